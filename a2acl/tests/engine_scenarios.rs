//! End-to-end scenarios exercising the parser, matcher, store and decision
//! engine together, the way a mail filter actually calls this crate.

use a2acl::{
    load, parse, whichlist, AclStore, EngineConfig, FileStore, ListVerdict, MemoryStore, ParseMode,
};

fn ident(s: &str) -> a2acl::A2Id {
    parse(s.as_bytes(), ParseMode::Identifier).unwrap()
}

#[test]
fn empty_store_always_greylists() {
    let store = MemoryStore::new();
    let remote = ident("a@b.example");
    let local = ident("c@d.example");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Greylist);
}

#[test]
fn universal_rule_keyed_on_local_matches_via_an_option() {
    let local = ident("foo+bar@d.example");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%W +bar").unwrap();

    let remote = ident("baz@ex.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Whitelist);
}

#[test]
fn extra_local_options_do_not_break_a_matching_rule() {
    let local = ident("foo+bar+baz@d.example");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%W +bar").unwrap();

    let remote = ident("baz@ex.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Whitelist);
}

#[test]
fn a_rule_naming_only_a_later_option_does_not_match_an_earlier_one() {
    // "bar+baz"'s option span is "bar+baz"; a segment naming "baz" alone is
    // not a prefix of that span, so it must not match even though "baz" is
    // one of the local id's option names.
    let local = ident("foo+bar+baz@d.example");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%W +baz").unwrap();

    let remote = ident("anyone@ex.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Greylist, "'baz' is not a prefix of the option span 'bar+baz'");
}

#[test]
fn a_segment_name_can_span_two_option_segments() {
    // A name may itself be a "+"-joined sequence (spec grammar: `name =
    // basechar *( basechar / "." / "+" basechar )`), so a rule segment can
    // match a prefix of the option span that crosses an option boundary.
    let local = ident("foo+bar+baz@d.example");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%W +bar+baz").unwrap();

    let remote = ident("anyone@ex.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Whitelist);
}

#[test]
fn a_later_list_group_in_the_same_rule_can_still_win() {
    let local = ident("bob+partner@d.example");
    let mut store = MemoryStore::new();
    store
        .put(b"@.", &local.core_form(), b"%W +nobody %B +partner")
        .unwrap();

    let remote = ident("baz@ex.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Blacklist);
}

#[test]
fn malformed_rule_is_reported_instead_of_silently_falling_back() {
    let local = ident("c@d.example");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%X +foo").unwrap();

    let remote = ident("a@b.example");
    let err = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, a2acl::EngineError::MalformedRule { .. }));
}

#[test]
fn more_specific_selector_wins_over_a_more_general_one() {
    let local = ident("c@d.example");
    let mut store = MemoryStore::new();
    store.put(b"alice@example.com", &local.core_form(), b"%W +").unwrap();
    store.put(b"@example.com", &local.core_form(), b"%B +").unwrap();

    let remote = ident("alice@example.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Whitelist, "the exact selector must be tried before the domain-only one");
}

#[test]
fn loading_a_policy_file_end_to_end_then_deciding() {
    let dir = tempfile::tempdir().unwrap();
    let policy_path = dir.path().join("acl.conf");
    std::fs::write(
        &policy_path,
        "alice@example.com bob@local.net %W +\n\
         @example.com bob@local.net %B +\n\
         @. bob@local.net %G +\n",
    )
    .unwrap();

    let (store, count): (FileStore, usize) = load(&policy_path).unwrap();
    assert_eq!(count, 3);

    let local = ident("bob@local.net");
    let config = EngineConfig::default();

    let whitelisted = ident("alice@example.com");
    assert_eq!(whichlist(&store, &whitelisted, &local, &config).unwrap(), ListVerdict::Whitelist);

    let blacklisted = ident("mallory+spam@example.com");
    assert_eq!(whichlist(&store, &blacklisted, &local, &config).unwrap(), ListVerdict::Blacklist);

    let unrelated = ident("nobody@somewhere.example");
    assert_eq!(whichlist(&store, &unrelated, &local, &config).unwrap(), ListVerdict::Greylist);
}

#[test]
fn signature_required_rules_reject_unsigned_senders_and_fall_through() {
    let local = ident("bob@local.net");
    let mut store = MemoryStore::new();
    store.put(b"@.", &local.core_form(), b"%W ++").unwrap();

    let remote = ident("alice@example.com");
    let verdict = whichlist(&store, &remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Greylist, "no signature on the remote end, wildcard-with-signature must not fire");

    let signed_remote = ident("alice+sig+@example.com");
    let verdict = whichlist(&store, &signed_remote, &local, &EngineConfig::default()).unwrap();
    assert_eq!(verdict, ListVerdict::Greylist, "the signature requirement is checked on local_id, not remote_id");
}
