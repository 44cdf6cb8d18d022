//! A2ID matching (component D): does a subject identifier satisfy a
//! selector?
//!
//! Named `matcher` rather than `match` because the latter is a reserved
//! word. Operates only through `a2id_types::A2Id`'s public accessors, so it
//! needs no special access to the type's internals the way the parser does.

use a2id_types::{A2Id, IdType};

/// True if `subject` satisfies `selector`.
///
/// `selector` should be either the result of parsing with
/// [`crate::parser::ParseMode::Selector`] or an identifier that has been
/// [`A2Id::generalize`]d; `subject` is ordinarily a plain parsed identifier.
/// An empty localpart or domain on the selector side means "no constraint"
/// for that half — `@.`, the fully generalized selector, matches every
/// subject.
pub fn matches(subject: &A2Id, selector: &A2Id) -> bool {
    localpart_matches(subject, selector) && domain_matches(subject, selector)
}

fn localpart_matches(subject: &A2Id, selector: &A2Id) -> bool {
    let sel_lp = selector.localpart();
    if sel_lp.is_empty() {
        return true;
    }
    let sub_lp = subject.localpart();
    if sel_lp.len() > sub_lp.len() {
        return false;
    }

    if selector.has_signature() {
        if !subject.has_signature() {
            return false;
        }
        let sel_sig = selector.sig_flags();
        // A signature-flags length of 1 is just the bare leading '+': "any
        // signature will do". Only a longer span demands exact agreement.
        if sel_sig.len() > 1 {
            let sub_sig = subject.sig_flags();
            if !sub_sig.eq_ignore_ascii_case(sel_sig) {
                return false;
            }
        }
    }

    let (mut si, mut oi) = (0usize, 0usize);
    if selector.id_type() == IdType::Service {
        if subject.id_type() != IdType::Service {
            return false;
        }
        si = 1;
        oi = 1;
    }

    if selector.option_count() > subject.option_count() {
        return false;
    }

    // One comparison for the basename, one per selector option.
    let total_segments = selector.option_count() + 1;
    for seg_idx in 0..total_segments {
        let sel_seg_start = si;
        while si < sel_lp.len() && sel_lp[si] != b'+' {
            si += 1;
        }
        let sel_seg = &sel_lp[sel_seg_start..si];

        if sel_seg.is_empty() {
            // Empty selector segment: just require the subject to have
            // something there, without constraining what it is.
            if oi >= sub_lp.len() || sub_lp[oi] == b'+' {
                return false;
            }
            while oi < sub_lp.len() && sub_lp[oi] != b'+' {
                oi += 1;
            }
        } else {
            let sub_seg_start = oi;
            while oi < sub_lp.len() && sub_lp[oi] != b'+' {
                oi += 1;
            }
            if !sub_lp[sub_seg_start..oi].eq_ignore_ascii_case(sel_seg) {
                return false;
            }
        }

        if seg_idx + 1 < total_segments {
            if si >= sel_lp.len() || oi >= sub_lp.len() {
                return false;
            }
            debug_assert_eq!(sel_lp[si], b'+', "nropts guarantees another segment follows");
            if sub_lp[oi] != b'+' {
                return false;
            }
            si += 1;
            oi += 1;
        }
    }
    true
}

fn domain_matches(subject: &A2Id, selector: &A2Id) -> bool {
    let sel_dom = selector.domain();
    if sel_dom.len() <= 1 {
        // Empty, or just a bare '@': no domain constraint at all.
        return true;
    }
    let sub_dom = subject.domain();
    let mut si = sel_dom.len();
    let mut oi = sub_dom.len();

    loop {
        if si > 1 && sel_dom[si - 1] == b'.' {
            si -= 1;
        }
        if oi > 1 && sub_dom[oi - 1] == b'.' {
            oi -= 1;
        }

        let mut p = si;
        while p > 1 && sel_dom[p - 1] != b'.' {
            p -= 1;
        }
        let sel_label = &sel_dom[p..si];

        if sel_label.is_empty() {
            if oi <= 1 || sub_dom[oi - 1] == b'.' {
                return false;
            }
            let mut q = oi;
            while q > 1 && sub_dom[q - 1] != b'.' {
                q -= 1;
            }
            oi = q;
        } else {
            let mut q = oi;
            while q > 1 && sub_dom[q - 1] != b'.' {
                q -= 1;
            }
            if !sub_dom[q..oi].eq_ignore_ascii_case(sel_label) {
                return false;
            }
            oi = q;
        }
        si = p;

        if si <= 1 {
            return true;
        }
        if oi <= 1 || sub_dom[oi - 1] != b'.' {
            return false;
        }
        debug_assert_eq!(sel_dom[si - 1], b'.', "loop only stops short of 1 at a label boundary");
        si -= 1;
        oi -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseMode};

    fn ident(s: &str) -> A2Id {
        parse(s.as_bytes(), ParseMode::Identifier).unwrap()
    }

    fn sel(s: &str) -> A2Id {
        parse(s.as_bytes(), ParseMode::Selector).unwrap()
    }

    #[test]
    fn identifier_matches_itself_as_a_selector() {
        let id = ident("alice@example.com");
        assert!(matches(&id, &id));
    }

    #[test]
    fn universal_selector_matches_everything() {
        let top = sel("@.");
        assert!(matches(&ident("alice@example.com"), &top));
        assert!(matches(&ident("+pop3@sub.example.org"), &top));
    }

    #[test]
    fn domain_only_selector_ignores_localpart() {
        let s = sel("@example.com");
        assert!(matches(&ident("alice@example.com"), &s));
        assert!(matches(&ident("bob+vacation@example.com"), &s));
        assert!(!matches(&ident("alice@other.com"), &s));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let s = sel("Alice@Example.COM");
        assert!(matches(&ident("alice@example.com"), &s));
    }

    #[test]
    fn option_mismatch_rejects() {
        let s = sel("alice+vacation@example.com");
        assert!(matches(&ident("alice+vacation@example.com"), &s));
        assert!(!matches(&ident("alice+urgent@example.com"), &s));
        assert!(!matches(&ident("alice@example.com"), &s));
    }

    #[test]
    fn empty_option_segment_is_an_existence_check() {
        let s = sel("alice+@example.com");
        assert!(matches(&ident("alice+anything@example.com"), &s));
        assert!(!matches(&ident("alice@example.com"), &s));
    }

    #[test]
    fn signature_requirement_propagates() {
        let s = sel("alice++@example.com");
        assert!(matches(&ident("alice++@example.com"), &s));
        assert!(matches(&ident("alice+sig+@example.com"), &s));
        assert!(!matches(&ident("alice@example.com"), &s));
    }

    #[test]
    fn exact_signature_flags_must_match() {
        let s = sel("alice+strong+@example.com");
        assert!(matches(&ident("alice+strong+@example.com"), &s));
        assert!(!matches(&ident("alice+weak+@example.com"), &s));
    }

    #[test]
    fn service_type_must_agree() {
        let s = sel("+pop3@example.com");
        assert!(matches(&ident("+pop3@example.com"), &s));
        assert!(!matches(&ident("pop3@example.com"), &s));
    }

    #[test]
    fn empty_domain_label_is_an_existence_check() {
        let s = sel("@a..example.com");
        assert!(matches(&ident("a@a.b.example.com"), &s));
        assert!(!matches(&ident("a@a.example.com"), &s));
    }
}
