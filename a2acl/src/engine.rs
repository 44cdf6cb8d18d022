//! The `whichlist` decision procedure (component H): generalise the remote
//! identifier until a stored rule matches, then test that rule's segments
//! against the local identifier.

use thiserror::Error;

use a2id_types::{A2Id, A2ID_MAXLEN};

use crate::segments::AclSegment;
use crate::segments::AclSegments;
use crate::store::{AclStore, StoreError};
use a2id_types::ListVerdict;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store lookup failed: {0}")]
    Store(#[from] StoreError),
    #[error("stored rule at offset {offset} is malformed: {source}")]
    MalformedRule {
        offset: usize,
        #[source]
        source: a2id_types::SegIterError,
    },
}

/// Tunables for [`whichlist`]. `Default` mirrors the original's behaviour:
/// generalise all the way to the universal selector if nothing matches
/// sooner, and fall back to [`ListVerdict::Greylist`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub max_generalisation_steps: usize,
    pub default_verdict: ListVerdict,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_generalisation_steps: A2ID_MAXLEN,
            default_verdict: ListVerdict::Greylist,
        }
    }
}

/// Decides how `remote_id` should be treated when it mails `local_id`.
///
/// `remote_id` is progressively generalised (starting from its own exact
/// form) and looked up against `store` keyed on `local_id`'s core form,
/// until either a stored rule is found or the remote selector reaches the
/// fixed point `@.`. The winning rule's segments are then matched against
/// `local_id`'s option segments; the most specific matching segment's list
/// tag is the verdict. A present-but-unmatched rule falls through to the
/// next, more general, remote selector exactly as an absent one would.
pub fn whichlist(
    store: &dyn AclStore,
    remote_id: &A2Id,
    local_id: &A2Id,
    config: &EngineConfig,
) -> Result<ListVerdict, EngineError> {
    let local_core = local_id.core_form();
    let mut remote = remote_id.clone();

    for step in 0..=config.max_generalisation_steps {
        let selector_bytes = remote.as_bytes();
        log::trace!("whichlist: probing selector {:?} (step {})", String::from_utf8_lossy(selector_bytes), step);

        if let Some(rule) = store.get(selector_bytes, &local_core)? {
            if let Some(verdict) = evaluate_rule(rule, local_id)? {
                log::debug!(
                    "whichlist: selector {:?} matched, verdict {verdict}",
                    String::from_utf8_lossy(selector_bytes)
                );
                return Ok(verdict);
            }
            log::trace!("whichlist: rule present but no segment matched, generalising further");
        }

        if !remote.generalize() {
            break;
        }
    }

    log::warn!(
        "whichlist: no rule matched {:?}, falling back to {}",
        local_id,
        config.default_verdict
    );
    Ok(config.default_verdict)
}

/// Walks `rule`'s segments looking for one that matches `local_id`,
/// returning the first (and per the grammar, only meaningfully first)
/// match's list tag.
fn evaluate_rule(rule: &[u8], local_id: &A2Id) -> Result<Option<ListVerdict>, EngineError> {
    for seg in AclSegments::new(rule) {
        let seg = seg.map_err(|e| EngineError::MalformedRule {
            offset: e.offset,
            source: e,
        })?;
        if segment_matches(local_id, &seg) {
            return Ok(Some(seg.list));
        }
    }
    Ok(None)
}

/// Whether one ACL segment applies to `local_id`: a wildcard always
/// applies; a named segment matches iff its bytes are a prefix of
/// `local_id`'s whole concatenated option-segments span (starting at
/// offset 0, not at each option's own start), with the prefix's end
/// landing on a `+` delimiter or the end of the span; either may
/// additionally require a signature.
fn segment_matches(local_id: &A2Id, seg: &AclSegment<'_>) -> bool {
    if seg.requires_signature && !local_id.has_signature() {
        return false;
    }
    if seg.is_wildcard() {
        return true;
    }
    let opts = local_id.option_segments();
    opts.len() >= seg.name.len()
        && opts[..seg.name.len()].eq_ignore_ascii_case(seg.name)
        && matches!(opts.get(seg.name.len()), None | Some(b'+'))
}
