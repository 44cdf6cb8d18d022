//! Policy-line grammar (component F): `<remote-selector> <local-id> <rule>`.

use thiserror::Error;

use a2id_types::A2ID_MAXLEN;

/// Longest an ACL rule's text (everything after the local identifier
/// field) is allowed to be.
pub const A2ACL_MAXLEN: usize = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum PolicyLineErrorKind {
    #[error("line is shorter than the shortest possible rule")]
    LineTooShort,
    #[error("remote selector field is too short")]
    SelectorTooShort,
    #[error("remote selector exceeds the {A2ID_MAXLEN} byte maximum")]
    SelectorTooLong,
    #[error("expected a blank separating fields")]
    ExpectedBlank,
    #[error("local identifier field is too short")]
    LocalIdTooShort,
    #[error("local identifier exceeds the {A2ID_MAXLEN} byte maximum")]
    LocalIdTooLong,
    #[error("rule field is too short, or contains a non-printable byte")]
    RuleInvalid,
    #[error("rule exceeds the {A2ACL_MAXLEN} byte maximum")]
    RuleTooLong,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("invalid policy line at byte {offset}: {kind}")]
pub struct PolicyLineError {
    pub offset: usize,
    pub kind: PolicyLineErrorKind,
}

impl PolicyLineError {
    const fn new(offset: usize, kind: PolicyLineErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// The three whitespace-separated fields of one policy line, still
/// borrowed from the caller's line buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PolicyLine<'a> {
    pub remote_selector: &'a [u8],
    pub local_id: &'a [u8],
    pub rule: &'a [u8],
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_graph(b: u8) -> bool {
    (0x21..=0x7e).contains(&b)
}

fn is_print(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}

fn skip_blanks(line: &[u8], pos: &mut usize) {
    while *pos < line.len() && is_blank(line[*pos]) {
        *pos += 1;
    }
}

fn consume_graph(line: &[u8], pos: &mut usize) {
    while *pos < line.len() && is_graph(line[*pos]) {
        *pos += 1;
    }
}

/// Parses one already newline-stripped policy-file line into its three
/// fields. `"@. a@b %B+"`, the shortest possible rule, is the minimum
/// accepted length.
pub fn parse_policy_line(line: &[u8]) -> Result<PolicyLine<'_>, PolicyLineError> {
    const MIN_LEN: usize = 10; // "@. a@b %B+".len()
    if line.len() < MIN_LEN {
        return Err(PolicyLineError::new(0, PolicyLineErrorKind::LineTooShort));
    }

    let mut pos = 0usize;
    skip_blanks(line, &mut pos);
    let sel_start = pos;
    consume_graph(line, &mut pos);
    let remote_selector = &line[sel_start..pos];
    if remote_selector.len() < 2 {
        return Err(PolicyLineError::new(sel_start, PolicyLineErrorKind::SelectorTooShort));
    }
    if remote_selector.len() > A2ID_MAXLEN {
        return Err(PolicyLineError::new(sel_start, PolicyLineErrorKind::SelectorTooLong));
    }
    if pos >= line.len() || !is_blank(line[pos]) {
        return Err(PolicyLineError::new(pos, PolicyLineErrorKind::ExpectedBlank));
    }

    skip_blanks(line, &mut pos);
    let id_start = pos;
    consume_graph(line, &mut pos);
    let local_id = &line[id_start..pos];
    if local_id.len() < 3 {
        return Err(PolicyLineError::new(id_start, PolicyLineErrorKind::LocalIdTooShort));
    }
    if local_id.len() > A2ID_MAXLEN {
        return Err(PolicyLineError::new(id_start, PolicyLineErrorKind::LocalIdTooLong));
    }
    if pos >= line.len() || !is_blank(line[pos]) {
        return Err(PolicyLineError::new(pos, PolicyLineErrorKind::ExpectedBlank));
    }

    skip_blanks(line, &mut pos);
    let rule_start = pos;
    let rule = &line[rule_start..];
    if rule.len() < 3 || !rule.iter().all(|&b| is_print(b)) {
        return Err(PolicyLineError::new(rule_start, PolicyLineErrorKind::RuleInvalid));
    }
    if rule.len() > A2ACL_MAXLEN {
        return Err(PolicyLineError::new(rule_start, PolicyLineErrorKind::RuleTooLong));
    }

    Ok(PolicyLine {
        remote_selector,
        local_id,
        rule,
    })
}
