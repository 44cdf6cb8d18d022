use thiserror::Error;

/// Why [`crate::id::A2Id`] parsing rejected an input.
///
/// Carries no byte offset itself; [`ParseError`] pairs a `ParseErrorKind`
/// with the offset at which the parser's state machine got stuck.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("byte is not valid in the current grammar state")]
    UnexpectedByte,
    #[error("input exceeds the {} byte maximum", crate::id::A2ID_MAXLEN)]
    TooLong,
    #[error("input ended while the grammar still expected more bytes")]
    Truncated,
}

/// An A2ID (or selector) failed to parse.
///
/// `offset` is always a valid index into the input that was handed to the
/// parser — never past the end — so callers can slice `input[..offset]` to
/// show "parsed this much, then got stuck here" diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("invalid A2ID at byte {offset}: {kind}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub const fn new(offset: usize, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }
}

/// An ACL rule's segment grammar (`%W +foo+ ++`) rejected an input.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("invalid ACL rule at byte {offset}: {kind}")]
pub struct SegIterError {
    pub offset: usize,
    pub kind: SegIterErrorKind,
}

impl SegIterError {
    pub const fn new(offset: usize, kind: SegIterErrorKind) -> Self {
        Self { offset, kind }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SegIterErrorKind {
    #[error("expected '%' followed by one of W, G, B, A")]
    BadListTag,
    #[error("byte is not valid inside a segment or its delimiters")]
    UnexpectedByte,
    #[error("rule ended with an unterminated segment")]
    Truncated,
}
