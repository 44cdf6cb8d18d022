//! The A2ID grammar's hand-written DFA (component B of the ACL engine).
//!
//! Deliberately not built on a parser-combinator library: the grammar is a
//! handful of states with no backtracking, and a combinator stack buys
//! nothing here but indirection. `match (state, byte)` is the whole parser.

use a2id_types::charclass::basechar;
use a2id_types::{A2Id, IdType, ParseError, ParseErrorKind, RawParts, A2ID_MAXLEN};

/// Whether `parse` should accept the relaxed selector grammar (empty
/// localpart/domain, bare `@`, `@.`, empty intermediate labels) or the
/// strict identifier grammar a real sender address must satisfy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseMode {
    Identifier,
    Selector,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Start,
    Service,
    Localpart,
    Option,
    NewLabel,
    Domain,
}

/// Parses `input` as an A2ID (or, in [`ParseMode::Selector`], a selector).
///
/// `offset` on a returned [`ParseError`] is always a valid index into
/// `input`, pointing at the byte the grammar could not accept in its
/// current state (or `input.len()` if the input ended too early).
pub fn parse(input: &[u8], mode: ParseMode) -> Result<A2Id, ParseError> {
    if input.len() > A2ID_MAXLEN {
        return Err(ParseError::new(A2ID_MAXLEN, ParseErrorKind::TooLong));
    }
    let selector = mode == ParseMode::Selector;

    let mut state = State::Start;
    let mut basename: Option<usize> = None;
    let mut firstopt: Option<usize> = None;
    let mut secondopt: Option<usize> = None;
    let mut curopt: Option<usize> = None;
    let mut prevopt: Option<usize> = None;
    let mut domain: Option<usize> = None;
    let mut nropts: usize = 0;

    for (i, &b) in input.iter().enumerate() {
        state = match state {
            State::Start => {
                if basechar(b) || b == b'.' {
                    basename = Some(i);
                    State::Localpart
                } else if b == b'+' {
                    State::Service
                } else if b == b'@' {
                    domain = Some(i);
                    State::NewLabel
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
            State::Service => {
                if basechar(b) || b == b'.' {
                    basename = Some(i);
                    State::Localpart
                } else if selector && b == b'@' {
                    domain = Some(i);
                    State::NewLabel
                } else if selector && b == b'+' {
                    curopt = Some(i);
                    firstopt = Some(i);
                    nropts += 1;
                    State::Option
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
            State::Localpart => {
                if basechar(b) || b == b'.' {
                    State::Localpart
                } else if b == b'+' {
                    prevopt = curopt;
                    curopt = Some(i);
                    if firstopt.is_none() {
                        firstopt = Some(i);
                    } else if secondopt.is_none() {
                        secondopt = Some(i);
                    }
                    nropts += 1;
                    State::Option
                } else if b == b'@' {
                    domain = Some(i);
                    State::NewLabel
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
            State::Option => {
                if basechar(b) || b == b'.' {
                    State::Localpart
                } else if b == b'+' {
                    prevopt = curopt;
                    curopt = Some(i);
                    if secondopt.is_none() {
                        secondopt = Some(i);
                    }
                    nropts += 1;
                    State::Option
                } else if b == b'@' {
                    domain = Some(i);
                    State::NewLabel
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
            State::Domain => {
                if basechar(b) {
                    State::Domain
                } else if b == b'.' {
                    State::NewLabel
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
            State::NewLabel => {
                if basechar(b) {
                    State::Domain
                } else if selector && b == b'.' {
                    State::NewLabel
                } else {
                    return Err(ParseError::new(i, ParseErrorKind::UnexpectedByte));
                }
            }
        };
    }

    match state {
        State::Domain => {}
        State::NewLabel if selector => {}
        _ => return Err(ParseError::new(input.len(), ParseErrorKind::Truncated)),
    }

    debug_assert!(domain.is_some(), "Domain/NewLabel end state implies '@' was consumed");
    let domain_off = domain.unwrap_or(input.len());
    let domain_len = input.len() - domain_off;

    let id_type = if domain_off == 0 {
        IdType::DomainOnly
    } else if input[0] == b'+' {
        IdType::Service
    } else {
        IdType::Generic
    };

    // A signature-flags segment is a pair of adjacent '+'s, the second one
    // sitting right before '@': "...+flags+@..." or the degenerate "...++@...".
    let mut sig_flags_off = domain_off;
    let mut sig_flags_len = 0usize;
    if let (Some(cur), Some(prev)) = (curopt, prevopt) {
        if cur + 1 == domain_off {
            debug_assert!(nropts >= 2, "both curopt and prevopt implies two prior increments");
            sig_flags_off = prev;
            sig_flags_len = cur - prev;
            nropts -= 2;
            if nropts == 0 {
                firstopt = None;
            }
        }
    }

    let (first_option_off, first_option_len) = match firstopt {
        None => (domain_off, 0),
        Some(fo) => {
            let end = if let Some(so) = secondopt {
                so
            } else if sig_flags_len > 0 {
                sig_flags_off
            } else {
                domain_off
            };
            (fo, end - fo)
        }
    };

    let (basename_off, basename_len) = match basename {
        None => (domain_off, 0),
        Some(bn) => {
            let end = if first_option_len > 0 {
                first_option_off
            } else if sig_flags_len > 0 {
                sig_flags_off
            } else {
                domain_off
            };
            (bn, end - bn)
        }
    };

    Ok(A2Id::from_raw_parts(
        input,
        RawParts {
            id_type,
            nropts,
            basename_off,
            basename_len,
            first_option_off,
            first_option_len,
            sig_flags_off,
            sig_flags_len,
            domain_off,
            domain_len,
        },
    ))
}
