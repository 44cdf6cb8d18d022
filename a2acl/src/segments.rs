//! The ACL-rule segment grammar (component E): `%W +foo+ ++ %G +bar`.
//!
//! A rule line is a sequence of list-tag groups (`%W`, `%G`, `%B`, `%A`),
//! each followed by one or more blank-separated segments. A segment is a
//! bare wildcard (`+`), a name (`+name`), or either of those with a
//! trailing `+` that additionally demands a signature on the subject.

use a2id_types::charclass::basechar;
use a2id_types::{ListVerdict, SegIterError, SegIterErrorKind};

/// One segment out of an ACL rule, together with the list tag currently in
/// effect (the last `%`-tag seen, which may have been several segments
/// back).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AclSegment<'a> {
    pub list: ListVerdict,
    /// Empty for a wildcard segment; the option name otherwise.
    pub name: &'a [u8],
    pub requires_signature: bool,
}

impl AclSegment<'_> {
    pub fn is_wildcard(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Start,
    SetList,
    List,
    Wildcard,
    SegmentName,
    SubSegment,
    ReqSigFlags,
    PostSegment,
    Done,
}

/// Streams the segments out of one ACL rule line's rule text (the part
/// after the remote selector and local identifier).
#[derive(Debug)]
pub struct AclSegments<'a> {
    rule: &'a [u8],
    pos: usize,
    state: State,
    current_list: ListVerdict,
}

impl<'a> AclSegments<'a> {
    pub fn new(rule: &'a [u8]) -> Self {
        Self {
            rule,
            pos: 0,
            state: State::Start,
            current_list: ListVerdict::Greylist,
        }
    }

    fn err(&mut self, offset: usize, kind: SegIterErrorKind) -> Option<Result<AclSegment<'a>, SegIterError>> {
        self.state = State::Done;
        Some(Err(SegIterError::new(offset, kind)))
    }
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

impl<'a> Iterator for AclSegments<'a> {
    type Item = Result<AclSegment<'a>, SegIterError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }

        let mut seg_start = self.pos;
        let mut name_end = self.pos;
        let mut requires_signature = false;

        loop {
            if self.pos >= self.rule.len() {
                return match self.state {
                    State::Wildcard => {
                        self.state = State::Done;
                        Some(Ok(AclSegment {
                            list: self.current_list,
                            name: &[],
                            requires_signature: false,
                        }))
                    }
                    State::SegmentName => {
                        self.state = State::Done;
                        Some(Ok(AclSegment {
                            list: self.current_list,
                            name: &self.rule[seg_start..self.pos],
                            requires_signature: false,
                        }))
                    }
                    State::ReqSigFlags => {
                        self.state = State::Done;
                        Some(Ok(AclSegment {
                            list: self.current_list,
                            name: &self.rule[seg_start..name_end],
                            requires_signature: true,
                        }))
                    }
                    State::PostSegment => {
                        self.state = State::Done;
                        None
                    }
                    State::Start | State::SetList | State::List | State::SubSegment => {
                        self.err(self.pos, SegIterErrorKind::Truncated)
                    }
                    State::Done => unreachable!(),
                };
            }

            let b = self.rule[self.pos];
            match self.state {
                State::Start => {
                    if is_blank(b) {
                        self.pos += 1;
                    } else if b == b'%' {
                        self.pos += 1;
                        self.state = State::SetList;
                    } else {
                        return self.err(self.pos, SegIterErrorKind::BadListTag);
                    }
                }
                State::SetList => match ListVerdict::from_letter(b) {
                    Some(list) => {
                        self.current_list = list;
                        self.pos += 1;
                        self.state = State::List;
                    }
                    None => return self.err(self.pos, SegIterErrorKind::BadListTag),
                },
                State::List => {
                    if is_blank(b) {
                        self.pos += 1;
                    } else if b == b'+' {
                        self.pos += 1;
                        self.state = State::Wildcard;
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::Wildcard => {
                    seg_start = self.pos;
                    if is_blank(b) {
                        self.pos += 1;
                        self.state = State::PostSegment;
                        return Some(Ok(AclSegment {
                            list: self.current_list,
                            name: &[],
                            requires_signature: false,
                        }));
                    } else if b == b'+' {
                        self.pos += 1;
                        self.state = State::ReqSigFlags;
                        requires_signature = true;
                        name_end = seg_start;
                    } else if basechar(b) || b == b'.' {
                        self.pos += 1;
                        self.state = State::SegmentName;
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::SegmentName => {
                    if basechar(b) || b == b'.' {
                        self.pos += 1;
                    } else if is_blank(b) {
                        let name = &self.rule[seg_start..self.pos];
                        self.pos += 1;
                        self.state = State::PostSegment;
                        return Some(Ok(AclSegment {
                            list: self.current_list,
                            name,
                            requires_signature: false,
                        }));
                    } else if b == b'+' {
                        match self.rule.get(self.pos + 1).copied() {
                            Some(nb) if basechar(nb) || nb == b'.' => {
                                self.pos += 1;
                                self.state = State::SubSegment;
                            }
                            None => {
                                name_end = self.pos;
                                self.pos += 1;
                                self.state = State::ReqSigFlags;
                                requires_signature = true;
                            }
                            Some(nb) if is_blank(nb) => {
                                name_end = self.pos;
                                self.pos += 1;
                                self.state = State::ReqSigFlags;
                                requires_signature = true;
                            }
                            _ => return self.err(self.pos + 1, SegIterErrorKind::UnexpectedByte),
                        }
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::SubSegment => {
                    if basechar(b) || b == b'.' {
                        self.pos += 1;
                        self.state = State::SegmentName;
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::ReqSigFlags => {
                    if is_blank(b) {
                        let name = &self.rule[seg_start..name_end];
                        self.pos += 1;
                        self.state = State::PostSegment;
                        return Some(Ok(AclSegment {
                            list: self.current_list,
                            name,
                            requires_signature,
                        }));
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::PostSegment => {
                    if is_blank(b) {
                        self.pos += 1;
                    } else if b == b'+' {
                        self.pos += 1;
                        self.state = State::Wildcard;
                    } else if b == b'%' {
                        self.pos += 1;
                        self.state = State::SetList;
                    } else {
                        return self.err(self.pos, SegIterErrorKind::UnexpectedByte);
                    }
                }
                State::Done => unreachable!(),
            }
        }
    }
}
