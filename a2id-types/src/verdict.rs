use std::fmt;

/// The four ACL lists a rule, and ultimately a `whichlist` decision, can name.
///
/// Rendered as a single ASCII letter everywhere it crosses a text boundary
/// (policy files, rule segments), matching the `%W`/`%G`/`%B`/`%A` tags a
/// policy line uses to introduce a segment group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ListVerdict {
    Whitelist,
    Greylist,
    Blacklist,
    /// A sender that should be dropped without a bounce. Distinct from
    /// `Blacklist`, whose bounce behaviour is a policy choice made above
    /// this crate.
    Abandon,
}

impl ListVerdict {
    /// The single ASCII letter a policy line or rule segment uses to name
    /// this list.
    pub const fn letter(self) -> u8 {
        match self {
            Self::Whitelist => b'W',
            Self::Greylist => b'G',
            Self::Blacklist => b'B',
            Self::Abandon => b'A',
        }
    }

    /// Inverse of [`Self::letter`]. Returns `None` for anything but
    /// `W`/`G`/`B`/`A`.
    pub const fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'W' => Some(Self::Whitelist),
            b'G' => Some(Self::Greylist),
            b'B' => Some(Self::Blacklist),
            b'A' => Some(Self::Abandon),
            _ => None,
        }
    }
}

impl fmt::Display for ListVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Whitelist => "whitelist",
            Self::Greylist => "greylist",
            Self::Blacklist => "blacklist",
            Self::Abandon => "abandon",
        })
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for ListVerdict {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(*u.choose(&[
            Self::Whitelist,
            Self::Greylist,
            Self::Blacklist,
            Self::Abandon,
        ])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_round_trips() {
        for v in [
            ListVerdict::Whitelist,
            ListVerdict::Greylist,
            ListVerdict::Blacklist,
            ListVerdict::Abandon,
        ] {
            assert_eq!(ListVerdict::from_letter(v.letter()), Some(v));
        }
    }

    #[test]
    fn from_letter_rejects_unknown() {
        assert_eq!(ListVerdict::from_letter(b'X'), None);
        assert_eq!(ListVerdict::from_letter(b'w'), None);
    }
}
