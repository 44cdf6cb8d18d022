use std::fmt;

/// Longest byte sequence the parser will accept, mirroring the original
/// implementation's fixed-size working buffer.
pub const A2ID_MAXLEN: usize = 512;

/// Which of the three productions an A2ID's localpart matched.
///
/// `Service` and `Generic` differ only in whether the localpart begins with
/// `+`; `DomainOnly` means there was no localpart at all (a bare `@domain`,
/// only reachable when parsing in selector mode).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum IdType {
    DomainOnly,
    Generic,
    Service,
}

/// A parsed ARPA2 identifier or selector.
///
/// Stores the original bytes verbatim in a fixed-capacity buffer, plus the
/// offsets the parser (`a2acl::parser`) computed while walking the grammar.
/// Every accessor is a slice into that one buffer — there is no
/// re-allocation after parsing, and [`Self::generalize`] shrinks the buffer
/// in place rather than building a new one.
#[derive(Clone, Eq, PartialEq)]
pub struct A2Id {
    buf: [u8; A2ID_MAXLEN],
    id_len: usize,
    id_type: IdType,
    nropts: usize,
    generalized: u32,

    basename_off: usize,
    basename_len: usize,
    first_option_off: usize,
    first_option_len: usize,
    sig_flags_off: usize,
    sig_flags_len: usize,
    domain_off: usize,
    domain_len: usize,
}

/// The fields [`A2Id::from_raw_parts`] needs, computed by a grammar-aware
/// parser. Field meanings mirror the offsets documented on [`A2Id`]'s
/// accessors; this type does no validation of its own; whoever passes it to
/// `from_raw_parts` is attesting that it satisfies the invariants the
/// accessors rely on.
#[cfg(feature = "unvalidated")]
#[derive(Clone, Copy, Debug)]
pub struct RawParts {
    pub id_type: IdType,
    pub nropts: usize,
    pub basename_off: usize,
    pub basename_len: usize,
    pub first_option_off: usize,
    pub first_option_len: usize,
    pub sig_flags_off: usize,
    pub sig_flags_len: usize,
    pub domain_off: usize,
    pub domain_len: usize,
}

impl A2Id {
    #[cfg(feature = "unvalidated")]
    pub fn from_raw_parts(bytes: &[u8], parts: RawParts) -> Self {
        debug_assert!(bytes.len() <= A2ID_MAXLEN, "parser must enforce A2ID_MAXLEN");
        debug_assert_eq!(parts.domain_off, bytes.len() - parts.domain_len);
        let mut buf = [0u8; A2ID_MAXLEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            id_len: bytes.len(),
            id_type: parts.id_type,
            nropts: parts.nropts,
            generalized: 0,
            basename_off: parts.basename_off,
            basename_len: parts.basename_len,
            first_option_off: parts.first_option_off,
            first_option_len: parts.first_option_len,
            sig_flags_off: parts.sig_flags_off,
            sig_flags_len: parts.sig_flags_len,
            domain_off: parts.domain_off,
            domain_len: parts.domain_len,
        }
    }

    /// The full identifier, exactly as parsed (or as reduced so far by
    /// [`Self::generalize`]).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.id_len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.id_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id_len == 0
    }

    /// Everything before the `@`, including any service `+` prefix, option
    /// segments and signature-flags segment.
    #[inline]
    pub fn localpart(&self) -> &[u8] {
        &self.buf[..self.domain_off]
    }

    /// `@` followed by every domain label, dots included.
    #[inline]
    pub fn domain(&self) -> &[u8] {
        &self.buf[self.domain_off..self.domain_off + self.domain_len]
    }

    /// The localpart with its service prefix and all option/signature
    /// segments stripped.
    #[inline]
    pub fn basename(&self) -> &[u8] {
        &self.buf[self.basename_off..self.basename_off + self.basename_len]
    }

    /// The first option segment, leading `+` included, up to (not
    /// including) the second option, the signature-flags segment, or the
    /// domain, whichever comes first. Empty if there is no option.
    #[inline]
    pub fn first_option(&self) -> &[u8] {
        &self.buf[self.first_option_off..self.first_option_off + self.first_option_len]
    }

    /// The signature-flags segment, leading `+` included, trailing `+`
    /// excluded. Empty if the identifier carries no signature-flags
    /// segment.
    #[inline]
    pub fn sig_flags(&self) -> &[u8] {
        &self.buf[self.sig_flags_off..self.sig_flags_off + self.sig_flags_len]
    }

    #[inline]
    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    #[inline]
    pub fn has_signature(&self) -> bool {
        self.sig_flags_len > 0
    }

    /// Number of `+`-delimited option segments, signature-flags segment
    /// excluded. A trailing `+` immediately before `@` (e.g. `foo+@bar`)
    /// counts as one option whose byte content is empty; see
    /// [`Self::option_segments`].
    #[inline]
    pub fn option_count(&self) -> usize {
        self.nropts
    }

    /// How many [`Self::generalize`] steps have been applied so far.
    #[inline]
    pub fn generalization_steps(&self) -> u32 {
        self.generalized
    }

    #[inline]
    pub fn is_generalized(&self) -> bool {
        self.generalized > 0
    }

    /// Every option segment's bytes concatenated, `+` delimiters included
    /// between them but the very first leading `+` and the signature-flags
    /// tail excluded. Empty when there is no option or the first option is
    /// itself empty (including the `foo+@bar` case, where `option_count`
    /// is 1 but this is empty — see the original implementation's own
    /// observation that this asymmetry is non-obvious but load-bearing).
    pub fn option_segments(&self) -> &[u8] {
        if self.first_option_len <= 1 {
            return &[];
        }
        let start = self.first_option_off + 1;
        let end = self.domain_off
            - if self.sig_flags_len > 0 {
                self.sig_flags_len + 1
            } else {
                0
            };
        &self.buf[start..end]
    }

    /// `basename` + `domain`, the service prefix and every option and
    /// signature segment stripped. `Service` identifiers keep a single
    /// leading `+` so that the service indicator survives.
    pub fn core_form(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.basename_len + self.domain_len);
        match self.id_type {
            IdType::Service => out.push(b'+'),
            IdType::Generic | IdType::DomainOnly => {}
        }
        out.extend_from_slice(self.basename());
        out.extend_from_slice(self.domain());
        out
    }

    /// Applies one step of the generalisation rewrite described in the
    /// engine's decision loop, returning whether anything changed. Once
    /// this returns `false`, the identifier is `@.`, the universal
    /// selector, and further calls are no-ops.
    ///
    /// Reduction order: signature flags, then the last option segment,
    /// then the basename, then the rightmost domain label.
    pub fn generalize(&mut self) -> bool {
        if self.sig_flags_len > 0 {
            self.generalize_signature();
            return true;
        }
        if self.nropts > 0 {
            self.generalize_last_option();
            return true;
        }
        if self.basename_len > 0 {
            self.generalize_basename();
            return true;
        }
        self.generalize_domain_label()
    }

    fn generalize_signature(&mut self) {
        if self.sig_flags_len > 1 {
            let removed = self.sig_flags_len - 1;
            self.remove_range(self.sig_flags_off + 1, removed);
            self.sig_flags_len = 1;
        } else {
            self.remove_range(self.sig_flags_off, 2);
            self.sig_flags_len = 0;
        }
        self.generalized += 1;
    }

    fn generalize_last_option(&mut self) {
        let last = self.domain_off - 1;
        if self.buf[last] == b'+' {
            self.remove_range(last, 1);
            self.nropts -= 1;
            if self.nropts == 0 {
                self.first_option_len = 0;
            }
        } else {
            let mut start = last;
            while self.buf[start - 1] != b'+' {
                start -= 1;
            }
            let removed = last - start + 1;
            self.remove_range(start, removed);
            if self.nropts == 1 {
                self.first_option_len -= removed;
            }
        }
        self.generalized += 1;
    }

    fn generalize_basename(&mut self) {
        self.remove_range(self.basename_off, self.basename_len);
        self.basename_len = 0;
        self.generalized += 1;
    }

    fn generalize_domain_label(&mut self) -> bool {
        if self.domain_len == 2 && self.buf[self.domain_off + 1] == b'.' {
            return false;
        }
        let start = self.domain_off + 1;
        let end = self.domain_off + self.domain_len;
        let mut n = 0usize;
        while start + n < end && self.buf[start + n] != b'.' {
            n += 1;
        }
        if n == 0 {
            n = 1;
        }
        self.remove_range(start, n);
        self.domain_len -= n;
        if self.domain_len == 1 {
            self.insert_byte(self.domain_off + 1, b'.');
            self.domain_len = 2;
        }
        self.generalized += 1;
        true
    }

    /// Deletes `buf[start..start + len]`, shifting everything after it left
    /// and fixing up every span offset that pointed past the deleted bytes.
    fn remove_range(&mut self, start: usize, len: usize) {
        if len == 0 {
            return;
        }
        self.buf.copy_within(start + len..self.id_len, start);
        self.id_len -= len;
        let fixup = |off: &mut usize| {
            if *off >= start + len {
                *off -= len;
            }
        };
        fixup(&mut self.basename_off);
        fixup(&mut self.first_option_off);
        fixup(&mut self.sig_flags_off);
        fixup(&mut self.domain_off);
    }

    /// Inserts a single byte at `at`, shifting everything from `at` onward
    /// right by one. Only used to rewrite an exhausted domain back to the
    /// canonical `@.` form.
    fn insert_byte(&mut self, at: usize, byte: u8) {
        self.buf.copy_within(at..self.id_len, at + 1);
        self.buf[at] = byte;
        self.id_len += 1;
    }
}

impl fmt::Display for A2Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The grammar admits only basechar, '.', '@' and '+', all ASCII.
        f.write_str(std::str::from_utf8(self.as_bytes()).unwrap_or("<invalid a2id>"))
    }
}

impl fmt::Debug for A2Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A2Id")
            .field("value", &self.to_string())
            .field("id_type", &self.id_type)
            .field("nropts", &self.nropts)
            .field("has_signature", &self.has_signature())
            .field("generalized", &self.generalized)
            .finish()
    }
}

#[cfg(test)]
#[cfg(feature = "unvalidated")]
mod tests {
    use super::*;

    fn raw(bytes: &[u8], parts: RawParts) -> A2Id {
        A2Id::from_raw_parts(bytes, parts)
    }

    /// `foo+bar+sig+@example.com`: basename "foo", one option "bar", a
    /// two-byte signature-flags payload "sig".
    fn sample() -> A2Id {
        let bytes = b"foo+bar+sig+@example.com";
        raw(
            bytes,
            RawParts {
                id_type: IdType::Generic,
                nropts: 1,
                basename_off: 0,
                basename_len: 3,
                first_option_off: 3,
                first_option_len: 4,
                sig_flags_off: 7,
                sig_flags_len: 4,
                domain_off: 12,
                domain_len: bytes.len() - 12,
            },
        )
    }

    #[test]
    fn accessors_slice_correctly() {
        let id = sample();
        assert_eq!(id.basename(), b"foo");
        assert_eq!(id.first_option(), b"+bar");
        assert_eq!(id.sig_flags(), b"+sig");
        assert_eq!(id.domain(), b"@example.com");
        assert!(id.has_signature());
        assert_eq!(id.option_segments(), b"bar");
    }

    #[test]
    fn core_form_drops_options_and_signature() {
        let id = sample();
        assert_eq!(id.core_form(), b"foo@example.com");
    }

    #[test]
    fn generalize_walks_to_universal_selector() {
        let mut id = sample();
        let mut steps = 0;
        while id.generalize() {
            steps += 1;
            assert!(steps < 64, "generalize did not converge");
        }
        assert_eq!(id.as_bytes(), b"@.");
    }

    #[test]
    fn generalize_walks_through_expected_intermediate_forms() {
        let mut id = sample();
        // Signature flags first shrink to "any signature" (a bare "++")...
        assert!(id.generalize());
        assert_eq!(id.as_bytes(), b"foo+bar++@example.com");
        // ...then the signature requirement itself is dropped.
        assert!(id.generalize());
        assert_eq!(id.as_bytes(), b"foo+bar@example.com");
        // The last option's value is erased, leaving a dangling '+'...
        assert!(id.generalize());
        assert_eq!(id.as_bytes(), b"foo+@example.com");
        // ...which the next step removes entirely.
        assert!(id.generalize());
        assert_eq!(id.as_bytes(), b"foo@example.com");
        assert!(id.generalize());
        assert_eq!(id.as_bytes(), b"@example.com");
    }

    #[test]
    fn generalize_is_a_no_op_past_the_fixed_point() {
        let bytes = b"@.";
        let mut id = raw(
            bytes,
            RawParts {
                id_type: IdType::DomainOnly,
                nropts: 0,
                basename_off: 0,
                basename_len: 0,
                first_option_off: 0,
                first_option_len: 0,
                sig_flags_off: 0,
                sig_flags_len: 0,
                domain_off: 0,
                domain_len: 2,
            },
        );
        assert!(!id.generalize());
        assert_eq!(id.as_bytes(), b"@.");
    }

    #[test]
    fn dangling_option_plus_has_empty_option_segments() {
        // foo+@bar: nropts counts the trailing '+' as one option, but its
        // byte content is empty.
        let bytes = b"foo+@bar.example";
        let id = raw(
            bytes,
            RawParts {
                id_type: IdType::Generic,
                nropts: 1,
                basename_off: 0,
                basename_len: 3,
                first_option_off: 3,
                first_option_len: 1,
                sig_flags_off: 4,
                sig_flags_len: 0,
                domain_off: 4,
                domain_len: bytes.len() - 4,
            },
        );
        assert_eq!(id.option_count(), 1);
        assert_eq!(id.option_segments(), b"");
    }
}
