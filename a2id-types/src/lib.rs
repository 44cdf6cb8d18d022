//! Misuse-resistant data structures for ARPA2 identifiers (A2ID) and the
//! verdicts an ACL decision can reach.
//!
//! This crate holds types only: the byte-classification tables, the `A2Id`
//! struct and the operations defined purely in terms of its own bytes
//! (`core_form`, `option_segments`, `generalize`), and the small enums
//! (`IdType`, `ListVerdict`) those types are built from. Turning raw bytes
//! into an `A2Id`, matching one identifier against another, and everything
//! to do with ACL rules and policy stores lives in `a2acl`, which depends
//! on this crate.

#![deny(missing_debug_implementations)]

pub mod charclass;
pub mod error;
pub mod id;
pub mod verdict;

pub use error::{ParseError, ParseErrorKind, SegIterError, SegIterErrorKind};
pub use id::{A2Id, IdType, A2ID_MAXLEN};
pub use verdict::ListVerdict;

#[cfg(feature = "unvalidated")]
pub use id::RawParts;
