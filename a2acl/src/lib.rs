//! `a2acl`: A2ID matching and the ARPA2 access-control decision engine.
//!
//! Built on [`a2id_types`], which owns the identifier representation
//! itself; this crate owns everything that operates *on* identifiers —
//! parsing raw bytes into one, matching one against a selector, reading
//! ACL rule text, and the `whichlist` procedure that ties parsing,
//! matching, storage and generalisation together into a single verdict.

#![deny(missing_debug_implementations)]

pub mod engine;
pub mod loader;
pub mod matcher;
pub mod parser;
pub mod policy;
pub mod segments;
pub mod store;

pub use engine::{whichlist, EngineConfig, EngineError};
pub use loader::{load, LoaderError};
pub use matcher::matches;
pub use parser::{parse, ParseMode};
pub use policy::{parse_policy_line, PolicyLine, PolicyLineError, PolicyLineErrorKind, A2ACL_MAXLEN};
pub use segments::{AclSegment, AclSegments};
pub use store::{AclStore, FileStore, MemoryStore, StoreError};

pub use a2id_types::{A2Id, IdType, ListVerdict, ParseError, ParseErrorKind, SegIterError, SegIterErrorKind, A2ID_MAXLEN};
