//! Character-mapping allocation for legacy code pages.
//!
//! A corpus of text and JSON files is scanned for characters that a target
//! engine's code page (optionally narrowed by a reference font) cannot show.
//! Each such character gets a unique proxy from the code page's double-byte
//! space; the mapping is persisted as JSON and applied to a mirrored copy of
//! the corpus.
//!
//! The [`coverage`] module answers the reverse question for fonts: which of a
//! set of fallback fonts best covers the characters a primary font lacks.

mod allocate;
mod codepage;
pub mod corpus;
pub mod coverage;
mod error;
mod mapping;
pub mod text;

pub use allocate::{AllocationOutcome, Classification, ProxyPool, allocate, classify};
pub use codepage::CodePage;
pub use corpus::{Corpus, DEFAULT_EXTENSIONS, parse_extensions};
pub use coverage::{CoverageReport, assign_coverage};
pub use error::{CharmapError, Result};
pub use mapping::CharacterMapping;
