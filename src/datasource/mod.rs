//! Context data source: retrieval plus token-budgeted assembly.
//!
//! `SearchDataSource` runs one embed → search → format pipeline per call
//! and concatenates formatted fragments until the caller's token budget
//! would be exceeded. Whole candidates only: a fragment that does not fit
//! is dropped, never cut.

mod source;

pub use source::{AssembledContext, DataSource, SearchDataSource};
