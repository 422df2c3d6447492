//! Genome range search: overlap queries over annotated gene intervals.
//!
//! The heart of the crate is [`tree::IntervalTree`], an unbalanced binary
//! search tree keyed by interval start and augmented with the maximum end of
//! each subtree. Everything else loads data into it, validates outside
//! input, or renders its results.
//!
//! # Example
//!
//! ```rust
//! use generange::{GeneRecord, IntervalTree};
//!
//! let tree: IntervalTree = [
//!     GeneRecord::new(100, 300, "BRCA1"),
//!     GeneRecord::new(250, 420, "TP53"),
//!     GeneRecord::new(500, 680, "MYC"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let hits = tree.overlap_search(200, 600);
//! assert_eq!(hits.len(), 3);
//! assert!(tree.overlap_search(0, 50).is_empty());
//! ```

pub mod bed;
pub mod catalog;
pub mod config;
pub mod generate;
pub mod interval;
pub mod logging;
pub mod naive;
pub mod output;
pub mod parallel;
pub mod request;
pub mod server;
pub mod tree;

// Re-export commonly used types
pub use bed::{read_records, GeneError, GeneReader};
pub use interval::{GeneRecord, Metadata};
pub use naive::NaiveIndex;
pub use tree::{IntervalNode, IntervalTree};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bed::{parse_records, read_records, GeneReader};
    pub use crate::catalog::{demo_records, demo_tree};
    pub use crate::interval::{keys, GeneRecord, Metadata};
    pub use crate::naive::NaiveIndex;
    pub use crate::request::{Envelope, SearchQuery};
    pub use crate::tree::{IntervalNode, IntervalTree};
}
