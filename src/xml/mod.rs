//! Internal XML layer: a small namespace-aware tree over quick-xml.
//!
//! - [`tree`]: arena [`Document`] with build-time DOCTYPE rejection and
//!   namespace resolution
//! - [`ns`]: the namespace URIs the detector and extensions match against

pub mod ns;
mod tree;

pub use tree::{Document, NodeId};
