//! Ballot Module
//!
//! Time-boxed polls with a fixed option list, one vote per identity, and
//! tie-aware winner determination.

pub mod ballot;
pub mod registry;

pub use ballot::{BallotId, BallotSnapshot};
pub use registry::{BallotError, BallotRegistry, RegistryStats};
