//! ballotbox
//!
//! An in-memory ballot registry: open a time-boxed poll with a question and
//! a fixed set of options, let each identity vote exactly once while the
//! poll is open, and read the running or final tally at any time. Closure
//! is purely a function of elapsed time; ballots are never deleted.
//!
//! Time is injected through [`clock::Clock`], so harnesses and tests can
//! move a ballot through its window deterministically.

pub mod ballots;
pub mod clock;

pub use ballots::{BallotError, BallotId, BallotRegistry, BallotSnapshot, RegistryStats};
pub use clock::{Clock, ManualClock, SystemClock};
