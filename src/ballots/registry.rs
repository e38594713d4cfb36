//! Ballot registry engine.
//!
//! Owns the ordered ballot list and exposes creation, voting, and tally
//! reads. All state sits behind one `RwLock` so a vote's duplicate check,
//! voter insertion, and count increment are a single indivisible step with
//! respect to every other caller.

use super::ballot::{Ballot, BallotId, BallotSnapshot};
use crate::clock::{Clock, SystemClock};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Registry errors.
///
/// All of these are terminal: the registry never retries, and a failing
/// call leaves state completely unchanged. The `Display` messages are a
/// stable contract; callers match on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallotError {
    /// Creation-time validation failure.
    #[error("{0}")]
    InvalidBallot(&'static str),

    /// No ballot with this id.
    #[error("Ballot not found: {0}")]
    NotFound(BallotId),

    /// Option index outside the ballot's option list.
    #[error("Option index out of range: {index} (ballot {ballot})")]
    InvalidOption { ballot: BallotId, index: usize },

    /// Vote cast before the ballot's start time.
    #[error("Voting has not started yet")]
    VotingNotOpen,

    /// Vote cast at or after the end of the voting window.
    #[error("Voting has ended")]
    VotingClosed,

    /// Identity has already voted on this ballot.
    #[error("Address has already casted a vote for this question")]
    DuplicateVote,
}

/// Registry for time-boxed ballots.
///
/// Ballots are created once, mutated only by successful votes during their
/// window, and kept forever as queryable records once closed. There is no
/// explicit close transition: closure is derived from the clock on every
/// read.
#[derive(Debug)]
pub struct BallotRegistry {
    ballots: RwLock<Vec<Ballot>>,
    clock: Arc<dyn Clock>,
}

impl Default for BallotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BallotRegistry {
    /// Create a registry on wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a registry with an injected time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            ballots: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Create a new ballot and return its id.
    ///
    /// Ids are sequential from 0; a failed creation consumes no id.
    /// Validation runs in order and the first failure aborts the call.
    pub fn create_ballot(
        &self,
        question: impl Into<String>,
        options: Vec<String>,
        start_time: i64,
        duration: u64,
    ) -> Result<BallotId, BallotError> {
        if options.len() < 2 {
            return Err(BallotError::InvalidBallot(
                "Ballot must have a minimum of two options",
            ));
        }
        if start_time <= self.clock.now() {
            return Err(BallotError::InvalidBallot("Start time must be in the future"));
        }
        if duration < 60 {
            return Err(BallotError::InvalidBallot("Duration must be at least 1 minute"));
        }

        let mut ballots = self.ballots.write();
        let id = ballots.len() as BallotId;
        ballots.push(Ballot::new(question.into(), options, start_time, duration));
        info!(ballot = id, start_time, duration, "ballot created");
        Ok(id)
    }

    /// Cast a vote for `option_index` on behalf of `voter`.
    ///
    /// The window check is half-open: a vote at exactly `start_time` is
    /// accepted, a vote at exactly `start_time + duration` is rejected.
    pub fn vote(
        &self,
        ballot_id: BallotId,
        option_index: usize,
        voter: &str,
    ) -> Result<(), BallotError> {
        let now = self.clock.now();
        let mut ballots = self.ballots.write();
        let ballot = usize::try_from(ballot_id)
            .ok()
            .and_then(|index| ballots.get_mut(index))
            .ok_or(BallotError::NotFound(ballot_id))?;

        if option_index >= ballot.options.len() {
            return Err(BallotError::InvalidOption {
                ballot: ballot_id,
                index: option_index,
            });
        }
        if now < ballot.start_time {
            return Err(BallotError::VotingNotOpen);
        }
        if now >= ballot.end_time() {
            return Err(BallotError::VotingClosed);
        }
        if ballot.voters.contains(voter) {
            return Err(BallotError::DuplicateVote);
        }

        ballot.vote_counts[option_index] += 1;
        ballot.voters.insert(voter.to_string());
        debug!(ballot = ballot_id, option = option_index, "vote recorded");
        Ok(())
    }

    /// Get a read-only snapshot of a ballot's immutable fields.
    pub fn get_ballot(&self, ballot_id: BallotId) -> Result<BallotSnapshot, BallotError> {
        self.with_ballot(ballot_id, |b| b.snapshot(ballot_id))
    }

    /// Whether `identity` has already voted on this ballot.
    pub fn has_voted(&self, ballot_id: BallotId, identity: &str) -> Result<bool, BallotError> {
        self.with_ballot(ballot_id, |b| b.voters.contains(identity))
    }

    /// Vote count for a single option.
    pub fn get_votes(&self, ballot_id: BallotId, option_index: usize) -> Result<u64, BallotError> {
        let ballots = self.ballots.read();
        let ballot = usize::try_from(ballot_id)
            .ok()
            .and_then(|index| ballots.get(index))
            .ok_or(BallotError::NotFound(ballot_id))?;
        ballot
            .vote_counts
            .get(option_index)
            .copied()
            .ok_or(BallotError::InvalidOption {
                ballot: ballot_id,
                index: option_index,
            })
    }

    /// Full tally, index-aligned with the ballot's options. Valid at any
    /// point in the lifecycle; counts may still change while the ballot is
    /// open.
    pub fn results(&self, ballot_id: BallotId) -> Result<Vec<u64>, BallotError> {
        self.with_ballot(ballot_id, |b| b.vote_counts.clone())
    }

    /// Winner flags, index-aligned with the ballot's options.
    ///
    /// Entry `i` is true iff option `i` is tied for the highest count, so
    /// ties produce multiple winners and a ballot with no votes marks every
    /// option a winner.
    pub fn winners(&self, ballot_id: BallotId) -> Result<Vec<bool>, BallotError> {
        self.with_ballot(ballot_id, |b| {
            let max = b.vote_counts.iter().copied().max().unwrap_or(0);
            b.vote_counts.iter().map(|&count| count == max).collect()
        })
    }

    /// Whether the ballot's voting window currently contains the clock's
    /// notion of now.
    pub fn is_open(&self, ballot_id: BallotId) -> Result<bool, BallotError> {
        let now = self.clock.now();
        self.with_ballot(ballot_id, |b| b.is_open(now))
    }

    /// Number of ballots ever created.
    pub fn len(&self) -> usize {
        self.ballots.read().len()
    }

    /// Whether any ballots exist.
    pub fn is_empty(&self) -> bool {
        self.ballots.read().is_empty()
    }

    /// Registry-wide counters, bucketed by where each ballot's window sits
    /// relative to the clock.
    pub fn stats(&self) -> RegistryStats {
        let now = self.clock.now();
        let ballots = self.ballots.read();

        let mut stats = RegistryStats {
            total_ballots: ballots.len(),
            ..Default::default()
        };
        for ballot in ballots.iter() {
            if now < ballot.start_time {
                stats.pending_ballots += 1;
            } else if ballot.is_open(now) {
                stats.open_ballots += 1;
            } else {
                stats.closed_ballots += 1;
            }
            stats.total_votes += ballot.voters.len();
        }
        stats
    }

    fn with_ballot<T>(
        &self,
        ballot_id: BallotId,
        f: impl FnOnce(&Ballot) -> T,
    ) -> Result<T, BallotError> {
        let ballots = self.ballots.read();
        usize::try_from(ballot_id)
            .ok()
            .and_then(|index| ballots.get(index))
            .map(f)
            .ok_or(BallotError::NotFound(ballot_id))
    }
}

/// Registry-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Ballots ever created
    pub total_ballots: usize,
    /// Ballots whose window has not opened yet
    pub pending_ballots: usize,
    /// Ballots currently accepting votes
    pub open_ballots: usize,
    /// Ballots whose window has passed
    pub closed_ballots: usize,
    /// Votes cast across all ballots
    pub total_votes: usize,
}
