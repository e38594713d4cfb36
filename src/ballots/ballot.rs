//! Ballot records.
//!
//! A ballot pairs a question with a fixed, ordered option list and a voting
//! window. Option order is significant: it defines the index space used for
//! voting and tallying. Everything except the tally and the voter set is
//! immutable after creation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ballot identifier: sequential from 0, equal to the ballot's position in
/// the registry's list.
pub type BallotId = u64;

/// A ballot as stored by the registry.
#[derive(Debug, Clone)]
pub(crate) struct Ballot {
    pub(crate) question: String,
    pub(crate) options: Vec<String>,
    /// Unix seconds at which voting opens.
    pub(crate) start_time: i64,
    /// Length of the voting window in seconds.
    pub(crate) duration: u64,
    /// Per-option tally, index-aligned with `options`.
    pub(crate) vote_counts: Vec<u64>,
    /// Identities that have already voted on this ballot.
    pub(crate) voters: HashSet<String>,
}

impl Ballot {
    pub(crate) fn new(question: String, options: Vec<String>, start_time: i64, duration: u64) -> Self {
        let vote_counts = vec![0; options.len()];
        Self {
            question,
            options,
            start_time,
            duration,
            vote_counts,
            voters: HashSet::new(),
        }
    }

    /// First instant at which voting is closed again. Saturates, so a
    /// duration past the end of representable time leaves the ballot open
    /// forever rather than wrapping the window shut.
    pub(crate) fn end_time(&self) -> i64 {
        self.start_time
            .saturating_add(i64::try_from(self.duration).unwrap_or(i64::MAX))
    }

    /// Whether the voting window contains `now`. The window is half-open:
    /// voting is allowed at `start_time` and rejected at `end_time`.
    pub(crate) fn is_open(&self, now: i64) -> bool {
        now >= self.start_time && now < self.end_time()
    }

    pub(crate) fn snapshot(&self, id: BallotId) -> BallotSnapshot {
        BallotSnapshot {
            id,
            question: self.question.clone(),
            options: self.options.clone(),
            start_time: self.start_time,
            duration: self.duration,
        }
    }
}

/// Read-only projection of a ballot's immutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSnapshot {
    /// Ballot ID
    pub id: BallotId,
    /// The question being voted on
    pub question: String,
    /// Ordered option labels
    pub options: Vec<String>,
    /// When voting opens (unix seconds)
    pub start_time: i64,
    /// Voting window length in seconds
    pub duration: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot() -> Ballot {
        Ballot::new(
            "Favorite color?".to_string(),
            vec!["Red".to_string(), "Blue".to_string()],
            1_000,
            400,
        )
    }

    #[test]
    fn test_new_ballot_starts_empty() {
        let b = ballot();
        assert_eq!(b.vote_counts, vec![0, 0]);
        assert!(b.voters.is_empty());
    }

    #[test]
    fn test_window_boundaries() {
        let b = ballot();
        assert_eq!(b.end_time(), 1_400);

        assert!(!b.is_open(999));
        assert!(b.is_open(1_000)); // opens exactly at start_time
        assert!(b.is_open(1_399));
        assert!(!b.is_open(1_400)); // closed at start_time + duration
        assert!(!b.is_open(2_000));
    }

    #[test]
    fn test_huge_duration_never_wraps_the_window() {
        let b = Ballot::new(
            "Forever?".to_string(),
            vec!["Yes".to_string(), "No".to_string()],
            1_000,
            u64::MAX,
        );
        assert_eq!(b.end_time(), i64::MAX);
        assert!(b.is_open(1_000));
        assert!(b.is_open(i64::MAX - 1));
    }

    #[test]
    fn test_snapshot_projects_immutable_fields() {
        let mut b = ballot();
        b.vote_counts[0] = 3;
        b.voters.insert("alice".to_string());

        let snap = b.snapshot(7);
        assert_eq!(snap.id, 7);
        assert_eq!(snap.question, "Favorite color?");
        assert_eq!(snap.options, vec!["Red", "Blue"]);
        assert_eq!(snap.start_time, 1_000);
        assert_eq!(snap.duration, 400);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snap = ballot().snapshot(0);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["question"], "Favorite color?");
        assert_eq!(json["start_time"], 1_000);
        assert_eq!(json["options"][1], "Blue");
    }
}
