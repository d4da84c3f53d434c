//! Adventure and round definitions.

use serde::{Deserialize, Serialize};

use taleweave_protocol::AdventureId;

/// One step of narrative content with a fixed set of choices.
///
/// `next_rounds` is the transition table: `next_rounds[i]` is the round
/// the story moves to when choice `i` wins, or `None` when that choice
/// ends the story. It is always the same length as `choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub text: String,
    pub choices: Vec<String>,
    pub next_rounds: Vec<Option<usize>>,
}

/// A full story definition, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adventure {
    pub id: AdventureId,
    pub title: String,
    pub description: String,
    pub rounds: Vec<Round>,
}

/// Where a resolved choice leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The story continues at this round index.
    Next(usize),
    /// The chosen branch ends the story.
    Finished,
}

impl Adventure {
    /// Returns the round at `index`, if it exists.
    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    /// Maps a winning choice on `round_index` through the transition
    /// table. Returns `None` when either index is out of range.
    pub fn outcome(
        &self,
        round_index: usize,
        choice_index: usize,
    ) -> Option<RoundOutcome> {
        let round = self.rounds.get(round_index)?;
        match round.next_rounds.get(choice_index)? {
            Some(next) => Some(RoundOutcome::Next(*next)),
            None => Some(RoundOutcome::Finished),
        }
    }
}
