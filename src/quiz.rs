//! "Which movie scored higher?" rounds.

use serde::{Deserialize, Serialize};

use crate::models::MovieRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizRound {
    pub left: MovieRecord,
    pub right: MovieRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub correct: bool,
    /// `None` when both movies have the same score.
    pub winner: Option<Side>,
    pub margin: f64,
}

/// Pairs records in input order; an odd record out is dropped.
pub fn build_rounds(records: &[MovieRecord]) -> Vec<QuizRound> {
    records
        .chunks_exact(2)
        .map(|pair| QuizRound {
            left: pair[0].clone(),
            right: pair[1].clone(),
        })
        .collect()
}

/// A tie is correct whichever side was picked.
pub fn judge(round: &QuizRound, guess: Side) -> QuizOutcome {
    let left = round.left.vote_average;
    let right = round.right.vote_average;

    let winner = if left > right {
        Some(Side::Left)
    } else if right > left {
        Some(Side::Right)
    } else {
        None
    };

    QuizOutcome {
        correct: winner.map_or(true, |side| side == guess),
        winner,
        margin: (left - right).abs(),
    }
}

/// Judges `picks` against consecutive rounds starting at index `first`.
///
/// Returns `None` when there is not a round for every pick.
pub fn play(
    rounds: &[QuizRound],
    first: usize,
    picks: &[Side],
) -> Option<(Vec<QuizOutcome>, QuizTally)> {
    let end = first.checked_add(picks.len())?;
    let played = rounds.get(first..end)?;

    let mut tally = QuizTally::default();
    let outcomes = played
        .iter()
        .zip(picks)
        .map(|(round, pick)| {
            let outcome = judge(round, *pick);
            tally.record(&outcome);
            outcome
        })
        .collect();

    Some((outcomes, tally))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizTally {
    pub answered: usize,
    pub correct: usize,
}

impl QuizTally {
    pub fn record(&mut self, outcome: &QuizOutcome) {
        self.answered += 1;
        if outcome.correct {
            self.correct += 1;
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.correct as f64 / self.answered as f64
        }
    }
}
