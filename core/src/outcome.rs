use serde::Serialize;

use crate::session::{LossReason, Phase};

pub const PLAY_AGAIN_LABEL: &str = "Play again";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub phase: Phase,
    pub correct: usize,
    pub wrong: usize,
    pub total: usize,
}

impl Outcome {
    pub fn won(&self) -> bool {
        self.phase == Phase::Won
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalContent {
    pub outcome: Outcome,
    pub title: String,
    pub message: String,
    pub button_label: String,
}

impl ModalContent {
    pub fn for_outcome(outcome: Outcome) -> Self {
        let Outcome {
            phase,
            correct,
            wrong,
            total,
        } = outcome;
        let (title, message) = match phase {
            Phase::Won => (
                "You won!".to_string(),
                format!("All {total} tiles are in place. Mistakes: {wrong}"),
            ),
            Phase::Lost(LossReason::BoardFilled) => (
                "Too bad, you lost".to_string(),
                format!("Board full with {correct} correct and {wrong} wrong. Try again!"),
            ),
            Phase::Lost(LossReason::TimeUp) => (
                "Time's up".to_string(),
                format!("{correct} correct and {wrong} wrong out of {total}. Try again!"),
            ),
            Phase::Playing => (String::new(), String::new()),
        };
        Self {
            outcome,
            title,
            message,
            button_label: PLAY_AGAIN_LABEL.to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.message)
    }
}
