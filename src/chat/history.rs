//! Conversation turns and per-session history.

use serde::{Deserialize, Serialize};

/// One input/output exchange. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub input: String,
    pub output: String,
}

impl Turn {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Append-only sequence of turns for one session.
///
/// Created empty on the first interaction, grows by one turn per submission,
/// and dies with the session. There is no persistence; the surface threads
/// this value through every request explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Flatten the whole conversation plus a pending input into one string.
    ///
    /// Every stored input/output pair is interleaved in chronological order,
    /// the new input appended, and the result joined with single spaces.
    /// There is no deduplication and no truncation; the flattened string
    /// grows without bound over a long session.
    pub fn flatten_with(&self, new_input: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.turns.len() * 2 + 1);
        for turn in &self.turns {
            parts.push(&turn.input);
            parts.push(&turn.output);
        }
        parts.push(new_input);
        parts.join(" ")
    }
}
