//! Difficulty tiers and the progression state machine.
//!
//! The ladder only moves forward, one tier at a time, and only on a perfect
//! batch score. Partial credit never advances the tier.

use serde::{Deserialize, Serialize};

/// Ordered difficulty levels a quiz batch belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    VeryEasy,
    Easy,
    Moderate,
    Difficult,
}

impl Tier {
    pub const ORDER: [Tier; 4] = [Tier::VeryEasy, Tier::Easy, Tier::Moderate, Tier::Difficult];

    /// Human label, also the canonical difficulty spelling in question banks.
    pub fn label(self) -> &'static str {
        match self {
            Tier::VeryEasy => "Very easy",
            Tier::Easy => "Easy",
            Tier::Moderate => "Moderate",
            Tier::Difficult => "Difficult",
        }
    }

    /// Case-insensitive, whitespace-trimmed match against a raw difficulty cell.
    pub fn matches(self, raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(self.label())
    }

    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::VeryEasy => Some(Tier::Easy),
            Tier::Easy => Some(Tier::Moderate),
            Tier::Moderate => Some(Tier::Difficult),
            Tier::Difficult => None,
        }
    }
}

/// Where the session stands on the ladder. `Completed` is terminal: no
/// further batches are served until a new upload resets everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Tier(Tier),
    Completed,
}

impl Stage {
    pub fn start() -> Self {
        Stage::Tier(Tier::VeryEasy)
    }

    /// Advance on a perfect batch. Returns true when the stage moved.
    pub fn advance(&mut self, correct: usize, batch_size: usize) -> bool {
        if correct != batch_size {
            return false;
        }
        match *self {
            Stage::Tier(tier) => {
                *self = match tier.next() {
                    Some(next) => Stage::Tier(next),
                    None => Stage::Completed,
                };
                true
            }
            Stage::Completed => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_case_insensitively() {
        assert!(Tier::VeryEasy.matches("very easy"));
        assert!(Tier::VeryEasy.matches("  VERY EASY "));
        assert!(!Tier::VeryEasy.matches("easy"));
        assert!(Tier::Difficult.matches("difficult"));
    }

    #[test]
    fn perfect_score_walks_the_full_ladder() {
        let mut stage = Stage::start();
        assert_eq!(stage, Stage::Tier(Tier::VeryEasy));

        assert!(stage.advance(10, 10));
        assert_eq!(stage, Stage::Tier(Tier::Easy));
        assert!(stage.advance(10, 10));
        assert_eq!(stage, Stage::Tier(Tier::Moderate));
        assert!(stage.advance(10, 10));
        assert_eq!(stage, Stage::Tier(Tier::Difficult));
        assert!(stage.advance(10, 10));
        assert_eq!(stage, Stage::Completed);
    }

    #[test]
    fn partial_score_never_advances() {
        let mut stage = Stage::start();
        assert!(!stage.advance(9, 10));
        assert!(!stage.advance(0, 10));
        assert_eq!(stage, Stage::Tier(Tier::VeryEasy));
    }

    #[test]
    fn completed_is_terminal() {
        let mut stage = Stage::Completed;
        assert!(!stage.advance(10, 10));
        assert_eq!(stage, Stage::Completed);
    }
}
