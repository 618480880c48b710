use crate::libtrivia::config::GameConfig;
use crate::libtrivia::question::Question;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::One, PlayerId::Two];

    pub fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Jugador {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinCheck {
    Player1Wins,
    Player2Wins,
    Draw,
    NoWinnerYet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
}

impl WinCheck {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            WinCheck::Player1Wins => Some(Outcome::Winner(PlayerId::One)),
            WinCheck::Player2Wins => Some(Outcome::Winner(PlayerId::Two)),
            WinCheck::Draw => Some(Outcome::Draw),
            WinCheck::NoWinnerYet => None,
        }
    }
}

/// Nobody wins until someone reaches `threshold`; from then on the higher score wins and a tie is a draw.
pub fn check_win(scores: [i32; 2], threshold: i32) -> WinCheck {
    let [one, two] = scores;
    if one < threshold && two < threshold {
        WinCheck::NoWinnerYet
    } else {
        decide(scores)
    }
}

/// Decides on the scores alone, for when the session ends before anyone reaches the threshold.
pub fn decide(scores: [i32; 2]) -> WinCheck {
    let [one, two] = scores;
    match one.cmp(&two) {
        std::cmp::Ordering::Greater => WinCheck::Player1Wins,
        std::cmp::Ordering::Less => WinCheck::Player2Wins,
        std::cmp::Ordering::Equal => WinCheck::Draw,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    scores: [i32; 2],
    active: Option<PlayerId>,
}

impl ScoreTracker {
    /// First claim of the round wins; returns false when someone already holds the turn.
    pub fn claim_turn(&mut self, player: PlayerId) -> bool {
        match self.active {
            Some(holder) => {
                debug!("[Game] {} tried to claim, {} already holds the turn", player, holder);
                false
            }
            None => {
                self.active = Some(player);
                true
            }
        }
    }

    /// Scores an answer for the active player. Returns `None` when nobody holds the turn.
    pub fn submit_answer(
        &mut self,
        question: &Question,
        option: &str,
        elapsed_ticks: u32,
        config: &GameConfig,
    ) -> Option<Verdict> {
        let player = self.active?;
        let score = &mut self.scores[player.index()];
        let verdict = if question.is_correct(option) {
            *score += config.reward;
            Verdict::Correct
        } else {
            if elapsed_ticks > config.late_threshold_ticks {
                *score -= config.penalty;
            }
            Verdict::Incorrect
        };
        debug!(
            "[Game] {} answered {:?} after {} ticks: {:?} -> {}",
            player, option, elapsed_ticks, verdict, score
        );
        Some(verdict)
    }

    pub fn check_win(&self, threshold: i32) -> WinCheck {
        check_win(self.scores, threshold)
    }

    pub fn end_round(&mut self) {
        self.active = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn active(&self) -> Option<PlayerId> {
        self.active
    }

    pub fn score(&self, player: PlayerId) -> i32 {
        self.scores[player.index()]
    }

    pub fn scores(&self) -> [i32; 2] {
        self.scores
    }
}
