use std::time::Duration;

/// What happens when every question in the bank has been played this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionPolicy {
    /// Clear the history and keep drawing questions.
    Cycle,
    /// Finish the session and decide the winner on the current scores.
    #[default]
    EndSession,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub tick_rate: u32,
    pub round_ticks: u32,
    pub win_threshold: i32,
    pub reward: i32,
    pub penalty: i32,
    /// An incorrect answer given more than this many ticks after claiming the turn is penalised.
    pub late_threshold_ticks: u32,
    pub feedback_ticks: u32,
    pub announcement_ticks: u32,
    pub exhaustion: ExhaustionPolicy,
    pub player_one_key: char,
    pub player_two_key: char,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let tick_rate = 30;
        Self {
            tick_rate,
            round_ticks: 5 * tick_rate,
            win_threshold: 20,
            reward: 10,
            penalty: 5,
            late_threshold_ticks: 45,
            feedback_ticks: tick_rate / 2,
            announcement_ticks: 2 * tick_rate,
            exhaustion: ExhaustionPolicy::default(),
            player_one_key: 'q',
            player_two_key: ']',
            seed: None,
        }
    }
}

impl GameConfig {
    /// Slower variant: 60 Hz, ten second rounds, two seconds of feedback, first to 50 wins
    /// and wrong answers cost nothing.
    pub fn long_rounds() -> Self {
        let tick_rate = 60;
        Self {
            tick_rate,
            round_ticks: 10 * tick_rate,
            win_threshold: 50,
            penalty: 0,
            late_threshold_ticks: 90,
            feedback_ticks: 2 * tick_rate,
            announcement_ticks: 2 * tick_rate,
            ..Self::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    pub fn duration_of(&self, ticks: u32) -> Duration {
        Duration::from_millis(u64::from(ticks) * 1000 / u64::from(self.tick_rate.max(1)))
    }

    /// Converts a wall-clock duration into whole ticks at this tick rate.
    pub fn ticks_for(&self, duration: Duration) -> u32 {
        u32::try_from(duration.as_millis() * u128::from(self.tick_rate) / 1000).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_short_variant() {
        let config = GameConfig::default();
        assert_eq!(config.round_ticks, 150);
        assert_eq!(config.feedback_ticks, 15);
        assert_eq!(config.exhaustion, ExhaustionPolicy::EndSession);
    }

    #[test]
    fn ticks_for_converts_milliseconds() {
        let config = GameConfig::default();
        assert_eq!(config.ticks_for(Duration::from_millis(1500)), 45);
        assert_eq!(config.ticks_for(Duration::from_secs(5)), config.round_ticks);
        assert_eq!(GameConfig::long_rounds().ticks_for(Duration::from_secs(10)), 600);
        assert_eq!(config.duration_of(config.late_threshold_ticks), Duration::from_millis(1500));
    }

    #[test]
    fn long_rounds_wins_at_fifty_without_penalty() {
        let config = GameConfig::long_rounds();
        assert_eq!(config.win_threshold, 50);
        assert_eq!(config.penalty, 0);
        assert_eq!(config.reward, 10);
        assert_eq!(config.round_ticks, 600);
    }

    #[test]
    fn ticks_for_saturates() {
        let config = GameConfig {
            tick_rate: u32::MAX,
            ..GameConfig::default()
        };
        assert_eq!(config.ticks_for(Duration::from_secs(3600)), u32::MAX);
    }

    #[test]
    fn tick_interval_never_divides_by_zero() {
        let config = GameConfig {
            tick_rate: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }
}
