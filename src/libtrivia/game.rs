use crate::libtrivia::config::{ExhaustionPolicy, GameConfig};
use crate::libtrivia::frame::{
    hit, menu_buttons, option_buttons, scoreboard_buttons, Button, ButtonAction, FeedbackView,
    Frame, InputEvent, Key, QuestionView, Screen, Tone,
};
use crate::libtrivia::question::{Question, QuestionBank, QuestionId};
use crate::libtrivia::score::{decide, Outcome, PlayerId, ScoreTracker, Verdict};
use crate::libtrivia::selector::{RoundSelector, Selection};
use log::{debug, error, info};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no questions are loaded, a game cannot start")]
    EmptyBank,
}

/// Round-scoped state, replaced wholesale whenever a new question is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub question: QuestionId,
    pub remaining: u32,
    pub timer_active: bool,
    /// Ticks since the active player claimed the turn.
    pub elapsed: u32,
    pub announcement: u32,
}

impl Round {
    fn new(question: QuestionId, config: &GameConfig) -> Self {
        Self {
            question,
            remaining: config.round_ticks,
            timer_active: false,
            elapsed: 0,
            announcement: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Feedback {
    verdict: Verdict,
    ticks_left: u32,
}

/// The whole game: one owner for every piece of session state.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    bank: QuestionBank,
    selector: RoundSelector,
    tracker: ScoreTracker,
    screen: Screen,
    round: Option<Round>,
    feedback: Option<Feedback>,
    outcome: Option<Outcome>,
    notice: Option<String>,
    terminated: bool,
}

impl Game {
    pub fn new(bank: QuestionBank, config: GameConfig) -> Self {
        Self {
            selector: RoundSelector::new(config.seed),
            config,
            bank,
            tracker: ScoreTracker::default(),
            screen: Screen::Menu,
            round: None,
            feedback: None,
            outcome: None,
            notice: None,
            terminated: false,
        }
    }

    /// Message shown on every screen until the next successful start, e.g. a load failure.
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Result<(), GameError> {
        if self.terminated {
            return Ok(());
        }
        match event {
            InputEvent::Quit => self.terminate(),
            InputEvent::KeyPress(key) => self.on_key(key),
            InputEvent::PointerClick { x, y } => {
                let action = hit(&self.buttons(), x, y).map(|button| button.action.clone());
                match action {
                    Some(action) => return self.on_button(action),
                    None => debug!("[Game] Click at ({x}, {y}) hit nothing"),
                }
            }
        }
        Ok(())
    }

    /// Advances the game by one tick of the loop.
    pub fn tick(&mut self) {
        if self.terminated || self.screen != Screen::Playing {
            return;
        }
        if let Some(feedback) = &mut self.feedback {
            feedback.ticks_left = feedback.ticks_left.saturating_sub(1);
            if feedback.ticks_left == 0 {
                self.feedback = None;
            }
        }
        let Some(round) = &mut self.round else {
            return;
        };
        round.announcement = round.announcement.saturating_sub(1);
        if round.timer_active {
            round.remaining = round.remaining.saturating_sub(1);
            round.elapsed += 1;
            if round.remaining == 0 {
                info!("[Round] Time is up for question {}", round.question.0);
                self.next_round();
            }
        }
    }

    fn on_key(&mut self, key: Key) {
        match (self.screen, key) {
            (Screen::Playing, Key::Char(c)) if c.eq_ignore_ascii_case(&self.config.player_one_key) => {
                self.claim(PlayerId::One)
            }
            (Screen::Playing, Key::Char(c)) if c.eq_ignore_ascii_case(&self.config.player_two_key) => {
                self.claim(PlayerId::Two)
            }
            (Screen::GameOver, Key::Space) => self.restart(),
            _ => debug!("[Game] Ignoring {:?} on {:?}", key, self.screen),
        }
    }

    fn on_button(&mut self, action: ButtonAction) -> Result<(), GameError> {
        match action {
            ButtonAction::Start => self.start()?,
            ButtonAction::Scores => self.screen = Screen::Scoreboard,
            ButtonAction::Back => self.screen = Screen::Menu,
            ButtonAction::Quit => self.terminate(),
            ButtonAction::Answer(option) => self.answer(&option),
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), GameError> {
        if self.bank.is_empty() {
            error!("[Game] Cannot start: the question bank is empty");
            self.notice = Some("No hay preguntas cargadas. Revisa el archivo de preguntas.".to_string());
            return Err(GameError::EmptyBank);
        }
        info!("[Game] Starting with {} questions", self.bank.len());
        self.notice = None;
        self.screen = Screen::Playing;
        self.next_round();
        Ok(())
    }

    fn claim(&mut self, player: PlayerId) {
        let Some(round) = &mut self.round else {
            return;
        };
        if self.tracker.claim_turn(player) {
            info!("[Round] {} claims question {}", player, round.question.0);
            round.timer_active = true;
            round.elapsed = 0;
            round.announcement = self.config.announcement_ticks;
        }
    }

    fn answer(&mut self, option: &str) {
        let Some(round) = &self.round else {
            return;
        };
        let Some(question) = self.bank.get(round.question) else {
            return;
        };
        let Some(verdict) = self
            .tracker
            .submit_answer(question, option, round.elapsed, &self.config)
        else {
            debug!("[Game] Answer {:?} ignored, nobody holds the turn", option);
            return;
        };
        self.feedback = Some(Feedback {
            verdict,
            ticks_left: self.config.feedback_ticks,
        });
        match self.tracker.check_win(self.config.win_threshold).outcome() {
            Some(outcome) => self.finish(outcome),
            None => self.next_round(),
        }
    }

    fn next_round(&mut self) {
        self.tracker.end_round();
        let previous = self.round.take().map(|round| round.question);
        match self.selector.select_next(&self.bank) {
            Selection::Question(id) => self.round = Some(Round::new(id, &self.config)),
            Selection::Exhausted => self.on_exhausted(previous),
        }
    }

    fn on_exhausted(&mut self, previous: Option<QuestionId>) {
        match self.config.exhaustion {
            ExhaustionPolicy::Cycle => {
                info!("[Round] Every question used, starting a new cycle");
                self.selector.restart_cycle(&self.bank, previous);
                match self.selector.select_next(&self.bank) {
                    Selection::Question(id) => self.round = Some(Round::new(id, &self.config)),
                    Selection::Exhausted => self.finish_on_scores(),
                }
            }
            ExhaustionPolicy::EndSession => {
                info!("[Round] Every question used, ending the session");
                self.finish_on_scores();
            }
        }
    }

    fn finish_on_scores(&mut self) {
        let outcome = decide(self.tracker.scores())
            .outcome()
            .unwrap_or(Outcome::Draw);
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(
            "[Game] Game over: {:?} with scores {:?}",
            outcome,
            self.tracker.scores()
        );
        self.tracker.end_round();
        self.round = None;
        self.outcome = Some(outcome);
        self.screen = Screen::GameOver;
    }

    fn restart(&mut self) {
        info!("[Game] Restarting");
        self.tracker.reset();
        self.selector.clear();
        self.round = None;
        self.feedback = None;
        self.outcome = None;
        self.screen = Screen::Menu;
    }

    fn terminate(&mut self) {
        info!("[Game] Quit requested");
        self.terminated = true;
    }

    fn current_question(&self) -> Option<&Question> {
        self.round
            .as_ref()
            .and_then(|round| self.bank.get(round.question))
    }

    fn buttons(&self) -> Vec<Button> {
        match self.screen {
            Screen::Menu => menu_buttons(),
            Screen::Scoreboard => scoreboard_buttons(),
            Screen::Playing => self
                .current_question()
                .map(|question| option_buttons(&question.options))
                .unwrap_or_default(),
            Screen::GameOver => Vec::new(),
        }
    }

    pub fn render_state(&self) -> Frame {
        let timer_elapsed = match &self.round {
            Some(round) if self.config.round_ticks > 0 => {
                1.0 - round.remaining as f32 / self.config.round_ticks as f32
            }
            _ => 0.0,
        };
        let announcement = self
            .round
            .as_ref()
            .filter(|round| round.announcement > 0)
            .and(self.tracker.active());
        let feedback = self
            .feedback
            .filter(|_| self.screen == Screen::Playing)
            .map(|feedback| match feedback.verdict {
                Verdict::Correct => FeedbackView {
                    message: "¡Correcto!",
                    tone: Tone::Correct,
                },
                Verdict::Incorrect => FeedbackView {
                    message: "Incorrecto",
                    tone: Tone::Incorrect,
                },
            });

        Frame {
            screen: self.screen,
            caption: self.screen.caption(),
            scores: self.tracker.scores(),
            question: self.current_question().map(|question| QuestionView {
                prompt: question.prompt.clone(),
                image: question.image.clone(),
                category: question.category.clone(),
            }),
            timer_elapsed,
            active_player: self.tracker.active(),
            announcement,
            feedback,
            outcome: self.outcome,
            notice: self.notice.clone(),
            buttons: self.buttons(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn scores(&self) -> [i32; 2] {
        self.tracker.scores()
    }

    pub fn active_player(&self) -> Option<PlayerId> {
        self.tracker.active()
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn questions_used(&self) -> usize {
        self.selector.history().len()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libtrivia::question::tests::sample_bank;
    use std::collections::HashSet;

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        }
    }

    fn click(game: &mut Game, action: ButtonAction) -> Result<(), GameError> {
        let frame = game.render_state();
        let button = frame
            .buttons
            .iter()
            .find(|button| button.action == action)
            .unwrap_or_else(|| panic!("no {action:?} button on {:?}", frame.screen));
        let (x, y) = button.rect.center();
        game.handle_event(InputEvent::PointerClick { x, y })
    }

    fn press(game: &mut Game, c: char) {
        game.handle_event(InputEvent::KeyPress(Key::Char(c))).unwrap();
    }

    fn answer(game: &mut Game, option: &str) {
        click(game, ButtonAction::Answer(option.into())).unwrap();
    }

    fn playing(bank_size: usize, config: GameConfig) -> Game {
        let mut game = Game::new(sample_bank(bank_size), config);
        click(&mut game, ButtonAction::Start).unwrap();
        game
    }

    #[test]
    fn menu_navigation() {
        let mut game = Game::new(sample_bank(3), config());
        assert_eq!(game.screen(), Screen::Menu);
        click(&mut game, ButtonAction::Scores).unwrap();
        assert_eq!(game.screen(), Screen::Scoreboard);
        click(&mut game, ButtonAction::Back).unwrap();
        assert_eq!(game.screen(), Screen::Menu);
        click(&mut game, ButtonAction::Start).unwrap();
        assert_eq!(game.screen(), Screen::Playing);
        let round = game.round().unwrap();
        assert_eq!(round.remaining, game.config().round_ticks);
        assert!(!round.timer_active);
        assert_eq!(game.active_player(), None);
    }

    #[test]
    fn quit_button_and_signal_terminate() {
        let mut game = Game::new(sample_bank(1), config());
        click(&mut game, ButtonAction::Quit).unwrap();
        assert!(game.is_terminated());

        let mut game = playing(2, config());
        game.handle_event(InputEvent::Quit).unwrap();
        assert!(game.is_terminated());
    }

    #[test]
    fn empty_bank_blocks_start() {
        let mut game = Game::new(QuestionBank::default(), config());
        assert_eq!(click(&mut game, ButtonAction::Start), Err(GameError::EmptyBank));
        assert_eq!(game.screen(), Screen::Menu);
        assert!(game.render_state().notice.is_some());
    }

    #[test]
    fn noise_is_ignored() {
        let mut game = playing(3, config());
        let before = game.round().cloned();
        game.handle_event(InputEvent::PointerClick { x: 1.0, y: 1.0 }).unwrap();
        press(&mut game, 'x');
        game.handle_event(InputEvent::KeyPress(Key::Space)).unwrap();
        // answering before anyone claims the turn does nothing
        answer(&mut game, "Lima");
        assert_eq!(game.round().cloned(), before);
        assert_eq!(game.scores(), [0, 0]);
    }

    #[test]
    fn second_claim_is_a_no_op() {
        let mut game = playing(3, config());
        press(&mut game, 'q');
        press(&mut game, ']');
        assert_eq!(game.active_player(), Some(PlayerId::One));
        assert!(game.round().unwrap().timer_active);
        assert_eq!(game.render_state().announcement, Some(PlayerId::One));
    }

    #[test]
    fn timer_only_runs_after_claim() {
        let mut game = playing(3, config());
        for _ in 0..10 {
            game.tick();
        }
        assert_eq!(game.round().unwrap().remaining, game.config().round_ticks);
        press(&mut game, ']');
        let mut last = game.round().unwrap().remaining;
        for _ in 0..10 {
            game.tick();
            let remaining = game.round().unwrap().remaining;
            assert!(remaining < last);
            last = remaining;
        }
        assert!(game.render_state().timer_elapsed > 0.0);
    }

    #[test]
    fn timer_expiry_moves_on_without_scoring() {
        let mut game = playing(3, config());
        let first = game.round().unwrap().question;
        press(&mut game, 'q');
        for _ in 0..game.config().round_ticks {
            game.tick();
        }
        let round = game.round().unwrap();
        assert_ne!(round.question, first);
        assert_eq!(round.remaining, game.config().round_ticks);
        assert!(!round.timer_active);
        assert_eq!(game.active_player(), None);
        assert_eq!(game.scores(), [0, 0]);
        assert_eq!(game.questions_used(), 2);
    }

    #[test]
    fn correct_answers_win_the_game() {
        let mut game = playing(5, config());
        press(&mut game, 'q');
        answer(&mut game, "Lima");
        assert_eq!(game.scores(), [10, 0]);
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(
            game.render_state().feedback.map(|f| f.tone),
            Some(Tone::Correct)
        );
        assert_eq!(game.active_player(), None);

        press(&mut game, 'q');
        answer(&mut game, "Lima");
        assert_eq!(game.screen(), Screen::GameOver);
        assert_eq!(game.outcome(), Some(Outcome::Winner(PlayerId::One)));
        assert!(game.render_state().buttons.is_empty());
    }

    #[test]
    fn late_wrong_answer_costs_points() {
        let mut game = playing(5, config());
        press(&mut game, ']');
        answer(&mut game, "Quito");
        assert_eq!(game.scores(), [0, 0]);

        press(&mut game, ']');
        for _ in 0..=game.config().late_threshold_ticks {
            game.tick();
        }
        answer(&mut game, "Quito");
        assert_eq!(game.scores(), [0, -5]);
    }

    #[test]
    fn feedback_expires() {
        let mut game = playing(5, config());
        press(&mut game, 'q');
        answer(&mut game, "Bogotá");
        assert!(game.render_state().feedback.is_some());
        for _ in 0..game.config().feedback_ticks {
            game.tick();
        }
        assert!(game.render_state().feedback.is_none());
    }

    #[test]
    fn exhaustion_ends_session_by_default() {
        let mut game = playing(2, config());
        press(&mut game, ']');
        answer(&mut game, "Lima");
        press(&mut game, 'q');
        answer(&mut game, "Quito");
        assert_eq!(game.screen(), Screen::GameOver);
        assert_eq!(game.outcome(), Some(Outcome::Winner(PlayerId::Two)));
    }

    #[test]
    fn exhaustion_cycles_when_configured() {
        let config = GameConfig {
            exhaustion: ExhaustionPolicy::Cycle,
            ..config()
        };
        let mut game = playing(2, config);
        for _ in 0..5 {
            let before = game.round().unwrap().question;
            press(&mut game, 'q');
            answer(&mut game, "Quito");
            assert_eq!(game.screen(), Screen::Playing);
            assert_ne!(game.round().unwrap().question, before);
        }
    }

    #[test]
    fn every_cycle_plays_the_whole_bank() {
        let config = GameConfig {
            exhaustion: ExhaustionPolicy::Cycle,
            ..config()
        };
        let mut game = playing(3, config);
        let mut played = vec![game.round().unwrap().question];
        for _ in 0..8 {
            press(&mut game, 'q');
            answer(&mut game, "Quito");
            assert_eq!(game.screen(), Screen::Playing);
            played.push(game.round().unwrap().question);
        }
        for cycle in played.chunks(3) {
            let distinct: HashSet<_> = cycle.iter().collect();
            assert_eq!(distinct.len(), 3, "cycle {cycle:?} missed a question");
        }
        for pair in played.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn single_question_cycles_onto_itself() {
        let config = GameConfig {
            exhaustion: ExhaustionPolicy::Cycle,
            ..config()
        };
        let mut game = playing(1, config);
        press(&mut game, 'q');
        answer(&mut game, "Quito");
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(game.round().unwrap().question, QuestionId(0));
    }

    #[test]
    fn restart_resets_session() {
        let mut game = playing(5, config());
        press(&mut game, 'q');
        answer(&mut game, "Lima");
        press(&mut game, ']');
        answer(&mut game, "Lima");
        press(&mut game, ']');
        answer(&mut game, "Lima");
        assert_eq!(game.screen(), Screen::GameOver);

        press(&mut game, 'q');
        assert_eq!(game.screen(), Screen::GameOver);
        game.handle_event(InputEvent::KeyPress(Key::Space)).unwrap();
        assert_eq!(game.screen(), Screen::Menu);
        assert_eq!(game.scores(), [0, 0]);
        assert_eq!(game.questions_used(), 0);
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn events_after_quit_are_dropped() {
        let mut game = playing(3, config());
        game.handle_event(InputEvent::Quit).unwrap();
        press(&mut game, 'q');
        assert_eq!(game.active_player(), None);
    }
}
