use clap::{Parser, ValueEnum};
use colored::Colorize;
use env_logger::Env;
use log::{debug, warn};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

mod libtrivia;

#[cfg(feature = "cli")]
mod cli;
#[cfg(feature = "gui")]
mod gui;

use crate::libtrivia::config::{ExhaustionPolicy, GameConfig};
use crate::libtrivia::game::Game;
use crate::libtrivia::question::{LoadError, QuestionBank};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Exhaustion {
    /// Start over once every question has been played.
    Cycle,
    /// End the game once every question has been played.
    End,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    /// 30 Hz, 5 s rounds, first to 20, late wrong answers cost 5.
    Short,
    /// 60 Hz, 10 s rounds, first to 50, no penalty.
    Long,
}

#[derive(Parser, Debug)]
#[command(name = "Exploradores del mundo")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "questions.json")]
    questions: PathBuf,
    #[arg(short, long, default_value = "error")]
    log_level: String,
    /// Preset the flags below are applied on top of.
    #[arg(long, value_enum, default_value = "short")]
    variant: Variant,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: Option<u32>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    round_seconds: Option<u32>,
    #[arg(short, long)]
    threshold: Option<i32>,
    #[arg(long)]
    feedback_ms: Option<u64>,
    /// Wrong answers given later than this after claiming the turn lose points.
    #[arg(long)]
    late_ms: Option<u64>,
    #[arg(long, value_enum, default_value = "end")]
    exhaustion: Exhaustion,
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> GameConfig {
        let preset = match self.variant {
            Variant::Short => GameConfig::default(),
            Variant::Long => GameConfig::long_rounds(),
        };
        let round = self
            .round_seconds
            .map(|secs| Duration::from_secs(secs.into()))
            .unwrap_or_else(|| preset.duration_of(preset.round_ticks));
        let feedback = self
            .feedback_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| preset.duration_of(preset.feedback_ticks));
        let late = self
            .late_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| preset.duration_of(preset.late_threshold_ticks));
        let announcement = preset.duration_of(preset.announcement_ticks);

        let mut config = GameConfig {
            tick_rate: self.fps.unwrap_or(preset.tick_rate).max(1),
            win_threshold: self.threshold.unwrap_or(preset.win_threshold),
            exhaustion: match self.exhaustion {
                Exhaustion::Cycle => ExhaustionPolicy::Cycle,
                Exhaustion::End => ExhaustionPolicy::EndSession,
            },
            seed: self.seed,
            ..preset
        };
        config.round_ticks = config.ticks_for(round).max(1);
        config.feedback_ticks = config.ticks_for(feedback);
        config.late_threshold_ticks = config.ticks_for(late);
        config.announcement_ticks = config.ticks_for(announcement);
        config
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error("question file {0:?} not found")]
    NoQuestionFile(PathBuf),
    #[error("window error: {0}")]
    Gui(String),
}

fn main() -> Result<(), Error> {
    //INIT START
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    if !args.questions.exists() {
        println!(
            "{}",
            format!(
                "No se encuentra el archivo {:?}. Por favor, créalo con el formato correcto.",
                args.questions
            )
            .bright_red()
        );
        return Err(Error::NoQuestionFile(args.questions));
    }

    let config = args.config();
    debug!("[Setup] Config: {:?}", config);

    let game = build_game(QuestionBank::load(&args.questions), config);
    // INIT DONE

    run(game)
}

/// A bank that failed to load leaves the game on an empty bank with the reason on screen.
fn build_game(loaded: Result<QuestionBank, LoadError>, config: GameConfig) -> Game {
    match loaded {
        Ok(bank) => Game::new(bank, config),
        Err(err) => {
            warn!("[Setup] Cannot load questions: {}", err);
            let notice = describe(&err);
            println!("{}", notice.yellow());
            Game::new(QuestionBank::default(), config).with_notice(notice)
        }
    }
}

fn describe(err: &LoadError) -> String {
    match err {
        LoadError::Entry { index, source } => {
            format!("Pregunta {} inválida: {}", index + 1, source)
        }
        other => format!("No se pudieron cargar las preguntas: {}", other),
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "cli")] {
        fn run(game: Game) -> Result<(), Error> {
            cli::cli_loop(game);
            Ok(())
        }
    } else if #[cfg(feature = "gui")] {
        fn run(game: Game) -> Result<(), Error> {
            gui::init_gui(game)?;
            Ok(())
        }
    } else {
        compile_error!("enable the `gui` or the `cli` feature");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libtrivia::frame::{ButtonAction, InputEvent, Screen};
    use crate::libtrivia::game::GameError;

    fn args(flags: &[&str]) -> Args {
        Args::parse_from(std::iter::once("exploradores").chain(flags.iter().copied()))
    }

    #[test]
    fn defaults_match_the_short_preset() {
        let config = args(&[]).config();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn long_variant_starts_from_the_long_preset() {
        let config = args(&["--variant", "long"]).config();
        assert_eq!(config, GameConfig::long_rounds());
        assert_eq!(config.win_threshold, 50);
        assert_eq!(config.penalty, 0);

        let config = args(&["--variant", "long", "--threshold", "30"]).config();
        assert_eq!(config.win_threshold, 30);
        assert_eq!(config.round_ticks, 600);
    }

    #[test]
    fn flags_rescale_to_the_tick_rate() {
        let config = args(&["--fps", "60", "--round-seconds", "3", "--late-ms", "1000"]).config();
        assert_eq!(config.round_ticks, 180);
        assert_eq!(config.late_threshold_ticks, 60);
        assert_eq!(config.feedback_ticks, 30);
        assert_eq!(config.announcement_ticks, 120);
    }

    #[test]
    fn huge_rounds_saturate() {
        let config = args(&["--fps", "1000", "--round-seconds", "4294967295"]).config();
        assert_eq!(config.round_ticks, u32::MAX);
        assert!(Args::try_parse_from(["exploradores", "--fps", "1000000"]).is_err());
        assert!(Args::try_parse_from(["exploradores", "--round-seconds", "0"]).is_err());
    }

    #[test]
    fn malformed_entry_degrades_to_empty_bank() {
        let json = r#"{"questions": [
            {"question": "¿Capital de Perú?", "image_path": "peru.png",
             "options": ["Lima"], "correct_answer": "Lima", "category": "Capitales"}
        ]}"#;
        let mut game = build_game(QuestionBank::from_json(json), GameConfig::default());
        let notice = "Pregunta 1 inválida: needs at least 2 options, found 1";
        assert_eq!(game.render_state().notice.as_deref(), Some(notice));

        let start = game
            .render_state()
            .buttons
            .into_iter()
            .find(|button| button.action == ButtonAction::Start)
            .unwrap();
        let (x, y) = start.rect.center();
        assert_eq!(
            game.handle_event(InputEvent::PointerClick { x, y }),
            Err(GameError::EmptyBank)
        );
        assert_eq!(game.screen(), Screen::Menu);
    }

    #[test]
    fn unreadable_json_is_described() {
        let err = QuestionBank::from_json("{not json").unwrap_err();
        assert!(describe(&err).starts_with("No se pudieron cargar las preguntas: "));
    }
}
