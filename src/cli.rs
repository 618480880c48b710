use crate::libtrivia::frame::{Frame, InputEvent, Key, Screen, Tone};
use crate::libtrivia::game::Game;
use crate::libtrivia::pacer::{self, PresentationAdapter};
use crate::libtrivia::score::{Outcome, PlayerId};
use colored::{ColoredString, Colorize};
#[cfg(feature = "kittygfx")]
use kitty_image::{Action, Command, WrappedCommand};
use log::debug;
#[cfg(feature = "kittygfx")]
use log::warn;
use std::io::Write;
#[cfg(feature = "kittygfx")]
use std::path::PathBuf;
use text_io::try_read;

const TIMER_WIDTH: usize = 40;

/// Terminal front end. Each line typed is one frame of input.
struct Terminal {
    last: Option<Frame>,
}

impl Terminal {
    fn parse(&self, line: &str) -> Vec<InputEvent> {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.trim() {
            "" if line.contains(' ') => vec![InputEvent::KeyPress(Key::Space)],
            "" => Vec::new(),
            ":q" | ":salir" => vec![InputEvent::Quit],
            "espacio" => vec![InputEvent::KeyPress(Key::Space)],
            input => match input.parse::<usize>() {
                Ok(num) => self.click(num),
                Err(_) => {
                    let mut chars = input.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => vec![InputEvent::KeyPress(Key::Char(c))],
                        _ => {
                            println!("{}", format!("No entiendo {:?}.", input).bright_red());
                            Vec::new()
                        }
                    }
                }
            },
        }
    }

    /// Clicks the centre of the `num`th button of the last frame shown.
    fn click(&self, num: usize) -> Vec<InputEvent> {
        let button = self
            .last
            .as_ref()
            .and_then(|frame| frame.buttons.get(num.wrapping_sub(1)));
        match button {
            Some(button) => {
                let (x, y) = button.rect.center();
                vec![InputEvent::PointerClick { x, y }]
            }
            None => {
                println!("{}", format!("No hay opción {}.", num).bright_red());
                Vec::new()
            }
        }
    }
}

impl PresentationAdapter for Terminal {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        print!("{} ", ">".cyan());
        let _ = std::io::stdout().flush();
        let line: Result<String, _> = try_read!("{}\n");
        match line {
            Ok(line) => {
                let events = self.parse(&line);
                debug!("[CLI] {:?} -> {:?}", line, events);
                events
            }
            Err(_) => vec![InputEvent::Quit],
        }
    }

    fn present(&mut self, frame: &Frame) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        let question_changed = self.last.as_ref().map(|last| &last.question) != Some(&frame.question);
        draw(frame, question_changed);
        self.last = Some(frame.clone());
    }
}

fn player_colored(player: PlayerId, text: String) -> ColoredString {
    match player {
        PlayerId::One => text.bright_red(),
        PlayerId::Two => text.bright_blue(),
    }
}

fn draw(frame: &Frame, question_changed: bool) {
    println!("{}", format!("==========> {} <==========", frame.caption).cyan());
    if let Some(notice) = &frame.notice {
        println!("{}", notice.yellow());
    }

    match frame.screen {
        Screen::Menu => {}
        Screen::Scoreboard => draw_scores(frame),
        Screen::Playing => draw_playing(frame, question_changed),
        Screen::GameOver => {
            draw_scores(frame);
            let banner = match frame.outcome {
                Some(Outcome::Winner(player)) => player_colored(player, format!("¡{} Gana!", player)),
                Some(Outcome::Draw) | None => "¡Empate!".white(),
            };
            println!("{}", banner.bold());
            println!("{}", "Escribe \"espacio\" para volver al menú".cyan());
        }
    }

    for (i, button) in frame.buttons.iter().enumerate() {
        println!("  {}. {}", format!("{}", i + 1).bold(), button.label);
    }
}

fn draw_scores(frame: &Frame) {
    for player in PlayerId::ALL {
        let score = frame.scores[player.number() as usize - 1];
        println!("{}", player_colored(player, format!("{}: {}", player, score)));
    }
}

fn draw_playing(frame: &Frame, question_changed: bool) {
    draw_scores(frame);
    let filled = (frame.timer_elapsed * TIMER_WIDTH as f32).round() as usize;
    let filled = filled.min(TIMER_WIDTH);
    println!(
        "[{}{}]",
        "#".repeat(TIMER_WIDTH - filled).purple(),
        " ".repeat(filled)
    );

    if let Some(feedback) = &frame.feedback {
        let message = match feedback.tone {
            Tone::Correct => feedback.message.bright_green(),
            Tone::Incorrect => feedback.message.bright_red(),
        };
        println!("{}", message.bold());
    }

    if let Some(question) = &frame.question {
        println!(
            "{} {}",
            format!("[{}]", question.category).cyan(),
            question.prompt.black().bold().on_white()
        );
        #[cfg(feature = "kittygfx")]
        if question_changed {
            show_image(&question.image);
        }
        #[cfg(not(feature = "kittygfx"))]
        let _ = question_changed;
    }

    match (frame.announcement, frame.active_player) {
        (Some(player), _) => println!("{}", player_colored(player, format!("¡Turno de {}!", player)).bold()),
        (None, Some(player)) => println!("{}", player_colored(player, format!("Responde {}", player))),
        (None, None) => println!(
            "{}",
            "Pulsa la tecla de tu jugador para responder (q / ])".cyan()
        ),
    }
}

#[cfg(feature = "kittygfx")]
fn show_image(image_path: &PathBuf) {
    debug!("path at {image_path:?}");
    let (width, height) = match image::image_dimensions(image_path) {
        Ok(dimensions) => dimensions,
        Err(err) => {
            warn!("[CLI] Cannot read image {:?}: {}", image_path, err);
            return;
        }
    };
    let action = Action::TransmitAndDisplay(
        kitty_image::ActionTransmission {
            format: kitty_image::Format::Png,
            medium: kitty_image::Medium::File,
            width,
            height,
            ..Default::default()
        },
        kitty_image::ActionPut {
            x_offset: 0,
            ..Default::default()
        },
    );
    let command = WrappedCommand::new(Command::with_payload_from_path(action, image_path));
    println!("{command}");
    print!("{}", "\n".repeat(height as usize / 20));
}

pub fn cli_loop(mut game: Game) {
    println!(
        "{}",
        "Números eligen botones, q / ] reclaman el turno, :salir termina.".cyan()
    );
    let mut terminal = Terminal { last: None };
    pacer::run(&mut game, &mut terminal);
    println!("{}", "¡Hasta luego!".cyan());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libtrivia::config::GameConfig;
    use crate::libtrivia::question::tests::sample_bank;

    fn terminal_on_menu() -> Terminal {
        let game = Game::new(sample_bank(2), GameConfig::default());
        Terminal {
            last: Some(game.render_state()),
        }
    }

    #[test]
    fn parses_keys_and_quit() {
        let terminal = terminal_on_menu();
        assert_eq!(terminal.parse("q"), vec![InputEvent::KeyPress(Key::Char('q'))]);
        assert_eq!(terminal.parse("]\n"), vec![InputEvent::KeyPress(Key::Char(']'))]);
        assert_eq!(terminal.parse(" "), vec![InputEvent::KeyPress(Key::Space)]);
        assert_eq!(terminal.parse("espacio"), vec![InputEvent::KeyPress(Key::Space)]);
        assert_eq!(terminal.parse(":salir"), vec![InputEvent::Quit]);
        assert!(terminal.parse("").is_empty());
        assert!(terminal.parse("hola").is_empty());
    }

    #[test]
    fn numbers_click_buttons() {
        let terminal = terminal_on_menu();
        let frame = terminal.last.clone().unwrap();
        let (x, y) = frame.buttons[0].rect.center();
        assert_eq!(terminal.parse("1"), vec![InputEvent::PointerClick { x, y }]);
        assert!(terminal.parse("0").is_empty());
        assert!(terminal.parse("9").is_empty());
    }
}
