use crate::libtrivia::frame::{
    Frame, InputEvent, Key, Rect, Screen, Tone, TITLE, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use crate::libtrivia::game::Game;
use crate::libtrivia::pacer::{self, FramePacer};
use crate::libtrivia::score::{Outcome, PlayerId};
use crate::Error;
use eframe::egui;
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Vec2};
use log::debug;

const PURPLE: Color32 = Color32::from_rgb(147, 112, 219);
const AQUA: Color32 = Color32::from_rgb(127, 255, 212);
const PINK: Color32 = Color32::from_rgb(255, 182, 193);
const RED: Color32 = Color32::from_rgb(255, 0, 0);
const BLUE: Color32 = Color32::from_rgb(0, 0, 255);
const GREEN: Color32 = Color32::from_rgb(0, 255, 0);
const MENU_TEXT: Color32 = Color32::from_rgb(0xb6, 0x8f, 0x40);
const IMAGE_SIZE: f32 = 200.0;

/// Maps the 800x600 logical space of a [`Frame`] onto the window.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    origin: Pos2,
    scale: Vec2,
}

impl Viewport {
    fn new(area: egui::Rect) -> Self {
        Self {
            origin: area.min,
            scale: Vec2::new(area.width() / WINDOW_WIDTH, area.height() / WINDOW_HEIGHT),
        }
    }

    fn pos(&self, x: f32, y: f32) -> Pos2 {
        self.origin + Vec2::new(x * self.scale.x, y * self.scale.y)
    }

    fn rect(&self, rect: &Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.pos(rect.x, rect.y),
            self.pos(rect.x + rect.width, rect.y + rect.height),
        )
    }

    fn logical(&self, pos: Pos2) -> (f32, f32) {
        let offset = pos - self.origin;
        (offset.x / self.scale.x, offset.y / self.scale.y)
    }

    fn font(&self, size: f32) -> FontId {
        FontId::proportional(size * self.scale.y.max(0.1))
    }
}

/// Paint passes of one frame, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Screen,
    Question,
    Announcement,
}

fn layers(frame: &Frame) -> Vec<Layer> {
    let mut layers = vec![Layer::Screen];
    if frame.screen == Screen::Playing {
        if frame.question.is_some() {
            layers.push(Layer::Question);
        }
        // The overlay is translucent, the question stays readable under it.
        if frame.announcement.is_some() {
            layers.push(Layer::Announcement);
        }
    }
    layers
}

fn player_color(player: PlayerId) -> Color32 {
    match player {
        PlayerId::One => RED,
        PlayerId::Two => BLUE,
    }
}

struct GuiState {
    game: Game,
    pacer: FramePacer,
    viewport: Option<Viewport>,
    caption: String,
}

impl GuiState {
    fn new(ctx: &eframe::CreationContext, game: Game) -> Self {
        egui_extras::install_image_loaders(&ctx.egui_ctx);
        Self {
            pacer: FramePacer::new(game.config().tick_interval()),
            game,
            viewport: None,
            caption: String::new(),
        }
    }

    fn collect_events(&self, ctx: &egui::Context) -> Vec<InputEvent> {
        let player_keys = [
            self.game.config().player_one_key,
            self.game.config().player_two_key,
        ];
        ctx.input(|input| {
            let mut events = Vec::new();
            if input.viewport().close_requested() {
                events.push(InputEvent::Quit);
            }
            for event in &input.events {
                match event {
                    egui::Event::Key {
                        key: egui::Key::Space,
                        pressed: true,
                        repeat: false,
                        ..
                    } => events.push(InputEvent::KeyPress(Key::Space)),
                    egui::Event::Text(text) => events.extend(
                        text.chars()
                            .filter(|c| player_keys.iter().any(|k| k.eq_ignore_ascii_case(c)))
                            .map(|c| InputEvent::KeyPress(Key::Char(c))),
                    ),
                    egui::Event::PointerButton {
                        pos,
                        button: egui::PointerButton::Primary,
                        pressed: true,
                        ..
                    } => {
                        if let Some(viewport) = &self.viewport {
                            let (x, y) = viewport.logical(*pos);
                            events.push(InputEvent::PointerClick { x, y });
                        }
                    }
                    _ => {}
                }
            }
            events
        })
    }

    fn draw(&self, painter: &Painter, viewport: &Viewport, frame: &Frame, hover: Option<Pos2>) {
        let full = viewport.rect(&Rect {
            x: 0.0,
            y: 0.0,
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        });
        match frame.screen {
            Screen::Menu => {
                painter.rect_filled(full, 0.0, Color32::BLACK);
                painter.text(
                    viewport.pos(420.0, 100.0),
                    Align2::CENTER_CENTER,
                    TITLE,
                    viewport.font(30.0),
                    MENU_TEXT,
                );
            }
            Screen::Scoreboard => {
                painter.rect_filled(full, 0.0, Color32::BLACK);
                self.draw_scores(painter, viewport, Color32::WHITE, 200.0);
            }
            Screen::Playing => self.draw_playing(painter, viewport, frame, full),
            Screen::GameOver => {
                painter.rect_filled(full, 0.0, PINK);
                let (text, color) = match frame.outcome {
                    Some(Outcome::Winner(player)) => {
                        (format!("¡{} Gana!", player), player_color(player))
                    }
                    Some(Outcome::Draw) | None => ("¡Empate!".to_string(), Color32::WHITE),
                };
                painter.text(
                    viewport.pos(400.0, 250.0),
                    Align2::CENTER_CENTER,
                    text,
                    viewport.font(48.0),
                    color,
                );
                self.draw_scores(painter, viewport, Color32::BLACK, 330.0);
                painter.text(
                    viewport.pos(400.0, 420.0),
                    Align2::CENTER_CENTER,
                    "Presiona ESPACIO para volver al menú",
                    viewport.font(24.0),
                    Color32::BLACK,
                );
            }
        }

        for button in &frame.buttons {
            let rect = viewport.rect(&button.rect);
            let hovered = hover.is_some_and(|pos| rect.contains(pos));
            painter.rect_filled(rect, 20.0, if hovered { RED } else { PINK });
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &button.label,
                viewport.font(20.0),
                Color32::BLACK,
            );
        }

        if let Some(notice) = &frame.notice {
            painter.text(
                viewport.pos(400.0, 580.0),
                Align2::CENTER_CENTER,
                notice,
                viewport.font(18.0),
                Color32::YELLOW,
            );
        }
    }

    fn draw_scores(&self, painter: &Painter, viewport: &Viewport, color: Color32, y: f32) {
        for (player, x) in PlayerId::ALL.into_iter().zip([250.0, 550.0]) {
            painter.text(
                viewport.pos(x, y),
                Align2::CENTER_CENTER,
                format!("{}: {}", player, self.game.scores()[player.number() as usize - 1]),
                viewport.font(28.0),
                color,
            );
        }
    }

    fn draw_playing(&self, painter: &Painter, viewport: &Viewport, frame: &Frame, full: egui::Rect) {
        painter.rect_filled(full, 0.0, AQUA);
        painter.rect_filled(
            viewport.rect(&Rect {
                x: 0.0,
                y: 0.0,
                width: WINDOW_WIDTH,
                height: 60.0,
            }),
            0.0,
            PURPLE,
        );
        painter.rect_filled(
            viewport.rect(&Rect {
                x: 0.0,
                y: 70.0,
                width: (1.0 - frame.timer_elapsed) * WINDOW_WIDTH,
                height: 10.0,
            }),
            0.0,
            PURPLE,
        );
        painter.text(
            viewport.pos(50.0, 30.0),
            Align2::LEFT_CENTER,
            format!("Jugador 1: {}", frame.scores[0]),
            viewport.font(28.0),
            Color32::BLACK,
        );
        painter.text(
            viewport.pos(WINDOW_WIDTH - 50.0, 30.0),
            Align2::RIGHT_CENTER,
            format!("Jugador 2: {}", frame.scores[1]),
            viewport.font(28.0),
            Color32::BLACK,
        );

        if let Some(feedback) = &frame.feedback {
            painter.text(
                viewport.pos(400.0, 420.0),
                Align2::CENTER_CENTER,
                feedback.message,
                viewport.font(40.0),
                match feedback.tone {
                    Tone::Correct => GREEN,
                    Tone::Incorrect => RED,
                },
            );
        }

    }

    fn draw_announcement(&self, painter: &Painter, viewport: &Viewport, frame: &Frame) {
        let Some(player) = frame.announcement else {
            return;
        };
        let full = viewport.rect(&Rect {
            x: 0.0,
            y: 0.0,
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        });
        painter.rect_filled(full, 0.0, Color32::from_white_alpha(128));
        painter.text(
            viewport.pos(400.0, 300.0),
            Align2::CENTER_CENTER,
            format!("{}", player),
            viewport.font(48.0),
            player_color(player),
        );
    }

    fn draw_question(&self, ui: &mut egui::Ui, viewport: &Viewport, frame: &Frame) {
        let Some(question) = &frame.question else {
            return;
        };
        ui.painter().text(
            viewport.pos(400.0, 120.0),
            Align2::CENTER_CENTER,
            &question.prompt,
            viewport.font(32.0),
            Color32::BLACK,
        );
        ui.painter().text(
            viewport.pos(400.0, 155.0),
            Align2::CENTER_CENTER,
            &question.category,
            viewport.font(18.0),
            PURPLE,
        );
        let image_rect = viewport.rect(&Rect::centered(400.0, 280.0, IMAGE_SIZE, IMAGE_SIZE));
        egui::Image::new(format!("file://{}", question.image.display())).paint_at(ui, image_rect);
    }
}

impl eframe::App for GuiState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let events = self.collect_events(ctx);
        let ticks = self.pacer.due_ticks();
        pacer::step(&mut self.game, ticks, events);

        if self.game.is_terminated() {
            debug!("[GUI] Closing window");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let frame = self.game.render_state();
        if frame.caption != self.caption {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(frame.caption.clone()));
            self.caption = frame.caption.clone();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let viewport = Viewport::new(ui.max_rect());
                let hover = ctx.pointer_hover_pos();
                for layer in layers(&frame) {
                    match layer {
                        Layer::Screen => self.draw(ui.painter(), &viewport, &frame, hover),
                        Layer::Question => self.draw_question(ui, &viewport, &frame),
                        Layer::Announcement => {
                            self.draw_announcement(ui.painter(), &viewport, &frame)
                        }
                    }
                }
                self.viewport = Some(viewport);
            });

        ctx.request_repaint_after(self.pacer.interval());
    }
}

pub fn init_gui(game: Game) -> Result<(), Error> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        native_options,
        Box::new(|cc| Ok(Box::new(GuiState::new(cc, game)))),
    )
    .map_err(|err| Error::Gui(err.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libtrivia::config::GameConfig;
    use crate::libtrivia::question::tests::sample_bank;

    #[test]
    fn viewport_round_trips_points() {
        let area = egui::Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(1600.0, 1200.0));
        let viewport = Viewport::new(area);
        assert_eq!(viewport.pos(400.0, 300.0), Pos2::new(810.0, 620.0));
        assert_eq!(viewport.logical(Pos2::new(810.0, 620.0)), (400.0, 300.0));
    }

    #[test]
    fn question_stays_under_the_turn_announcement() {
        let mut game = Game::new(sample_bank(3), GameConfig::default());
        assert_eq!(layers(&game.render_state()), [Layer::Screen]);

        let start = game.render_state().buttons[0].rect.center();
        game.handle_event(InputEvent::PointerClick { x: start.0, y: start.1 })
            .unwrap();
        assert_eq!(
            layers(&game.render_state()),
            [Layer::Screen, Layer::Question]
        );

        game.handle_event(InputEvent::KeyPress(Key::Char('q'))).unwrap();
        assert_eq!(
            layers(&game.render_state()),
            [Layer::Screen, Layer::Question, Layer::Announcement]
        );
    }
}
