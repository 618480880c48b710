//! Everything a front end needs to draw a frame and report input, in an
//! 800x600 logical coordinate space.

use crate::libtrivia::score::{Outcome, PlayerId};
use std::path::PathBuf;

pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;
pub const TITLE: &str = "Exploradores del mundo";

const OPTION_WIDTH: f32 = 150.0;
const OPTION_HEIGHT: f32 = 50.0;
const OPTION_Y: f32 = 500.0;
const MENU_WIDTH: f32 = 260.0;
const MENU_HEIGHT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    KeyPress(Key),
    PointerClick { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Scoreboard,
    Playing,
    GameOver,
}

impl Screen {
    pub fn caption(self) -> String {
        match self {
            Screen::Menu => format!("Menu - {TITLE}"),
            Screen::Scoreboard => format!("Puntaje - {TITLE}"),
            Screen::Playing | Screen::GameOver => TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ButtonAction {
    Start,
    Scores,
    Quit,
    Back,
    Answer(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub rect: Rect,
    pub action: ButtonAction,
}

impl Button {
    fn new(label: &str, rect: Rect, action: ButtonAction) -> Self {
        Self {
            label: label.to_string(),
            rect,
            action,
        }
    }
}

pub fn menu_buttons() -> Vec<Button> {
    vec![
        Button::new(
            "JUGAR",
            Rect::centered(400.0, 250.0, MENU_WIDTH, MENU_HEIGHT),
            ButtonAction::Start,
        ),
        Button::new(
            "PUNTAJES",
            Rect::centered(400.0, 325.0, MENU_WIDTH, MENU_HEIGHT),
            ButtonAction::Scores,
        ),
        Button::new(
            "SALIR",
            Rect::centered(400.0, 400.0, MENU_WIDTH, MENU_HEIGHT),
            ButtonAction::Quit,
        ),
    ]
}

pub fn scoreboard_buttons() -> Vec<Button> {
    vec![Button::new(
        "ATRAS",
        Rect::centered(150.0, 500.0, 180.0, MENU_HEIGHT),
        ButtonAction::Back,
    )]
}

/// One button per option, in a row along the bottom of the window.
pub fn option_buttons(options: &[String]) -> Vec<Button> {
    let count = options.len().max(1) as f32;
    let spacing = (WINDOW_WIDTH - OPTION_WIDTH * count) / (count + 1.0);
    options
        .iter()
        .enumerate()
        .map(|(i, option)| Button {
            label: option.clone(),
            rect: Rect {
                x: spacing + i as f32 * (OPTION_WIDTH + spacing),
                y: OPTION_Y,
                width: OPTION_WIDTH,
                height: OPTION_HEIGHT,
            },
            action: ButtonAction::Answer(option.clone()),
        })
        .collect()
}

pub fn hit<'a>(buttons: &'a [Button], x: f32, y: f32) -> Option<&'a Button> {
    buttons.iter().find(|button| button.rect.contains(x, y))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackView {
    pub message: &'static str,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub prompt: String,
    pub image: PathBuf,
    pub category: String,
}

/// Drawable description of the current state. Front ends paint this and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub screen: Screen,
    pub caption: String,
    pub scores: [i32; 2],
    pub question: Option<QuestionView>,
    /// Fraction of the round countdown already spent, from 0.0 to 1.0.
    pub timer_elapsed: f32,
    pub active_player: Option<PlayerId>,
    pub announcement: Option<PlayerId>,
    pub feedback: Option<FeedbackView>,
    pub outcome: Option<Outcome>,
    pub notice: Option<String>,
    pub buttons: Vec<Button>,
}
