pub mod config;
pub mod frame;
pub mod game;
pub mod pacer;
pub mod question;
pub mod score;
pub mod selector;
