use crate::libtrivia::frame::{Frame, InputEvent};
use crate::libtrivia::game::Game;
use log::{debug, warn};
use std::thread;
use std::time::{Duration, Instant};

/// A front end: paints frames and hands over whatever input arrived since the last poll.
pub trait PresentationAdapter {
    fn poll_events(&mut self) -> Vec<InputEvent>;
    fn present(&mut self, frame: &Frame);
}

/// Turns wall-clock time into whole ticks and caps the loop at the tick rate.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    last: Instant,
    carry: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            last: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks owed since the previous call, keeping the remainder for next time.
    pub fn due_ticks(&mut self) -> u32 {
        let now = Instant::now();
        let owed = self.advance(now.duration_since(self.last));
        self.last = now;
        owed
    }

    fn advance(&mut self, elapsed: Duration) -> u32 {
        let total = self.carry + elapsed;
        let ticks = (total.as_nanos() / self.interval.as_nanos()) as u32;
        self.carry = total - self.interval * ticks;
        ticks
    }

    /// Sleeps until the next tick boundary.
    pub fn wait(&self) {
        let spent = self.last.elapsed() + self.carry;
        if let Some(rest) = self.interval.checked_sub(spent) {
            thread::sleep(rest);
        }
    }
}

/// Applies one frame's worth of time and input to the game.
pub fn step(game: &mut Game, ticks: u32, events: Vec<InputEvent>) {
    for _ in 0..ticks {
        game.tick();
    }
    for event in events {
        if let Err(err) = game.handle_event(event) {
            warn!("[Game] {}", err);
        }
    }
}

/// Runs the game until it is told to quit.
pub fn run(game: &mut Game, adapter: &mut impl PresentationAdapter) {
    let mut pacer = FramePacer::new(game.config().tick_interval());
    adapter.present(&game.render_state());
    while !game.is_terminated() {
        let events = adapter.poll_events();
        let ticks = pacer.due_ticks();
        step(game, ticks, events);
        adapter.present(&game.render_state());
        pacer.wait();
    }
    debug!("[Setup] Game loop finished");
}
