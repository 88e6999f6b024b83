//! Player input
//!
//! Device events land in an `InputState` as they arrive; the frame driver
//! turns it into one `TickInput` per frame. Held state (keys, press)
//! persists, one-shots (start, restart, pointer target, drag) are consumed.

use crate::sim::{GamePhase, GameState, TickInput};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Start,
    Restart,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value. Unknown keys are `None`.
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "Left" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "Right" | "d" | "D" => Some(Key::Right),
            " " | "Spacebar" | "Enter" => Some(Key::Start),
            "r" | "R" => Some(Key::Restart),
            _ => None,
        }
    }
}

/// Accumulated device state between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    /// Latest pointer position in playfield coordinates
    pointer_x: Option<f32>,
    /// Last touch position, for relative drags
    touch_x: Option<f32>,
    drag_dx: f32,
    pressed: bool,
    start: bool,
    restart: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Start => self.start = true,
            Key::Restart => self.restart = true,
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Start | Key::Restart => {}
        }
    }

    /// Mouse moved; the paddle centers on `x`
    pub fn pointer_move(&mut self, x: f32) {
        if x.is_finite() {
            self.pointer_x = Some(x);
        }
    }

    /// Click: launches a waiting ball and starts squeezing the paddle
    pub fn pointer_down(&mut self) {
        self.pressed = true;
        self.start = true;
    }

    pub fn pointer_up(&mut self) {
        self.pressed = false;
    }

    /// Touch began at the given client x positions; only the first counts
    pub fn touch_start(&mut self, xs: &[f32]) {
        let Some(&x) = xs.first() else {
            return;
        };
        self.touch_x = Some(x);
        self.pressed = true;
        self.start = true;
    }

    /// Touch moved: the paddle follows the finger's movement, not its position
    pub fn touch_move(&mut self, xs: &[f32]) {
        let (Some(&x), Some(last)) = (xs.first(), self.touch_x) else {
            return;
        };
        self.drag_dx += x - last;
        self.touch_x = Some(x);
    }

    pub fn touch_end(&mut self) {
        self.touch_x = None;
        self.pressed = false;
    }

    pub fn request_start(&mut self) {
        self.start = true;
    }

    pub fn request_restart(&mut self) {
        self.restart = true;
    }

    /// Keyboard direction; opposite keys cancel out
    pub fn direction(&self) -> i8 {
        self.right as i8 - self.left as i8
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Drop queued one-shots (start, restart, pointer and drag) while keeping
    /// held keys and the press
    pub fn clear_one_shots(&mut self) {
        self.pointer_x = None;
        self.drag_dx = 0.0;
        self.start = false;
        self.restart = false;
    }

    /// Intent for the coming frame. Consumes one-shots.
    pub fn frame_input(&mut self) -> TickInput {
        TickInput {
            direction: self.direction(),
            target_x: self.pointer_x.take(),
            drag_dx: std::mem::take(&mut self.drag_dx),
            pressed: self.pressed,
            start: std::mem::take(&mut self.start),
            restart: std::mem::take(&mut self.restart),
        }
    }
}

/// Demo player: launches when waiting and keeps the paddle under the ball.
/// A slow sweep of the aim point varies the bounce angle between hits.
pub fn autopilot(state: &GameState) -> TickInput {
    match state.phase {
        GamePhase::Waiting => TickInput {
            start: true,
            ..Default::default()
        },
        GamePhase::Playing => {
            let sweep = (state.frame as f32 * 0.05).sin() * state.paddle.width * 0.3;
            TickInput {
                target_x: Some(state.ball.pos.x + sweep),
                ..Default::default()
            }
        }
        GamePhase::GameOver | GamePhase::Cleared => TickInput::default(),
    }
}
