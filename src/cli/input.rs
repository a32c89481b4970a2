//! Keystroke input handling using crossterm
//!
//! Raw-mode capture with a short poll timeout, classified into the small
//! set of keystrokes the form reacts to.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// A keystroke the form knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
    /// Ctrl+C or Escape.
    Exit,
}

/// Reads and classifies keystrokes from the terminal.
pub struct InputHandler {
    /// Timeout for poll operations.
    poll_timeout: Duration,
}

impl InputHandler {
    /// Creates an input handler with a 50ms poll timeout, short enough
    /// that the form feels immediate.
    pub fn new() -> Self {
        InputHandler {
            poll_timeout: Duration::from_millis(50),
        }
    }

    /// Enable raw mode for terminal input
    pub fn enable_raw_mode() -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    /// Disable raw mode and restore terminal
    pub fn disable_raw_mode() -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Polls for the next keystroke. Returns `None` when the poll times
    /// out or the event is not a keystroke the form handles.
    pub fn read(&self) -> io::Result<Option<Keystroke>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                Event::Key(key) => Ok(Self::classify(&key)),
                _ => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    fn classify(key: &KeyEvent) -> Option<Keystroke> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Keystroke::Exit)
            }
            KeyCode::Esc => Some(Keystroke::Exit),
            KeyCode::Enter => Some(Keystroke::Enter),
            KeyCode::Backspace => Some(Keystroke::Backspace),
            KeyCode::Tab => Some(Keystroke::Tab),
            KeyCode::Up => Some(Keystroke::Up),
            KeyCode::Down => Some(Keystroke::Down),
            KeyCode::Left => Some(Keystroke::Left),
            KeyCode::Right => Some(Keystroke::Right),
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    Some(Keystroke::Char(c))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
