//! Terminal surface: form state, keystroke capture and rendering
//!
//! # Components
//! - `form.rs`: pure form state and record assembly
//! - `input.rs`: keystroke capture using crossterm
//! - `display.rs`: terminal rendering and UI

pub mod display;
pub mod form;
pub mod input;
