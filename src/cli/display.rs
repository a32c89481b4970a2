//! Terminal rendering for the form and result screens
//!
//! Fixed-row layout drawn with crossterm; every screen starts from a
//! cleared terminal, so each method only paints its own rows.

use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};

use crate::cli::form::FormState;
use crate::pipeline::{PipelineError, Prediction};
use crate::record::CompanyRecord;

const SEPARATOR_WIDTH: usize = 50;
const BAR_WIDTH: usize = 30;

/// Terminal display manager.
pub struct Display;

impl Display {
    /// Claims the terminal: hides the cursor until shutdown.
    pub fn new() -> std::io::Result<Self> {
        execute!(stdout(), cursor::Hide)?;
        Ok(Display)
    }

    /// Clear screen
    pub fn clear(&self) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    /// Title plus the model status line.
    pub fn show_banner(&self, summary: Option<&str>) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print("💼 Layoff Scale Predictor"),
            ResetColor,
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Blue),
            Print("─".repeat(SEPARATOR_WIDTH)),
            ResetColor,
            cursor::MoveTo(0, 2),
        )?;
        match summary {
            Some(summary) => execute!(
                stdout,
                Print("Model: "),
                SetForegroundColor(Color::Green),
                Print(summary),
                ResetColor
            )?,
            None => execute!(
                stdout,
                SetForegroundColor(Color::Red),
                Print("Model assets unavailable; submissions will show the load report"),
                ResetColor
            )?,
        }
        stdout.flush()?;
        Ok(())
    }

    /// Renders the form rows and the Predict row, marking the active one.
    pub fn show_form(&self, form: &FormState) -> std::io::Result<()> {
        let mut stdout = stdout();
        let label_width = form
            .fields()
            .iter()
            .map(|field| field.label().len())
            .max()
            .unwrap_or(0);

        for (row, field) in form.fields().iter().enumerate() {
            let active = form.active() == row;
            let marker = if active { "▸ " } else { "  " };
            let value = if active && field.is_select() {
                format!("◂ {} ▸", field.value())
            } else if active {
                format!("{}_", field.value())
            } else {
                field.value().to_string()
            };

            execute!(
                stdout,
                cursor::MoveTo(0, 4 + row as u16),
                Print(marker),
                Print(format!("{:<width$}  ", field.label(), width = label_width)),
            )?;
            if active {
                execute!(
                    stdout,
                    SetForegroundColor(Color::Cyan),
                    Print(value),
                    ResetColor
                )?;
            } else {
                execute!(stdout, Print(value))?;
            }
        }

        let submit_row = 4 + form.fields().len() as u16 + 1;
        execute!(stdout, cursor::MoveTo(0, submit_row))?;
        if form.is_on_submit() {
            execute!(
                stdout,
                SetForegroundColor(Color::Cyan),
                Print("▸ [ Predict ]"),
                ResetColor
            )?;
        } else {
            execute!(stdout, Print("  [ Predict ]"))?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Show help text
    pub fn show_help(&self) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 14),
            SetForegroundColor(Color::DarkGrey),
            Print("↑/↓ move  |  ←/→ cycle stage  |  Enter submit  |  Esc quit"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Echoes the submitted record in trained column order.
    pub fn show_record(&self, record: &CompanyRecord) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print("Company record"),
            ResetColor,
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::Blue),
            Print("─".repeat(SEPARATOR_WIDTH)),
            ResetColor,
        )?;
        for (row, (name, value)) in record.fields().iter().enumerate() {
            execute!(
                stdout,
                cursor::MoveTo(0, 2 + row as u16),
                Print(format!("{:<12}  {}", name, value)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Renders the decoded label and, when present, the confidence bars.
    /// Returns the first free row underneath.
    pub fn show_prediction(&self, prediction: &Prediction) -> std::io::Result<u16> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 10),
            Print("Predicted layoff scale: "),
            SetForegroundColor(Color::Green),
            Print(&prediction.label),
            ResetColor,
        )?;

        let mut next_row = 12;
        if let Some(confidence) = &prediction.confidence {
            execute!(
                stdout,
                cursor::MoveTo(0, 12),
                SetForegroundColor(Color::Cyan),
                Print("Confidence"),
                ResetColor,
            )?;
            let label_width = confidence
                .iter()
                .map(|(label, _)| label.chars().count())
                .max()
                .unwrap_or(0);
            // Same first-max rule as prediction, so the highlighted bar
            // always matches the decoded label.
            let mut best = 0;
            for (index, (_, probability)) in confidence.iter().enumerate() {
                if *probability > confidence[best].1 {
                    best = index;
                }
            }

            for (index, (label, probability)) in confidence.iter().enumerate() {
                let filled = ((probability * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
                let color = if index == best {
                    Color::Green
                } else {
                    Color::Blue
                };
                execute!(
                    stdout,
                    cursor::MoveTo(0, 13 + index as u16),
                    Print(format!("{:<width$}  ", label, width = label_width)),
                    SetForegroundColor(color),
                    Print("█".repeat(filled)),
                    Print("░".repeat(BAR_WIDTH - filled)),
                    ResetColor,
                    Print(format!("  {:5.1}%", probability * 100.0)),
                )?;
            }
            next_row = 13 + confidence.len() as u16 + 1;
        }
        stdout.flush()?;
        Ok(next_row)
    }

    /// Renders a per-submission failure, the load report carried by a
    /// degraded-mode error, and the hint, if any.
    /// Returns the first free row underneath.
    pub fn show_error(&self, error: &PipelineError) -> std::io::Result<u16> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 10),
            SetForegroundColor(Color::Red),
            Print(format!("Error: {}", error)),
            ResetColor,
        )?;
        let mut next_row = 12;
        if let PipelineError::AssetsUnavailable {
            report: Some(report),
        } = error
        {
            execute!(
                stdout,
                cursor::MoveTo(0, 11),
                SetForegroundColor(Color::Red),
                Print(format!("Cause: {}", report)),
                ResetColor,
            )?;
            next_row = 13;
        }
        if let Some(hint) = error.hint() {
            execute!(
                stdout,
                cursor::MoveTo(0, next_row),
                SetForegroundColor(Color::Yellow),
                Print(format!("Tip: {}", hint)),
                ResetColor,
            )?;
            next_row += 2;
        }
        stdout.flush()?;
        Ok(next_row)
    }

    /// Footer for the result screen.
    pub fn show_continue_hint(&self, row: u16) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print("Press any key to edit the form again  |  Esc quit"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&self) -> std::io::Result<()> {
        let mut stdout = stdout();
        execute!(stdout, cursor::Show, ResetColor)?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}
