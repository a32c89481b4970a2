use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use pinkslip::cli::display::Display;
use pinkslip::cli::form::FormState;
use pinkslip::cli::input::{InputHandler, Keystroke};
use pinkslip::{AssetPaths, AssetStore, CompanyRecord, Pipeline, PipelineError, Prediction};

#[derive(Parser)]
#[command(name = "pinkslip", author, version, about, long_about = None)]
struct Args {
    /// Directory holding rf_model.json and label_encoder.json
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Explicit classifier artifact path (wins over --assets)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Explicit label-decoder artifact path (wins over --assets)
    #[arg(long)]
    encoder: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Layoff Scale Predictor ===");

    let paths = AssetPaths {
        dir: args.assets,
        model: args.model,
        encoder: args.encoder,
    };
    let store = AssetStore::obtain(&paths);
    let pipeline = Pipeline::from_store(store).ok();

    let display = Display::new()?;
    InputHandler::enable_raw_mode()?;
    let outcome = run_session(&display, store, pipeline);
    InputHandler::disable_raw_mode()?;
    display.shutdown()?;

    info!("=== Session Over ===");
    outcome
}

/// Drives the form until the user exits with Ctrl+C or Escape.
fn run_session(
    display: &Display,
    store: &AssetStore,
    pipeline: Option<Pipeline>,
) -> Result<()> {
    let input = InputHandler::new();
    let mut form = FormState::new();
    let summary = store
        .classifier()
        .map(|model| model.summary().to_string());

    'session: loop {
        display.clear()?;
        display.show_banner(summary.as_deref())?;
        display.show_form(&form)?;
        display.show_help()?;

        // Wait out poll timeouts so the screen only redraws after a
        // keystroke changed something.
        loop {
            let Some(keystroke) = input.read()? else {
                continue;
            };
            match keystroke {
                Keystroke::Exit => break 'session,
                Keystroke::Enter if form.is_on_submit() => {
                    let record = form.assemble();
                    info!("Submitting record: {:?}", record);
                    let outcome = match &pipeline {
                        Some(pipeline) => pipeline.predict(&record),
                        None => Err(PipelineError::unavailable(store.failure())),
                    };
                    if !show_outcome(display, &record, &outcome, &input)? {
                        break 'session;
                    }
                }
                Keystroke::Enter | Keystroke::Down | Keystroke::Tab => form.next(),
                Keystroke::Up => form.prev(),
                Keystroke::Left => form.cycle_left(),
                Keystroke::Right => form.cycle_right(),
                Keystroke::Backspace => form.backspace(),
                Keystroke::Char(c) => form.insert_char(c),
            }
            break;
        }
    }

    Ok(())
}

/// Renders the result screen and waits for a keystroke.
/// Returns `false` when the user chose to exit from here.
fn show_outcome(
    display: &Display,
    record: &CompanyRecord,
    outcome: &Result<Prediction, PipelineError>,
    input: &InputHandler,
) -> Result<bool> {
    display.clear()?;
    display.show_record(record)?;
    let next_row = match outcome {
        Ok(prediction) => {
            info!("Predicted '{}'", prediction.label);
            display.show_prediction(prediction)?
        }
        Err(error) => {
            info!("Submission failed: {}", error);
            display.show_error(error)?
        }
    };
    display.show_continue_hint(next_row)?;

    loop {
        match input.read()? {
            Some(Keystroke::Exit) => return Ok(false),
            Some(_) => return Ok(true),
            None => {}
        }
    }
}
