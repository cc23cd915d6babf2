mod cli;
mod config;
mod demo;
mod error;
mod lifecycle;
mod stepper;
mod ui;

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use tracing::Level;

use cli::{Cli, Command};
use config::StepperConfig;
use demo::Walkthrough;
use error::StepperError;
use lifecycle::{JobCard, LifecycleTable, StatusMapper, TransitionRequest};
use stepper::{JobCardStepper, StepperView};
use ui::{Layout, StepperRenderer, WalkthroughProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = StepperConfig::load().context("failed to load eka.toml")?;
    if let Some(layout) = cli.layout {
        config.layout = layout.into();
    }
    if cli.no_color {
        config.color = false;
    }
    let renderer = StepperRenderer::new(config.color, config.bar_width);
    let table = LifecycleTable::canonical();

    match cli.command {
        Command::States => {
            println!("{}", renderer.render_table(&table));
        }
        Command::Map { statuses } => {
            for raw in &statuses {
                let resolution = StatusMapper::resolve(raw);
                println!("{}", renderer.render_mapping(raw, &resolution, &table));
            }
        }
        Command::Render { status, previous } => {
            let mut stepper = JobCardStepper::new(status);
            if let Some(previous) = previous {
                stepper = stepper.with_previous_status(previous);
            }
            let view = stepper.view();
            println!("{}", renderer.render(&view, pick_layout(&config, &view)));
        }
        Command::Inspect { file } => {
            let card = read_job_card(&file)
                .with_context(|| format!("failed to read job card from {}", file.display()))?;
            let view = JobCardStepper::for_job_card(&card).view();
            println!("{}", renderer.render_header(&card));
            println!("{}", renderer.render(&view, pick_layout(&config, &view)));
        }
        Command::Select {
            status,
            step,
            notes,
        } => {
            let (view, request) = select_transition(&status, step, notes)?;
            println!("{}", renderer.render(&view, pick_layout(&config, &view)));
            println!();
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Demo { from, interval_ms } => {
            let period = Duration::from_millis(interval_ms.unwrap_or(config.demo_interval_ms));
            let mut walkthrough = Walkthrough::new(period);
            if let Some(from) = from.as_deref() {
                walkthrough = walkthrough.starting_at(from);
            }

            let progress = WalkthroughProgress::start(table.len());
            let last = walkthrough
                .play(|view| progress.show(view, &renderer.render(view, pick_layout(&config, view))))
                .await;
            progress.finish(last.as_ref());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn terminal_columns() -> Option<u16> {
    Term::stdout().size_checked().map(|(_, cols)| cols)
}

// Auto mode also falls back to narrow when the wide strip would not fit.
fn pick_layout(config: &StepperConfig, view: &StepperView) -> Layout {
    let threshold = config
        .narrow_below_columns
        .max(StepperRenderer::wide_width(view));
    config.layout.resolve(terminal_columns(), threshold)
}

fn read_job_card(path: &Path) -> Result<JobCard, StepperError> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(JobCard::from_json(&json)?)
}

/// Activate 1-based `step` on a stepper at `status`, capturing the
/// transition the click requests.
fn select_transition(
    status: &str,
    step: usize,
    notes: Option<String>,
) -> Result<(StepperView, TransitionRequest), StepperError> {
    let mut requested = None;
    let mut stepper = JobCardStepper::new(status)
        .on_step_click(|id| requested = Some(TransitionRequest::to(id, notes.clone())));

    let total = stepper.table().len();
    let index = step
        .checked_sub(1)
        .filter(|&i| i < total)
        .ok_or(StepperError::StepOutOfRange { step, total })?;
    stepper.activate(index);
    let view = stepper.view();
    drop(stepper);

    let request = requested.ok_or(StepperError::StepOutOfRange { step, total })?;
    Ok((view, request))
}
