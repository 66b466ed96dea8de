use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;
use serde::Deserialize;
use serde_json::json;
use shake_redirect::console::{ConsoleNavigator, ConsoleSurface, DeviceProfile, SimulatedDevice};
use shake_redirect::{GateConfig, PageEvent, Preset, RedirectController};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
struct Args {
    /// Recorded trace (JSON) with an optional device profile and an event list
    #[arg(long)]
    trace: PathBuf,

    /// Page version to emulate
    #[arg(long, value_enum, default_value = "classic")]
    preset: Preset,

    /// JSON config overriding the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print status lines while replaying
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Deserialize)]
struct Trace {
    #[serde(default)]
    device: DeviceProfile,
    events: Vec<PageEvent>,
}

fn load_trace(path: &Path) -> anyhow::Result<Trace> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GateConfig::load(path)?,
        None => args.preset.config(),
    };
    let trace = load_trace(&args.trace)?;
    let total_events = trace.events.len();
    info!("Replaying {} events from {}", total_events, args.trace.display());

    // Everything is queued up front; the controller stops reading once it redirects
    let (tx, rx) = mpsc::channel::<PageEvent>(total_events.max(1));
    for event in trace.events {
        tx.send(event).await?;
    }
    drop(tx);

    let mut controller = RedirectController::new(
        config.clone(),
        SimulatedDevice::new(trace.device),
        ConsoleSurface::new(!args.verbose),
        ConsoleNavigator::default(),
    );
    let summary = controller.run(rx).await;

    let report = json!({
        "trace": args.trace.display().to_string(),
        "config": config,
        "events_total": total_events,
        "summary": summary,
        "device": controller.device().attached(),
        "visited": controller.navigator().visited(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
