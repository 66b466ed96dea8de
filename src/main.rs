use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError, Sender};
use tokio::time::{interval, sleep, timeout, Duration, Instant};

use shake_redirect::console::{
    ts_now, ConsoleNavigator, ConsoleSurface, DeviceProfile, PromptAnswer, SimulatedDevice,
};
use shake_redirect::{
    GateConfig, MotionSample, OrientationSample, PageEvent, Preset, RedirectController, TapKind,
};

#[derive(Parser, Debug)]
#[command(name = "shake_redirect")]
#[command(about = "Simulate the shake-to-redirect page against mock sensors", long_about = None)]
struct Args {
    /// Give up after this many seconds without a redirect
    #[arg(value_name = "SECONDS", default_value = "10")]
    duration: u64,

    /// Page version to emulate
    #[arg(long, value_enum, default_value = "classic")]
    preset: Preset,

    /// JSON config overriding the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Device has no DeviceMotion support
    #[arg(long)]
    no_motion: bool,

    /// Device has no DeviceOrientation support
    #[arg(long)]
    no_orientation: bool,

    /// Motion access needs an explicit permission prompt (iOS 13+)
    #[arg(long)]
    requires_permission: bool,

    /// How the permission prompt answers
    #[arg(long, value_enum, default_value = "grant")]
    prompt: PromptAnswer,

    /// Milliseconds between simulated shakes (0 = hold still)
    #[arg(long, default_value = "700")]
    shake_every_ms: u64,

    /// Peak acceleration of a shake (m/s^2)
    #[arg(long, default_value = "30.0")]
    shake_strength: f64,

    /// Tap the page at these offsets (ms), repeatable
    #[arg(long = "tap-at")]
    tap_at: Vec<u64>,

    /// Press the enable button at this offset (ms)
    #[arg(long)]
    button_at: Option<u64>,

    /// Tilt the device past the orientation threshold at this offset (ms)
    #[arg(long)]
    tilt_at: Option<u64>,

    /// Only print the final summary
    #[arg(long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GateConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => args.preset.config(),
    };

    let profile = DeviceProfile {
        motion: !args.no_motion,
        requires_permission: args.requires_permission,
        orientation: !args.no_orientation,
        prompt_answer: args.prompt,
        ..DeviceProfile::default()
    };

    if !args.quiet {
        println!("[{}] Shake Redirect simulation starting", ts_now());
        println!("  Duration: {} seconds", args.duration);
        println!(
            "  Threshold: {} m/s^2, {} shakes, {} ms debounce",
            config.motion_threshold, config.required_trigger_count, config.debounce_ms
        );
        println!("  Target: {}", config.target_url);
    }

    let (tx, rx) = mpsc::channel::<PageEvent>(500);
    let origin = Instant::now();

    let _accel_handle = tokio::spawn(accel_loop(
        tx.clone(),
        origin,
        args.shake_every_ms,
        args.shake_strength,
    ));
    let _input_handle = tokio::spawn(input_script(
        tx.clone(),
        args.tap_at.clone(),
        args.button_at,
        args.tilt_at,
    ));
    drop(tx);

    let mut controller = RedirectController::new(
        config,
        SimulatedDevice::new(profile),
        ConsoleSurface::new(args.quiet),
        ConsoleNavigator::default(),
    );

    let summary = match timeout(Duration::from_secs(args.duration), controller.run(rx)).await {
        Ok(summary) => summary,
        Err(_) => {
            warn!("No redirect after {} seconds", args.duration);
            controller.summary()
        }
    };

    let report = json!({
        "summary": summary,
        "device": controller.device().attached(),
        "visited": controller.navigator().visited(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// ~50Hz accelerometer feed with a sharp spike every `shake_every_ms`
async fn accel_loop(tx: Sender<PageEvent>, origin: Instant, shake_every_ms: u64, strength: f64) {
    let mut ticker = interval(Duration::from_millis(20));
    let mut sample_count = 0u64;
    let mut shakes = 0u64;
    let mut last_shake_ms = 0u64;

    loop {
        ticker.tick().await;
        let t_ms = origin.elapsed().as_millis() as u64;
        let t = t_ms as f64 / 1000.0;

        // Resting phone: gravity on z plus a little hand tremor
        let mut x = (t * 2.0 * std::f64::consts::PI).sin() * 0.5;
        let y = (t * 2.0 * std::f64::consts::PI).cos() * 0.3;
        let z = 9.81 + (t * std::f64::consts::PI).sin() * 0.1;

        if shake_every_ms > 0 && t_ms - last_shake_ms >= shake_every_ms {
            last_shake_ms = t_ms;
            shakes += 1;
            x += if shakes % 2 == 0 { -strength } else { strength };
            debug!("[accel] shake #{} at {} ms", shakes, t_ms);
        }

        let sample = MotionSample::new(x, y, z, t_ms as f64);
        match tx.try_send(PageEvent::Motion(sample)) {
            Ok(_) => {
                sample_count += 1;
                if sample_count % 100 == 0 {
                    debug!("[accel] {} samples", sample_count);
                }
            }
            Err(TrySendError::Closed(_)) => {
                info!("[accel] Channel closed after {} samples", sample_count);
                break;
            }
            Err(TrySendError::Full(_)) => {
                // Channel full, drop this sample
            }
        }
    }
}

/// Scripted user input: window load, taps, button press and tilt
async fn input_script(
    tx: Sender<PageEvent>,
    mut tap_at: Vec<u64>,
    button_at: Option<u64>,
    tilt_at: Option<u64>,
) {
    let mut script: Vec<(u64, PageEvent)> = vec![(0, PageEvent::Loaded)];
    tap_at.sort_unstable();
    for (i, at) in tap_at.into_iter().enumerate() {
        let tap = if i % 2 == 0 { TapKind::Click } else { TapKind::Touch };
        script.push((at, PageEvent::Tap { tap }));
    }
    if let Some(at) = button_at {
        script.push((at, PageEvent::ButtonPressed));
    }
    if let Some(at) = tilt_at {
        script.push((at, PageEvent::Orientation(OrientationSample::new(35.0, 5.0))));
    }
    script.sort_by_key(|(at, _)| *at);

    let start = Instant::now();
    for (at, event) in script {
        let due = start + Duration::from_millis(at);
        let now = Instant::now();
        if due > now {
            sleep(due - now).await;
        }
        if tx.send(event).await.is_err() {
            break;
        }
    }
}
