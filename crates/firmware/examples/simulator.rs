//! Desktop Simulator
//!
//! Runs the full detector pipeline on the host: a synthetic coil stands in
//! for ADC/DMA, the indicators and beeps go to the console.
//! Run with: cargo run --example simulator --features emulator
//!
//! Log level via RUST_LOG (default `info`); `debug` also prints the spectrum
//! peak every 30 frames.

use std::time::Duration;

use embassy_time::Delay;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use firmware::acquisition::{start_acquisition, AcquisitionSource};
use firmware::{AcquisitionBuffer, AudioTask, PipelineContext, SignalTask, UiTask};
use platform::config::{APP_NAME, APP_VERSION};
use platform::{
    AlertOutput, BufferHalf, ChartMode, ChartSeries, PipelineConfig, ResultDisplay, SamplePair,
    HALF_BUFFER_LEN,
};
use sensing::synth::{CoilSignal, Tone};
use sensing::SignalProcessor;

/// Excitation bin of the simulated coil.
const COIL_BIN: usize = 96;
/// Time between two simulated DMA half-buffer events.
const HALF_PERIOD: Duration = Duration::from_millis(20);
/// How long the simulation runs.
const RUN_TIME: Duration = Duration::from_secs(12);

static PIPELINE: PipelineContext = PipelineContext::new();
static SAMPLES: AcquisitionBuffer = AcquisitionBuffer::new();

/// Coil sweeping over a buried target every few seconds.
struct SimulatedCoil {
    started: bool,
}

impl SimulatedCoil {
    /// RX amplitude for half-buffer number `n`: background with a bump while
    /// the coil passes over the target.
    fn rx_amplitude(n: u64) -> f32 {
        let phase = n % 150;
        if (60..75).contains(&phase) {
            let x = phase.abs_diff(67) as f32;
            120.0 + 400.0 - 50.0 * x
        } else {
            120.0
        }
    }
}

impl AcquisitionSource for SimulatedCoil {
    type Error = &'static str;

    fn start(&mut self, buffer: &'static AcquisitionBuffer) -> Result<(), Self::Error> {
        if self.started {
            return Err("already running");
        }
        self.started = true;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(HALF_PERIOD);
            let mut half = BufferHalf::Half;
            let mut samples = Box::new([SamplePair::ZERO; HALF_BUFFER_LEN]);
            for n in 0u64.. {
                ticker.tick().await;
                let rx = Tone::new(COIL_BIN, Self::rx_amplitude(n), -0.9);
                CoilSignal::new(2048, Tone::new(COIL_BIN, 900.0, 0.0), rx).fill(&mut samples[..]);
                // SAFETY: the runtime is single-threaded and the signal task
                // reads a half without yielding, so this write never overlaps
                // a live read of the same half.
                unsafe { buffer.write_half(half, &samples) };
                let notifier = PIPELINE.notifier();
                match half {
                    BufferHalf::Half => notifier.on_half_transfer(),
                    BufferHalf::Full => notifier.on_transfer_complete(),
                };
                half = half.other();
            }
        });
        Ok(())
    }
}

/// Amplifier line that prints instead of beeping.
#[derive(Default)]
struct ConsoleBeeper {
    enabled: bool,
}

impl AlertOutput for ConsoleBeeper {
    type Error = core::convert::Infallible;

    fn set(&mut self, enabled: bool) -> Result<(), Self::Error> {
        if enabled {
            info!("BEEP");
        }
        self.enabled = enabled;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Indicator and chart sink that logs changes.
struct ConsoleDisplay {
    depth: u16,
    frame: u32,
    peak: (usize, f32),
    index: usize,
}

impl ConsoleDisplay {
    fn new() -> Self {
        Self {
            depth: 0,
            frame: 0,
            peak: (0, 0.0),
            index: 0,
        }
    }
}

impl ResultDisplay for ConsoleDisplay {
    fn publish_depth(&mut self, value: u16) {
        self.depth = value;
    }

    fn publish_phase(&mut self, degrees: u16) {
        if self.depth == 0 && degrees == 0 {
            info!("indicators cleared");
        } else {
            info!(depth = self.depth, phase = degrees, "target");
        }
    }

    fn push_chart_sample(&mut self, _series: ChartSeries, value: f32) {
        // Skip the DC bin so the offset does not mask the coil tone.
        if self.index > 0 && value > self.peak.1 {
            self.peak = (self.index, value);
        }
        self.index = self.index.wrapping_add(1);
    }

    fn chart_mode(&self) -> ChartMode {
        ChartMode::FrequencyDomain
    }

    fn configure_chart(&mut self, mode: ChartMode) {
        info!(points = mode.point_count(), y_max = mode.y_max(), "chart {:?}", mode);
    }

    fn end_frame(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        if self.frame.checked_rem(30) == Some(0) {
            debug!(bin = self.peak.0, magnitude = self.peak.1, "spectrum peak");
        }
        self.peak = (0, 0.0);
        self.index = 0;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PipelineConfig::handheld().with_detector(150, 20);
    info!("{} v{} (simulator)", APP_NAME, APP_VERSION);
    info!(
        ground_balance = config.initial_ground_balance,
        sensitivity = config.initial_sensitivity,
        chirp = config.startup_chirp,
        "starting pipeline"
    );

    PIPELINE.start(&config);

    let processor: &'static mut SignalProcessor = Box::leak(Box::new(SignalProcessor::new()));
    tokio::spawn(async move { SignalTask::new(&PIPELINE, &SAMPLES, processor).run().await });
    tokio::spawn(async move { UiTask::new(&PIPELINE, ConsoleDisplay::new(), Delay, &config).run().await });
    tokio::spawn(async move {
        AudioTask::new(PIPELINE.alert(), ConsoleBeeper::default(), Delay, config.alert_pulse_ms)
            .run()
            .await
    });

    let mut coil = SimulatedCoil { started: false };
    if let Err(e) = start_acquisition(&mut coil, &SAMPLES) {
        warn!("{e}");
        return;
    }

    tokio::time::sleep(RUN_TIME).await;

    let stats = PIPELINE.stats().snapshot();
    info!(
        cycles = stats.cycles,
        detections = stats.detections,
        dropped = stats.dropped_notifications,
        "simulation finished"
    );
}
