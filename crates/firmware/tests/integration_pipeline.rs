//! Pipeline integration tests: DMA notification → signal task → alert/UI.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects,
    clippy::large_stack_arrays
)]
//!
//! Drives the three tasks one step at a time on the host. The sample buffer
//! is written from the CPU in place of DMA, and "still pending" is checked by
//! racing a task step against an immediately-ready future.
//!
//! Run with: cargo test -p firmware --test integration_pipeline

use core::future::ready;

use embassy_futures::select::{select, Either};
use firmware::{AcquisitionBuffer, AudioTask, PipelineContext, SignalTask, UiTask};
use platform::mocks::{MockAlertOutput, MockDelay, MockDisplay};
use platform::{BufferHalf, ChartMode, PipelineConfig, SamplePair, HALF_BUFFER_LEN};
use sensing::synth::{CoilSignal, Tone};
use sensing::{Detection, SignalProcessor};

const BIN: usize = 64;

struct Rig {
    ctx: &'static PipelineContext,
    buffer: &'static AcquisitionBuffer,
    processor: Option<&'static mut SignalProcessor>,
}

impl Rig {
    fn new(config: PipelineConfig) -> Self {
        let ctx: &'static PipelineContext = Box::leak(Box::new(PipelineContext::new()));
        ctx.start(&config);
        Self {
            ctx,
            buffer: Box::leak(Box::new(AcquisitionBuffer::new())),
            processor: Some(Box::leak(Box::new(SignalProcessor::new()))),
        }
    }

    fn signal_task(&mut self) -> SignalTask<'static> {
        SignalTask::new(self.ctx, self.buffer, self.processor.take().unwrap())
    }

    fn audio_task(&self) -> AudioTask<'static, MockAlertOutput, MockDelay> {
        AudioTask::new(self.ctx.alert(), MockAlertOutput::new(), MockDelay::new(), 250)
    }

    /// Fill `half` with an RX tone of `amplitude` codes at `BIN`.
    fn load(&self, half: BufferHalf, amplitude: f32) {
        let signal = CoilSignal::new(2048, Tone::new(BIN, 500.0, 0.0), Tone::new(BIN, amplitude, -0.5));
        let mut samples = Box::new([SamplePair::ZERO; HALF_BUFFER_LEN]);
        signal.fill(&mut samples[..]);
        // SAFETY: no DMA on the host and no outstanding read of this half.
        unsafe { self.buffer.write_half(half, &samples) };
    }
}

fn quiet(gb: u16, sens: u16) -> PipelineConfig {
    PipelineConfig::handheld()
        .with_detector(gb, sens)
        .with_startup_chirp(false)
}

/// Rising magnitude above ground balance is detected; a further rise smaller
/// than the sensitivity is not.
#[tokio::test]
async fn detection_then_sub_threshold_rise() {
    let mut rig = Rig::new(quiet(100, 20));
    let mut signal = rig.signal_task();
    let mut audio = rig.audio_task();
    let mut ui = UiTask::new(rig.ctx, MockDisplay::new(ChartMode::TimeDomain), MockDelay::new(), &quiet(100, 20));

    // Amplitude 300 → magnitude 150: above 100 and above 0 + 20.
    rig.load(BufferHalf::Half, 300.0);
    assert!(rig.ctx.notifier().on_half_transfer());
    let report = signal.run_cycle().await;
    assert_eq!(report.half, BufferHalf::Half);
    assert_eq!(report.dominant_bin, BIN);
    assert!((report.reading.rx_magnitude - 150.0).abs() < 1.0);
    assert!(report.detection.is_target());
    assert!(rig.ctx.alert().is_pending());

    audio.pulse_once().await.unwrap();
    assert_eq!(audio.output().levels(), &[true, false]);
    assert_eq!(audio.delay().calls_ms(), &[250]);

    ui.frame();
    let depth = ui.display().depth_updates()[0];
    assert!(depth.abs_diff(50) <= 1, "depth {depth}");
    let phase = ui.display().phase_updates()[0];
    assert!(phase.abs_diff(28) <= 1, "phase {phase}");

    // Amplitude 310 → magnitude 155: 155 <= 150 + 20, no target.
    rig.load(BufferHalf::Full, 310.0);
    assert!(rig.ctx.notifier().on_transfer_complete());
    let report = signal.run_cycle().await;
    assert_eq!(report.half, BufferHalf::Full);
    assert_eq!(report.detection, Detection::NoTarget);
    assert!(!rig.ctx.alert().is_pending());
    assert_eq!(signal.detector().last_magnitude, report.reading.rx_magnitude);

    let stats = rig.ctx.stats().snapshot();
    assert_eq!(stats.cycles, 2);
    assert_eq!(stats.detections, 1);
}

/// Two notifications before the signal task runs yield one cycle on the
/// first half; the second is dropped and counted.
#[tokio::test]
async fn notifications_coalesce_in_the_mailbox() {
    let mut rig = Rig::new(quiet(0, 0));
    let mut signal = rig.signal_task();

    assert!(rig.ctx.notifier().on_half_transfer());
    assert!(!rig.ctx.notifier().on_transfer_complete());

    let report = signal.run_cycle().await;
    assert_eq!(report.half, BufferHalf::Half);

    match select(signal.run_cycle(), ready(())).await {
        Either::First(report) => panic!("unexpected second cycle on {:?}", report.half),
        Either::Second(()) => {}
    }

    let stats = rig.ctx.stats().snapshot();
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.dropped_notifications, 1);
}

/// Several detections before the audio task runs produce a single pulse.
#[tokio::test]
async fn alerts_coalesce_into_one_pulse() {
    let mut rig = Rig::new(quiet(0, 0));
    let mut signal = rig.signal_task();
    let mut audio = rig.audio_task();

    rig.load(BufferHalf::Half, 200.0);
    rig.load(BufferHalf::Full, 400.0);
    assert!(signal.process_half(BufferHalf::Half).detection.is_target());
    assert!(signal.process_half(BufferHalf::Full).detection.is_target());

    audio.pulse_once().await.unwrap();
    match select(audio.pulse_once(), ready(())).await {
        Either::First(_) => panic!("second pulse without a new alert"),
        Either::Second(()) => {}
    }
    assert_eq!(audio.output().pulse_count(), 1);
    assert_eq!(rig.ctx.stats().snapshot().detections, 2);
}

/// The boot chirp pulses once with no detection at all.
#[tokio::test]
async fn startup_chirp_pulses_once() {
    let rig = Rig::new(PipelineConfig::handheld());
    let mut audio = rig.audio_task();

    audio.pulse_once().await.unwrap();
    assert_eq!(audio.output().pulse_count(), 1);
    match select(audio.pulse_once(), ready(())).await {
        Either::First(_) => panic!("chirp must pulse only once"),
        Either::Second(()) => {}
    }
}

#[tokio::test]
async fn no_chirp_means_silence_at_boot() {
    let rig = Rig::new(quiet(0, 0));
    let mut audio = rig.audio_task();

    match select(audio.pulse_once(), ready(())).await {
        Either::First(_) => panic!("pulse without chirp or detection"),
        Either::Second(()) => {}
    }
    assert!(audio.output().levels().is_empty());
}

/// All-zero input reports bin 0 and, with zero thresholds, no target
/// (0 is not greater than 0).
#[tokio::test]
async fn silent_buffer_reports_bin_zero() {
    let mut rig = Rig::new(quiet(0, 0));
    let mut signal = rig.signal_task();

    rig.ctx.notifier().on_transfer_complete();
    let report = signal.run_cycle().await;
    assert_eq!(report.dominant_bin, 0);
    assert_eq!(report.reading.rx_magnitude, 0.0);
    assert_eq!(report.detection, Detection::NoTarget);
}

/// The UI shows a detection, then falls back to zero once the idle window
/// passes, while streaming the spectrum in frequency mode.
#[tokio::test]
async fn ui_renders_then_resets() {
    let mut rig = Rig::new(quiet(50, 0));
    let mut signal = rig.signal_task();
    let config = PipelineConfig {
        idle_reset_frames: 2,
        ..quiet(50, 0)
    };
    let mut ui = UiTask::new(rig.ctx, MockDisplay::new(ChartMode::FrequencyDomain), MockDelay::new(), &config);

    rig.load(BufferHalf::Half, 300.0);
    signal.process_half(BufferHalf::Half);

    ui.frame();
    let depth = ui.display().depth_updates()[0];
    assert!(depth.abs_diff(100) <= 1, "depth {depth}");
    let peak = ui.display().chart().get(BIN).map(|(_, v)| *v).unwrap();
    assert!((peak - 150.0).abs() < 1.0);

    ui.frame();
    ui.frame();
    ui.frame();
    assert_eq!(ui.display().depth_updates().len(), 2);
    assert_eq!(ui.display().depth_updates().last(), Some(&0));
    assert_eq!(ui.display().phase_updates().last(), Some(&0));
    assert_eq!(ui.display().frames(), 4);
}

/// Ground balance changes made between cycles apply to the next cycle.
#[tokio::test]
async fn runtime_ground_balance_change() {
    let mut rig = Rig::new(quiet(0, 0));
    let mut signal = rig.signal_task();

    rig.ctx.set_ground_balance(1000);
    rig.load(BufferHalf::Half, 300.0);
    assert!(!signal.process_half(BufferHalf::Half).detection.is_target());

    rig.ctx.set_ground_balance(0);
    rig.load(BufferHalf::Full, 400.0);
    assert!(signal.process_half(BufferHalf::Full).detection.is_target());
}
