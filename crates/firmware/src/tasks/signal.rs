//! Signal task: one processing cycle per acquisition notification.

use platform::BufferHalf;
use sensing::{Detection, DetectorState, SignalProcessor};

use crate::acquisition::AcquisitionBuffer;
use crate::pipeline::{CycleReport, NoHooks, PipelineContext, PipelineHooks, TargetReport};

/// Highest-priority consumer of the notification mailbox.
///
/// Owns the processor arrays and the detector's remembered magnitude;
/// thresholds are re-read from the shared settings at the start of each
/// detection so slider changes apply on the next cycle.
pub struct SignalTask<'a, H: PipelineHooks = NoHooks> {
    ctx: &'a PipelineContext,
    buffer: &'a AcquisitionBuffer,
    processor: &'a mut SignalProcessor,
    detector: DetectorState,
    hooks: H,
}

impl<'a> SignalTask<'a, NoHooks> {
    /// Task over `buffer` with no hooks installed.
    pub fn new(
        ctx: &'a PipelineContext,
        buffer: &'a AcquisitionBuffer,
        processor: &'a mut SignalProcessor,
    ) -> Self {
        Self {
            ctx,
            buffer,
            processor,
            detector: DetectorState::new(),
            hooks: NoHooks,
        }
    }
}

impl<'a, H: PipelineHooks> SignalTask<'a, H> {
    /// Replace the observation hooks.
    pub fn with_hooks<H2: PipelineHooks>(self, hooks: H2) -> SignalTask<'a, H2> {
        SignalTask {
            ctx: self.ctx,
            buffer: self.buffer,
            processor: self.processor,
            detector: self.detector,
            hooks,
        }
    }

    /// Installed hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Detector state carried between cycles.
    pub fn detector(&self) -> &DetectorState {
        &self.detector
    }

    /// Wait for one notification and process the half it names.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let half = self.ctx.mailbox().receive().await;
        self.process_half(half)
    }

    /// Process `half` immediately.
    pub fn process_half(&mut self, half: BufferHalf) -> CycleReport {
        // SAFETY: `half` was named by the latest DMA notification, so DMA is
        // filling the other half until this cycle completes.
        let samples = unsafe { self.buffer.read_half(half) };
        let output = self.processor.process(samples);

        let scope = self.ctx.scope();
        scope.publish_time(self.processor.tx_time(), self.processor.rx_time());
        scope.publish_spectrum(self.processor.rx_polar());

        self.ctx.settings().apply_to(&mut self.detector);
        let detection = self.detector.detect(&output.reading);

        if let Detection::Target {
            phase_difference_degrees,
        } = detection
        {
            let depth = output.reading.rx_magnitude - self.detector.ground_balance;
            self.ctx.alert().release();
            self.ctx.result().publish(phase_difference_degrees, depth);
            self.ctx.stats().record_detection();

            let target = TargetReport {
                dominant_bin: output.dominant_bin,
                phase_degrees: phase_difference_degrees,
                depth,
            };
            #[cfg(feature = "defmt")]
            defmt::debug!("target: {}", target);
            self.hooks.on_detection(&target);
        }

        self.ctx.stats().record_cycle();

        let report = CycleReport {
            half,
            dominant_bin: output.dominant_bin,
            reading: output.reading,
            detection,
        };
        self.hooks.on_cycle(&report);
        report
    }

    /// Process notifications forever.
    pub async fn run(mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!("signal task running");
        loop {
            self.run_cycle().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use platform::{SamplePair, HALF_BUFFER_LEN};
    use sensing::synth::{CoilSignal, Tone};

    struct Fixture {
        ctx: &'static PipelineContext,
        buffer: &'static AcquisitionBuffer,
        processor: &'static mut SignalProcessor,
    }

    fn fixture() -> Fixture {
        Fixture {
            ctx: Box::leak(Box::new(PipelineContext::new())),
            buffer: Box::leak(Box::new(AcquisitionBuffer::new())),
            processor: Box::leak(Box::new(SignalProcessor::new())),
        }
    }

    fn load(buffer: &AcquisitionBuffer, half: BufferHalf, signal: &CoilSignal) {
        let mut samples = Box::new([SamplePair::ZERO; HALF_BUFFER_LEN]);
        signal.fill(&mut samples[..]);
        // SAFETY: single-threaded test, no DMA.
        unsafe { buffer.write_half(half, &samples) };
    }

    #[derive(Default)]
    struct Counting {
        cycles: usize,
        targets: usize,
    }

    impl PipelineHooks for Counting {
        fn on_cycle(&mut self, _report: &CycleReport) {
            self.cycles += 1;
        }

        fn on_detection(&mut self, _report: &TargetReport) {
            self.targets += 1;
        }
    }

    #[test]
    fn silent_input_reports_bin_zero_and_no_target() {
        let f = fixture();
        let mut task = SignalTask::new(f.ctx, f.buffer, f.processor);
        let report = task.process_half(BufferHalf::Half);
        assert_eq!(report.dominant_bin, 0);
        assert_eq!(report.detection, Detection::NoTarget);
        assert!(!f.ctx.alert().is_pending());
        assert_eq!(f.ctx.stats().snapshot().cycles, 1);
    }

    #[test]
    fn target_releases_alert_and_publishes_depth() {
        let f = fixture();
        f.ctx.set_ground_balance(100);
        f.ctx.set_sensitivity(20);
        load(
            f.buffer,
            BufferHalf::Full,
            &CoilSignal::new(2048, Tone::new(64, 500.0, 0.0), Tone::new(64, 300.0, -1.0)),
        );
        let mut task = SignalTask::new(f.ctx, f.buffer, f.processor).with_hooks(Counting::default());
        let report = task.process_half(BufferHalf::Full);

        assert_eq!(report.half, BufferHalf::Full);
        assert_eq!(report.dominant_bin, 64);
        assert!(report.detection.is_target());
        assert!(f.ctx.alert().is_pending());
        let result = f.ctx.result().take().unwrap();
        assert!((result.depth - 50.0).abs() < 1.0, "depth {}", result.depth);
        assert!((result.phase_degrees - 1.0_f32.to_degrees()).abs() < 1.0);
        assert_eq!(task.hooks().cycles, 1);
        assert_eq!(task.hooks().targets, 1);
    }

    #[test]
    fn threshold_changes_apply_next_cycle() {
        let f = fixture();
        f.ctx.set_ground_balance(1000);
        load(
            f.buffer,
            BufferHalf::Half,
            &CoilSignal::new(2048, Tone::silent(), Tone::new(40, 400.0, 0.0)),
        );
        let mut task = SignalTask::new(f.ctx, f.buffer, f.processor);
        assert!(!task.process_half(BufferHalf::Half).detection.is_target());
        assert_eq!(task.detector().ground_balance, 1000.0);

        f.ctx.set_ground_balance(0);
        // Same magnitude as last cycle: no rise, so still no target.
        assert!(!task.process_half(BufferHalf::Half).detection.is_target());
        assert_eq!(task.detector().ground_balance, 0.0);
    }

    #[test]
    fn scope_reflects_processed_half() {
        let f = fixture();
        load(
            f.buffer,
            BufferHalf::Half,
            &CoilSignal::new(1500, Tone::silent(), Tone::new(30, 200.0, 0.0)),
        );
        let mut task = SignalTask::new(f.ctx, f.buffer, f.processor);
        task.process_half(BufferHalf::Half);
        let scope = f.ctx.scope();
        assert_eq!(scope.tx_time().next(), Some(1500.0));
        assert_eq!(scope.rx_time().next(), Some(1700.0));
        let peak = scope.rx_magnitude().nth(30).unwrap();
        assert!((peak - 100.0).abs() < 1.0, "peak {peak}");
    }

    #[tokio::test]
    async fn run_cycle_consumes_the_notification() {
        let f = fixture();
        let mut task = SignalTask::new(f.ctx, f.buffer, f.processor);
        assert!(f.ctx.notifier().on_transfer_complete());
        let report = task.run_cycle().await;
        assert_eq!(report.half, BufferHalf::Full);
        assert!(!f.ctx.mailbox().is_pending());
    }
}
