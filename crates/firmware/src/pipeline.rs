//! Pipeline context: every piece of state the three tasks and the interrupt
//! handlers share, plus the per-cycle observation hooks.

use platform::{BufferHalf, PipelineConfig};
use sensing::{Detection, Reading};

use crate::acquisition::AcquisitionNotifier;
use crate::alert::AlertSignal;
use crate::mailbox::NotificationMailbox;
use crate::shared::{DetectorSettings, PipelineStats, ScopeView, SharedResult};

/// Shared coordination state of one detector pipeline.
///
/// `const`-constructible so it can be a plain `static`; every member is
/// interior-mutable and safe to use from interrupt context.
pub struct PipelineContext {
    mailbox: NotificationMailbox,
    alert: AlertSignal,
    settings: DetectorSettings,
    result: SharedResult,
    scope: ScopeView,
    stats: PipelineStats,
}

impl PipelineContext {
    /// Fresh context: empty mailbox, alert clear, thresholds at zero.
    pub const fn new() -> Self {
        Self {
            mailbox: NotificationMailbox::new(),
            alert: AlertSignal::new(),
            settings: DetectorSettings::new(),
            result: SharedResult::new(),
            scope: ScopeView::new(),
            stats: PipelineStats::new(),
        }
    }

    /// Apply power-on settings. Call once, before spawning the tasks.
    ///
    /// With `startup_chirp` the alert starts released, so the audio task
    /// pulses the amplifier once as soon as it runs.
    pub fn start(&self, config: &PipelineConfig) {
        self.settings.set_ground_balance(config.initial_ground_balance);
        self.settings.set_sensitivity(config.initial_sensitivity);
        if config.startup_chirp {
            self.alert.release();
        }
        #[cfg(feature = "defmt")]
        defmt::info!(
            "pipeline start: gb={=u16} sens={=u16} chirp={=bool}",
            config.initial_ground_balance,
            config.initial_sensitivity,
            config.startup_chirp
        );
    }

    /// Interrupt entry points for the DMA half/complete events.
    pub fn notifier(&self) -> AcquisitionNotifier<'_> {
        AcquisitionNotifier::new(&self.mailbox, &self.stats)
    }

    /// Set the ground-balance threshold. Takes effect on the next cycle.
    pub fn set_ground_balance(&self, value: u16) {
        self.settings.set_ground_balance(value);
    }

    /// Set the sensitivity threshold. Takes effect on the next cycle.
    pub fn set_sensitivity(&self, value: u16) {
        self.settings.set_sensitivity(value);
    }

    /// Notification mailbox.
    pub fn mailbox(&self) -> &NotificationMailbox {
        &self.mailbox
    }

    /// Alert between the signal and audio tasks.
    pub fn alert(&self) -> &AlertSignal {
        &self.alert
    }

    /// Current detector thresholds.
    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Latest detection result.
    pub fn result(&self) -> &SharedResult {
        &self.result
    }

    /// Chart data of the latest cycle.
    pub fn scope(&self) -> &ScopeView {
        &self.scope
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Hooks ───────────────────────────────────────────────────────────────────

/// What one processing cycle saw.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Half buffer that was processed.
    pub half: BufferHalf,
    /// Dominant RX bin.
    pub dominant_bin: usize,
    /// Detector input at that bin.
    pub reading: Reading,
    /// Detector outcome.
    pub detection: Detection,
}

/// A detection as published to the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetReport {
    /// Dominant RX bin.
    pub dominant_bin: usize,
    /// Phase difference in degrees, `0..=180`.
    pub phase_degrees: f32,
    /// RX magnitude above the ground balance.
    pub depth: f32,
}

/// Observation points called by the signal task.
///
/// Both methods default to doing nothing. They run inside the highest
/// priority task and must return quickly.
pub trait PipelineHooks {
    /// After every cycle, detected or not.
    fn on_cycle(&mut self, _report: &CycleReport) {}

    /// After a detection has been published.
    fn on_detection(&mut self, _report: &TargetReport) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PipelineHooks for NoHooks {}
