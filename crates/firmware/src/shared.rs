//! Lock-free state shared between the signal task, the UI task, and the
//! configuration inputs.
//!
//! # Consistency contract
//!
//! Every field is an independent atomic. Writers store with `Relaxed`
//! ordering and readers may observe a mix of old and new fields (for example
//! a new phase next to the previous depth, or a chart that is partly from the
//! previous cycle). Each individual value is always a complete `f32`, never
//! torn. The only ordered edge is the `detected` flag of [`SharedResult`],
//! which is set with `Release` after the values it announces and consumed
//! with `Acquire`.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use platform::{BIN_COUNT, FFT_LEN};
use sensing::{DetectorState, Polar};

/// An `f32` stored as its bit pattern.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    const fn zero() -> Self {
        Self(AtomicU32::new(0))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

// Array repeat operand; each element is a fresh atomic.
#[allow(clippy::declare_interior_mutable_const)]
const ZERO_F32: AtomicF32 = AtomicF32::zero();

// ─── Detector settings ───────────────────────────────────────────────────────

/// Ground-balance and sensitivity thresholds, written by the configuration
/// inputs and read by the signal task once per cycle.
///
/// A cycle may see one threshold updated and the other not yet; no
/// validation or range clamping is applied.
pub struct DetectorSettings {
    ground_balance: AtomicF32,
    sensitivity: AtomicF32,
}

impl DetectorSettings {
    /// Both thresholds at zero.
    pub const fn new() -> Self {
        Self {
            ground_balance: AtomicF32::zero(),
            sensitivity: AtomicF32::zero(),
        }
    }

    /// Set the ground-balance threshold.
    pub fn set_ground_balance(&self, value: u16) {
        self.ground_balance.store(f32::from(value));
    }

    /// Set the sensitivity (required rise over the previous magnitude).
    pub fn set_sensitivity(&self, value: u16) {
        self.sensitivity.store(f32::from(value));
    }

    /// Current ground balance.
    pub fn ground_balance(&self) -> f32 {
        self.ground_balance.load()
    }

    /// Current sensitivity.
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity.load()
    }

    /// Copy the current thresholds into `state`, leaving its remembered
    /// magnitude untouched.
    pub fn apply_to(&self, state: &mut DetectorState) {
        state.ground_balance = self.ground_balance();
        state.sensitivity = self.sensitivity();
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Detection result ────────────────────────────────────────────────────────

/// Values announced by one detection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResultSnapshot {
    /// Phase difference in degrees, `0..=180`.
    pub phase_degrees: f32,
    /// RX magnitude above the ground balance.
    pub depth: f32,
}

/// Latest detection, published by the signal task and consumed by the UI.
///
/// Several detections between two UI frames collapse to the last one written;
/// the UI renders once.
pub struct SharedResult {
    detected: AtomicBool,
    phase_degrees: AtomicF32,
    depth: AtomicF32,
}

impl SharedResult {
    /// No detection pending.
    pub const fn new() -> Self {
        Self {
            detected: AtomicBool::new(false),
            phase_degrees: AtomicF32::zero(),
            depth: AtomicF32::zero(),
        }
    }

    /// Store a detection and raise the flag.
    pub fn publish(&self, phase_degrees: f32, depth: f32) {
        self.phase_degrees.store(phase_degrees);
        self.depth.store(depth);
        self.detected.store(true, Ordering::Release);
    }

    /// Consume the pending detection, clearing the flag.
    pub fn take(&self) -> Option<ResultSnapshot> {
        if self.detected.swap(false, Ordering::Acquire) {
            Some(self.peek())
        } else {
            None
        }
    }

    /// `true` while a detection has not been consumed.
    pub fn is_pending(&self) -> bool {
        self.detected.load(Ordering::Acquire)
    }

    /// Last published values, whether or not they were consumed.
    pub fn peek(&self) -> ResultSnapshot {
        ResultSnapshot {
            phase_degrees: self.phase_degrees.load(),
            depth: self.depth.load(),
        }
    }
}

impl Default for SharedResult {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Scope view ──────────────────────────────────────────────────────────────

/// Chart data of the most recent cycle: both time-domain channels and the
/// RX magnitude spectrum.
///
/// Best-effort: the UI may read a mix of two cycles.
pub struct ScopeView {
    tx_time: [AtomicF32; FFT_LEN],
    rx_time: [AtomicF32; FFT_LEN],
    rx_magnitude: [AtomicF32; BIN_COUNT],
}

impl ScopeView {
    /// All-zero view.
    pub const fn new() -> Self {
        Self {
            tx_time: [ZERO_F32; FFT_LEN],
            rx_time: [ZERO_F32; FFT_LEN],
            rx_magnitude: [ZERO_F32; BIN_COUNT],
        }
    }

    /// Overwrite the time-domain channels.
    pub fn publish_time(&self, tx: &[f32; FFT_LEN], rx: &[f32; FFT_LEN]) {
        for (cell, value) in self.tx_time.iter().zip(tx.iter()) {
            cell.store(*value);
        }
        for (cell, value) in self.rx_time.iter().zip(rx.iter()) {
            cell.store(*value);
        }
    }

    /// Overwrite the RX magnitude spectrum.
    pub fn publish_spectrum(&self, rx: &[Polar; BIN_COUNT]) {
        for (cell, bin) in self.rx_magnitude.iter().zip(rx.iter()) {
            cell.store(bin.magnitude);
        }
    }

    /// TX coil samples, oldest first.
    pub fn tx_time(&self) -> impl Iterator<Item = f32> + '_ {
        self.tx_time.iter().map(AtomicF32::load)
    }

    /// RX coil samples, oldest first.
    pub fn rx_time(&self) -> impl Iterator<Item = f32> + '_ {
        self.rx_time.iter().map(AtomicF32::load)
    }

    /// RX magnitude per bin, DC first.
    pub fn rx_magnitude(&self) -> impl Iterator<Item = f32> + '_ {
        self.rx_magnitude.iter().map(AtomicF32::load)
    }
}

impl Default for ScopeView {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Counters for diagnostics. All wrap on overflow.
pub struct PipelineStats {
    cycles: AtomicU32,
    dropped_notifications: AtomicU32,
    detections: AtomicU32,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Completed processing cycles.
    pub cycles: u32,
    /// Notifications discarded because the mailbox was full.
    pub dropped_notifications: u32,
    /// Cycles that reported a target.
    pub detections: u32,
}

impl PipelineStats {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            cycles: AtomicU32::new(0),
            dropped_notifications: AtomicU32::new(0),
            detections: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Callable from interrupt context.
    pub(crate) fn record_drop(&self) {
        self.dropped_notifications.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_detection(&self) {
        self.detections.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            dropped_notifications: self.dropped_notifications.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
