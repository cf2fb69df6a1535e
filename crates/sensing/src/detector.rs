//! Target decision logic.
//!
//! A target is reported when the dominant-bin RX magnitude is above the
//! ground balance *and* has risen by more than the sensitivity since the
//! previous cycle. The previous magnitude is replaced on every call, detected
//! or not, so the detector responds to cycle-over-cycle increase rather than
//! to a sustained elevated level: holding the coil still over a target reports
//! it once, on approach.
//!
//! On detection the TX−RX phase difference at the dominant bin is reported in
//! degrees, folded into `0..=180`. Ferrous and non-ferrous targets shift the
//! RX phase in opposite directions, which is what the phase indicator shows.

/// Magnitude and phases at the dominant bin for one processing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// TX coil phase in radians.
    pub tx_phase: f32,
    /// RX coil normalised magnitude.
    pub rx_magnitude: f32,
    /// RX coil phase in radians.
    pub rx_phase: f32,
}

/// Outcome of one detector call.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Detection {
    /// Nothing crossed both thresholds this cycle.
    NoTarget,
    /// A target was detected.
    Target {
        /// |TX − RX| phase in degrees, `0..=180`.
        phase_difference_degrees: f32,
    },
}

impl Detection {
    /// `true` for [`Detection::Target`].
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target { .. })
    }
}

/// Detector thresholds and the previous cycle's magnitude.
///
/// `ground_balance` and `sensitivity` are written by configuration calls;
/// `last_magnitude` is written by [`detect`](Self::detect) only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorState {
    /// RX magnitude seen on the previous call.
    pub last_magnitude: f32,
    /// Readings at or below this magnitude are never targets.
    pub ground_balance: f32,
    /// Required rise over `last_magnitude`.
    pub sensitivity: f32,
}

impl DetectorState {
    /// Zero thresholds, no history.
    pub const fn new() -> Self {
        Self {
            last_magnitude: 0.0,
            ground_balance: 0.0,
            sensitivity: 0.0,
        }
    }

    /// Detector with the given thresholds and no history.
    pub const fn with_thresholds(ground_balance: f32, sensitivity: f32) -> Self {
        Self {
            last_magnitude: 0.0,
            ground_balance,
            sensitivity,
        }
    }

    /// Overwrite the ground balance from a raw slider value.
    pub fn set_ground_balance(&mut self, raw: u16) {
        self.ground_balance = f32::from(raw);
    }

    /// Overwrite the sensitivity from a raw slider value.
    pub fn set_sensitivity(&mut self, raw: u16) {
        self.sensitivity = f32::from(raw);
    }

    /// Evaluate one reading and remember its magnitude.
    pub fn detect(&mut self, reading: &Reading) -> Detection {
        let magnitude = reading.rx_magnitude;
        let detected = magnitude > self.ground_balance
            && magnitude > self.last_magnitude + self.sensitivity;

        self.last_magnitude = magnitude;

        if detected {
            Detection::Target {
                phase_difference_degrees: phase_difference_degrees(
                    reading.tx_phase,
                    reading.rx_phase,
                ),
            }
        } else {
            Detection::NoTarget
        }
    }
}

/// Fold an angle in degrees into `(-180, 180]` with a single ±360 step.
///
/// Inputs are differences of two `atan2` results, so they lie in
/// `(-360, 360)` and one step is enough.
pub fn normalize_degrees(degrees: f32) -> f32 {
    if degrees > 180.0 {
        degrees - 360.0
    } else if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Absolute TX−RX phase difference in degrees, `0..=180`.
pub fn phase_difference_degrees(tx_phase: f32, rx_phase: f32) -> f32 {
    libm::fabsf(normalize_degrees((tx_phase - rx_phase).to_degrees()))
}
