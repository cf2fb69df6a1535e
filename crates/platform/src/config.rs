//! Application configuration and constants
//!
//! Central configuration values used across the firmware. Detector settings
//! given here are only the power-on values; the user adjusts ground balance
//! and sensitivity at runtime and nothing is persisted.

/// The application name
pub const APP_NAME: &str = "Coil Sentinel";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pipeline timing and power-on settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineConfig {
    /// How long the amplifier stays enabled per alert.
    pub alert_pulse_ms: u32,
    /// UI frame period.
    pub ui_period_ms: u32,
    /// Consecutive frames without detection before indicators return to zero.
    pub idle_reset_frames: u32,
    /// Log pipeline statistics every this many UI frames (0 disables).
    pub stats_log_frames: u32,
    /// Pulse the amplifier once at boot as a speaker self-test.
    pub startup_chirp: bool,
    /// Ground balance applied before the user touches the slider.
    pub initial_ground_balance: u16,
    /// Sensitivity applied before the user touches the slider.
    pub initial_sensitivity: u16,
}

impl PipelineConfig {
    /// Reference configuration of the handheld unit.
    pub const fn handheld() -> Self {
        Self {
            alert_pulse_ms: 250,
            ui_period_ms: 35,
            idle_reset_frames: 35,
            stats_log_frames: 1000,
            startup_chirp: true,
            initial_ground_balance: 0,
            initial_sensitivity: 0,
        }
    }

    /// Set the power-on detector settings.
    pub const fn with_detector(mut self, ground_balance: u16, sensitivity: u16) -> Self {
        self.initial_ground_balance = ground_balance;
        self.initial_sensitivity = sensitivity;
        self
    }

    /// Enable or disable the boot chirp.
    pub const fn with_startup_chirp(mut self, enabled: bool) -> Self {
        self.startup_chirp = enabled;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::handheld()
    }
}
