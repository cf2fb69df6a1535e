//! Result display abstraction.
//!
//! The UI task pushes detection indicators and chart samples through this
//! trait; widget rendering and the panel driver live behind it.

use crate::acquisition::{ADC_MAX_VALUE, BIN_COUNT, HALF_BUFFER_LEN};

/// What the live chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChartMode {
    /// Raw coil waveforms, both channels.
    #[default]
    TimeDomain,
    /// RX magnitude spectrum, one series.
    FrequencyDomain,
}

impl ChartMode {
    /// Number of points per series for this mode.
    pub const fn point_count(self) -> usize {
        match self {
            Self::TimeDomain => HALF_BUFFER_LEN,
            Self::FrequencyDomain => BIN_COUNT,
        }
    }

    /// Upper bound of the Y axis.
    ///
    /// Time domain spans the converter's full scale. A full-scale sine has a
    /// normalised magnitude of half its peak-to-peak code range.
    pub const fn y_max(self) -> u16 {
        match self {
            Self::TimeDomain => ADC_MAX_VALUE,
            Self::FrequencyDomain => 2048,
        }
    }

    /// Whether the secondary (TX) series is shown.
    pub const fn shows_tx(self) -> bool {
        matches!(self, Self::TimeDomain)
    }
}

/// Chart series identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChartSeries {
    /// Primary series: receive coil.
    Rx,
    /// Secondary series: transmit coil (time domain only).
    Tx,
}

/// Display collaborator consumed by the UI task.
pub trait ResultDisplay {
    /// Set the depth indicator.
    fn publish_depth(&mut self, value: u16);

    /// Set the phase indicator, in whole degrees `0..=180`.
    fn publish_phase(&mut self, degrees: u16);

    /// Append one sample to a chart series.
    fn push_chart_sample(&mut self, series: ChartSeries, value: f32);

    /// Current chart mode, selected by the user.
    fn chart_mode(&self) -> ChartMode;

    /// Called before the first frame of a new chart mode, so the display can
    /// size its axes from [`ChartMode::point_count`] and [`ChartMode::y_max`].
    fn configure_chart(&mut self, _mode: ChartMode) {}

    /// Called once at the end of every UI frame.
    fn end_frame(&mut self) {}
}
