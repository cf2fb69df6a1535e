//! Result display that reports indicators over defmt.
//!
//! Stands in for the panel on boards brought up without a screen: depth and
//! phase changes are logged at info. In time-domain mode the RX swing of each
//! frame is logged at trace, in volts at the pin; other chart samples are
//! discarded.

use platform::{ChartMode, ChartSeries, ResultDisplay, SamplePair};

/// Indicator sink writing to the defmt log.
pub struct LogDisplay {
    mode: ChartMode,
    depth: u16,
    phase: u16,
    rx_min: f32,
    rx_max: f32,
}

impl LogDisplay {
    /// Display reporting the given chart mode.
    pub const fn new(mode: ChartMode) -> Self {
        Self {
            mode,
            depth: 0,
            phase: 0,
            rx_min: f32::MAX,
            rx_max: 0.0,
        }
    }
}

impl ResultDisplay for LogDisplay {
    fn publish_depth(&mut self, value: u16) {
        self.depth = value;
    }

    fn publish_phase(&mut self, degrees: u16) {
        if degrees != self.phase || self.depth != 0 {
            defmt::info!("depth {=u16} phase {=u16} deg", self.depth, degrees);
        }
        self.phase = degrees;
    }

    fn push_chart_sample(&mut self, series: ChartSeries, value: f32) {
        if self.mode == ChartMode::TimeDomain && series == ChartSeries::Rx {
            self.rx_min = self.rx_min.min(value);
            self.rx_max = self.rx_max.max(value);
        }
    }

    fn chart_mode(&self) -> ChartMode {
        self.mode
    }

    fn configure_chart(&mut self, mode: ChartMode) {
        defmt::info!(
            "chart {}: {=usize} points, y 0..{=u16}",
            mode,
            mode.point_count(),
            mode.y_max()
        );
    }

    fn end_frame(&mut self) {
        if self.rx_max >= self.rx_min {
            defmt::trace!(
                "rx {=f32}..{=f32} V",
                SamplePair::to_volts(self.rx_min as u16),
                SamplePair::to_volts(self.rx_max as u16)
            );
        }
        self.rx_min = f32::MAX;
        self.rx_max = 0.0;
    }
}
