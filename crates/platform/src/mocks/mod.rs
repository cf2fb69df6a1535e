//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform collaborators
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::arithmetic_side_effects)] // mock counters; overflow not a concern in tests

use embedded_hal_async::delay::DelayNs;

use crate::{AlertOutput, ChartMode, ChartSeries, ResultDisplay};

/// Capacity of the recorded chart stream: two full time-domain series.
pub const MOCK_CHART_CAPACITY: usize = 2 * crate::HALF_BUFFER_LEN;

/// Mock amplifier-enable line: records every level change.
#[derive(Debug, Default)]
pub struct MockAlertOutput {
    enabled: bool,
    levels: heapless::Vec<bool, 64>,
}

impl MockAlertOutput {
    /// Create a mock line, initially low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every level driven so far, in order.
    pub fn levels(&self) -> &[bool] {
        &self.levels
    }

    /// Number of rising edges (amplifier pulses started).
    pub fn pulse_count(&self) -> usize {
        self.levels.iter().filter(|&&level| level).count()
    }
}

impl AlertOutput for MockAlertOutput {
    type Error = core::convert::Infallible;

    fn set(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.enabled = enabled;
        let _ = self.levels.push(enabled);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Mock display: records indicator updates and chart samples.
pub struct MockDisplay {
    mode: ChartMode,
    depth: heapless::Vec<u16, 64>,
    phase: heapless::Vec<u16, 64>,
    chart: heapless::Vec<(ChartSeries, f32), MOCK_CHART_CAPACITY>,
    axes: heapless::Vec<(usize, u16), 8>,
    frames: usize,
}

impl MockDisplay {
    /// Create a mock display in the given chart mode.
    pub fn new(mode: ChartMode) -> Self {
        Self {
            mode,
            depth: heapless::Vec::new(),
            phase: heapless::Vec::new(),
            chart: heapless::Vec::new(),
            axes: heapless::Vec::new(),
            frames: 0,
        }
    }

    /// Switch the chart mode, as the user's dropdown would.
    pub fn set_mode(&mut self, mode: ChartMode) {
        self.mode = mode;
    }

    /// Depth values published so far.
    pub fn depth_updates(&self) -> &[u16] {
        &self.depth
    }

    /// Phase values published so far.
    pub fn phase_updates(&self) -> &[u16] {
        &self.phase
    }

    /// Chart samples pushed since the last [`clear_chart`](Self::clear_chart).
    pub fn chart(&self) -> &[(ChartSeries, f32)] {
        &self.chart
    }

    /// Chart samples of one series.
    pub fn series(&self, which: ChartSeries) -> impl Iterator<Item = f32> + '_ {
        self.chart
            .iter()
            .filter(move |(series, _)| *series == which)
            .map(|(_, value)| *value)
    }

    /// Axis setups `(points, y_max)` requested through `configure_chart`.
    pub fn axis_updates(&self) -> &[(usize, u16)] {
        &self.axes
    }

    /// Forget recorded chart samples.
    pub fn clear_chart(&mut self) {
        self.chart.clear();
    }

    /// Number of completed frames.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl ResultDisplay for MockDisplay {
    fn publish_depth(&mut self, value: u16) {
        let _ = self.depth.push(value);
    }

    fn publish_phase(&mut self, degrees: u16) {
        let _ = self.phase.push(degrees);
    }

    fn push_chart_sample(&mut self, series: ChartSeries, value: f32) {
        let _ = self.chart.push((series, value));
    }

    fn chart_mode(&self) -> ChartMode {
        self.mode
    }

    fn configure_chart(&mut self, mode: ChartMode) {
        let _ = self.axes.push((mode.point_count(), mode.y_max()));
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

/// Mock delay: returns immediately and records every requested duration.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: u64,
    calls_ms: heapless::Vec<u32, 64>,
}

impl MockDelay {
    /// Create a mock delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Millisecond delays requested through `delay_ms`, in order.
    pub fn calls_ms(&self) -> &[u32] {
        &self.calls_ms
    }

    /// Sum of all requested delays in nanoseconds.
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    async fn delay_ms(&mut self, ms: u32) {
        let _ = self.calls_ms.push(ms);
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}
