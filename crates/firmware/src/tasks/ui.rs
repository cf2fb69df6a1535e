//! UI task: refreshes the indicators and the chart every frame period.

use embedded_hal_async::delay::DelayNs;
use platform::{ChartMode, ChartSeries, PipelineConfig, ResultDisplay};

use crate::pipeline::PipelineContext;

/// Middle-priority periodic reader of the shared result and scope view.
///
/// Per frame:
/// 1. A pending detection is rendered (depth and phase as integers) and
///    consumed; otherwise the idle counter advances, and once it has reached
///    `idle_reset_frames` both indicators are reset to 0.
/// 2. The chart receives `point_count()` samples of the latest cycle for the
///    display's mode; a mode change first lets the display set up its axes.
/// 3. The display is told the frame is complete.
pub struct UiTask<'a, S: ResultDisplay, D: DelayNs> {
    ctx: &'a PipelineContext,
    display: S,
    delay: D,
    period_ms: u32,
    idle_reset_frames: u32,
    stats_log_frames: u32,
    idle_frames: u32,
    frames: u32,
    dropped_seen: u32,
    chart_mode: Option<ChartMode>,
}

impl<'a, S: ResultDisplay, D: DelayNs> UiTask<'a, S, D> {
    /// Task rendering `ctx` onto `display` with the timing in `config`.
    pub fn new(ctx: &'a PipelineContext, display: S, delay: D, config: &PipelineConfig) -> Self {
        Self {
            ctx,
            display,
            delay,
            period_ms: config.ui_period_ms,
            idle_reset_frames: config.idle_reset_frames,
            stats_log_frames: config.stats_log_frames,
            idle_frames: 0,
            frames: 0,
            dropped_seen: 0,
            chart_mode: None,
        }
    }

    /// The display collaborator.
    pub fn display(&self) -> &S {
        &self.display
    }

    /// Mutable access to the display, e.g. to switch chart mode.
    pub fn display_mut(&mut self) -> &mut S {
        &mut self.display
    }

    /// Frames since the last detection or reset.
    pub fn idle_frames(&self) -> u32 {
        self.idle_frames
    }

    /// Render one frame.
    pub fn frame(&mut self) {
        self.update_indicators();
        self.stream_chart();
        self.display.end_frame();
        self.frames = self.frames.wrapping_add(1);
        self.log_stats();
    }

    /// Render frames forever at the configured period.
    pub async fn run(mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!("ui task running, period {=u32} ms", self.period_ms);
        loop {
            self.frame();
            self.delay.delay_ms(self.period_ms).await;
        }
    }

    fn update_indicators(&mut self) {
        if let Some(result) = self.ctx.result().take() {
            self.display.publish_depth(indicator(result.depth));
            self.display.publish_phase(indicator(result.phase_degrees));
            self.idle_frames = 0;
        } else if self.idle_frames >= self.idle_reset_frames {
            self.display.publish_depth(0);
            self.display.publish_phase(0);
            self.idle_frames = 0;
        } else {
            self.idle_frames = self.idle_frames.saturating_add(1);
        }
    }

    fn stream_chart(&mut self) {
        let mode = self.display.chart_mode();
        if self.chart_mode != Some(mode) {
            self.display.configure_chart(mode);
            self.chart_mode = Some(mode);
        }

        let scope = self.ctx.scope();
        let points = mode.point_count();
        match mode {
            ChartMode::TimeDomain => {
                let with_tx = mode.shows_tx();
                for (rx, tx) in scope.rx_time().zip(scope.tx_time()).take(points) {
                    self.display.push_chart_sample(ChartSeries::Rx, rx);
                    if with_tx {
                        self.display.push_chart_sample(ChartSeries::Tx, tx);
                    }
                }
            }
            ChartMode::FrequencyDomain => {
                for magnitude in scope.rx_magnitude().take(points) {
                    self.display.push_chart_sample(ChartSeries::Rx, magnitude);
                }
            }
        }
    }

    fn log_stats(&mut self) {
        let stats = self.ctx.stats().snapshot();
        if stats.dropped_notifications != self.dropped_seen {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{=u32} acquisition notification(s) dropped",
                stats.dropped_notifications.wrapping_sub(self.dropped_seen)
            );
            self.dropped_seen = stats.dropped_notifications;
        }
        if self.frames.checked_rem(self.stats_log_frames) == Some(0) {
            #[cfg(feature = "defmt")]
            defmt::info!("pipeline stats: {}", stats);
        }
    }
}

/// Integer indicator value: truncated toward zero, saturating at the `u16`
/// range, `NaN` as 0.
fn indicator(value: f32) -> u16 {
    value as u16
}
