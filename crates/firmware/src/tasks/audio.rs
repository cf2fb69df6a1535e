//! Audio task: one fixed-length amplifier pulse per consumed alert.

use embedded_hal_async::delay::DelayNs;
use platform::AlertOutput;

use crate::alert::AlertSignal;
use crate::PipelineError;

/// Lowest-priority consumer of the alert signal.
///
/// Each wake drives the amplifier enable line high, waits `pulse_ms`, and
/// drives it low again. Alerts released during a pulse coalesce into at most
/// one further pulse.
pub struct AudioTask<'a, O: AlertOutput, D: DelayNs> {
    alert: &'a AlertSignal,
    output: O,
    delay: D,
    pulse_ms: u32,
}

impl<'a, O: AlertOutput, D: DelayNs> AudioTask<'a, O, D> {
    /// Task pulsing `output` for `pulse_ms` per alert.
    pub fn new(alert: &'a AlertSignal, output: O, delay: D, pulse_ms: u32) -> Self {
        Self {
            alert,
            output,
            delay,
            pulse_ms,
        }
    }

    /// The amplifier enable line.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The delay provider.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Wait for one alert and emit one pulse.
    pub async fn pulse_once(&mut self) -> Result<(), PipelineError> {
        self.alert.acquire().await;
        self.output.set(true).map_err(|_e| PipelineError::AlertOutput)?;
        self.delay.delay_ms(self.pulse_ms).await;
        self.output.set(false).map_err(|_e| PipelineError::AlertOutput)
    }

    /// Pulse forever. Output errors are logged and the next alert is awaited.
    pub async fn run(mut self) -> ! {
        loop {
            let result = self.pulse_once().await;
            #[cfg(feature = "defmt")]
            if let Err(e) = result {
                defmt::warn!("alert pulse failed: {}", e);
            }
            #[cfg(not(feature = "defmt"))]
            let _ = result;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockAlertOutput, MockDelay};

    #[tokio::test]
    async fn one_alert_one_pulse() {
        let alert = AlertSignal::new();
        let mut task = AudioTask::new(&alert, MockAlertOutput::new(), MockDelay::new(), 250);
        alert.release();
        task.pulse_once().await.unwrap();
        assert_eq!(task.output().levels(), &[true, false]);
        assert_eq!(task.delay().calls_ms(), &[250]);
        assert!(!task.output().is_enabled());
    }

    struct BrokenLine;

    impl AlertOutput for BrokenLine {
        type Error = ();

        fn set(&mut self, _enabled: bool) -> Result<(), ()> {
            Err(())
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn output_failure_is_reported_without_delay() {
        let alert = AlertSignal::new();
        let mut task = AudioTask::new(&alert, BrokenLine, MockDelay::new(), 250);
        alert.release();
        assert_eq!(task.pulse_once().await, Err(PipelineError::AlertOutput));
        assert!(task.delay().calls_ms().is_empty());
    }
}
