//! Audible alert output abstraction.
//!
//! The alert path is a class-D amplifier fed by a DAC tone that runs
//! continuously; the firmware only gates the amplifier's enable line.
//!
//! ```text
//! Enable high → amplifier on  (tone audible)
//! Enable low  → amplifier in shutdown
//! ```

use embedded_hal::digital::OutputPin;

/// Binary amplifier-enable line driven by the audio task.
pub trait AlertOutput {
    /// Error type returned by the underlying line.
    type Error: core::fmt::Debug;

    /// Drive the enable line.
    fn set(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Returns `true` if the line was last driven high.
    fn is_enabled(&self) -> bool;
}

/// [`AlertOutput`] backed by a push-pull GPIO.
///
/// Holds ownership of the enable pin and tracks the driven state.
pub struct GpioAlertOutput<P: OutputPin> {
    pin: P,
    enabled: bool,
}

impl<P: OutputPin> GpioAlertOutput<P> {
    /// Take ownership of the enable pin and drive it low.
    ///
    /// A failing pin is not reported here; the first [`AlertOutput::set`]
    /// call surfaces it.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self {
            pin,
            enabled: false,
        }
    }

    /// Release the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> AlertOutput for GpioAlertOutput<P> {
    type Error = P::Error;

    fn set(&mut self, enabled: bool) -> Result<(), Self::Error> {
        if enabled {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.enabled = enabled;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[test]
    fn construction_drives_line_low() {
        let pin = PinMock::new(&[Transaction::set(State::Low)]);
        let out = GpioAlertOutput::new(pin);
        assert!(!out.is_enabled());
        out.release().done();
    }

    #[test]
    fn set_follows_requested_level() {
        let pin = PinMock::new(&[
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ]);
        let mut out = GpioAlertOutput::new(pin);
        out.set(true).unwrap();
        assert!(out.is_enabled());
        out.set(false).unwrap();
        assert!(!out.is_enabled());
        out.release().done();
    }
}
