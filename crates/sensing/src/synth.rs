//! Synthetic coil signals.
//!
//! Produces what the converters would see for a steady excitation: a DC
//! offset plus one cosine per channel, quantised to 12-bit codes. Tones are
//! placed exactly on an FFT bin so they do not leak into neighbours.
//!
//! Used by host tests and by the desktop simulator to stand in for the ADC.

use platform::acquisition::ADC_MAX_VALUE;
use platform::{SamplePair, FFT_LEN};

/// One cosine component, `amplitude * cos(2π·bin·n/FFT_LEN + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tone {
    /// FFT bin the tone sits on.
    pub bin: usize,
    /// Peak amplitude in ADC codes.
    pub amplitude: f32,
    /// Phase offset in radians.
    pub phase: f32,
}

impl Tone {
    /// A tone on `bin` with the given amplitude and phase.
    pub const fn new(bin: usize, amplitude: f32, phase: f32) -> Self {
        Self {
            bin,
            amplitude,
            phase,
        }
    }

    /// No tone at all.
    pub const fn silent() -> Self {
        Self::new(0, 0.0, 0.0)
    }

    /// Value of the tone at sample `n`.
    #[allow(clippy::cast_precision_loss)] // n, bin < 2^24: exact in f32
    pub fn at(&self, n: usize) -> f32 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        // Reduce the cycle count modulo the window first to keep the
        // argument small and the phase accurate.
        let cycles = self.bin.wrapping_mul(n) % FFT_LEN;
        let angle = core::f32::consts::TAU * cycles as f32 / FFT_LEN as f32 + self.phase;
        self.amplitude * libm::cosf(angle)
    }
}

/// Both coil channels around a shared DC offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoilSignal {
    /// Mid-scale offset in ADC codes.
    pub dc: u16,
    /// Transmit coil component.
    pub tx: Tone,
    /// Receive coil component.
    pub rx: Tone,
}

impl CoilSignal {
    /// A signal with the given offset and tones.
    pub const fn new(dc: u16, tx: Tone, rx: Tone) -> Self {
        Self { dc, tx, rx }
    }

    /// Constant `dc` on both channels.
    pub const fn silent(dc: u16) -> Self {
        Self::new(dc, Tone::silent(), Tone::silent())
    }

    /// The same signal with a different RX amplitude.
    pub const fn with_rx_amplitude(mut self, amplitude: f32) -> Self {
        self.rx.amplitude = amplitude;
        self
    }

    /// Quantised pair at sample `n`.
    pub fn sample(&self, n: usize) -> SamplePair {
        SamplePair::new(quantise(self.dc, self.tx.at(n)), quantise(self.dc, self.rx.at(n)))
    }

    /// Fill `out` with consecutive samples starting at `n = 0`.
    pub fn fill(&self, out: &mut [SamplePair]) {
        for (n, slot) in out.iter_mut().enumerate() {
            *slot = self.sample(n);
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=4095 first
fn quantise(dc: u16, value: f32) -> u16 {
    let code = libm::roundf(f32::from(dc) + value);
    code.clamp(0.0, f32::from(ADC_MAX_VALUE)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_signal_is_flat() {
        let mut out = [SamplePair::ZERO; 16];
        CoilSignal::silent(2048).fill(&mut out);
        assert!(out.iter().all(|p| *p == SamplePair::new(2048, 2048)));
    }

    #[test]
    fn tone_starts_at_its_peak() {
        let signal = CoilSignal::new(2048, Tone::new(4, 100.0, 0.0), Tone::silent());
        assert_eq!(signal.sample(0), SamplePair::new(2148, 2048));
        // A quarter period later the cosine crosses zero.
        assert_eq!(signal.sample(FFT_LEN / 16).tx, 2048);
    }

    #[test]
    fn codes_clamp_to_converter_range() {
        let signal = CoilSignal::new(4000, Tone::new(1, 500.0, 0.0), Tone::new(1, 500.0, core::f32::consts::PI));
        let first = signal.sample(0);
        assert_eq!(first.tx, ADC_MAX_VALUE);
        assert_eq!(first.rx, 3500);
    }
}
