//! Per-cycle spectral analysis of both coil channels.
//!
//! One processing cycle takes the half buffer that DMA has just completed and
//! runs:
//!
//! ```text
//! [SamplePair; 1024] ──demux──▶ tx_time, rx_time : [f32; 1024]
//!                    ──rfft───▶ [Complex32; 512] per channel (scratch, ephemeral)
//!                    ──polar──▶ tx_polar, rx_polar : [Polar; 512]
//!                    ──peak───▶ dominant bin (RX, above the guard band)
//! ```
//!
//! Magnitudes are divided by the transform length so levels do not depend on
//! it: a cosine of amplitude `A` centred on a bin reads `A / 2`.
//!
//! All arrays are fixed-size members of [`SignalProcessor`]; nothing is
//! allocated. The processor is about 20 KB and is meant to live in a static.

use microfft::Complex32;
use platform::{SamplePair, BIN_COUNT, FFT_LEN, HALF_BUFFER_LEN};

use crate::detector::Reading;

/// Bins `0..=GUARD_BINS` are never reported as dominant (DC and
/// low-frequency drift from coil motion).
pub const GUARD_BINS: usize = 10;

/// Magnitude/phase form of one frequency bin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Polar {
    /// Normalised magnitude, always `>= 0`.
    pub magnitude: f32,
    /// Phase in radians, `(-π, π]`.
    pub phase: f32,
}

impl Polar {
    /// Zero magnitude and phase, usable in `const` initialisers.
    pub const ZERO: Self = Self {
        magnitude: 0.0,
        phase: 0.0,
    };

    /// Polar form of one FFT output bin, normalised by the transform length.
    #[allow(clippy::cast_precision_loss)] // FFT_LEN = 1024 is exact in f32
    pub fn from_bin(bin: Complex32) -> Self {
        Self {
            magnitude: libm::sqrtf(bin.re * bin.re + bin.im * bin.im) / FFT_LEN as f32,
            phase: libm::atan2f(bin.im, bin.re),
        }
    }
}

/// Result of one processing cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleOutput {
    /// Dominant RX bin, `0` when nothing rose above zero past the guard band.
    pub dominant_bin: usize,
    /// Detector input taken at `dominant_bin`.
    pub reading: Reading,
}

/// Signal processing state: time-domain working arrays, a transform scratch
/// buffer, and the polar form of both channels.
///
/// The polar arrays persist until the next cycle overwrites them.
pub struct SignalProcessor {
    tx_time: [f32; FFT_LEN],
    rx_time: [f32; FFT_LEN],
    scratch: [f32; FFT_LEN],
    tx_polar: [Polar; BIN_COUNT],
    rx_polar: [Polar; BIN_COUNT],
}

impl SignalProcessor {
    /// Create a processor with all arrays zeroed.
    ///
    /// `const` so the processor can be placed in a static without a runtime
    /// initialiser or a stack temporary.
    pub const fn new() -> Self {
        Self {
            tx_time: [0.0; FFT_LEN],
            rx_time: [0.0; FFT_LEN],
            scratch: [0.0; FFT_LEN],
            tx_polar: [Polar::ZERO; BIN_COUNT],
            rx_polar: [Polar::ZERO; BIN_COUNT],
        }
    }

    /// Demultiplex one half buffer into the per-channel working arrays.
    pub fn load_samples(&mut self, samples: &[SamplePair; HALF_BUFFER_LEN]) {
        for ((pair, tx), rx) in samples
            .iter()
            .zip(self.tx_time.iter_mut())
            .zip(self.rx_time.iter_mut())
        {
            *tx = f32::from(pair.tx);
            *rx = f32::from(pair.rx);
        }
    }

    /// Transform both channels, fill the polar arrays, and return the
    /// dominant RX bin.
    pub fn perform_fft(&mut self) -> usize {
        transform_into(&self.tx_time, &mut self.scratch, &mut self.tx_polar);
        transform_into(&self.rx_time, &mut self.scratch, &mut self.rx_polar);
        dominant_bin(&self.rx_polar)
    }

    /// Detector input at `bin`: RX magnitude and phase, TX phase.
    ///
    /// Out-of-range bins read as silence.
    pub fn reading_at(&self, bin: usize) -> Reading {
        let rx = self.rx_polar.get(bin).copied().unwrap_or_default();
        let tx = self.tx_polar.get(bin).copied().unwrap_or_default();
        Reading {
            tx_phase: tx.phase,
            rx_magnitude: rx.magnitude,
            rx_phase: rx.phase,
        }
    }

    /// Run a full cycle over one half buffer.
    pub fn process(&mut self, samples: &[SamplePair; HALF_BUFFER_LEN]) -> CycleOutput {
        self.load_samples(samples);
        let dominant_bin = self.perform_fft();
        CycleOutput {
            dominant_bin,
            reading: self.reading_at(dominant_bin),
        }
    }

    /// TX coil samples of the last loaded half buffer.
    pub fn tx_time(&self) -> &[f32; FFT_LEN] {
        &self.tx_time
    }

    /// RX coil samples of the last loaded half buffer.
    pub fn rx_time(&self) -> &[f32; FFT_LEN] {
        &self.rx_time
    }

    /// TX polar form from the last transform.
    pub fn tx_polar(&self) -> &[Polar; BIN_COUNT] {
        &self.tx_polar
    }

    /// RX polar form from the last transform.
    pub fn rx_polar(&self) -> &[Polar; BIN_COUNT] {
        &self.rx_polar
    }
}

impl Default for SignalProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Real FFT of `time` (via `scratch`) into `polar`.
fn transform_into(
    time: &[f32; FFT_LEN],
    scratch: &mut [f32; FFT_LEN],
    polar: &mut [Polar; BIN_COUNT],
) {
    scratch.copy_from_slice(time);
    let spectrum = microfft::real::rfft_1024(scratch);
    // microfft packs the Nyquist term into bin 0's imaginary part.
    if let Some(dc) = spectrum.first_mut() {
        dc.im = 0.0;
    }
    for (out, bin) in polar.iter_mut().zip(spectrum.iter()) {
        *out = Polar::from_bin(*bin);
    }
}

/// Index of the strongest bin above the guard band.
///
/// Only a strictly greater magnitude replaces the current best, so ties keep
/// the lowest index; a spectrum that never rises above zero past the guard
/// band yields `0`.
pub fn dominant_bin(polar: &[Polar]) -> usize {
    let mut best_index = 0;
    let mut best_magnitude = 0.0_f32;
    for (index, bin) in polar.iter().enumerate().skip(GUARD_BINS + 1) {
        if bin.magnitude > best_magnitude {
            best_magnitude = bin.magnitude;
            best_index = index;
        }
    }
    best_index
}
