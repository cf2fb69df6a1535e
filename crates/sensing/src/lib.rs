//! Coil signal chain: spectral analysis and target detection
//!
//! Pure, allocation-free processing invoked by the firmware's signal task:
//!
//! - [`spectrum`]: half-buffer demux, real FFT, polar form, dominant bin
//! - [`detector`]: threshold/rise decision and phase difference
//! - [`synth`]: synthetic coil waveforms for tests and the simulator
//!
//! Nothing here touches hardware or synchronisation; the firmware crate owns
//! the state and decides which task calls what.
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod detector;
pub mod spectrum;
pub mod synth;

pub use detector::{Detection, DetectorState, Reading};
pub use spectrum::{CycleOutput, Polar, SignalProcessor, GUARD_BINS};
