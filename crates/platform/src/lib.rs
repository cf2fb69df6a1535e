//! Hardware Abstraction Layer (HAL) for the Coil Sentinel metal detector
//!
//! This crate provides the types and trait-based abstractions the detection
//! pipeline shares with the board, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: tasks, pipeline context)
//!         ↓
//! Signal chain (sensing crate: FFT, detector)
//!         ↓
//! Platform HAL (this crate - sample types, collaborator traits)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Collaborators
//!
//! - [`AlertOutput`] - amplifier-enable line pulsed on detection
//! - [`ResultDisplay`] - depth/phase indicators and the live chart
//!
//! # Features
//!
//! - `std`: Enable standard library support (mocks outside `cfg(test)`)
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt logging derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod acquisition;
pub mod alert;
pub mod config;
pub mod display;
pub mod dma_safety;
pub mod mocks;

pub use acquisition::{BufferHalf, SamplePair, BIN_COUNT, FFT_LEN, HALF_BUFFER_LEN, SAMPLE_BUFFER_LEN};
pub use alert::{AlertOutput, GpioAlertOutput};
pub use config::PipelineConfig;
pub use display::{ChartMode, ChartSeries, ResultDisplay};
pub use dma_safety::{AxiSramRegion, DmaAccessible};
