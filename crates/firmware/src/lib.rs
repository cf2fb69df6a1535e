//! Coil Sentinel Firmware
//!
//! Concurrency architecture of a dual-coil metal detector on STM32H7.
//!
//! # Architecture
//!
//! ```text
//! ADC1+ADC2 ──DMA (circular)──▶ AcquisitionBuffer [2048 pairs]
//!                                   │ half / full transfer IRQ
//!                                   ▼
//!                      AcquisitionNotifier ──try_post──▶ NotificationMailbox (1 slot)
//!                                                              │
//!                      signal task (highest priority) ◀────────┘
//!                        load → FFT → polar → dominant bin → detect
//!                          │ ScopeView          │ on target
//!                          │ SharedResult       ▼
//!                          │               AlertSignal ──▶ audio task (lowest)
//!                          ▼                                 pulse amplifier 250 ms
//!                      UI task (middle), every 35 ms
//!                        indicators + chart → ResultDisplay
//! ```
//!
//! All coordination state lives in one [`PipelineContext`] that is a plain
//! `static` on hardware and a leaked or stack value in tests.
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy-stm32, defmt, cortex-m)
//! - `emulator` - Build the desktop simulator (tokio, tracing)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Emulator Target
//!
//! ```bash
//! cargo run --example simulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)]
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod acquisition;
pub mod alert;
pub mod boot;
pub mod error;
#[cfg(feature = "defmt")]
pub mod log_display;
pub mod mailbox;
pub mod pipeline;
pub mod shared;
pub mod tasks;

pub use acquisition::{AcquisitionBuffer, AcquisitionNotifier};
pub use alert::AlertSignal;
pub use error::PipelineError;
pub use mailbox::NotificationMailbox;
pub use pipeline::{CycleReport, NoHooks, PipelineContext, PipelineHooks, TargetReport};
pub use shared::{DetectorSettings, PipelineStats, ResultSnapshot, ScopeView, SharedResult, StatsSnapshot};
pub use tasks::{AudioTask, SignalTask, UiTask};
