//! The three pipeline tasks.
//!
//! | Task | Priority | Wakes on |
//! |---|---|---|
//! | [`SignalTask`] | highest | notification mailbox |
//! | [`UiTask`] | middle | 35 ms period |
//! | [`AudioTask`] | lowest | alert signal |
//!
//! Each task exposes a single-step method (`run_cycle`, `frame`,
//! `pulse_once`) for host tests and a `run` loop that never returns.

pub mod audio;
pub mod signal;
pub mod ui;

pub use audio::AudioTask;
pub use signal::SignalTask;
pub use ui::UiTask;
