//! Pipeline error type.

/// Errors surfaced by pipeline startup and the alert path.
///
/// Runtime drops (a full mailbox, a coalesced alert) are not errors; they are
/// counted in [`crate::PipelineStats`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// The ADC/DMA acquisition source refused to start.
    #[error("acquisition failed to start")]
    AcquisitionStart,
    /// Driving the amplifier enable line failed.
    #[error("alert output could not be driven")]
    AlertOutput,
    /// The signal processor state was already handed to a task.
    #[error("signal processor already taken")]
    ProcessorAlreadyTaken,
}
