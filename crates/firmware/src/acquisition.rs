//! Circular ADC sample buffer and its DMA interrupt entry points.
//!
//! The DMA controller fills [`AcquisitionBuffer`] continuously with
//! `(tx, rx)` pairs from ADC1/ADC2 in dual regular-simultaneous mode. Its
//! half-transfer and transfer-complete interrupts call into
//! [`AcquisitionNotifier`], which posts the tag of the half that just became
//! stable:
//!
//! ```text
//! pairs [0, 1024)     ── half-transfer IRQ     ──▶ BufferHalf::Half
//! pairs [1024, 2048)  ── transfer-complete IRQ ──▶ BufferHalf::Full
//! ```
//!
//! While the signal task reads one half, DMA writes the other. The signal task
//! must finish a cycle within one half-buffer period for that to hold; if it
//! falls behind, notifications are dropped and counted, never queued.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::sync::atomic::{compiler_fence, Ordering};

use platform::{AxiSramRegion, BufferHalf, DmaAccessible, SamplePair, HALF_BUFFER_LEN, SAMPLE_BUFFER_LEN};

use crate::mailbox::NotificationMailbox;
use crate::shared::PipelineStats;
use crate::PipelineError;

/// DMA target for both ADCs, tagged with the memory region it lives in.
///
/// The region parameter only accepts [`DmaAccessible`] markers, so a buffer
/// declared for CPU-only memory does not compile. Place the static with
/// `#[link_section = ".axisram"]` to match the default marker.
pub struct AcquisitionBuffer<R: DmaAccessible = AxiSramRegion> {
    samples: UnsafeCell<[SamplePair; SAMPLE_BUFFER_LEN]>,
    _region: PhantomData<R>,
}

// SAFETY: the CPU only reads a half through `read_half`, whose contract
// requires DMA (or any other writer) to be working on the other half.
unsafe impl<R: DmaAccessible> Sync for AcquisitionBuffer<R> {}

impl<R: DmaAccessible> AcquisitionBuffer<R> {
    /// Zeroed buffer, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            samples: UnsafeCell::new([SamplePair::ZERO; SAMPLE_BUFFER_LEN]),
            _region: PhantomData,
        }
    }

    /// Start address to program into the DMA memory register.
    pub fn dma_target(&self) -> *mut SamplePair {
        self.samples.get().cast::<SamplePair>()
    }

    /// Number of pairs in the circular buffer.
    pub const fn len(&self) -> usize {
        SAMPLE_BUFFER_LEN
    }

    /// Always `false`; the buffer has a fixed size.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Borrow one half of the buffer.
    ///
    /// # Safety
    ///
    /// Nothing may write to `half` while the returned reference is alive.
    /// This holds for the half named by the latest notification as long as
    /// processing finishes within one half-buffer period.
    pub unsafe fn read_half(&self, half: BufferHalf) -> &[SamplePair; HALF_BUFFER_LEN] {
        // Keep the compiler from hoisting reads above the notification.
        compiler_fence(Ordering::Acquire);
        // SAFETY: offset + HALF_BUFFER_LEN <= SAMPLE_BUFFER_LEN for both
        // halves, and the caller guarantees no concurrent writer.
        unsafe {
            &*self
                .dma_target()
                .add(half.offset())
                .cast::<[SamplePair; HALF_BUFFER_LEN]>()
        }
    }

    /// Overwrite one half from the CPU, standing in for DMA.
    ///
    /// # Safety
    ///
    /// No reference obtained from [`read_half`](Self::read_half) for the
    /// same half may be alive, and DMA must not be running on this buffer.
    pub unsafe fn write_half(&self, half: BufferHalf, samples: &[SamplePair; HALF_BUFFER_LEN]) {
        // SAFETY: in bounds as above; the caller guarantees exclusive access.
        unsafe {
            self.dma_target()
                .add(half.offset())
                .cast::<[SamplePair; HALF_BUFFER_LEN]>()
                .write(*samples);
        }
        compiler_fence(Ordering::Release);
    }
}

impl<R: DmaAccessible> Default for AcquisitionBuffer<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt-side entry points that turn DMA progress into mailbox posts.
///
/// Every method is non-blocking and safe to call from interrupt context.
#[derive(Clone, Copy)]
pub struct AcquisitionNotifier<'a> {
    mailbox: &'a NotificationMailbox,
    stats: &'a PipelineStats,
}

impl<'a> AcquisitionNotifier<'a> {
    pub(crate) fn new(mailbox: &'a NotificationMailbox, stats: &'a PipelineStats) -> Self {
        Self { mailbox, stats }
    }

    /// DMA half-transfer: pairs `[0, 1024)` are stable.
    pub fn on_half_transfer(&self) -> bool {
        self.notify(BufferHalf::Half)
    }

    /// DMA transfer-complete: pairs `[1024, 2048)` are stable.
    pub fn on_transfer_complete(&self) -> bool {
        self.notify(BufferHalf::Full)
    }

    /// Post `half`, dropping it if a notification is still pending.
    ///
    /// Returns `true` if the tag was delivered.
    pub fn notify(&self, half: BufferHalf) -> bool {
        let delivered = self.mailbox.try_post(half);
        if !delivered {
            self.stats.record_drop();
        }
        delivered
    }
}

/// Something that can start filling an [`AcquisitionBuffer`] and report
/// progress through an [`AcquisitionNotifier`].
///
/// On hardware this is the ADC/DMA bring-up; the desktop simulator drives
/// the buffer from a synthetic coil signal.
pub trait AcquisitionSource {
    /// Source-specific failure.
    type Error: core::fmt::Debug;

    /// Begin circular acquisition into `buffer`.
    fn start(&mut self, buffer: &'static AcquisitionBuffer) -> Result<(), Self::Error>;
}

/// Start `source`, logging and mapping any failure.
pub fn start_acquisition<S: AcquisitionSource>(
    source: &mut S,
    buffer: &'static AcquisitionBuffer,
) -> Result<(), PipelineError> {
    source.start(buffer).map_err(|_e| {
        #[cfg(feature = "defmt")]
        defmt::error!("acquisition failed to start");
        PipelineError::AcquisitionStart
    })
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn leaked_buffer() -> &'static AcquisitionBuffer {
        Box::leak(Box::new(AcquisitionBuffer::new()))
    }

    fn ramp(start: u16) -> Box<[SamplePair; HALF_BUFFER_LEN]> {
        let mut half = Box::new([SamplePair::ZERO; HALF_BUFFER_LEN]);
        for (i, pair) in half.iter_mut().enumerate() {
            *pair = SamplePair::new(start + i as u16, start);
        }
        half
    }

    #[test]
    fn halves_do_not_overlap() {
        let buffer = leaked_buffer();
        // SAFETY: single-threaded test, no DMA.
        unsafe {
            buffer.write_half(BufferHalf::Half, &ramp(0));
            buffer.write_half(BufferHalf::Full, &ramp(2000));
            let first = buffer.read_half(BufferHalf::Half);
            let second = buffer.read_half(BufferHalf::Full);
            assert_eq!(first[0], SamplePair::new(0, 0));
            assert_eq!(first[HALF_BUFFER_LEN - 1].tx, 1023);
            assert_eq!(second[0], SamplePair::new(2000, 2000));
        }
    }

    #[test]
    fn dma_target_is_buffer_start() {
        let buffer = leaked_buffer();
        // SAFETY: single-threaded test, no DMA.
        let first = unsafe { buffer.read_half(BufferHalf::Half) };
        assert_eq!(first.as_ptr(), buffer.dma_target().cast_const());
        assert_eq!(buffer.len(), SAMPLE_BUFFER_LEN);
    }

    #[test]
    fn notifier_counts_drops() {
        let mailbox = NotificationMailbox::new();
        let stats = PipelineStats::new();
        let notifier = AcquisitionNotifier::new(&mailbox, &stats);
        assert!(notifier.on_half_transfer());
        assert!(!notifier.on_transfer_complete());
        assert!(!notifier.on_half_transfer());
        assert_eq!(stats.snapshot().dropped_notifications, 2);
        assert_eq!(mailbox.try_receive(), Some(BufferHalf::Half));
    }

    struct FailingSource;

    impl AcquisitionSource for FailingSource {
        type Error = ();

        fn start(&mut self, _buffer: &'static AcquisitionBuffer) -> Result<(), ()> {
            Err(())
        }
    }

    #[test]
    fn start_failure_maps_to_pipeline_error() {
        let buffer = leaked_buffer();
        assert_eq!(
            start_acquisition(&mut FailingSource, buffer),
            Err(PipelineError::AcquisitionStart)
        );
    }
}
