//! DMA safety marker traits and buffer sizing constants for STM32H743ZI.
//!
//! ## DMA Accessibility on STM32H743ZI
//!
//! | Memory Region | Base Address | Size   | DMA1/2 | BDMA | Use case |
//! |---------------|-------------|--------|--------|------|----------|
//! | AXI SRAM      | 0x2400_0000 | 512 KB | YES    | NO   | ADC sample buffer |
//! | SRAM1/2 (D2)  | 0x3000_0000 | 256 KB | YES    | NO   | Embassy task stacks |
//! | SRAM4 (D3)    | 0x3800_0000 | 64 KB  | NO     | YES  | ADC3, SPI6 |
//! | DTCM          | 0x2000_0000 | 128 KB | NO     | NO   | CPU-only: processor arrays, stack |
//!
//! ADC1/ADC2 in dual mode are serviced by DMA1, so the sample buffer must sit
//! in AXI SRAM. The FFT working arrays are CPU-only and belong in DTCM.

use crate::acquisition::{SamplePair, SAMPLE_BUFFER_LEN};

// ── Memory region addresses ──────────────────────────────────────────────────

/// Base address of AXI SRAM (DMA1/2/MDMA accessible, D1 domain).
pub const AXI_SRAM_BASE: u32 = 0x2400_0000;

/// Size of AXI SRAM in bytes (512 KB).
pub const AXI_SRAM_SIZE_BYTES: usize = 512 * 1024;

// ── Acquisition DMA constants ────────────────────────────────────────────────

/// Size of the circular ADC sample buffer in bytes.
///
/// 2048 pairs x 4 bytes = 8192 bytes.
pub const SAMPLE_BUFFER_BYTES: usize = SAMPLE_BUFFER_LEN * core::mem::size_of::<SamplePair>();

// ── Marker traits ────────────────────────────────────────────────────────────

/// Marker trait: memory region accessible by DMA1, DMA2, and MDMA.
///
/// # Safety
/// Only implement for zero-sized types representing memory regions
/// that are physically accessible by the STM32H743 DMA controllers.
/// Incorrectly implementing this trait for DTCM will cause silent
/// DMA data corruption or bus faults.
pub unsafe trait DmaAccessible: Sized {}

// ── Region zero-sized types ──────────────────────────────────────────────────

/// Zero-sized type representing AXI SRAM (DMA1/DMA2/MDMA accessible).
///
/// Buffers placed here via `#[link_section = ".axisram"]`:
/// - ADC dual-mode sample buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct AxiSramRegion;

// SAFETY: AXI SRAM at 0x2400_0000 is in D1 domain, accessible by all
// DMA controllers (DMA1, DMA2, MDMA) per STM32H743 reference manual Table 3.
unsafe impl DmaAccessible for AxiSramRegion {}

/// Zero-sized type representing DTCM (CPU-only, NOT DMA-accessible).
///
/// NEVER place DMA buffers here: they will not be transferred correctly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DtcmRegion;
// DtcmRegion intentionally does NOT implement DmaAccessible.

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_dma_accessible<R: DmaAccessible>() {}

    #[test]
    fn sample_buffer_fits_axi_sram() {
        assert_eq!(SAMPLE_BUFFER_BYTES, 8192);
        assert!(SAMPLE_BUFFER_BYTES < AXI_SRAM_SIZE_BYTES);
        assert_dma_accessible::<AxiSramRegion>();
    }
}
