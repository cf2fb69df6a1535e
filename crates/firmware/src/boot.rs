//! Boot-time memory and clock configuration.
//!
//! Required order on hardware:
//!
//! 1. [`hardware::apply_mpu_config_from_peripherals`]: mark AXI SRAM
//!    non-cacheable so DMA writes to the sample buffer are seen by the CPU.
//! 2. `embassy_stm32::init(build_embassy_config())`: clocks, enables D-cache.
//! 3. Start the pipeline and spawn the tasks.
//! 4. Start ADC/DMA acquisition.
//!
//! Step 1 must precede step 2: once the D-cache is on, a cacheable sample
//! buffer returns stale lines to the signal task.

use platform::dma_safety::{AXI_SRAM_BASE, AXI_SRAM_SIZE_BYTES};

/// Ordered boot steps, logged at startup.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "mpu: AXI SRAM non-cacheable",
    "rcc: 400 MHz core, PLL2P ADC kernel clock",
    "pipeline: initial settings",
    "tasks: signal, ui, audio",
    "acquisition: ADC1/ADC2 dual DMA",
];

/// MPU region slot used for the sample buffer region.
pub const AXI_SRAM_MPU_REGION: u8 = 0;

/// RASR attribute bits for normal, shareable, non-cacheable, execute-never,
/// full-access memory (TEX=001, S=1, C=0, B=0, AP=011, XN=1).
pub const NON_CACHEABLE_ATTRS: u32 = 0x1308_0000;

/// MPU RASR SIZE field for a power-of-two region: `2^(SIZE+1)` bytes.
///
/// Returns `None` unless `bytes` is a power of two of at least 32.
pub const fn mpu_size_field(bytes: usize) -> Option<u8> {
    if bytes < 32 || !bytes.is_power_of_two() {
        return None;
    }
    // trailing_zeros >= 5 here, so the subtraction cannot underflow.
    Some((bytes.trailing_zeros() as u8).wrapping_sub(1))
}

/// `(RBAR, RASR)` for the non-cacheable AXI SRAM region.
///
/// | Region | Base | Size | RBAR | RASR |
/// |---|---|---|---|---|
/// | AXI SRAM | 0x2400_0000 | 512 KB | 0x2400_0010 | 0x1308_0025 |
pub fn mpu_register_pair() -> Option<(u32, u32)> {
    let size = mpu_size_field(AXI_SRAM_SIZE_BYTES)?;
    // RBAR: base | VALID | REGION
    let rbar = AXI_SRAM_BASE | 0x10 | u32::from(AXI_SRAM_MPU_REGION);
    // RASR: attributes | SIZE << 1 | ENABLE
    let rasr = NON_CACHEABLE_ATTRS | (u32::from(size) << 1) | 1;
    Some((rbar, rasr))
}

/// `embassy_stm32::Config` for the detector board.
///
/// HSI (64 MHz) → PLL1 (prediv 4, mul 50) → PLL1_P = 400 MHz system clock.
/// HSI → PLL2 (prediv 8, mul 50) → PLL2_P = 25 MHz ADC kernel clock (the
/// ADCSEL reset value selects PLL2_P).
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz system clock
        divq: None,
        divr: None,
    });

    config.rcc.pll2 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV16), // 25 MHz ADC kernel clock
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

#[cfg(feature = "hardware")]
pub mod hardware {
    //! MPU register writes. Only compiled for the target.

    /// Write the AXI SRAM region into the Cortex-M7 MPU and re-enable it with
    /// the default map for everything else.
    ///
    /// # Safety
    ///
    /// - Must run before the D-cache is enabled and before any DMA starts.
    /// - Must run in privileged mode with no interrupt handler active.
    #[allow(unsafe_code)]
    pub unsafe fn apply_mpu_config(mpu: &mut cortex_m::peripheral::MPU) {
        let Some((rbar, rasr)) = super::mpu_register_pair() else {
            defmt::error!("mpu: AXI SRAM size is not encodable");
            return;
        };

        // SAFETY: MPU disabled while reprogramming; RBAR VALID selects the slot.
        unsafe {
            mpu.ctrl.write(0);
            mpu.rbar.write(rbar);
            mpu.rasr.write(rasr);
            // ENABLE | PRIVDEFENA
            mpu.ctrl.write(0b101);
        }

        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    /// Zero-argument entry point for `main`: steals the core peripherals,
    /// applies the region, and drops them before `embassy_stm32::init`.
    #[allow(unsafe_code)]
    pub fn apply_mpu_config_from_peripherals() {
        // SAFETY: called once at boot before any task or interrupt runs; no
        // other owner of the core peripherals exists yet.
        let mut cp = unsafe { cortex_m::Peripherals::steal() };
        // SAFETY: boot context, D-cache off, no DMA configured.
        unsafe { apply_mpu_config(&mut cp.MPU) };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn axi_sram_register_pair() {
        assert_eq!(mpu_register_pair(), Some((0x2400_0010, 0x1308_0025)));
    }

    #[test]
    fn size_field_encoding() {
        assert_eq!(mpu_size_field(32), Some(4));
        assert_eq!(mpu_size_field(512 * 1024), Some(18));
        assert_eq!(mpu_size_field(48), None);
        assert_eq!(mpu_size_field(16), None);
    }

    #[test]
    fn sample_buffer_fits_the_region() {
        assert!(platform::dma_safety::SAMPLE_BUFFER_BYTES <= AXI_SRAM_SIZE_BYTES);
    }

    #[test]
    fn boot_steps_start_with_mpu() {
        assert!(BOOT_SEQUENCE_STEPS.first().unwrap().starts_with("mpu"));
    }
}
