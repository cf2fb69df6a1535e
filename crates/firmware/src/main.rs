//! Coil Sentinel Firmware - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI.
//!
//! Three executors give the tasks their priorities:
//!
//! | Executor | Interrupt | Priority | Task |
//! |---|---|---|---|
//! | `EXECUTOR_HIGH` | UART4 | P6 | signal |
//! | `EXECUTOR_MED` | UART5 | P7 | ui |
//! | thread mode | - | lowest | audio |

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt_rtt as _;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::gpio::{AnyPin, Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::peripherals::{ADC1, ADC2, DMA1_CH0};
use embassy_time::Delay;
use static_cell::{ConstStaticCell, StaticCell};

use firmware::acquisition::{start_acquisition, AcquisitionSource};
use firmware::log_display::LogDisplay;
use firmware::{AcquisitionBuffer, AudioTask, PipelineContext, PipelineError, SignalTask, UiTask};
use platform::config::{APP_NAME, APP_VERSION};
use platform::{ChartMode, GpioAlertOutput, PipelineConfig};
use sensing::SignalProcessor;

// Panic handler
use panic_probe as _;

const CONFIG: PipelineConfig = PipelineConfig::handheld();

static PIPELINE: PipelineContext = PipelineContext::new();

// ADC1/ADC2 DMA target; must stay in AXI SRAM (see boot::mpu_register_pair).
#[link_section = ".axisram"]
static SAMPLES: AcquisitionBuffer = AcquisitionBuffer::new();

// Working arrays of the signal chain; CPU-only, default RAM (DTCM).
static PROCESSOR: ConstStaticCell<SignalProcessor> = ConstStaticCell::new(SignalProcessor::new());

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MED: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn UART4() {
    // SAFETY: UART4 is reserved for EXECUTOR_HIGH and never enabled for the peripheral.
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[interrupt]
unsafe fn UART5() {
    // SAFETY: UART5 is reserved for EXECUTOR_MED and never enabled for the peripheral.
    unsafe { EXECUTOR_MED.on_interrupt() }
}

/// ADC1 (TX coil) and ADC2 (RX coil) in dual regular-simultaneous mode,
/// streamed by DMA1 stream 0 into the circular sample buffer.
struct DualAdcDma {
    _adc1: ADC1,
    _adc2: ADC2,
    _dma: DMA1_CH0,
}

/// Dual-ADC bring-up failure.
#[derive(Debug, defmt::Format)]
enum AdcError {
    /// The HAL has no dual regular-simultaneous driver yet.
    DualModeUnavailable,
}

impl AcquisitionSource for DualAdcDma {
    type Error = AdcError;

    fn start(&mut self, buffer: &'static AcquisitionBuffer) -> Result<(), Self::Error> {
        defmt::info!(
            "sample buffer at {=usize:#x}, {=usize} pairs",
            buffer.dma_target() as usize,
            buffer.len()
        );
        // TODO: program ADC12 common CCR for dual regular-simultaneous mode,
        // DMA1 stream 0 circular into buffer.dma_target() with HT/TC enabled,
        // and call PIPELINE.notifier() from the DMA1_STR0 handler.
        Err(AdcError::DualModeUnavailable)
    }
}

/// Fatal startup failure: sleep until an external reset.
fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

#[embassy_executor::task]
async fn signal_task(processor: &'static mut SignalProcessor) {
    SignalTask::new(&PIPELINE, &SAMPLES, processor).run().await
}

#[embassy_executor::task]
async fn ui_task() {
    UiTask::new(&PIPELINE, LogDisplay::new(ChartMode::TimeDomain), Delay, &CONFIG)
        .run()
        .await
}

#[embassy_executor::task]
async fn audio_task(amp: Output<'static, AnyPin>) {
    AudioTask::new(PIPELINE.alert(), GpioAlertOutput::new(amp), Delay, CONFIG.alert_pulse_ms)
        .run()
        .await
}

#[entry]
fn main() -> ! {
    // MPU first: HAL init turns the D-cache on.
    firmware::boot::hardware::apply_mpu_config_from_peripherals();

    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    for step in firmware::boot::BOOT_SEQUENCE_STEPS {
        defmt::debug!("boot: {=str}", step);
    }

    let p = embassy_stm32::init(firmware::boot::build_embassy_config());

    // Amplifier shutdown control, low = muted.
    let amp: Output<'static, AnyPin> = Output::new(p.PA3, Level::Low, Speed::Low).degrade();

    let mut adc = DualAdcDma {
        _adc1: p.ADC1,
        _adc2: p.ADC2,
        _dma: p.DMA1_CH0,
    };

    PIPELINE.start(&CONFIG);

    // Startup failures are fatal and must park before any executor starts.
    let Some(processor) = PROCESSOR.try_take() else {
        defmt::error!("{}", PipelineError::ProcessorAlreadyTaken);
        park();
    };
    if start_acquisition(&mut adc, &SAMPLES).is_err() {
        park();
    }

    interrupt::UART4.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::UART4);
    high.must_spawn(signal_task(processor));

    interrupt::UART5.set_priority(Priority::P7);
    let med = EXECUTOR_MED.start(interrupt::UART5);
    med.must_spawn(ui_task());

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(audio_task(amp));
    })
}
