//! Dual-channel acquisition types and buffer sizing.
//!
//! ADC1 (TX coil) and ADC2 (RX coil) run in dual regular-simultaneous mode.
//! Each conversion produces one 32-bit word that DMA writes into the circular
//! sample buffer: ADC1 in the low half-word, ADC2 in the high half-word.
//!
//! ```text
//! SampleBuffer: [SamplePair; SAMPLE_BUFFER_LEN]
//!   ├── first half  (pairs 0..1024):    ready on the half-transfer event (HALF)
//!   └── second half (pairs 1024..2048): ready on the transfer-complete event (FULL)
//! ```
//!
//! DMA always writes the half that the signal task is *not* reading; the
//! HALF/FULL tag tells the consumer which half has just become stable.

/// Number of dual-channel sample pairs in the circular DMA buffer.
pub const SAMPLE_BUFFER_LEN: usize = 2048;

/// Number of pairs in one buffer half (one processing cycle).
pub const HALF_BUFFER_LEN: usize = SAMPLE_BUFFER_LEN / 2;

/// Real FFT length: one half buffer per channel.
pub const FFT_LEN: usize = HALF_BUFFER_LEN;

/// Number of frequency bins kept after the real FFT (quarter buffer).
pub const BIN_COUNT: usize = FFT_LEN / 2;

/// Full-scale code of the 12-bit converters.
pub const ADC_MAX_VALUE: u16 = 4095;

/// ADC reference voltage in volts.
pub const REF_VOLTAGE: f32 = 3.3;

/// One simultaneous conversion of both coil channels.
///
/// Layout matches the ADC common data register in dual mode, so a
/// `[SamplePair; N]` can be handed to DMA directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct SamplePair {
    /// ADC1 code: transmit coil.
    pub tx: u16,
    /// ADC2 code: receive coil.
    pub rx: u16,
}

impl SamplePair {
    /// A zeroed pair, usable in `const` initialisers.
    pub const ZERO: Self = Self { tx: 0, rx: 0 };

    /// Create a pair from raw converter codes.
    pub const fn new(tx: u16, rx: u16) -> Self {
        Self { tx, rx }
    }

    /// Convert a raw converter code to volts at the pin.
    pub fn to_volts(code: u16) -> f32 {
        f32::from(code) * REF_VOLTAGE / f32::from(ADC_MAX_VALUE)
    }
}

/// Which half of the circular buffer has just been completed by DMA.
///
/// Encoded on the wire between interrupt and task as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BufferHalf {
    /// Half-transfer event: pairs `0..HALF_BUFFER_LEN` are stable.
    Half = 0,
    /// Transfer-complete event: pairs `HALF_BUFFER_LEN..SAMPLE_BUFFER_LEN` are stable.
    Full = 1,
}

impl BufferHalf {
    /// Index of the first pair belonging to this half.
    pub const fn offset(self) -> usize {
        match self {
            Self::Half => 0,
            Self::Full => HALF_BUFFER_LEN,
        }
    }

    /// Pair index range covered by this half.
    pub const fn range(self) -> core::ops::Range<usize> {
        let start = self.offset();
        #[allow(clippy::arithmetic_side_effects)] // offset() <= HALF_BUFFER_LEN; sum <= SAMPLE_BUFFER_LEN
        let end = start + HALF_BUFFER_LEN;
        start..end
    }

    /// The half that DMA is filling while this one is being read.
    pub const fn other(self) -> Self {
        match self {
            Self::Half => Self::Full,
            Self::Full => Self::Half,
        }
    }
}

impl From<BufferHalf> for u8 {
    fn from(half: BufferHalf) -> Self {
        half as u8
    }
}

impl TryFrom<u8> for BufferHalf {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Half),
            1 => Ok(Self::Full),
            other => Err(other),
        }
    }
}
