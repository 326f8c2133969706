//! Open Bitstream Unit framing.
//!
//! Wire layout of every OBU, in order:
//!
//! ```text
//! [type+flags: 1 byte][obu_size: leb128][trim_at_end: leb128?]
//! [trim_at_start: leb128?][ext_size: leb128?][ext_bytes: ext_size?]
//! [type-specific payload]
//! ```
//!
//! `obu_size` counts every byte after itself. Writers stage those bytes in
//! a local buffer, measure it, then emit the size field followed by the
//! staged bytes, so no field is ever backpatched.

pub mod audio_frame;
pub mod header;

pub use audio_frame::AudioFrameObu;
pub use header::{ExtensionHeader, ObuHeader, TrimmingStatus};

use crate::error::{Error, Result};
use crate::leb128::LebGenerator;

/// Highest substream id encodable through a dedicated implicit type code.
pub const MAX_IMPLICIT_SUBSTREAM_ID: u32 = 17;

/// OBU type codes from the governing container format.
///
/// Eighteen dedicated audio-frame codes carry a substream id implicitly;
/// the generic [`ObuType::AudioFrame`] code is followed by an explicit
/// leb128 id field instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObuType {
    CodecConfig,
    AudioElement,
    MixPresentation,
    ParameterBlock,
    TemporalDelimiter,
    /// Generic audio frame; the substream id follows as an explicit field.
    AudioFrame,
    /// Audio frame whose substream id (0..=17) lives in the type code.
    AudioFrameId(u8),
    SequenceHeader,
}

impl ObuType {
    /// The 5-bit code stored in the top bits of the flag byte.
    pub fn code(self) -> u8 {
        match self {
            ObuType::CodecConfig => 0,
            ObuType::AudioElement => 1,
            ObuType::MixPresentation => 2,
            ObuType::ParameterBlock => 3,
            ObuType::TemporalDelimiter => 4,
            ObuType::AudioFrame => 5,
            ObuType::AudioFrameId(id) => {
                crate::assert_invariant!(
                    u32::from(id) <= MAX_IMPLICIT_SUBSTREAM_ID,
                    "implicit audio frame type codes carry substream ids in [0, 17]",
                    "obu::ObuType::code"
                );
                6 + id
            }
            ObuType::SequenceHeader => 31,
        }
    }
}

/// Frames one OBU: flag-and-type byte, `obu_size`, then the staged bytes.
///
/// `staged` holds everything that follows the size field (optional header
/// fields plus the type-specific payload) already serialized, so its
/// length *is* `obu_size`.
pub(crate) fn frame_obu(
    flag_and_type: u8,
    staged: &[u8],
    leb: &LebGenerator,
    out: &mut Vec<u8>,
) -> Result<()> {
    let before = out.len();
    out.push(flag_and_type);
    let size_len = leb.append(staged.len() as u64, out)?;
    out.extend_from_slice(staged);
    crate::assert_invariant!(
        out.len() - before == 1 + size_len + staged.len(),
        "framed OBU length must equal flag byte + size field + staged bytes",
        "obu::frame_obu"
    );
    Ok(())
}

/// Temporal delimiter OBU. Carries no payload; separates temporal units in
/// the serialized sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalDelimiterObu {
    pub header: ObuHeader,
}

impl TemporalDelimiterObu {
    /// Serializes the OBU.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the header is marked as a redundant copy or
    /// carries trimming status; neither is legal on a temporal delimiter.
    pub fn validate_and_write(&self, leb: &LebGenerator, out: &mut Vec<u8>) -> Result<()> {
        if self.header.obu_redundant_copy {
            return Err(Error::invalid_argument(
                "temporal delimiter OBUs cannot be marked as redundant copies",
            ));
        }
        if self.header.trimming.is_some() {
            return Err(Error::invalid_argument(
                "temporal delimiter OBUs cannot carry trimming status",
            ));
        }
        self.header
            .validate_and_write(ObuType::TemporalDelimiter, &[], leb, out)
    }
}
