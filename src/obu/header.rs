//! Flag-packed OBU header.

use super::{ObuType, frame_obu};
use crate::error::{Error, Result};
use crate::leb128::LebGenerator;

/// Bit set in the flag byte when the OBU is a redundant copy.
pub const OBU_REDUNDANT_COPY_BIT_MASK: u8 = 0x04;
/// Bit set in the flag byte when trimming fields follow `obu_size`.
pub const OBU_TRIMMING_STATUS_FLAG_BIT_MASK: u8 = 0x02;
/// Bit set in the flag byte when an extension block follows the trim fields.
pub const OBU_EXTENSION_FLAG_BIT_MASK: u8 = 0x01;

/// Trim counts carried when the trimming-status flag is set.
///
/// Serialized end-first, matching the wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimmingStatus {
    pub num_samples_to_trim_at_end: u32,
    pub num_samples_to_trim_at_start: u32,
}

/// Opaque extension block carried when the extension flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionHeader {
    pub extension_header_size: u32,
    pub extension_header_bytes: Vec<u8>,
}

/// Header shared by every OBU type.
///
/// The trimming and extension blocks are `Option`s; the corresponding wire
/// flags are derived from presence, so "fields present iff flag set" holds
/// by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObuHeader {
    pub obu_redundant_copy: bool,
    pub trimming: Option<TrimmingStatus>,
    pub extension: Option<ExtensionHeader>,
}

impl ObuHeader {
    /// The leading flag-and-type byte: 5-bit type code, then the redundant
    /// copy, trimming status, and extension flags.
    pub(crate) fn flag_byte(&self, obu_type: ObuType) -> u8 {
        let mut byte = obu_type.code() << 3;
        if self.obu_redundant_copy {
            byte |= OBU_REDUNDANT_COPY_BIT_MASK;
        }
        if self.trimming.is_some() {
            byte |= OBU_TRIMMING_STATUS_FLAG_BIT_MASK;
        }
        if self.extension.is_some() {
            byte |= OBU_EXTENSION_FLAG_BIT_MASK;
        }
        byte
    }

    /// Serializes the header followed by `payload` as one complete OBU.
    ///
    /// Everything after `obu_size` is staged into a local buffer first;
    /// the measured length becomes the size field.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the extension block's declared size disagrees
    /// with its byte count, or if any field fails leb128 encoding.
    pub fn validate_and_write(
        &self,
        obu_type: ObuType,
        payload: &[u8],
        leb: &LebGenerator,
        out: &mut Vec<u8>,
    ) -> Result<()> {
        if let Some(extension) = &self.extension {
            if extension.extension_header_bytes.len() as u64
                != u64::from(extension.extension_header_size)
            {
                return Err(Error::invalid_argument(format!(
                    "extension header declares {} bytes but carries {}",
                    extension.extension_header_size,
                    extension.extension_header_bytes.len()
                )));
            }
        }

        let mut staged = Vec::with_capacity(payload.len() + 16);
        if let Some(trimming) = &self.trimming {
            leb.append(u64::from(trimming.num_samples_to_trim_at_end), &mut staged)?;
            leb.append(
                u64::from(trimming.num_samples_to_trim_at_start),
                &mut staged,
            )?;
        }
        if let Some(extension) = &self.extension {
            leb.append(u64::from(extension.extension_header_size), &mut staged)?;
            staged.extend_from_slice(&extension.extension_header_bytes);
        }
        staged.extend_from_slice(payload);

        frame_obu(self.flag_byte(obu_type), &staged, leb, out)
    }
}
