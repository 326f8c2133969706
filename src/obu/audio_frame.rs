//! Audio frame OBUs.
//!
//! A substream id in `[0, 17]` is folded into one of eighteen dedicated
//! type codes and no id field is written. Larger ids use the generic
//! audio-frame type code followed by an explicit leb128 id immediately
//! before the payload. The encoding is resolved from the id's value at
//! write time; the stored id is authoritative metadata either way.

use super::{MAX_IMPLICIT_SUBSTREAM_ID, ObuHeader, ObuType};
use crate::error::{Error, Result};
use crate::leb128::LebGenerator;
use tracing::trace;

/// One coded audio frame: header, substream id, opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrameObu {
    header: ObuHeader,
    audio_substream_id: u32,
    audio_frame: Vec<u8>,
}

impl AudioFrameObu {
    pub fn new(header: ObuHeader, audio_substream_id: u32, audio_frame: Vec<u8>) -> Self {
        Self {
            header,
            audio_substream_id,
            audio_frame,
        }
    }

    /// The id supplied at construction, regardless of encoding path.
    pub fn substream_id(&self) -> u32 {
        self.audio_substream_id
    }

    pub fn header(&self) -> &ObuHeader {
        &self.header
    }

    /// The opaque coded payload. May be empty.
    pub fn audio_frame(&self) -> &[u8] {
        &self.audio_frame
    }

    /// Serializes the OBU, choosing the implicit or explicit substream-id
    /// encoding from the id's value.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the header is marked as a redundant copy
    /// (audio frames are never buffered copies), or if any field fails
    /// validation or leb128 encoding.
    pub fn validate_and_write(&self, leb: &LebGenerator, out: &mut Vec<u8>) -> Result<()> {
        if self.header.obu_redundant_copy {
            return Err(Error::invalid_argument(
                "audio frame OBUs cannot be marked as redundant copies",
            ));
        }
        if self.audio_substream_id <= MAX_IMPLICIT_SUBSTREAM_ID {
            let obu_type = ObuType::AudioFrameId(self.audio_substream_id as u8);
            self.header
                .validate_and_write(obu_type, &self.audio_frame, leb, out)
        } else {
            trace!(
                substream_id = self.audio_substream_id,
                "writing explicit substream id field"
            );
            let mut payload = Vec::with_capacity(self.audio_frame.len() + 8);
            leb.append(u64::from(self.audio_substream_id), &mut payload)?;
            payload.extend_from_slice(&self.audio_frame);
            self.header
                .validate_and_write(ObuType::AudioFrame, &payload, leb, out)
        }
    }
}
