//! Unsigned leb128 coding for container fields.
//!
//! Every variable-length field in the container (sizes, trim counts,
//! substream ids) is an unsigned integer in `[0, 2^32 - 1]` encoded with
//! per-byte continuation bits: the low 7 bits of each byte carry payload and
//! the top bit says another byte follows.
//!
//! Two generation modes exist. *Minimal* emits the fewest bytes that
//! represent the value. *Fixed-size* pads to an exact width by emitting
//! continuation-flagged zero-payload bytes before a terminal byte whose
//! continuation bit is clear, so a padded value remains a legal decodable
//! sequence. The generator is process-wide configuration for one muxing
//! pass: the same instance is threaded through every field of every OBU.

use crate::error::{Error, Result};

/// Maximum encoded length of one leb128 value in this container.
pub const MAX_LEB128_SIZE: usize = 8;

/// Maximum value a container leb128 field can carry.
pub const MAX_LEB128_VALUE: u64 = u32::MAX as u64;

/// How a [`LebGenerator`] chooses the encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Fewest bytes that represent the value.
    Minimal,
    /// Exactly this many bytes (1..=8), padded with continuation-flagged
    /// zero-payload bytes.
    FixedSize(u8),
}

/// Encoder for every leb128 field written during one muxing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LebGenerator {
    mode: GenerationMode,
}

impl Default for LebGenerator {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Minimal,
        }
    }
}

impl LebGenerator {
    /// Generator that always emits minimal-length encodings.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Generator that pads every field to exactly `width` bytes.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `width` is outside `[1, 8]`.
    pub fn fixed_size(width: u8) -> Result<Self> {
        if width == 0 || usize::from(width) > MAX_LEB128_SIZE {
            return Err(Error::invalid_argument(format!(
                "fixed leb128 width must be in [1, 8], got {width}"
            )));
        }
        Ok(Self {
            mode: GenerationMode::FixedSize(width),
        })
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Appends the encoding of `value` to `out` and returns the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `value` does not fit in 32 bits, or if the
    /// generator's fixed width is smaller than the value's minimal length.
    /// Truncation is never silent.
    pub fn append(&self, value: u64, out: &mut Vec<u8>) -> Result<usize> {
        if value > MAX_LEB128_VALUE {
            return Err(Error::invalid_argument(format!(
                "leb128 value {value} does not fit in 32 bits"
            )));
        }
        let width = match self.mode {
            GenerationMode::Minimal => minimal_size(value),
            GenerationMode::FixedSize(width) => {
                let width = usize::from(width);
                let needed = minimal_size(value);
                if needed > width {
                    return Err(Error::invalid_argument(format!(
                        "value {value} needs {needed} leb128 bytes but the generator is fixed at {width}"
                    )));
                }
                width
            }
        };
        for i in 0..width {
            let mut byte = ((value >> (7 * i)) & 0x7f) as u8;
            if i + 1 < width {
                byte |= 0x80;
            }
            out.push(byte);
        }
        crate::assert_invariant!(
            (1..=MAX_LEB128_SIZE).contains(&width),
            "leb128 output length must be within [1, 8]",
            "leb128::append"
        );
        Ok(width)
    }

    /// Encodes `value` into a fresh buffer.
    pub fn encode(&self, value: u64) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(MAX_LEB128_SIZE);
        self.append(value, &mut out)?;
        Ok(out)
    }
}

/// Minimal encoded size of `value` at 7 payload bits per byte.
pub fn minimal_size(value: u64) -> usize {
    let mut size = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        size += 1;
        rest >>= 7;
    }
    size
}

/// Decodes one leb128 value from the front of `data`, returning the value
/// and the number of bytes consumed.
///
/// # Errors
///
/// `InvalidBitstream` if the decoded value overflows 32 bits or no
/// terminator byte appears within [`MAX_LEB128_SIZE`] bytes.
pub fn decode(data: &[u8]) -> Result<(u32, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in data.iter().take(MAX_LEB128_SIZE).enumerate() {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            if value > MAX_LEB128_VALUE {
                return Err(Error::invalid_bitstream(format!(
                    "leb128 value {value} overflows 32 bits"
                )));
            }
            return Ok((value as u32, i + 1));
        }
    }
    Err(Error::invalid_bitstream(
        "leb128 terminator not found within 8 bytes",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_size_boundaries() {
        assert_eq!(minimal_size(0), 1);
        assert_eq!(minimal_size(127), 1);
        assert_eq!(minimal_size(128), 2);
        assert_eq!(minimal_size(16_383), 2);
        assert_eq!(minimal_size(16_384), 3);
        assert_eq!(minimal_size(u64::from(u32::MAX)), 5);
    }

    #[test]
    fn fixed_width_bounds_are_enforced() {
        assert!(LebGenerator::fixed_size(0).is_err());
        assert!(LebGenerator::fixed_size(9).is_err());
        assert!(LebGenerator::fixed_size(1).is_ok());
        assert!(LebGenerator::fixed_size(8).is_ok());
    }

    #[test]
    fn oversized_value_is_rejected() {
        let leb = LebGenerator::minimal();
        assert!(matches!(
            leb.encode(u64::from(u32::MAX) + 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn append_returns_bytes_written() {
        let leb = LebGenerator::fixed_size(4).unwrap();
        let mut out = vec![0xaa];
        let written = leb.append(1, &mut out).unwrap();
        assert_eq!(written, 4);
        assert_eq!(out, [0xaa, 0x81, 0x80, 0x80, 0x00]);
    }
}
