//! PCM sample-format negotiation and frame serialization.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::debug;

/// Sample rate chosen when the inputs disagree.
pub const FALLBACK_SAMPLE_RATE: u32 = 48_000;
/// Bit depth chosen when the inputs disagree.
pub const FALLBACK_BIT_DEPTH: u8 = 16;

/// Negotiated output format for one muxing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonFormat {
    pub sample_rate: u32,
    pub bit_depth: u8,
    /// True when any input stream must be converted to match.
    pub requires_resampling: bool,
}

fn only<T: Copy + Eq + Hash>(set: &HashSet<T>) -> Option<T> {
    if set.len() == 1 {
        set.iter().next().copied()
    } else {
        None
    }
}

/// Picks the single output sample rate and bit depth for a set of input
/// streams.
///
/// A unanimous set wins outright. Any disagreement falls back to 48 kHz /
/// 16-bit for the contested axis, and the result is flagged as requiring
/// resampling. The two axes are negotiated independently.
///
/// # Errors
///
/// `InvalidArgument` if either set is empty.
pub fn get_common_sample_rate_and_bit_depth(
    sample_rates: &HashSet<u32>,
    bit_depths: &HashSet<u8>,
) -> Result<CommonFormat> {
    if sample_rates.is_empty() {
        return Err(Error::invalid_argument("no input sample rates"));
    }
    if bit_depths.is_empty() {
        return Err(Error::invalid_argument("no input bit depths"));
    }
    let (sample_rate, resample_rate) = match only(sample_rates) {
        Some(rate) => (rate, false),
        None => (FALLBACK_SAMPLE_RATE, true),
    };
    let (bit_depth, resample_depth) = match only(bit_depths) {
        Some(depth) => (depth, false),
        None => (FALLBACK_BIT_DEPTH, true),
    };
    let common = CommonFormat {
        sample_rate,
        bit_depth,
        requires_resampling: resample_rate || resample_depth,
    };
    debug!(
        sample_rate = common.sample_rate,
        bit_depth = common.bit_depth,
        requires_resampling = common.requires_resampling,
        "negotiated common PCM format"
    );
    Ok(common)
}

/// Appends one time-major PCM frame to `out`, skipping trimmed ticks.
///
/// `frame[tick][channel]` holds samples left-justified in 32 bits; each
/// retained sample contributes its most significant `bit_depth / 8` bytes,
/// in the requested byte order, channels interleaved within a tick.
///
/// # Errors
///
/// `InvalidArgument` if `bit_depth` is zero, above 32, or not a multiple of
/// eight; if the trims cover more ticks than the frame has; or if any
/// retained tick's channel count differs from the first retained tick's.
pub fn write_pcm_frame(
    frame: &[Vec<i32>],
    samples_to_trim_at_start: u32,
    samples_to_trim_at_end: u32,
    bit_depth: u8,
    big_endian: bool,
    out: &mut Vec<u8>,
) -> Result<()> {
    if bit_depth == 0 || bit_depth > 32 || bit_depth % 8 != 0 {
        return Err(Error::invalid_argument(format!(
            "bit depth must be a multiple of 8 in [8, 32], got {bit_depth}"
        )));
    }
    if u64::from(samples_to_trim_at_start) + u64::from(samples_to_trim_at_end)
        > frame.len() as u64
    {
        return Err(Error::invalid_argument(format!(
            "trims cover {} + {} ticks but the frame has {}",
            samples_to_trim_at_start,
            samples_to_trim_at_end,
            frame.len()
        )));
    }
    let start = samples_to_trim_at_start as usize;
    let end = frame.len() - samples_to_trim_at_end as usize;
    let retained = &frame[start..end];
    let Some(first) = retained.first() else {
        return Ok(());
    };
    let num_channels = first.len();
    let bytes_per_sample = usize::from(bit_depth / 8);

    out.reserve(retained.len() * num_channels * bytes_per_sample);
    for tick in retained {
        if tick.len() != num_channels {
            return Err(Error::invalid_argument(format!(
                "ragged frame: expected {num_channels} channels, got {}",
                tick.len()
            )));
        }
        for &sample in tick {
            let sample = sample as u32;
            for b in 0..bytes_per_sample {
                let shift = if big_endian {
                    24 - 8 * b
                } else {
                    32 - 8 * (bytes_per_sample - b)
                };
                out.push((sample >> shift) as u8);
            }
        }
    }
    Ok(())
}
