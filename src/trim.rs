//! Cross-substream trim reconciliation.
//!
//! Independently encoded substreams may each declare samples to discard at
//! the container's start and end. Before muxing, every substream must agree
//! on a single common (end, start) trim pair; this module proves that
//! agreement as a pure fold over the frames, or reports which substream
//! disagreed.

use crate::error::{Error, Result};
use tracing::debug;

/// Trim metadata for one frame of one substream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTrim {
    pub substream_id: u32,
    /// Position of the frame within its substream, in samples. Frames are
    /// reconciled in ascending timestamp order per substream.
    pub start_timestamp: i64,
    pub num_samples_to_trim_at_end: u32,
    pub num_samples_to_trim_at_start: u32,
}

/// The single (end, start) trim pair shared by every substream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommonTrim {
    pub num_samples_to_trim_at_end: u32,
    pub num_samples_to_trim_at_start: u32,
}

#[derive(Default)]
struct SubstreamTrimState {
    cumulative_start: u32,
    end: u32,
    past_leading_run: bool,
}

/// Validates per-substream trim placement and reduces all substreams to a
/// single common trim pair.
///
/// Per frame, `start + end` may not exceed `num_samples_per_frame`. Per
/// substream, non-zero start trims are legal only on a contiguous leading
/// run of frames, a non-zero end trim is legal only on the final frame, and
/// no frame may be entirely trimmed from the end. The cumulative start trim
/// (summed over the leading run) and the end trim must then be identical
/// across substreams.
///
/// Empty input is vacuously common and yields `(0, 0)`.
pub fn validate_and_get_common_trim(
    num_samples_per_frame: u32,
    frames: &[FrameTrim],
) -> Result<CommonTrim> {
    // First-seen substream order keeps error reporting deterministic.
    let mut states: Vec<(u32, SubstreamTrimState)> = Vec::new();

    let mut ordered: Vec<&FrameTrim> = frames.iter().collect();
    ordered.sort_by_key(|frame| frame.start_timestamp);

    for frame in ordered {
        let start = frame.num_samples_to_trim_at_start;
        let end = frame.num_samples_to_trim_at_end;
        if u64::from(start) + u64::from(end) > u64::from(num_samples_per_frame) {
            return Err(Error::invalid_argument(format!(
                "substream {}: trim {start} + {end} exceeds the frame length {num_samples_per_frame}",
                frame.substream_id
            )));
        }

        let index = match states
            .iter()
            .position(|(id, _)| *id == frame.substream_id)
        {
            Some(index) => index,
            None => {
                states.push((frame.substream_id, SubstreamTrimState::default()));
                states.len() - 1
            }
        };
        let state = &mut states[index].1;

        if state.end != 0 {
            return Err(Error::invalid_argument(format!(
                "substream {}: frames may not follow one trimmed at the end",
                frame.substream_id
            )));
        }
        if start > 0 {
            if state.past_leading_run {
                return Err(Error::invalid_argument(format!(
                    "substream {}: non-zero start trim after the leading trimmed run",
                    frame.substream_id
                )));
            }
            state.cumulative_start =
                state.cumulative_start.checked_add(start).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "substream {}: cumulative start trim overflows 32 bits",
                        frame.substream_id
                    ))
                })?;
            if start != num_samples_per_frame {
                // The frame contributes audible samples; the run is over.
                state.past_leading_run = true;
            }
        } else {
            state.past_leading_run = true;
        }
        if end > 0 {
            if end == num_samples_per_frame {
                return Err(Error::invalid_argument(format!(
                    "substream {}: a frame may not be entirely trimmed from the end; drop it instead",
                    frame.substream_id
                )));
            }
            state.end = end;
        }
    }

    let mut iter = states.iter();
    let Some((_, first)) = iter.next() else {
        return Ok(CommonTrim::default());
    };
    for (substream_id, state) in iter {
        if state.cumulative_start != first.cumulative_start || state.end != first.end {
            return Err(Error::invalid_argument(format!(
                "substream {substream_id}: trim (end {}, start {}) disagrees with the common trim (end {}, start {})",
                state.end, state.cumulative_start, first.end, first.cumulative_start
            )));
        }
    }
    debug!(
        substreams = states.len(),
        num_samples_to_trim_at_end = first.end,
        num_samples_to_trim_at_start = first.cumulative_start,
        "reconciled common trim"
    );
    Ok(CommonTrim {
        num_samples_to_trim_at_end: first.end,
        num_samples_to_trim_at_start: first.cumulative_start,
    })
}
