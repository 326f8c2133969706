//! Mix presentation OBUs and loudness finalization.
//!
//! A mix presentation declares sub-mixes of audio elements; each sub-mix
//! lists rendering layouts, and each layout carries a loudness record.
//! Measured loudness arrives late, from an external measurement stage, as a
//! metadata mirror of the OBU tree; the finalizer copies it onto the OBUs
//! only after proving the two trees agree shape-for-shape and bit-for-bit
//! on which loudness fields exist.

use crate::error::{Error, Result};
use crate::param::ParamDefinition;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bit assignments of `LoudnessInfo::info_type`.
pub mod info_type {
    /// A true-peak measurement accompanies the digital peak.
    pub const TRUE_PEAK: u8 = 0x01;
    /// Anchored loudness elements are present.
    pub const ANCHORED_LOUDNESS: u8 = 0x02;
    /// Any of the extension bits.
    pub const ANY_EXTENSION: u8 = 0xFC;
}

/// What an anchored loudness value is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorElementType {
    Unknown,
    Dialogue,
    Album,
}

/// One (anchor, loudness) pair in Q7.8 decibels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredLoudnessElement {
    pub anchor_element: AnchorElementType,
    pub anchored_loudness: i16,
}

/// Opaque extension block carried when any extension bit is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoudnessExtension {
    pub info_type_size: u32,
    pub info_type_bytes: Vec<u8>,
}

/// Loudness record of one rendering layout. Gains and peaks are Q7.8
/// decibels.
///
/// `info_type` governs which optional fields exist: [`info_type::TRUE_PEAK`]
/// gates `true_peak`, [`info_type::ANCHORED_LOUDNESS`] gates
/// `anchored_loudness`, and any [`info_type::ANY_EXTENSION`] bit gates
/// `layout_extension`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoudnessInfo {
    pub info_type: u8,
    pub integrated_loudness: i16,
    pub digital_peak: i16,
    pub true_peak: Option<i16>,
    pub anchored_loudness: Vec<AnchoredLoudnessElement>,
    pub layout_extension: Option<LoudnessExtension>,
}

/// One rendering layout of a sub-mix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixPresentationLayout {
    pub loudness: LoudnessInfo,
}

/// One audio element's membership in a sub-mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMixAudioElement {
    pub audio_element_id: u32,
    pub element_mix_gain: Option<ParamDefinition>,
}

/// One sub-mix of a mix presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMix {
    pub audio_elements: Vec<SubMixAudioElement>,
    pub output_mix_gain: Option<ParamDefinition>,
    pub layouts: Vec<MixPresentationLayout>,
}

/// Mix presentation OBU, reduced to the fields finalization touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixPresentation {
    pub mix_presentation_id: u32,
    pub sub_mixes: Vec<SubMix>,
}

/// Measured loudness for one layout, mirroring [`MixPresentationLayout`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutLoudnessMetadata {
    pub loudness: LoudnessInfo,
}

/// Measured loudness for one sub-mix, mirroring [`SubMix`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMixLoudnessMetadata {
    pub layouts: Vec<LayoutLoudnessMetadata>,
}

/// Measured loudness for one mix presentation, mirroring
/// [`MixPresentation`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixPresentationLoudnessMetadata {
    pub mix_presentation_id: u32,
    pub sub_mixes: Vec<SubMixLoudnessMetadata>,
}

/// Validates one layout's measured loudness against the OBU's declaration
/// and produces the record to commit.
///
/// The metadata must declare the same `info_type` the OBU does, and each
/// gated field must be present exactly when its bit is set.
fn finalize_layout(
    metadata: &LayoutLoudnessMetadata,
    current: &LoudnessInfo,
    mix_presentation_id: u32,
) -> Result<LoudnessInfo> {
    let measured = &metadata.loudness;
    if measured.info_type != current.info_type {
        return Err(Error::invalid_argument(format!(
            "mix presentation {mix_presentation_id}: measured info_type {:#04x} disagrees with the declared {:#04x}",
            measured.info_type, current.info_type
        )));
    }
    let wants_true_peak = measured.info_type & info_type::TRUE_PEAK != 0;
    if wants_true_peak != measured.true_peak.is_some() {
        return Err(Error::invalid_argument(format!(
            "mix presentation {mix_presentation_id}: true peak must be present exactly when its info_type bit is set"
        )));
    }
    let wants_anchored = measured.info_type & info_type::ANCHORED_LOUDNESS != 0;
    if wants_anchored != !measured.anchored_loudness.is_empty() {
        return Err(Error::invalid_argument(format!(
            "mix presentation {mix_presentation_id}: anchored loudness must be present exactly when its info_type bit is set"
        )));
    }
    let wants_extension = measured.info_type & info_type::ANY_EXTENSION != 0;
    if wants_extension != measured.layout_extension.is_some() {
        return Err(Error::invalid_argument(format!(
            "mix presentation {mix_presentation_id}: a loudness extension must be present exactly when an extension bit is set"
        )));
    }
    Ok(measured.clone())
}

/// One-shot finalizer that copies measured loudness onto mix presentation
/// OBUs.
///
/// Finalization is two-phase: every layout of every OBU is validated before
/// any OBU is touched, so a failed run leaves the OBUs exactly as they were.
#[derive(Debug)]
pub struct MixPresentationFinalizer {
    metadata: Vec<MixPresentationLoudnessMetadata>,
}

impl MixPresentationFinalizer {
    pub fn new(metadata: Vec<MixPresentationLoudnessMetadata>) -> Self {
        Self { metadata }
    }

    /// Copies the measured loudness onto `obus`, consuming the finalizer.
    ///
    /// The metadata and `obus` are matched positionally and must agree on
    /// ids, sub-mix counts, and layout counts.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the trees disagree in shape or id, or if any
    /// layout fails the field-presence checks of its `info_type`. On error
    /// no OBU is modified.
    pub fn finalize(self, obus: &mut [MixPresentation]) -> Result<()> {
        if self.metadata.len() != obus.len() {
            return Err(Error::invalid_argument(format!(
                "loudness metadata covers {} mix presentations but {} were supplied",
                self.metadata.len(),
                obus.len()
            )));
        }

        // Phase 1: validate everything, accumulating the records to commit.
        let mut finalized: Vec<Vec<Vec<LoudnessInfo>>> = Vec::with_capacity(obus.len());
        for (metadata, obu) in self.metadata.iter().zip(obus.iter()) {
            if metadata.mix_presentation_id != obu.mix_presentation_id {
                return Err(Error::invalid_argument(format!(
                    "loudness metadata for mix presentation {} paired with OBU {}",
                    metadata.mix_presentation_id, obu.mix_presentation_id
                )));
            }
            if metadata.sub_mixes.len() != obu.sub_mixes.len() {
                return Err(Error::invalid_argument(format!(
                    "mix presentation {}: metadata has {} sub-mixes, OBU has {}",
                    obu.mix_presentation_id,
                    metadata.sub_mixes.len(),
                    obu.sub_mixes.len()
                )));
            }
            let mut obu_records = Vec::with_capacity(obu.sub_mixes.len());
            for (sub_mix_metadata, sub_mix) in metadata.sub_mixes.iter().zip(&obu.sub_mixes) {
                if sub_mix_metadata.layouts.len() != sub_mix.layouts.len() {
                    return Err(Error::invalid_argument(format!(
                        "mix presentation {}: metadata has {} layouts, OBU has {}",
                        obu.mix_presentation_id,
                        sub_mix_metadata.layouts.len(),
                        sub_mix.layouts.len()
                    )));
                }
                let mut sub_mix_records = Vec::with_capacity(sub_mix.layouts.len());
                for (layout_metadata, layout) in
                    sub_mix_metadata.layouts.iter().zip(&sub_mix.layouts)
                {
                    sub_mix_records.push(finalize_layout(
                        layout_metadata,
                        &layout.loudness,
                        obu.mix_presentation_id,
                    )?);
                }
                obu_records.push(sub_mix_records);
            }
            finalized.push(obu_records);
        }

        // Phase 2: commit. Infallible past this point.
        for (obu, obu_records) in obus.iter_mut().zip(finalized) {
            for (sub_mix, sub_mix_records) in obu.sub_mixes.iter_mut().zip(obu_records) {
                for (layout, loudness) in sub_mix.layouts.iter_mut().zip(sub_mix_records) {
                    layout.loudness = loudness;
                }
            }
            debug!(
                mix_presentation_id = obu.mix_presentation_id,
                "finalized mix presentation loudness"
            );
        }
        Ok(())
    }
}
