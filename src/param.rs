//! Parameter definition collection and per-id metadata.
//!
//! Audio elements and mix presentations both declare parameter definitions.
//! Before parameter blocks can be written, every definition sharing an id
//! must be proved structurally identical, and recon-gain definitions must be
//! joined back to the layer layout of the element they modify.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::mix_presentation::MixPresentation;

/// Discriminant of a [`ParamDefinition`]'s payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamDefinitionType {
    MixGain,
    DemixingInfo,
    ReconGain,
}

/// Type-specific fields of a parameter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamDefinitionPayload {
    MixGain { default_mix_gain: i16 },
    DemixingInfo { default_dmixp_mode: u8 },
    ReconGain { audio_element_id: u32 },
}

impl ParamDefinitionPayload {
    pub fn param_definition_type(&self) -> ParamDefinitionType {
        match self {
            ParamDefinitionPayload::MixGain { .. } => ParamDefinitionType::MixGain,
            ParamDefinitionPayload::DemixingInfo { .. } => ParamDefinitionType::DemixingInfo,
            ParamDefinitionPayload::ReconGain { .. } => ParamDefinitionType::ReconGain,
        }
    }
}

/// One parameter definition as declared by an audio element or sub-mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub parameter_id: u32,
    pub parameter_rate: u32,
    /// When set, subblock durations are carried in each parameter block
    /// instead of here.
    pub param_definition_mode: bool,
    pub duration: u32,
    pub constant_subblock_duration: u32,
    /// Explicit per-subblock durations; used only when
    /// `constant_subblock_duration` is zero.
    pub subblock_durations: Vec<u32>,
    pub payload: ParamDefinitionPayload,
}

/// Most layers a scalable channel layout may declare; `num_layers` is a
/// 3-bit field in the governing container format.
pub const MAX_CHANNEL_AUDIO_LAYERS: usize = 6;

/// Channel counts for one layer of a scalable channel layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNumbers {
    pub surround: u8,
    pub lfe: u8,
    pub height: u8,
}

/// One layer of a scalable channel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAudioLayerConfig {
    pub channel_numbers: ChannelNumbers,
    pub recon_gain_is_present: bool,
}

/// Layered channel layout of one audio element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalableChannelLayoutConfig {
    pub channel_audio_layer_configs: Vec<ChannelAudioLayerConfig>,
}

/// The slice of an audio element this module consumes: its own parameter
/// definitions plus the layer layout recon-gain metadata is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioElement {
    pub audio_element_id: u32,
    pub param_definitions: Vec<ParamDefinition>,
    pub scalable_channel_layout: Option<ScalableChannelLayoutConfig>,
}

/// Everything a parameter-block writer needs to know about one parameter id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMetadata {
    pub param_definition_type: ParamDefinitionType,
    pub param_definition: ParamDefinition,
    /// The element a recon-gain definition modifies; `None` otherwise.
    pub audio_element_id: Option<u32>,
    pub num_layers: u8,
    pub channel_numbers_for_layers: Vec<ChannelNumbers>,
    pub recon_gain_is_present_flags: Vec<bool>,
}

fn register(
    definitions: &mut HashMap<u32, ParamDefinition>,
    definition: &ParamDefinition,
) -> Result<()> {
    match definitions.get(&definition.parameter_id) {
        None => {
            definitions.insert(definition.parameter_id, definition.clone());
            Ok(())
        }
        Some(existing) if existing == definition => Ok(()),
        Some(_) => Err(Error::invalid_argument(format!(
            "parameter id {} is declared with two different definitions",
            definition.parameter_id
        ))),
    }
}

/// Collects every parameter definition declared by the audio elements and
/// mix presentations into one id-keyed map.
///
/// Duplicate ids are legal only when every declaration is structurally
/// identical; the first declaration is kept.
///
/// # Errors
///
/// `InvalidArgument` if two declarations of the same id differ in any field.
pub fn collect_and_validate_param_definitions(
    audio_elements: &HashMap<u32, AudioElement>,
    mix_presentations: &[MixPresentation],
) -> Result<HashMap<u32, ParamDefinition>> {
    let mut definitions = HashMap::new();
    for element in audio_elements.values() {
        for definition in &element.param_definitions {
            register(&mut definitions, definition)?;
        }
    }
    for mix_presentation in mix_presentations {
        for sub_mix in &mix_presentation.sub_mixes {
            for sub_mix_element in &sub_mix.audio_elements {
                if let Some(definition) = &sub_mix_element.element_mix_gain {
                    register(&mut definitions, definition)?;
                }
            }
            if let Some(definition) = &sub_mix.output_mix_gain {
                register(&mut definitions, definition)?;
            }
        }
    }
    debug!(
        parameter_ids = definitions.len(),
        "collected parameter definitions"
    );
    Ok(definitions)
}

/// Builds the per-parameter-id metadata map the parameter-block writer
/// consumes.
///
/// Mix-gain and demixing-info entries carry their definition unchanged.
/// Recon-gain entries are additionally joined to the layer layout of the
/// audio element they name.
///
/// # Errors
///
/// `InvalidArgument` if a recon-gain definition names an unknown audio
/// element, one without a scalable channel layout, or one declaring more
/// than [`MAX_CHANNEL_AUDIO_LAYERS`] layers.
pub fn generate_param_id_to_metadata_map(
    param_definitions: &HashMap<u32, ParamDefinition>,
    audio_elements: &HashMap<u32, AudioElement>,
) -> Result<HashMap<u32, ParamMetadata>> {
    let mut metadata = HashMap::new();
    for (&parameter_id, definition) in param_definitions {
        let entry = match &definition.payload {
            ParamDefinitionPayload::MixGain { .. }
            | ParamDefinitionPayload::DemixingInfo { .. } => ParamMetadata {
                param_definition_type: definition.payload.param_definition_type(),
                param_definition: definition.clone(),
                audio_element_id: None,
                num_layers: 0,
                channel_numbers_for_layers: Vec::new(),
                recon_gain_is_present_flags: Vec::new(),
            },
            ParamDefinitionPayload::ReconGain { audio_element_id } => {
                let element = audio_elements.get(audio_element_id).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "recon gain parameter {parameter_id} names unknown audio element {audio_element_id}"
                    ))
                })?;
                let layout = element.scalable_channel_layout.as_ref().ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "recon gain parameter {parameter_id} names audio element {audio_element_id}, which has no scalable channel layout"
                    ))
                })?;
                let layers = &layout.channel_audio_layer_configs;
                if layers.len() > MAX_CHANNEL_AUDIO_LAYERS {
                    return Err(Error::invalid_argument(format!(
                        "audio element {audio_element_id} declares {} channel audio layers; the format allows at most {MAX_CHANNEL_AUDIO_LAYERS}",
                        layers.len()
                    )));
                }
                ParamMetadata {
                    param_definition_type: ParamDefinitionType::ReconGain,
                    param_definition: definition.clone(),
                    audio_element_id: Some(*audio_element_id),
                    num_layers: layers.len() as u8,
                    channel_numbers_for_layers: layers
                        .iter()
                        .map(|layer| layer.channel_numbers)
                        .collect(),
                    recon_gain_is_present_flags: layers
                        .iter()
                        .map(|layer| layer.recon_gain_is_present)
                        .collect(),
                }
            }
        };
        metadata.insert(parameter_id, entry);
    }
    Ok(metadata)
}
