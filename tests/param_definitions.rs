//! Parameter definition collection and metadata map tests.

use iamux::Error;
use iamux::mix_presentation::{MixPresentation, SubMix, SubMixAudioElement};
use iamux::param::{
    AudioElement, ChannelAudioLayerConfig, ChannelNumbers, ParamDefinition,
    ParamDefinitionPayload, ParamDefinitionType, ScalableChannelLayoutConfig,
    collect_and_validate_param_definitions, generate_param_id_to_metadata_map,
};
use std::collections::HashMap;

fn mix_gain(parameter_id: u32, default_mix_gain: i16) -> ParamDefinition {
    ParamDefinition {
        parameter_id,
        parameter_rate: 48_000,
        param_definition_mode: false,
        duration: 1024,
        constant_subblock_duration: 1024,
        subblock_durations: Vec::new(),
        payload: ParamDefinitionPayload::MixGain { default_mix_gain },
    }
}

fn recon_gain(parameter_id: u32, audio_element_id: u32) -> ParamDefinition {
    ParamDefinition {
        parameter_id,
        parameter_rate: 48_000,
        param_definition_mode: false,
        duration: 1024,
        constant_subblock_duration: 1024,
        subblock_durations: Vec::new(),
        payload: ParamDefinitionPayload::ReconGain { audio_element_id },
    }
}

fn element(audio_element_id: u32, param_definitions: Vec<ParamDefinition>) -> AudioElement {
    AudioElement {
        audio_element_id,
        param_definitions,
        scalable_channel_layout: None,
    }
}

fn layered_element(audio_element_id: u32) -> AudioElement {
    AudioElement {
        audio_element_id,
        param_definitions: Vec::new(),
        scalable_channel_layout: Some(ScalableChannelLayoutConfig {
            channel_audio_layer_configs: vec![
                ChannelAudioLayerConfig {
                    channel_numbers: ChannelNumbers {
                        surround: 2,
                        lfe: 0,
                        height: 0,
                    },
                    recon_gain_is_present: false,
                },
                ChannelAudioLayerConfig {
                    channel_numbers: ChannelNumbers {
                        surround: 5,
                        lfe: 1,
                        height: 2,
                    },
                    recon_gain_is_present: true,
                },
            ],
        }),
    }
}

fn presentation_with_gains(
    element_mix_gain: Option<ParamDefinition>,
    output_mix_gain: Option<ParamDefinition>,
) -> MixPresentation {
    MixPresentation {
        mix_presentation_id: 42,
        sub_mixes: vec![SubMix {
            audio_elements: vec![SubMixAudioElement {
                audio_element_id: 300,
                element_mix_gain,
            }],
            output_mix_gain,
            layouts: Vec::new(),
        }],
    }
}

#[test]
fn definitions_from_elements_and_presentations_are_merged() {
    let elements = HashMap::from([(300, element(300, vec![mix_gain(1, 0)]))]);
    let presentations = [presentation_with_gains(Some(mix_gain(2, -768)), Some(mix_gain(3, 6)))];
    let definitions =
        collect_and_validate_param_definitions(&elements, &presentations).unwrap();
    assert_eq!(definitions.len(), 3);
    assert_eq!(definitions[&1], mix_gain(1, 0));
    assert_eq!(definitions[&2], mix_gain(2, -768));
    assert_eq!(definitions[&3], mix_gain(3, 6));
}

#[test]
fn identical_duplicate_declarations_are_legal() {
    let elements = HashMap::from([
        (300, element(300, vec![mix_gain(1, 0)])),
        (301, element(301, vec![mix_gain(1, 0)])),
    ]);
    let definitions = collect_and_validate_param_definitions(&elements, &[]).unwrap();
    assert_eq!(definitions.len(), 1);
}

#[test]
fn conflicting_duplicate_declarations_are_rejected() {
    let elements = HashMap::from([(300, element(300, vec![mix_gain(1, 0)]))]);
    let presentations = [presentation_with_gains(Some(mix_gain(1, -1)), None)];
    assert!(matches!(
        collect_and_validate_param_definitions(&elements, &presentations),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn conflict_within_one_element_is_rejected() {
    let mut changed = mix_gain(7, 0);
    changed.parameter_rate = 44_100;
    let elements = HashMap::from([(300, element(300, vec![mix_gain(7, 0), changed]))]);
    assert!(matches!(
        collect_and_validate_param_definitions(&elements, &[]),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn empty_inputs_yield_an_empty_map() {
    let definitions =
        collect_and_validate_param_definitions(&HashMap::new(), &[]).unwrap();
    assert!(definitions.is_empty());
}

#[test]
fn mix_gain_metadata_carries_no_layer_information() {
    let definitions = HashMap::from([(1, mix_gain(1, 0))]);
    let metadata = generate_param_id_to_metadata_map(&definitions, &HashMap::new()).unwrap();
    let entry = &metadata[&1];
    assert_eq!(entry.param_definition_type, ParamDefinitionType::MixGain);
    assert_eq!(entry.audio_element_id, None);
    assert_eq!(entry.num_layers, 0);
    assert!(entry.channel_numbers_for_layers.is_empty());
    assert!(entry.recon_gain_is_present_flags.is_empty());
}

#[test]
fn recon_gain_metadata_joins_the_element_layers() {
    let definitions = HashMap::from([(9, recon_gain(9, 300))]);
    let elements = HashMap::from([(300, layered_element(300))]);
    let metadata = generate_param_id_to_metadata_map(&definitions, &elements).unwrap();
    let entry = &metadata[&9];
    assert_eq!(entry.param_definition_type, ParamDefinitionType::ReconGain);
    assert_eq!(entry.audio_element_id, Some(300));
    assert_eq!(entry.num_layers, 2);
    assert_eq!(
        entry.channel_numbers_for_layers[1],
        ChannelNumbers {
            surround: 5,
            lfe: 1,
            height: 2,
        }
    );
    assert_eq!(entry.recon_gain_is_present_flags, [false, true]);
}

#[test]
fn recon_gain_naming_an_unknown_element_is_rejected() {
    let definitions = HashMap::from([(9, recon_gain(9, 999))]);
    assert!(matches!(
        generate_param_id_to_metadata_map(&definitions, &HashMap::new()),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn recon_gain_with_too_many_layers_is_rejected() {
    let layer = ChannelAudioLayerConfig {
        channel_numbers: ChannelNumbers::default(),
        recon_gain_is_present: true,
    };
    let element = AudioElement {
        audio_element_id: 300,
        param_definitions: Vec::new(),
        scalable_channel_layout: Some(ScalableChannelLayoutConfig {
            channel_audio_layer_configs: vec![layer; 7],
        }),
    };
    let definitions = HashMap::from([(9, recon_gain(9, 300))]);
    let elements = HashMap::from([(300, element)]);
    assert!(matches!(
        generate_param_id_to_metadata_map(&definitions, &elements),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn recon_gain_on_an_unlayered_element_is_rejected() {
    let definitions = HashMap::from([(9, recon_gain(9, 300))]);
    let elements = HashMap::from([(300, element(300, Vec::new()))]);
    assert!(matches!(
        generate_param_id_to_metadata_map(&definitions, &elements),
        Err(Error::InvalidArgument(_))
    ));
}
