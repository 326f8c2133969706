//! PCM frame serialization and format negotiation tests.

use iamux::Error;
use iamux::pcm::{
    FALLBACK_BIT_DEPTH, FALLBACK_SAMPLE_RATE, get_common_sample_rate_and_bit_depth,
    write_pcm_frame,
};
use std::collections::HashSet;

#[test]
fn sixteen_bit_big_endian_interleaves_channels() {
    let frame = vec![
        vec![0x1122_0000_u32 as i32, 0x3344_0000_u32 as i32],
        vec![0x5566_0000_u32 as i32, 0x7788_0000_u32 as i32],
    ];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 0, 0, 16, true, &mut out).unwrap();
    assert_eq!(out, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);
}

#[test]
fn sixteen_bit_little_endian_swaps_each_sample() {
    let frame = vec![
        vec![0x1122_0000_u32 as i32, 0x3344_0000_u32 as i32],
        vec![0x5566_0000_u32 as i32, 0x7788_0000_u32 as i32],
    ];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 0, 0, 16, false, &mut out).unwrap();
    assert_eq!(out, [0x22, 0x11, 0x44, 0x33, 0x66, 0x55, 0x88, 0x77]);
}

#[test]
fn twenty_four_bit_takes_the_top_three_bytes() {
    let frame = vec![vec![0x1234_5678_u32 as i32]];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 0, 0, 24, true, &mut out).unwrap();
    assert_eq!(out, [0x12, 0x34, 0x56]);

    out.clear();
    write_pcm_frame(&frame, 0, 0, 24, false, &mut out).unwrap();
    assert_eq!(out, [0x56, 0x34, 0x12]);
}

#[test]
fn thirty_two_bit_keeps_every_byte() {
    let frame = vec![vec![0x1234_5678_u32 as i32]];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 0, 0, 32, true, &mut out).unwrap();
    assert_eq!(out, [0x12, 0x34, 0x56, 0x78]);

    out.clear();
    write_pcm_frame(&frame, 0, 0, 32, false, &mut out).unwrap();
    assert_eq!(out, [0x78, 0x56, 0x34, 0x12]);
}

#[test]
fn negative_samples_keep_their_two_complement_bytes() {
    let frame = vec![vec![-1]];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 0, 0, 16, true, &mut out).unwrap();
    assert_eq!(out, [0xff, 0xff]);
}

#[test]
fn trims_remove_leading_and_trailing_ticks() {
    let frame = vec![
        vec![0x0100_0000],
        vec![0x0200_0000],
        vec![0x0300_0000],
        vec![0x0400_0000],
    ];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 1, 1, 8, true, &mut out).unwrap();
    assert_eq!(out, [0x02, 0x03]);
}

#[test]
fn a_fully_trimmed_frame_writes_nothing() {
    let frame = vec![vec![0x0100_0000], vec![0x0200_0000]];
    let mut out = Vec::new();
    write_pcm_frame(&frame, 1, 1, 16, true, &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn trims_exceeding_the_frame_are_rejected() {
    let frame = vec![vec![0]; 4];
    let mut out = Vec::new();
    assert!(matches!(
        write_pcm_frame(&frame, 3, 2, 16, true, &mut out),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn invalid_bit_depths_are_rejected() {
    let frame = vec![vec![0]];
    for bit_depth in [0, 7, 12, 33, 40] {
        let mut out = Vec::new();
        assert!(
            matches!(
                write_pcm_frame(&frame, 0, 0, bit_depth, true, &mut out),
                Err(Error::InvalidArgument(_))
            ),
            "bit depth {bit_depth} should be rejected"
        );
    }
}

#[test]
fn output_appends_after_existing_bytes() {
    let frame = vec![vec![0x0500_0000]];
    let mut out = vec![0xaa];
    write_pcm_frame(&frame, 0, 0, 8, true, &mut out).unwrap();
    assert_eq!(out, [0xaa, 0x05]);
}

#[test]
fn unanimous_format_is_kept_without_resampling() {
    let common = get_common_sample_rate_and_bit_depth(
        &HashSet::from([96_000]),
        &HashSet::from([32]),
    )
    .unwrap();
    assert_eq!(common.sample_rate, 96_000);
    assert_eq!(common.bit_depth, 32);
    assert!(!common.requires_resampling);
}

#[test]
fn mixed_rates_and_depths_fall_back_on_both_axes() {
    let common = get_common_sample_rate_and_bit_depth(
        &HashSet::from([44_100, 48_000]),
        &HashSet::from([16, 24]),
    )
    .unwrap();
    assert_eq!(common.sample_rate, FALLBACK_SAMPLE_RATE);
    assert_eq!(common.bit_depth, FALLBACK_BIT_DEPTH);
    assert!(common.requires_resampling);
}

#[test]
fn a_single_disagreeing_axis_still_flags_resampling() {
    let common = get_common_sample_rate_and_bit_depth(
        &HashSet::from([48_000]),
        &HashSet::from([16, 24]),
    )
    .unwrap();
    assert_eq!(common.sample_rate, 48_000);
    assert_eq!(common.bit_depth, FALLBACK_BIT_DEPTH);
    assert!(common.requires_resampling);
}
