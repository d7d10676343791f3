// splice-core/tests/reconcile_tests.rs

use splice_core::codec::{CodecFamily, compatible, family_of};
use splice_core::media::parse_profile;
use splice_core::reconcile::{InputAction, ReconciliationStrategy, plan};
use splice_core::MediaStreamProfile;
use std::path::Path;

fn probe_json(codec: &str, width: u32, height: u32, rate: &str, pix_fmt: &str) -> String {
    format!(
        r#"{{
            "streams": [
                {{"codec_type": "video", "codec_name": "{codec}", "width": {width}, "height": {height},
                  "pix_fmt": "{pix_fmt}", "r_frame_rate": "{rate}"}},
                {{"codec_type": "audio", "codec_name": "aac", "sample_rate": "48000", "channels": 2}}
            ],
            "format": {{"duration": "10.000000", "bit_rate": "3000000"}}
        }}"#
    )
}

fn profile(name: &str, codec: &str, width: u32, height: u32) -> MediaStreamProfile {
    parse_profile(
        Path::new(&format!("/media/{name}")),
        &probe_json(codec, width, height, "25/1", "yuv420p"),
    )
    .expect("valid prober output")
}

#[test]
fn test_alias_groups_are_compatible() {
    for (a, b) in [("h264", "avc1"), ("libx264", "H264"), ("hevc", "libx265"), ("mp3", "libmp3lame")] {
        assert!(compatible(a, b), "{a} vs {b}");
        assert!(compatible(b, a), "{b} vs {a}");
    }
    assert!(!compatible("h264", "hevc"));
}

#[test]
fn test_classification_is_idempotent() {
    for id in ["avc1", "hevc", "aac", "wmv3", "prores"] {
        let family = family_of(id);
        assert_eq!(family_of(family.as_str()), family);
    }
    assert_eq!(family_of("ProRes"), CodecFamily::Other("prores".to_string()));
}

#[test]
fn test_identical_profiles_need_nothing() {
    let profiles = vec![
        profile("a.mp4", "h264", 1920, 1080),
        profile("b.mp4", "h264", 1920, 1080),
        profile("c.mp4", "h264", 1920, 1080),
    ];
    let result = plan(&profiles, &profiles[0]);
    assert_eq!(result.strategy, ReconciliationStrategy::None);
    assert!(result.inputs.iter().all(|i| i.action == InputAction::Keep));
}

#[test]
fn test_h264_alias_difference_is_fast_repackage() {
    let profiles = vec![profile("a.mp4", "h264", 1920, 1080), profile("b.mov", "avc1", 1920, 1080)];
    let result = plan(&profiles, &profiles[0]);
    assert_eq!(result.strategy, ReconciliationStrategy::FastRepackage);
    assert!(result.inputs[1].mismatches.codec);
    assert!(!result.inputs[1].mismatches.is_structural());
}

#[test]
fn test_resolution_mismatch_forces_full_reencode() {
    let profiles = vec![profile("a.mp4", "h264", 1920, 1080), profile("b.mp4", "h264", 1280, 720)];
    let result = plan(&profiles, &profiles[0]);
    assert_eq!(result.strategy, ReconciliationStrategy::FullReencode);
    assert_eq!(result.indices_needing(InputAction::Reencode), vec![1]);
}

#[test]
fn test_frame_rate_and_pixel_format_are_structural() {
    let reference = profile("a.mp4", "h264", 1920, 1080);
    let ntsc = parse_profile(
        Path::new("/media/b.mp4"),
        &probe_json("h264", 1920, 1080, "30000/1001", "yuv420p"),
    )
    .unwrap();
    let tenbit = parse_profile(
        Path::new("/media/c.mp4"),
        &probe_json("h264", 1920, 1080, "25/1", "yuv420p10le"),
    )
    .unwrap();

    let result = plan(&[reference.clone(), ntsc, tenbit], &reference);
    assert_eq!(result.strategy, ReconciliationStrategy::FullReencode);
    assert!(result.inputs[1].mismatches.frame_rate);
    assert!(result.inputs[2].mismatches.pixel_format);
}

#[test]
fn test_matching_non_h264_inputs_are_all_reencoded() {
    let profiles = vec![
        profile("a.mkv", "hevc", 1920, 1080),
        profile("b.mkv", "hevc", 1920, 1080),
        profile("c.mkv", "hevc", 1920, 1080),
    ];
    let result = plan(&profiles, &profiles[0]);
    assert_eq!(result.strategy, ReconciliationStrategy::FullReencode);
    assert_eq!(result.indices_needing(InputAction::Reencode), vec![0, 1, 2]);
}
