//! Integration tests for the beautification engine and its boundary.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use silk_core::{BeautyParams, EngineError, Frame, PixelFormat};
use silk_engine::{BeautyBoundary, EngineState};

const BLUE: [u8; 4] = [0, 0, 255, 255];
const BLOCK_ORIGIN: u32 = 22;
const BLOCK_SIZE: u32 = 20;

/// 64x64 pure blue frame with a 20x20 noisy skin-toned block.
fn noisy_skin_block_frame() -> Frame {
    let mut frame = Frame::solid(64, 64, BLUE);
    let mut rng = StdRng::seed_from_u64(12345);
    let range = BLOCK_ORIGIN..BLOCK_ORIGIN + BLOCK_SIZE;
    for y in range.clone() {
        for x in range.clone() {
            let mut px = [0, 0, 0, 255];
            for (c, base) in px.iter_mut().zip([60i32, 110, 200]) {
                *c = (base + rng.gen_range(-10..=10)).clamp(0, 255) as u8;
            }
            frame.set_rgba(x, y, px);
        }
    }
    frame
}

fn in_block(x: u32, y: u32) -> bool {
    let range = BLOCK_ORIGIN..BLOCK_ORIGIN + BLOCK_SIZE;
    range.contains(&x) && range.contains(&y)
}

fn block_luma_variance(frame: &Frame) -> f64 {
    let lumas: Vec<f64> = (0..frame.height)
        .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
        .filter(|&(x, y)| in_block(x, y))
        .filter_map(|(x, y)| frame.rgba_at(x, y))
        .map(|[r, g, b, _]| 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64)
        .collect();
    let n = lumas.len() as f64;
    let mean = lumas.iter().sum::<f64>() / n;
    lumas.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n
}

#[test]
fn smoothing_reduces_block_variance_and_keeps_background() {
    let input = noisy_skin_block_frame();
    let boundary = BeautyBoundary::new();
    boundary.initialize(&input).unwrap();
    assert_eq!(
        boundary.skin_coverage(),
        Some((BLOCK_SIZE * BLOCK_SIZE) as f32 / (64.0 * 64.0))
    );

    boundary.smooth(260.0).unwrap();
    let mut output = Frame::new(64, 64, PixelFormat::Rgba8);
    boundary.commit(&mut output).unwrap();

    assert!(block_luma_variance(&output) < block_luma_variance(&input));
    for y in 0..64 {
        for x in 0..64 {
            if !in_block(x, y) {
                assert_eq!(output.rgba_at(x, y), Some(BLUE), "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn smooth_before_initialize_is_contained() {
    let boundary = BeautyBoundary::new();
    assert_eq!(boundary.smooth(260.0), Err(EngineError::NotInitialized));
    assert_eq!(boundary.whiten(3.0), Err(EngineError::NotInitialized));
    assert_eq!(boundary.state(), EngineState::Uninitialized);

    boundary.initialize(&noisy_skin_block_frame()).unwrap();
    assert_eq!(
        boundary.state(),
        EngineState::Initialized {
            width: 64,
            height: 64
        }
    );
}

#[test]
fn size_envelope_is_enforced() {
    let boundary = BeautyBoundary::new();
    let cases = [
        (31, 64, Some(EngineError::SizeTooSmall { width: 31, height: 64 })),
        (32, 32, None),
        (2049, 64, Some(EngineError::SizeTooLarge { width: 2049, height: 64 })),
        (2048, 1953, None),
        (2048, 2048, Some(EngineError::SizeTooLarge { width: 2048, height: 2048 })),
    ];
    for (w, h, expected) in cases {
        let result = boundary.initialize(&Frame::new(w, h, PixelFormat::Rgba8));
        assert_eq!(result.err(), expected, "{w}x{h}");
    }
    boundary.release();
}

#[test]
fn empty_and_truncated_buffers_are_invalid() {
    let boundary = BeautyBoundary::new();
    let empty = Frame::from_raw(64, 64, PixelFormat::Rgba8, Vec::new());
    assert!(matches!(
        boundary.initialize(&empty),
        Err(EngineError::InvalidData(_))
    ));

    let truncated = Frame::from_raw(64, 64, PixelFormat::Rgba8, vec![0; 64 * 64 * 4 - 1]);
    assert!(matches!(
        boundary.initialize(&truncated),
        Err(EngineError::InvalidData(_))
    ));
}

#[test]
fn reinitialize_with_new_dimensions() {
    let boundary = BeautyBoundary::new();
    boundary.initialize(&Frame::solid(64, 64, BLUE)).unwrap();
    boundary.initialize(&Frame::solid(96, 48, BLUE)).unwrap();
    assert_eq!(
        boundary.state(),
        EngineState::Initialized {
            width: 96,
            height: 48
        }
    );

    let mut wrong = Frame::new(64, 64, PixelFormat::Rgba8);
    assert!(boundary.commit(&mut wrong).is_err());
}

#[test]
fn whiten_then_smooth_in_either_order() {
    let input = noisy_skin_block_frame();
    let boundary = BeautyBoundary::new();

    boundary.initialize(&input).unwrap();
    boundary.whiten(3.0).unwrap();
    boundary.smooth(260.0).unwrap();
    let mut whiten_first = Frame::new(64, 64, PixelFormat::Rgba8);
    boundary.commit(&mut whiten_first).unwrap();

    boundary.initialize(&input).unwrap();
    boundary.smooth(260.0).unwrap();
    boundary.whiten(3.0).unwrap();
    let mut smooth_first = Frame::new(64, 64, PixelFormat::Rgba8);
    boundary.commit(&mut smooth_first).unwrap();

    // Both orders brighten the block.
    let original = input.rgba_at(30, 30).unwrap();
    for out in [&whiten_first, &smooth_first] {
        let px = out.rgba_at(30, 30).unwrap();
        let sum = |p: [u8; 4]| p[..3].iter().map(|&c| c as u32).sum::<u32>();
        assert!(sum(px) > sum(original));
    }
}

#[test]
fn bgra_frames_round_trip_through_process() {
    let rgba = noisy_skin_block_frame();
    let mut bgra = Frame::new(64, 64, PixelFormat::Bgra8);
    for y in 0..64 {
        for x in 0..64 {
            bgra.set_rgba(x, y, rgba.rgba_at(x, y).unwrap());
        }
    }

    let boundary = BeautyBoundary::new();
    let params = BeautyParams::from_intensity(0.6);
    let mut rgba_out = rgba.clone();
    let mut bgra_out = bgra.clone();
    boundary.process(&mut rgba_out, &params).unwrap();
    boundary.process(&mut bgra_out, &params).unwrap();

    for y in 0..64 {
        for x in 0..64 {
            assert_eq!(rgba_out.rgba_at(x, y), bgra_out.rgba_at(x, y));
        }
    }
}

#[test]
fn process_failure_leaves_frame_intact() {
    let boundary = BeautyBoundary::new();
    let mut frame = Frame::solid(4096, 32, BLUE);
    let before = frame.data.clone();
    let err = boundary
        .process(&mut frame, &BeautyParams::from_intensity(1.0))
        .unwrap_err();
    assert!(err.is_size_error());
    assert_eq!(frame.data, before);
}
