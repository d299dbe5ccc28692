//! End-to-end behavior of the processing pipeline through the public API.
//!
//! Run with: cargo test --test pipeline

use photo_resizer::buffer::{PixelBuffer, SourceImage};
use photo_resizer::config::UploadConfig;
use photo_resizer::export::{ExportOptions, RustEncoder, export_image};
use photo_resizer::imaging::{
    ExportFormat, ImagingError, ProcessingParams, Quality, ResizeMode, process,
};
use photo_resizer::upload::load_upload;

const WHITE: [u8; 4] = [255, 255, 255, 255];

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    SourceImage::new(PixelBuffer::filled(width, height, rgba).unwrap())
}

fn gradient(width: u32, height: u32) -> SourceImage {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            buf.put_pixel(
                x,
                y,
                [
                    (x * 255 / (width - 1)) as u8,
                    (y * 255 / (height - 1)) as u8,
                    ((x * 31 + y * 17) % 256) as u8,
                    255,
                ],
            );
        }
    }
    SourceImage::new(buf)
}

fn corners(buf: &PixelBuffer) -> [[u8; 4]; 4] {
    let (w, h) = buf.dimensions();
    [
        buf.pixel(0, 0),
        buf.pixel(w - 1, 0),
        buf.pixel(0, h - 1),
        buf.pixel(w - 1, h - 1),
    ]
}

// =============================================================================
// No-op and determinism
// =============================================================================

#[test]
fn noop_params_at_source_size_are_identity() {
    let source = gradient(37, 23);
    let result = process(&source, &ProcessingParams::for_source(37, 23)).unwrap();
    assert_eq!(result.buffer(), source.pixels());
}

#[test]
fn same_inputs_give_identical_bytes() {
    let source = gradient(50, 30);
    let params = ProcessingParams {
        resize_mode: ResizeMode::Contain,
        brightness: -15,
        contrast: 40,
        saturation: 25,
        sharpen: 60,
        smoothing: 20,
        ..ProcessingParams::for_source(33, 41)
    };
    let first = process(&source, &params).unwrap();
    let second = process(&source, &params).unwrap();
    assert_eq!(first.buffer().as_raw(), second.buffer().as_raw());
}

// =============================================================================
// Resize geometry
// =============================================================================

#[test]
fn contain_with_matching_ratio_has_no_padding() {
    let source = solid(400, 200, [200, 30, 30, 255]);
    let result = process(&source, &ProcessingParams::for_source(200, 100)).unwrap();
    assert_eq!((result.width(), result.height()), (200, 100));
    assert!(result.buffer().pixels().all(|p| p != WHITE));
}

#[test]
fn contain_pads_with_white() {
    let source = solid(400, 100, [0, 0, 200, 255]);
    let result = process(&source, &ProcessingParams::for_source(100, 100)).unwrap();
    // 4:1 into a square leaves bands above and below.
    assert_eq!(result.buffer().pixel(50, 0), WHITE);
    assert_eq!(result.buffer().pixel(50, 99), WHITE);
    assert_eq!(result.buffer().pixel(50, 50), [0, 0, 200, 255]);
}

#[test]
fn cover_always_has_target_dimensions() {
    let source = gradient(300, 40);
    for (w, h) in [(1, 1), (7, 300), (300, 7), (64, 64), (601, 80)] {
        let params = ProcessingParams {
            resize_mode: ResizeMode::Cover,
            ..ProcessingParams::for_source(w, h)
        };
        let result = process(&source, &params).unwrap();
        assert_eq!((result.width(), result.height()), (w, h));
    }
}

#[test]
fn cover_crops_where_contain_pads() {
    let source = solid(400, 100, [0, 0, 200, 255]);
    let contain = process(&source, &ProcessingParams::for_source(100, 100)).unwrap();
    let cover = process(
        &source,
        &ProcessingParams {
            resize_mode: ResizeMode::Cover,
            ..ProcessingParams::for_source(100, 100)
        },
    )
    .unwrap();

    let contain_corners = corners(contain.buffer());
    let cover_corners = corners(cover.buffer());
    for (c, v) in contain_corners.iter().zip(&cover_corners) {
        assert_ne!(c, v);
    }
    assert!(cover_corners.iter().all(|&p| p == [0, 0, 200, 255]));
}

#[test]
fn zero_target_dimensions_fail_fast() {
    let source = gradient(8, 8);
    for (w, h) in [(0, 8), (8, 0), (0, 0)] {
        let err = process(&source, &ProcessingParams::for_source(w, h)).unwrap_err();
        let ImagingError::InvalidDimensions { width, height } = err else {
            panic!("expected InvalidDimensions, got {err:?}");
        };
        assert_eq!((width, height), (w, h));
    }
}

// =============================================================================
// Color adjustment
// =============================================================================

#[test]
fn full_desaturation_is_grayscale() {
    let source = gradient(24, 16);
    let params = ProcessingParams {
        saturation: -100,
        ..ProcessingParams::for_source(24, 16)
    };
    let result = process(&source, &params).unwrap();
    for p in result.buffer().pixels() {
        let (r, g, b) = (i16::from(p[0]), i16::from(p[1]), i16::from(p[2]));
        assert!((r - g).abs() <= 1 && (g - b).abs() <= 1, "not gray: {p:?}");
    }
}

#[test]
fn tone_steps_run_brightness_contrast_saturation() {
    let source = solid(3, 3, [100, 60, 20, 255]);
    let params = ProcessingParams {
        brightness: 20,
        contrast: 50,
        saturation: 50,
        ..ProcessingParams::for_source(3, 3)
    };
    let result = process(&source, &params).unwrap();
    assert!(result.buffer().pixels().all(|p| p == [186, 97, 8, 255]));
}

#[test]
fn brightened_white_stays_white() {
    let source = solid(4, 4, WHITE);
    let params = ProcessingParams {
        width: 4,
        height: 4,
        resize_mode: ResizeMode::Contain,
        brightness: 50,
        ..ProcessingParams::default()
    };
    let result = process(&source, &params).unwrap();
    assert!(result.buffer().pixels().all(|p| p == WHITE));
}

// =============================================================================
// Convolution
// =============================================================================

#[test]
fn sharpening_flat_gray_changes_nothing() {
    let source = solid(10, 10, [128, 128, 128, 255]);
    let params = ProcessingParams {
        sharpen: 100,
        ..ProcessingParams::for_source(10, 10)
    };
    let result = process(&source, &params).unwrap();
    assert!(result.buffer().pixels().all(|p| p == [128, 128, 128, 255]));
}

#[test]
fn filters_keep_the_border_ring() {
    let source = gradient(12, 9);
    let params = ProcessingParams {
        sharpen: 80,
        smoothing: 50,
        ..ProcessingParams::for_source(12, 9)
    };
    let result = process(&source, &params).unwrap();
    let (before, after) = (source.pixels(), result.buffer());
    for x in 0..12 {
        assert_eq!(before.pixel(x, 0), after.pixel(x, 0));
        assert_eq!(before.pixel(x, 8), after.pixel(x, 8));
    }
    for y in 0..9 {
        assert_eq!(before.pixel(0, y), after.pixel(0, y));
        assert_eq!(before.pixel(11, y), after.pixel(11, y));
    }
    assert_ne!(before, after);
}

// =============================================================================
// Upload → process → export
// =============================================================================

#[test]
fn upload_process_export_round_trip() {
    let original = gradient(40, 20);
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(original.pixels().to_rgba_image())
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let upload = load_upload("sunset.png", "image/png", &png, &UploadConfig::default()).unwrap();
    assert_eq!((upload.metadata.width, upload.metadata.height), (40, 20));

    let mut params = ProcessingParams::for_source(40, 20);
    params.set_width(20, upload.source.dimensions());
    assert_eq!((params.width, params.height), (20, 10));

    let result = process(&upload.source, &params).unwrap();
    let options = ExportOptions {
        format: ExportFormat::Jpeg,
        quality: Quality::new(85),
    };
    let file = export_image(&RustEncoder::new(), &result, "sunset.png", &options).unwrap();
    assert_eq!(file.filename, "sunset-processed.jpg");
    assert_eq!(file.mime_type, "image/jpeg");

    let decoded = image::load_from_memory(&file.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 10));
}
