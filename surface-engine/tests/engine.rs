use std::sync::Arc;
use std::thread;

use surface_engine::gl::{
    ColorModel, FormatId, OfferedFormat, PixelFormatRequest, SelectError, SelectionPath,
};
use surface_engine::os::{HeadlessPlatform, Platform};
use surface_engine::Engine;

fn format(id: u64) -> OfferedFormat {
    OfferedFormat {
        id: FormatId(id),
        render_capable: true,
        draw_to_window: true,
        color_model: ColorModel::Rgba,
        color_bits: 24,
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
        ..Default::default()
    }
}

#[test]
fn default_request_on_software_formats() {
    let engine = Engine::with_platform(Arc::new(HeadlessPlatform::software()));

    // no driver guess, so every format gets scored
    let selected = engine.choose_pixel_format(None).unwrap();
    assert_eq!(selected.path, SelectionPath::FullSearch);
    assert_eq!(selected.id(), FormatId(5));
    assert!(selected.format.double_buffer);
    assert_eq!(selected.format.depth_bits, 32);
}

#[test]
fn explicit_request_overrides_default() {
    let engine = Engine::with_platform(Arc::new(HeadlessPlatform::software()));
    let request = PixelFormatRequest {
        stencil_enabled: true,
        ..Default::default()
    };

    let selected = engine.choose_pixel_format(Some(&request)).unwrap();
    assert_eq!(selected.id(), FormatId(1));
    assert_eq!(selected.format.stencil_bits, 8);
}

#[test]
fn default_request_is_configurable() {
    let mut engine = Engine::with_platform(Arc::new(HeadlessPlatform::software()));
    engine.set_default_request(PixelFormatRequest {
        double_buffer: false,
        depth_enabled: false,
        direct_rendering: false,
        depth_bits: Some(0),
        ..Default::default()
    });
    assert_eq!(engine.default_request().depth_bits, None);

    // single buffered and no depth matches best; the two such formats tie and the earlier wins
    let selected = engine.choose_pixel_format(None).unwrap();
    assert_eq!(selected.path, SelectionPath::FullSearch);
    assert_eq!(selected.id(), FormatId(3));
    assert_eq!(selected.score, Some(15024));
}

#[test]
fn enumeration_order_alone_does_not_win() {
    let single = OfferedFormat {
        direct_rendering: true,
        ..format(0x21)
    };
    let double = OfferedFormat {
        direct_rendering: true,
        double_buffer: true,
        depth_bits: 24,
        ..format(0x22)
    };
    let engine = Engine::with_platform(Arc::new(HeadlessPlatform::new(vec![single, double])));

    let selected = engine.choose_pixel_format(None).unwrap();
    assert_eq!(selected.id(), FormatId(0x22));
    assert_eq!(selected.path, SelectionPath::FullSearch);
}

#[test]
fn platform_guess_takes_fast_path() {
    let guess = OfferedFormat {
        direct_rendering: true,
        ..format(0x21)
    };
    let double = OfferedFormat {
        direct_rendering: true,
        double_buffer: true,
        depth_bits: 24,
        ..format(0x22)
    };
    let engine =
        Engine::with_platform(Arc::new(HeadlessPlatform::new(vec![double]).with_guess(guess)));

    let selected = engine.choose_pixel_format(None).unwrap();
    assert_eq!(selected.id(), FormatId(0x21));
    assert_eq!(selected.path, SelectionPath::FastPath);
}

#[test]
fn no_formats_is_reported() {
    let engine = Engine::with_platform(Arc::new(HeadlessPlatform::new(Vec::new())));

    let error = engine.choose_pixel_format(None).unwrap_err();
    assert_eq!(
        error.downcast_ref::<SelectError>(),
        Some(&SelectError::NoCompatibleFormat { candidates: 0 })
    );
}

#[test]
fn bitmap_target_comes_from_platform() {
    let window = OfferedFormat {
        direct_rendering: true,
        ..format(1)
    };
    let bitmap = OfferedFormat {
        direct_rendering: true,
        bitmap_color_bits: 16,
        color_bits: 16,
        ..format(2)
    };
    let platform = HeadlessPlatform::new(vec![window, bitmap]).with_bitmap_color_bits(16);
    assert_eq!(platform.bitmap_color_bits(), 16);

    let engine = Engine::with_platform(Arc::new(platform));
    let selected = engine.choose_pixel_format(None).unwrap();
    assert_eq!(selected.id(), FormatId(2));
}

#[test]
fn selection_from_many_threads_agrees() {
    let candidates: Arc<Vec<OfferedFormat>> = Arc::new(
        (1..=16)
            .map(|id| OfferedFormat {
                double_buffer: id % 3 == 0,
                depth_bits: if id % 2 == 0 { 24 } else { 0 },
                stencil_bits: if id % 4 == 0 { 8 } else { 0 },
                ..format(id)
            })
            .collect(),
    );
    let request = PixelFormatRequest {
        stencil_enabled: true,
        ..Default::default()
    };
    let expected = surface_engine::gl::select(&request, &candidates).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let candidates = candidates.clone();
            let request = request.clone();
            thread::spawn(move || surface_engine::gl::select(&request, &candidates).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert_eq!(expected.id(), FormatId(12));
}
