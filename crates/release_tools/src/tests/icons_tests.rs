use super::*;
use image::GenericImageView;

const RED: Rgba<u8> = Rgba([0xff, 0x00, 0x00, 0xff]);

fn wide_source() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 100, RED))
}

#[test]
fn variant_set_covers_every_target() {
    let variants = icon_variants();
    assert_eq!(variants.len(), ICON_SIZES.len() + MASKABLE_SIZES.len() + 1);

    let names: Vec<String> = variants.iter().map(IconVariant::file_name).collect();
    assert!(names.contains(&"icon-16x16.png".to_string()));
    assert!(names.contains(&"icon-512x512.png".to_string()));
    assert!(names.contains(&"icon-192x192-maskable.png".to_string()));
    assert!(names.contains(&"apple-touch-icon.png".to_string()));
}

#[test]
fn contain_fit_letterboxes_on_background() {
    let icon = render_icon(
        &wide_source(),
        IconVariant {
            kind: IconKind::Standard,
            size: 96,
        },
    );

    assert_eq!(icon.dimensions(), (96, 96));
    assert_eq!(*icon.get_pixel(48, 48), RED);
    assert_eq!(*icon.get_pixel(48, 2), BACKGROUND);
    assert_eq!(*icon.get_pixel(48, 93), BACKGROUND);
}

#[test]
fn transparent_artwork_stays_transparent() {
    let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 0])));
    let icon = render_icon(
        &clear,
        IconVariant {
            kind: IconKind::Standard,
            size: 96,
        },
    );

    assert_eq!(icon.get_pixel(48, 48)[3], 0);
    assert_eq!(*icon.get_pixel(48, 2), BACKGROUND);
}

#[test]
fn maskable_icons_keep_artwork_inside_safe_zone() {
    let square = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, RED));
    let icon = render_icon(
        &square,
        IconVariant {
            kind: IconKind::Maskable,
            size: 100,
        },
    );

    assert_eq!(*icon.get_pixel(50, 50), RED);
    assert_eq!(*icon.get_pixel(5, 50), BACKGROUND);
    assert_eq!(*icon.get_pixel(12, 50), RED);
    assert_eq!(*icon.get_pixel(94, 94), BACKGROUND);
}

#[test]
fn generates_every_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("logo.png");
    wide_source().save(&source).expect("write source");
    let out_dir = dir.path().join("icons");

    let report = generate_icons(&source, &out_dir).expect("generate");
    assert!(report.failed.is_empty());
    assert_eq!(report.written.len(), icon_variants().len());

    let apple = image::open(out_dir.join("apple-touch-icon.png")).expect("apple icon");
    assert_eq!(apple.dimensions(), (180, 180));
    let maskable = image::open(out_dir.join("icon-512x512-maskable.png")).expect("maskable");
    assert_eq!(maskable.dimensions(), (512, 512));
}

#[test]
fn undecodable_source_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = dir.path().join("logo.png");
    fs::write(&source, b"not an image").expect("write");

    let err = generate_icons(&source, &dir.path().join("icons")).expect_err("bad source");
    assert!(matches!(err, ReleaseToolError::Image { .. }));
}
