use super::*;

#[test]
fn bundled_presets_parse() {
    let library = AnimationLibrary::from_json(BUNDLED_PRESETS).expect("bundled presets");
    assert_eq!(library.version(), "1");
    assert!(!library.is_empty());

    let modal = library.preset("modal-enter").expect("modal-enter");
    assert_eq!(modal.easing, Easing::Spring);
    assert_eq!(modal.keyframes.first().and_then(|frame| frame.scale), Some(0.95));
}

#[test]
fn rejects_presets_without_keyframes() {
    let raw = r#"{"version":"1","presets":[{"name":"empty","duration_ms":10,"easing":"linear","keyframes":[]}]}"#;
    let err = AnimationLibrary::from_json(raw).expect_err("empty keyframes");
    assert_eq!(err.module, "animations");
    assert!(err.reason.contains("empty"));
}

#[test]
fn rejects_out_of_range_offsets() {
    let raw = r#"{"version":"1","presets":[{"name":"wild","duration_ms":10,"easing":"linear","keyframes":[{"offset":1.5}]}]}"#;
    assert!(AnimationLibrary::from_json(raw).is_err());
}

#[test]
fn malformed_catalogue_is_a_load_error() {
    assert!(AnimationLibrary::from_json("{ not json").is_err());
}

#[tokio::test]
async fn process_wide_library_loads_once() {
    let library = animation_library();
    library.reset();

    let first = library.load().await.expect("load");
    let second = library.load().await.expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.preset("fade-in").is_some());

    let handle = library.handle();
    assert!(!handle.is_loading);
    assert!(handle.module.is_some());
}
