//! Architecture boundary tests: run with `cargo test -p firmware --test arch_boundaries`
// Architecture test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
//!
//! Layering rules:
//!   Rule 1: platform (HAL) depends on neither sensing nor firmware
//!   Rule 2: sensing (signal chain) depends on platform only, never on firmware
//!           or any embassy crate
//!   Rule 3: firmware library code is free of blocking std primitives
//!
//! Rules 1 and 2 are read from the member manifests; a violation would also
//! show up as a cycle when building this test binary.

const PLATFORM_TOML: &str = include_str!("../../platform/Cargo.toml");
const SENSING_TOML: &str = include_str!("../../sensing/Cargo.toml");
const FIRMWARE_TOML: &str = include_str!("../Cargo.toml");

/// Dependency table of a manifest, without dev-dependencies.
fn runtime_deps(manifest: &str) -> &str {
    let start = manifest.find("[dependencies]").unwrap();
    let rest = &manifest[start..];
    match rest.find("[dev-dependencies]") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Dev-dependency table of a manifest.
fn dev_deps(manifest: &str) -> &str {
    let start = manifest.find("[dev-dependencies]").unwrap();
    let rest = &manifest[start..];
    match rest.find("[features]") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

#[test]
fn platform_is_the_bottom_layer() {
    let deps = runtime_deps(PLATFORM_TOML);
    assert!(!deps.contains("sensing"), "platform must not depend on sensing");
    assert!(!deps.contains("firmware"), "platform must not depend on firmware");
}

#[test]
fn sensing_has_no_runtime_or_firmware_dependency() {
    let deps = runtime_deps(SENSING_TOML);
    assert!(deps.contains("platform"));
    assert!(!deps.contains("firmware"), "sensing must not depend on firmware");
    assert!(
        !deps.contains("embassy"),
        "sensing must stay executor-agnostic; synchronisation lives in firmware"
    );
}

/// Test-only crates stay out of the firmware image.
#[test]
fn firmware_links_no_test_only_crates() {
    let deps = runtime_deps(FIRMWARE_TOML);
    assert!(!deps.contains("embassy-futures"), "select() is only used by tests");
    assert!(dev_deps(FIRMWARE_TOML).contains("embassy-futures"));
}

/// Host tests use MockDelay; embassy-time comes in only with a target feature.
#[test]
fn host_tests_do_not_pull_a_time_driver() {
    assert!(!dev_deps(FIRMWARE_TOML).contains("embassy-time"));
}

/// Collaborator traits are reachable without any firmware type.
#[test]
fn platform_traits_are_independent() {
    fn _assert_alert<T: platform::AlertOutput>() {}
    fn _assert_display<T: platform::ResultDisplay>() {}
    _assert_alert::<platform::mocks::MockAlertOutput>();
    _assert_display::<platform::mocks::MockDisplay>();
}

/// Shared state is `Sync`, so a `static PipelineContext` is sound.
#[test]
fn pipeline_state_is_shareable() {
    fn assert_sync<T: Sync>() {}
    assert_sync::<firmware::PipelineContext>();
    assert_sync::<firmware::AcquisitionBuffer>();
}

#[test]
fn library_code_uses_no_blocking_std_sync() {
    let sources = [
        include_str!("../src/shared.rs"),
        include_str!("../src/pipeline.rs"),
        include_str!("../src/mailbox.rs"),
        include_str!("../src/alert.rs"),
        include_str!("../src/tasks/signal.rs"),
        include_str!("../src/tasks/ui.rs"),
        include_str!("../src/tasks/audio.rs"),
    ];
    for source in sources {
        assert!(!source.contains("std::sync::Mutex"));
        assert!(!source.contains("std::thread"));
    }
}
