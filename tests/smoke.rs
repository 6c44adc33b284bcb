//! Basic smoke test to verify the public API surface.

#[test]
fn crate_compiles() {
    // If this test runs, the public re-exports are wired up.
    let _ = std::any::type_name::<license_sentinel::SentinelConfig>();
    let _ = std::any::type_name::<license_sentinel::SentinelError>();
    let _ = std::any::type_name::<license_sentinel::LicenseManager>();
    let _ = std::any::type_name::<license_sentinel::LicenseValidator>();
    let _ = std::any::type_name::<license_sentinel::RefreshScheduler>();
}

#[test]
fn fingerprint_is_stable_across_calls() {
    let a = license_sentinel::generate_fingerprint("app", "key", "org");
    let b = license_sentinel::generate_fingerprint("app", "key", "org");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
}
