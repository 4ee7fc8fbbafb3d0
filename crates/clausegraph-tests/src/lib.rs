//! Shared fixtures for the integration suites under `tests/`.

use std::path::PathBuf;

/// Absolute path of a file in `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub const SUPPLY_AGREEMENT: &str = include_str!("../tests/fixtures/supply_agreement.txt");
