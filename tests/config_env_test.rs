//! Environment variable overrides for Settings.
//!
//! Kept in its own test binary: it mutates process environment.

use std::fs;

use tempfile::TempDir;

use costtree::config::Settings;

#[test]
fn given_env_vars_when_load_then_they_override_config_files() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("local.toml");
    fs::write(
        &explicit,
        r#"
companies_source = "https://file.example.com/companies"
timeout_secs = 10
"#,
    )
    .unwrap();
    std::env::set_var("COSTTREE_COMPANIES_SOURCE", "https://env.example.com/companies");
    std::env::set_var("COSTTREE_TIMEOUT_SECS", "3");
    std::env::set_var("COSTTREE_PARALLEL", "true");

    // Act
    let settings = Settings::load_layers(None, Some(&explicit));

    std::env::remove_var("COSTTREE_COMPANIES_SOURCE");
    std::env::remove_var("COSTTREE_TIMEOUT_SECS");
    std::env::remove_var("COSTTREE_PARALLEL");

    // Assert
    let settings = settings.expect("load settings");
    assert_eq!(settings.companies_source, "https://env.example.com/companies");
    assert_eq!(settings.timeout_secs, 3);
    assert!(settings.parallel);
}
