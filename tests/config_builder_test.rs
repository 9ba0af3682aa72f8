//! Tests for the type-safe configuration builder pattern.

use national_treasure::AppConfig;

#[test]
fn builder_requires_database_path_and_archive_dir() {
    let config = AppConfig::builder()
        .database_path("/tmp/national-treasure-test.db")
        .archive_dir("/tmp/national-treasure-test-archive")
        .build()
        .expect("both required fields are set");

    assert_eq!(config.database_path().to_str(), Some("/tmp/national-treasure-test.db"));
    assert_eq!(
        config.archive_dir().to_str(),
        Some("/tmp/national-treasure-test-archive")
    );
}

#[test]
fn builder_applies_defaults_for_unset_tuning_fields() {
    let config = AppConfig::builder()
        .database_path("/tmp/a.db")
        .archive_dir("/tmp/a-archive")
        .build()
        .unwrap();

    let default_config = AppConfig::default();
    assert_eq!(config.worker_pool_size(), default_config.worker_pool_size());
    assert_eq!(config.max_attempts(), default_config.max_attempts());
    assert_eq!(config.exploration_threshold(), default_config.exploration_threshold());
}

#[test]
fn builder_overrides_are_reflected_in_getters() {
    let config = AppConfig::builder()
        .database_path("/tmp/b.db")
        .archive_dir("/tmp/b-archive")
        .worker_pool_size(8)
        .max_attempts(5)
        .navigation_timeout_ms(5_000)
        .build()
        .unwrap();

    assert_eq!(config.worker_pool_size(), 8);
    assert_eq!(config.max_attempts(), 5);
    assert_eq!(config.navigation_timeout(), std::time::Duration::from_millis(5_000));
}

#[test]
fn fingerprint_dir_nests_under_archive_dir() {
    let config = AppConfig::builder()
        .database_path("/tmp/c.db")
        .archive_dir("/tmp/c-archive")
        .build()
        .unwrap();

    let dir = config.fingerprint_dir("abc123");
    assert_eq!(dir, std::path::PathBuf::from("/tmp/c-archive/abc123"));
}
