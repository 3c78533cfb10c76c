//! Settings parsing from an environment lookup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal_macros::dec;
use stock_ledger::config::{ConfigError, Settings, StorageBackend};

fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn defaults_apply_with_only_jwt_secret() {
    let s = settings(&[("JWT_SECRET", "s3cret")]).unwrap();

    assert_eq!(s.bind_addr, "0.0.0.0:3000");
    assert_eq!(s.storage, StorageBackend::Memory);
    assert_eq!(s.jwt_secret, b"s3cret".to_vec());
    assert_eq!(s.starting_balance, dec!(100000));
    assert_eq!(s.io_timeout, Duration::from_millis(5000));
    assert!(s.admin.is_none());

    let ledger = s.ledger_config();
    assert_eq!(ledger.starting_balance, dec!(100000));
}

#[test]
fn missing_or_blank_jwt_secret_is_an_error() {
    assert!(matches!(settings(&[]), Err(ConfigError::Missing("JWT_SECRET"))));
    assert!(matches!(
        settings(&[("JWT_SECRET", "   ")]),
        Err(ConfigError::Missing("JWT_SECRET"))
    ));
}

#[test]
fn database_url_wins_over_data_dir() {
    let s = settings(&[
        ("JWT_SECRET", "x"),
        ("DATABASE_URL", "postgres://localhost/ledger"),
        ("LEDGER_DATA_DIR", "/var/lib/ledger"),
    ])
    .unwrap();
    assert_eq!(
        s.storage,
        StorageBackend::Postgres("postgres://localhost/ledger".to_string())
    );

    let s = settings(&[("JWT_SECRET", "x"), ("LEDGER_DATA_DIR", "/var/lib/ledger")]).unwrap();
    assert_eq!(
        s.storage,
        StorageBackend::Directory(PathBuf::from("/var/lib/ledger"))
    );
}

#[test]
fn numeric_settings_are_validated() {
    let s = settings(&[
        ("JWT_SECRET", "x"),
        ("STARTING_BALANCE", "2500.75"),
        ("IO_TIMEOUT_MS", "250"),
    ])
    .unwrap();
    assert_eq!(s.starting_balance, dec!(2500.75));
    assert_eq!(s.io_timeout, Duration::from_millis(250));

    for (name, value) in [
        ("STARTING_BALANCE", "-1"),
        ("STARTING_BALANCE", "lots"),
        ("IO_TIMEOUT_MS", "0"),
        ("IO_TIMEOUT_MS", "-5"),
    ] {
        let result = settings(&[("JWT_SECRET", "x"), (name, value)]);
        assert!(
            matches!(result, Err(ConfigError::Invalid { name: n, .. }) if n == name),
            "{name}={value}"
        );
    }
}

#[test]
fn admin_seed_needs_email_and_password() {
    let s = settings(&[
        ("JWT_SECRET", "x"),
        ("ADMIN_EMAIL", "admin@example.com"),
        ("ADMIN_PASSWORD", "admin-pass"),
    ])
    .unwrap();
    let admin = s.admin.unwrap();
    assert_eq!(admin.email, "admin@example.com");
    assert_eq!(admin.name, "Admin");

    assert!(matches!(
        settings(&[("JWT_SECRET", "x"), ("ADMIN_EMAIL", "admin@example.com")]),
        Err(ConfigError::Missing("ADMIN_PASSWORD"))
    ));
}
