use pretty_assertions::assert_eq;
use std::time::Duration;
use urlsync_codec::ArrayFormat;
use urlsync_engine::{SyncError, SyncOptions};

#[test]
fn defaults() {
    let options = SyncOptions::default();
    assert!(options.exclude.is_empty());
    assert_eq!(options.debounce(), Duration::from_secs(1));
    assert_eq!(options.array_format, ArrayFormat::Repeated);
}

#[test]
fn legacy_preset() {
    let options = SyncOptions::legacy();
    assert_eq!(options.debounce_ms, 500);
    assert_eq!(options.array_format, ArrayFormat::joined());
}

#[test]
fn from_json_fills_missing_fields() {
    let options = SyncOptions::from_json(r#"{"exclude": ["token"], "debounce_ms": 250}"#).unwrap();
    assert_eq!(
        options,
        SyncOptions::default()
            .with_exclude(["token"])
            .with_debounce_ms(250)
    );
    assert!(options.is_excluded("token"));
    assert!(!options.is_excluded("page"));
}

#[test]
fn from_json_reads_array_format() {
    let options =
        SyncOptions::from_json(r#"{"array_format": {"mode": "joined", "separator": "~"}}"#).unwrap();
    assert_eq!(
        options.array_format,
        ArrayFormat::Joined {
            separator: "~".into()
        }
    );
}

#[test]
fn invalid_json_is_a_config_error() {
    let err = SyncOptions::from_json(r#"{"debounce_ms": "soon"}"#).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}
