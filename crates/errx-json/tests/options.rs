use std::fs;

use errx_core::Error;
use errx_json::{ErrorKind, SerializeOptions};
use pretty_assertions::assert_eq;

#[test]
fn test_load_options_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errx.toml");
    fs::write(&path, "max_depth = 2\ninclude_standard_errors = false\n").unwrap();

    let options = SerializeOptions::from_path(&path).unwrap();
    assert_eq!(
        options,
        SerializeOptions::default()
            .with_max_depth(2)
            .with_include_standard_errors(false)
    );

    let err = Error::msg("inner").context("outer");
    let tree = errx_json::to_serialized(&err, options).unwrap();
    assert!(tree.cause.is_none());
}

#[test]
fn test_invalid_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errx.toml");
    fs::write(&path, "max_depth = -1\n").unwrap();

    let err = SerializeOptions::from_path(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(err
        .context()
        .iter()
        .any(|(key, value)| *key == "path" && value.ends_with("errx.toml")));
}
