//! End-to-end coupon-validation scenarios against real gzip fixtures on
//! disk, one per testable property.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use foodhub_core::{Validator, ValidationError};

fn write_gz(path: &Path, lines: &[&str]) {
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    encoder.finish().unwrap();
}

#[tokio::test]
async fn s1_single_file_not_in_enough_files() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(&dir.path().join("a.gz"), &["ABCDEFGH"]);

    let (validator, error) = Validator::new(dir.path()).await;
    assert!(error.is_none());

    assert_eq!(
        validator.validate("ABCDEFGH"),
        Err(ValidationError::NotDistinctEnough)
    );
    assert_eq!(validator.validate("NOPE1234"), Err(ValidationError::InvalidCode));
}

#[tokio::test]
async fn s2_two_files_shared_code_succeeds_lone_code_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(&dir.path().join("a.gz"), &["ABCDEFGH"]);
    write_gz(&dir.path().join("b.gz"), &["ABCDEFGH", "XYZXYZXY"]);

    let (validator, error) = Validator::new(dir.path()).await;
    assert!(error.is_none());

    assert_eq!(validator.validate("ABCDEFGH"), Ok(()));
    assert_eq!(
        validator.validate("XYZXYZXY"),
        Err(ValidationError::NotDistinctEnough)
    );
}

#[tokio::test]
async fn s3_empty_directory_rejects_every_code() {
    let dir = tempfile::tempdir().unwrap();

    let (validator, error) = Validator::new(dir.path()).await;
    assert!(error.is_none());
    assert!(validator.is_ready());

    assert_eq!(validator.validate("WELLFORMD"), Err(ValidationError::InvalidCode));
}

#[tokio::test]
async fn s4_length_boundaries_are_format_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (validator, _) = Validator::new(dir.path()).await;

    assert_eq!(validator.validate("ABCDEFG"), Err(ValidationError::InvalidFormat)); // 7
    assert_eq!(
        validator.validate("ABCDEFGHIJK"),
        Err(ValidationError::InvalidFormat)
    ); // 11
}

#[tokio::test]
async fn s5_whitespace_and_blank_lines_are_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    write_gz(&dir.path().join("a.gz"), &["  ABCDEFGH  ", ""]);
    write_gz(&dir.path().join("b.gz"), &["ABCDEFGH"]);

    let (validator, error) = Validator::new(dir.path()).await;
    assert!(error.is_none());

    assert_eq!(validator.validate("ABCDEFGH"), Ok(()));
}

// S6 (partial load on cancellation) is exercised at the loader's own unit
// test layer (`src/promo/loader.rs`), since only the `Validator::new`
// entry point is public from outside the crate and it fixes the load
// deadline at 120s — too long to exercise a real timeout in a test.
