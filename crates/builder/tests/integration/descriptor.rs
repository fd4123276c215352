//! Descriptor construction, loading and `describe`

use super::support::nagaconda_metadata;
use pkgdesc_builder::{PackageDescriptor, PackageMetadata, PhaseActions};
use pkgdesc_errors::{BuildError, Error};
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_describe_nagaconda_unmodified() {
    let metadata = PackageMetadata::new("NagAconda", "0.1", "1")
        .with_vendor("Shaun Thomas")
        .with_url("http://www.bonesmoses.org/NagAconda")
        .with_license("BSD")
        .with_summary("Python Nagios plugin library")
        .with_description("NagAconda is a Python Nagios wrapper.");

    let descriptor = PackageDescriptor::new(metadata, PhaseActions::setuptools()).unwrap();
    let described = descriptor.describe();

    assert_eq!(described.name, "NagAconda");
    assert_eq!(described.version, "0.1");
    assert_eq!(described.release, "1");
}

#[test]
fn test_missing_metadata_is_rejected() {
    let metadata = nagaconda_metadata().with_vendor("");
    let err = PackageDescriptor::new(metadata, PhaseActions::setuptools()).unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::MissingMetadata { ref field }) if field == "vendor"
    ));
}

#[tokio::test]
async fn test_from_file_round_trips_metadata() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[package]
name = "NagAconda"
version = "0.1.4b2"
release = "3"
vendor = "Shaun Thomas"
url = "http://www.bonesmoses.org/NagAconda"
license = "BSD"
summary = "Python Nagios plugin library"
description = """
NagAconda is a Python Nagios wrapper.
It handles option parsing and threshold checks."""
requires = ["python3"]

[manifest]
file = "files.lst"
"#
    )
    .unwrap();

    let descriptor = PackageDescriptor::from_file(file.path()).await.unwrap();
    assert_eq!(descriptor.describe().version, "0.1.4b2");
    assert_eq!(descriptor.describe().requires, vec!["python3".to_string()]);
    assert!(descriptor.describe().description.contains("threshold checks"));
    assert_eq!(descriptor.manifest_file(), "files.lst");
    assert_eq!(descriptor.actions(), &PhaseActions::setuptools());
}

#[test]
fn test_demo_descriptor_parses() {
    let descriptor =
        PackageDescriptor::from_toml(include_str!("../../../../demos/NagAconda.toml")).unwrap();
    let metadata = descriptor.describe();
    assert_eq!(metadata.name, "NagAconda");
    assert_eq!(metadata.author_email.as_deref(), Some("shaun@bonesmoses.org"));
    assert_eq!(metadata.requires, vec!["Sphinx".to_string()]);
    assert_eq!(descriptor.variables()["PYTHON"], "python3");
    assert_eq!(
        descriptor.actions().prepare,
        PhaseActions::setuptools().prepare
    );
}

#[tokio::test]
async fn test_from_file_missing_path() {
    let err = PackageDescriptor::from_file(std::path::Path::new("/nonexistent/pkg.toml"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ._:/-]{0,30}"
}

proptest! {
    #[test]
    fn prop_describe_returns_input(
        name in field(),
        version in field(),
        release in field(),
        vendor in field(),
        url in field(),
        license in field(),
        summary in field(),
        description in field(),
    ) {
        let metadata = PackageMetadata::new(name, version, release)
            .with_vendor(vendor)
            .with_url(url)
            .with_license(license)
            .with_summary(summary)
            .with_description(description);

        let descriptor = PackageDescriptor::new(metadata.clone(), PhaseActions::setuptools()).unwrap();
        prop_assert_eq!(descriptor.describe(), &metadata);
    }
}
