//! Artifact creation from the install manifest

use super::support::{nagaconda, nagaconda_metadata, FakeRunner, Workspace, THREE_FILES};
use pkgdesc_builder::{
    BuildConfig, FileManifest, LifecyclePhase, PackageArtifact, PackageDescriptor, PhaseActions,
};
use pkgdesc_errors::{BuildError, Error};
use pkgdesc_hash::Hash;
use pkgdesc_manifest::PackageManifest;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

async fn installed(ws: &Workspace, descriptor: &PackageDescriptor) -> pkgdesc_builder::BuildEnv {
    let mut env = ws.env_with(Arc::new(FakeRunner::installing(&THREE_FILES)));
    for phase in LifecyclePhase::SEQUENCE {
        descriptor.run_phase(phase, &mut env).await.unwrap();
    }
    env
}

/// Decompress an artifact and return `(path, contents)` for every entry
fn read_artifact(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = std::fs::File::open(path).unwrap();
    let decoder = zstd::stream::read::Decoder::new(file).unwrap();
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().display().to_string();
            let mut body = Vec::new();
            entry.read_to_end(&mut body).unwrap();
            (name, body)
        })
        .collect()
}

#[tokio::test]
async fn test_empty_manifest_is_rejected() {
    let ws = Workspace::new();
    let env = ws.env_with(Arc::new(FakeRunner::default()));

    let err = nagaconda()
        .package_with_manifest(&FileManifest::new(), &env)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Build(BuildError::ManifestEmpty)));
}

#[tokio::test]
async fn test_packaging_requires_install() {
    let ws = Workspace::new();
    let env = ws.env_with(Arc::new(FakeRunner::default()));

    let err = nagaconda()
        .package_with_manifest(&FileManifest::from_paths(THREE_FILES), &env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseOutOfOrder { ref required, .. }) if required == "install"
    ));
}

#[tokio::test]
async fn test_three_file_manifest_produces_artifact() {
    let ws = Workspace::new();
    let descriptor = nagaconda();
    let mut env = installed(&ws, &descriptor).await;
    let manifest = env.take_manifest();
    assert_eq!(manifest.len(), 3);

    let PackageArtifact {
        path,
        hash,
        size,
        file_count,
    } = descriptor.package_with_manifest(&manifest, &env).await.unwrap();

    assert_eq!(path, ws.output_dir().join("NagAconda-0.1.4-1.noarch.tar.zst"));
    assert_eq!(file_count, 3);
    assert!(size > 0);
    assert_eq!(hash, Hash::hash_file(&path).await.unwrap());

    let entries = read_artifact(&path);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "manifest.toml",
            "usr/lib/python3/site-packages/NagAconda/__init__.py",
            "usr/lib/python3/site-packages/NagAconda/plugin.py",
            "usr/share/doc/NagAconda/README",
        ]
    );

    let embedded = toml::from_str::<PackageManifest>(std::str::from_utf8(&entries[0].1).unwrap()).unwrap();
    embedded.validate().unwrap();
    assert_eq!(embedded.package.name, "NagAconda");
    assert_eq!(embedded.files.len(), 3);
    assert_eq!(
        entries[3].1,
        b"contents of /usr/share/doc/NagAconda/README\n".to_vec()
    );

    // The temporary tar is gone; only the artifact remains
    let leftovers: Vec<_> = std::fs::read_dir(ws.output_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[tokio::test]
async fn test_identical_input_gives_identical_artifact() {
    let ws = Workspace::new();
    let descriptor = nagaconda();
    let env = installed(&ws, &descriptor).await;
    let manifest = env.manifest().clone();

    let first = descriptor.package_with_manifest(&manifest, &env).await.unwrap();
    let second_env = env.clone().with_output_dir(ws.path().join("out2"));
    let second = descriptor
        .package_with_manifest(&manifest, &second_env)
        .await
        .unwrap();

    assert_eq!(first.hash, second.hash);
    assert_eq!(first.size, second.size);
}

#[tokio::test]
async fn test_manifest_entry_outside_build_root() {
    let ws = Workspace::new();
    let descriptor = nagaconda();
    let env = installed(&ws, &descriptor).await;

    let manifest = FileManifest::from_paths(["/usr/share/doc/NagAconda/README", "/../secret"]);
    let err = descriptor
        .package_with_manifest(&manifest, &env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ManifestPathInvalid { ref path, .. }) if path == "/../secret"
    ));
}

#[tokio::test]
async fn test_manifest_entry_missing_from_build_root() {
    let ws = Workspace::new();
    let descriptor = nagaconda();
    let env = installed(&ws, &descriptor).await;

    let mut manifest = env.manifest().clone();
    manifest.push("/usr/bin/nagaconda-check");
    let err = descriptor
        .package_with_manifest(&manifest, &env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ManifestPathInvalid { ref path, .. })
            if path == "/usr/bin/nagaconda-check"
    ));
}

#[tokio::test]
async fn test_normalized_duplicates_are_packaged_once() {
    let ws = Workspace::new();
    let descriptor = nagaconda();
    let env = installed(&ws, &descriptor).await;

    let manifest = FileManifest::from_paths([
        "/usr/share/doc/NagAconda/README",
        "usr/share/doc/NagAconda/README",
        "/usr/share//doc/NagAconda/./README",
    ]);
    assert_eq!(manifest.len(), 3);

    let artifact = descriptor
        .package_with_manifest(&manifest, &env)
        .await
        .unwrap();
    assert_eq!(artifact.file_count, 1);

    let names: Vec<String> = read_artifact(&artifact.path)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["manifest.toml", "usr/share/doc/NagAconda/README"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_entry_through_symlinked_directory_is_rejected() {
    let ws = Workspace::new();
    let outside = ws.path().join("outside");
    std::fs::create_dir_all(&outside).unwrap();
    std::fs::write(outside.join("secret.txt"), "not packaged\n").unwrap();

    let install = format!(
        concat!(
            r#"mkdir -p "${{BUILD_ROOT}}/usr" && "#,
            r#"ln -s '{}' "${{BUILD_ROOT}}/usr/link" && "#,
            r#"echo /usr/link/secret.txt > "${{MANIFEST_FILE}}""#
        ),
        outside.display()
    );
    let descriptor = PackageDescriptor::new(
        nagaconda_metadata(),
        PhaseActions::setuptools()
            .with_action(LifecyclePhase::Prepare, r#"mkdir -p "${SOURCE_DIR}""#)
            .with_action(LifecyclePhase::Build, "true")
            .with_action(LifecyclePhase::Install, install),
    )
    .unwrap();

    let mut env = BuildConfig::default()
        .with_output_dir(ws.output_dir())
        .environment(ws.build_root(), ws.work_dir());
    for phase in LifecyclePhase::SEQUENCE {
        descriptor.run_phase(phase, &mut env).await.unwrap();
    }

    let manifest = env.take_manifest();
    let err = descriptor
        .package_with_manifest(&manifest, &env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ManifestPathInvalid { ref path, ref reason })
            if path == "/usr/link/secret.txt" && reason.contains("outside")
    ));
    assert!(!ws
        .output_dir()
        .join("NagAconda-0.1.4-1.noarch.tar.zst")
        .exists());
}
