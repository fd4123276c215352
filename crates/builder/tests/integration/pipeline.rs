//! Full build pipeline, with the in-memory runner and with a real shell

use super::support::{nagaconda, nagaconda_metadata, FakeRunner, Workspace, THREE_FILES};
use pkgdesc_builder::{
    BuildConfig, BuildEnv, Builder, LifecyclePhase, PackageDescriptor, PackageMetadata,
    PhaseActions,
};
use pkgdesc_errors::{BuildError, Error};
use std::sync::Arc;

#[tokio::test]
async fn test_build_packages_and_cleans() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES));
    let mut env = ws.env_with(runner.clone());

    let result = Builder::new().build(&nagaconda(), &mut env).await.unwrap();

    assert!(result.artifact.path.exists());
    assert_eq!(result.artifact.file_count, 3);
    assert!(!ws.build_root().exists());
    assert_eq!(
        runner.calls(),
        vec![
            LifecyclePhase::Prepare,
            LifecyclePhase::Build,
            LifecyclePhase::Install,
            LifecyclePhase::Clean
        ]
    );
}

#[tokio::test]
async fn test_keep_build_root_skips_clean() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES));
    let mut env = ws.env_with(runner.clone());
    let builder = Builder::with_config(BuildConfig::default().with_keep_build_root(true));

    builder.build(&nagaconda(), &mut env).await.unwrap();

    assert!(ws
        .build_root()
        .join("usr/share/doc/NagAconda/README")
        .exists());
    assert!(!runner.calls().contains(&LifecyclePhase::Clean));
}

#[tokio::test]
async fn test_keep_build_root_after_failure() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES).failing_on(LifecyclePhase::Build));
    let mut env = ws.env_with(runner.clone());
    let builder = Builder::with_config(BuildConfig::default().with_keep_build_root(true));

    let err = builder.build(&nagaconda(), &mut env).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseExecutionFailure { ref phase, .. }) if phase == "build"
    ));
    assert!(ws.build_root().exists());
    assert!(!runner.calls().contains(&LifecyclePhase::Clean));
}

#[tokio::test]
async fn test_failed_phase_still_cleans() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES).failing_on(LifecyclePhase::Install));
    let mut env = ws.env_with(runner.clone());

    let err = Builder::new()
        .build(&nagaconda(), &mut env)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseExecutionFailure { ref phase, .. }) if phase == "install"
    ));
    assert!(!ws.build_root().exists());
    assert_eq!(env.failed_phase(), None);
    assert_eq!(runner.calls().last(), Some(&LifecyclePhase::Clean));
}

#[tokio::test]
async fn test_empty_install_record_fails_build() {
    let ws = Workspace::new();
    let mut env = ws.env_with(Arc::new(FakeRunner::default()));

    let err = Builder::new()
        .build(&nagaconda(), &mut env)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Build(BuildError::ManifestEmpty)));
}

#[tokio::test]
async fn test_shell_backed_build() {
    let ws = Workspace::new();
    let metadata = PackageMetadata::new("hello", "1.0", "2")
        .with_vendor("pkgdesc")
        .with_url("https://example.invalid/hello")
        .with_license("MIT")
        .with_summary("Greeting")
        .with_description("Prints a greeting.");
    let actions = PhaseActions {
        prepare: r#"mkdir -p "${SOURCE_DIR}" && echo 'hello' > "${SOURCE_DIR}/hello.txt""#
            .to_string(),
        build: "tr a-z A-Z < hello.txt > HELLO.txt".to_string(),
        install: concat!(
            r#"mkdir -p "${BUILD_ROOT}/usr/share/%{name}" && "#,
            r#"cp HELLO.txt "${RPM_BUILD_ROOT}/usr/share/%{name}/" && "#,
            r#"printf '/usr/share/%{name}\n/usr/share/%{name}/HELLO.txt\n' > "${MANIFEST_FILE}""#
        )
        .to_string(),
        clean: r#"rm -rf "${BUILD_ROOT}""#.to_string(),
    };
    let descriptor = PackageDescriptor::new(metadata, actions).unwrap();

    let config = BuildConfig::default().with_output_dir(ws.output_dir());
    let mut env: BuildEnv = config.environment(ws.build_root(), ws.work_dir());
    let result = Builder::with_config(config)
        .build(&descriptor, &mut env)
        .await
        .unwrap();

    assert_eq!(
        result.artifact.path,
        ws.output_dir().join("hello-1.0-2.noarch.tar.zst")
    );
    assert_eq!(result.artifact.file_count, 2);
    assert!(!ws.build_root().exists());
}

#[tokio::test]
async fn test_shell_failure_reports_exit_code_and_output() {
    let ws = Workspace::new();
    let descriptor = PackageDescriptor::new(
        nagaconda_metadata(),
        PhaseActions::setuptools()
            .with_action(LifecyclePhase::Prepare, r#"mkdir -p "${SOURCE_DIR}""#)
            .with_action(LifecyclePhase::Build, "echo 'no setup.py here' >&2; exit 7"),
    )
    .unwrap();

    let mut env = BuildConfig::default().environment(ws.build_root(), ws.work_dir());
    let err = Builder::new()
        .build(&descriptor, &mut env)
        .await
        .unwrap_err();

    match err {
        Error::Build(BuildError::PhaseExecutionFailure {
            phase,
            exit_code,
            output,
        }) => {
            assert_eq!(phase, "build");
            assert_eq!(exit_code, Some(7));
            assert_eq!(output, "no setup.py here");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!ws.build_root().exists());
}
