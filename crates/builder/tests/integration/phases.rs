//! Phase ordering, halting and clean behaviour

use super::support::{nagaconda, nagaconda_metadata, FakeRunner, Workspace, THREE_FILES};
use pkgdesc_builder::{LifecyclePhase, PackageDescriptor, PhaseActions};
use pkgdesc_errors::{BuildError, Error};
use pkgdesc_events::{AppEvent, PhaseEvent};
use std::sync::Arc;

#[tokio::test]
async fn test_phases_run_in_fixed_order() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES));
    let mut env = ws.env_with(runner.clone());
    let descriptor = nagaconda();

    for phase in LifecyclePhase::SEQUENCE {
        descriptor.run_phase(phase, &mut env).await.unwrap();
    }

    assert_eq!(
        runner.calls(),
        vec![
            LifecyclePhase::Prepare,
            LifecyclePhase::Build,
            LifecyclePhase::Install
        ]
    );
    assert!(env.has_completed(LifecyclePhase::Install));
    assert_eq!(env.manifest().len(), 3);
    assert_eq!(env.failed_phase(), None);
}

#[tokio::test]
async fn test_install_before_build_is_rejected() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES));
    let mut env = ws.env_with(runner.clone());
    let descriptor = nagaconda();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    let err = descriptor
        .run_phase(LifecyclePhase::Install, &mut env)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseOutOfOrder { ref phase, ref required })
            if phase == "install" && required == "build"
    ));
    // The refused phase never reached the runner and does not halt the sequence
    assert_eq!(runner.calls(), vec![LifecyclePhase::Prepare]);
    assert_eq!(env.failed_phase(), None);

    descriptor
        .run_phase(LifecyclePhase::Build, &mut env)
        .await
        .unwrap();
    descriptor
        .run_phase(LifecyclePhase::Install, &mut env)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_build_requires_prepare() {
    let ws = Workspace::new();
    let mut env = ws.env_with(Arc::new(FakeRunner::default()));

    let err = nagaconda()
        .run_phase(LifecyclePhase::Build, &mut env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseOutOfOrder { ref required, .. }) if required == "prepare"
    ));
}

#[tokio::test]
async fn test_failure_halts_sequence_until_clean() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES).failing_on(LifecyclePhase::Build));
    let mut env = ws.env_with(runner.clone());
    let descriptor = nagaconda();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    let err = descriptor
        .run_phase(LifecyclePhase::Build, &mut env)
        .await
        .unwrap_err();
    match err {
        Error::Build(BuildError::PhaseExecutionFailure {
            phase,
            exit_code,
            output,
        }) => {
            assert_eq!(phase, "build");
            assert_eq!(exit_code, Some(1));
            assert_eq!(output, "build exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(env.failed_phase(), Some(LifecyclePhase::Build));

    for phase in LifecyclePhase::SEQUENCE {
        let err = descriptor.run_phase(phase, &mut env).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::SequenceHalted { ref failed, .. }) if failed == "build"
        ));
    }

    descriptor
        .run_phase(LifecyclePhase::Clean, &mut env)
        .await
        .unwrap();
    assert_eq!(env.failed_phase(), None);
    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_clean_twice_succeeds() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::installing(&THREE_FILES));
    let mut env = ws.env_with(runner.clone());
    let descriptor = nagaconda();

    for phase in LifecyclePhase::SEQUENCE {
        descriptor.run_phase(phase, &mut env).await.unwrap();
    }
    assert!(ws.build_root().exists());

    descriptor.clean(&mut env).await.unwrap();
    assert!(!ws.build_root().exists());
    assert!(env.manifest().is_empty());
    assert_eq!(env.completed_phases().count(), 0);

    descriptor.clean(&mut env).await.unwrap();
    assert!(!ws.build_root().exists());
}

#[tokio::test]
async fn test_clean_on_fresh_environment() {
    let ws = Workspace::new();
    let mut env = ws.env_with(Arc::new(FakeRunner::default()));

    nagaconda()
        .run_phase(LifecyclePhase::Clean, &mut env)
        .await
        .unwrap();
    nagaconda()
        .run_phase(LifecyclePhase::Clean, &mut env)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_clean_action_still_removes_build_root() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::default().failing_on(LifecyclePhase::Clean));
    let mut env = ws.env_with(runner);
    let descriptor = nagaconda();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    assert!(ws.build_root().exists());

    let err = descriptor.clean(&mut env).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::PhaseExecutionFailure { ref phase, .. }) if phase == "clean"
    ));
    assert!(!ws.build_root().exists());
    assert!(!env.has_completed(LifecyclePhase::Prepare));
}

#[tokio::test]
async fn test_prepare_requires_source_layout() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner {
        skip_unpack: true,
        ..FakeRunner::default()
    });
    let mut env = ws.env_with(runner);

    let err = nagaconda()
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::SourceLayoutInvalid { ref expected })
            if expected.ends_with("NagAconda-0.1.4")
    ));
    assert_eq!(env.failed_phase(), Some(LifecyclePhase::Prepare));
}

#[tokio::test]
async fn test_build_requires_build_root() {
    let ws = Workspace::new();
    let mut env = ws.env_with(Arc::new(FakeRunner::default()));
    let descriptor = nagaconda();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    std::fs::remove_dir_all(ws.build_root()).unwrap();

    let err = descriptor
        .run_phase(LifecyclePhase::Build, &mut env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::BuildRootUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_install_without_record_is_invalid() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner {
        skip_record: true,
        ..FakeRunner::installing(&THREE_FILES)
    });
    let mut env = ws.env_with(runner);
    let descriptor = nagaconda();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    descriptor
        .run_phase(LifecyclePhase::Build, &mut env)
        .await
        .unwrap();
    let err = descriptor
        .run_phase(LifecyclePhase::Install, &mut env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ManifestPathInvalid { ref path, .. })
            if path.ends_with("INSTALLED_FILES")
    ));
}

#[tokio::test]
async fn test_actions_are_rendered_before_running() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::default());
    let mut env = ws.env_with(runner.clone());
    let descriptor = PackageDescriptor::new(
        nagaconda_metadata(),
        PhaseActions::setuptools()
            .with_action(LifecyclePhase::Prepare, "unpack %{name}-%{version} into ${WORK_DIR}"),
    )
    .unwrap();

    descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();

    let scripts = runner.scripts.lock().unwrap().clone();
    assert_eq!(
        scripts,
        vec![format!(
            "unpack NagAconda-0.1.4 into {}",
            ws.work_dir().display()
        )]
    );
}

#[tokio::test]
async fn test_template_error_halts_sequence() {
    let ws = Workspace::new();
    let runner = Arc::new(FakeRunner::default());
    let mut env = ws.env_with(runner.clone());
    let descriptor = PackageDescriptor::new(
        nagaconda_metadata(),
        PhaseActions::setuptools().with_action(LifecyclePhase::Prepare, "echo %{maintainer}"),
    )
    .unwrap();

    let err = descriptor
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::TemplateError { .. })
    ));
    assert!(runner.calls().is_empty());
    assert_eq!(env.failed_phase(), Some(LifecyclePhase::Prepare));
}

#[tokio::test]
async fn test_phase_events_are_emitted() {
    let ws = Workspace::new();
    let (tx, mut rx) = pkgdesc_events::channel();
    let mut env = ws
        .env_with(Arc::new(FakeRunner::default()))
        .with_event_sender(tx);

    nagaconda()
        .run_phase(LifecyclePhase::Prepare, &mut env)
        .await
        .unwrap();
    drop(env);

    let mut started = false;
    let mut completed = false;
    while let Some(message) = rx.recv().await {
        match message.event {
            AppEvent::Phase(PhaseEvent::Started { phase, .. }) => {
                assert_eq!(phase, LifecyclePhase::Prepare);
                started = true;
            }
            AppEvent::Phase(PhaseEvent::Completed { package, phase, .. }) => {
                assert_eq!(package, "NagAconda-0.1.4-1");
                assert_eq!(phase, LifecyclePhase::Prepare);
                completed = true;
            }
            _ => {}
        }
    }
    assert!(started && completed);
}
