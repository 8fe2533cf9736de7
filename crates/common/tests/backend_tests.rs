//! Backend Integration Tests
//!
//! Tests for typed backend access over a scripted command channel.
//!
//! # Test Scenarios
//! - Commands are rendered against the configured module paths
//! - Probes treat non-zero exits as `false`
//! - Marker scanning of toggle output
//! - Concurrent commands through a shared channel
//!
//! Run with: `cargo test -p common --test backend_tests`

use std::sync::Arc;

use common::test_utils::{DEFAULT_TEST_TIMEOUT, MockChannel, with_timeout};
use common::{Backend, Error};
use protocol::{BackendCommand, FailureKind, ModeOverride, ModulePaths, Outcome};

fn backend_with(channel: Arc<MockChannel>) -> Backend {
    let paths = ModulePaths {
        module_dir: "/m".to_string(),
        persist_dir: "/p".to_string(),
    };
    Backend::new(channel, paths)
}

// ============================================================================
// Command Rendering Tests
// ============================================================================

#[tokio::test]
async fn test_run_uses_module_paths() {
    let channel = Arc::new(MockChannel::new());
    let backend = backend_with(channel.clone());

    backend.run(&BackendCommand::LinkHosts).await.unwrap();
    backend
        .run(&BackendCommand::WriteModeOverride(ModeOverride(2)))
        .await
        .unwrap();

    assert_eq!(
        channel.calls(),
        vec![
            "sh /m/bindhosts.sh --link-hosts".to_string(),
            "echo \"mode=2\" > /p/mode_override.sh".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_read_trims_output() {
    let channel = Arc::new(MockChannel::new());
    channel.respond("module.prop | cut", "v1.2.3\n");
    let backend = backend_with(channel);

    let version = backend.read(&BackendCommand::ReadVersion).await.unwrap();
    assert_eq!(version, "v1.2.3");
}

// ============================================================================
// Probe Tests
// ============================================================================

#[tokio::test]
async fn test_probe_maps_exit_status() {
    let channel = Arc::new(MockChannel::new());
    channel.fail("crontabs/root");
    let backend = backend_with(channel);

    assert!(!backend.probe(&BackendCommand::CheckCron).await.unwrap());
    assert!(backend.probe(&BackendCommand::CheckUpdateJson).await.unwrap());
}

#[tokio::test]
async fn test_run_propagates_exec_error() {
    let channel = Arc::new(MockChannel::new());
    channel.fail_once("--whitelist", "permission denied");
    let backend = backend_with(channel);

    let err = backend
        .run(&BackendCommand::Whitelist(vec!["a.com".to_string()]))
        .await
        .unwrap_err();
    match err {
        Error::Exec { command, stderr, .. } => {
            assert!(command.ends_with("--whitelist a.com"));
            assert_eq!(stderr, "permission denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Marker Tests
// ============================================================================

#[tokio::test]
async fn test_run_marked_scans_output() {
    let channel = Arc::new(MockChannel::new());
    channel.respond("bindhosts-app.sh", "fetching\n[x] Failed to download apk\n");
    let backend = backend_with(channel);

    let outcomes = backend
        .run_marked(&BackendCommand::InstallCompanionApp)
        .await
        .unwrap();
    assert_eq!(outcomes, vec![Outcome::Failure(FailureKind::DownloadFailed)]);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_commands_share_channel() {
    let channel = Arc::new(MockChannel::new());
    let backend = backend_with(channel.clone());

    let mut handles = Vec::new();
    for i in 0..10 {
        let backend = backend.clone();
        handles.push(tokio::spawn(async move {
            backend
                .run(&BackendCommand::Whitelist(vec![format!("d{i}.com")]))
                .await
        }));
    }

    with_timeout(DEFAULT_TEST_TIMEOUT, async {
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    })
    .await
    .expect("commands timed out");

    assert_eq!(channel.calls_matching("--whitelist").len(), 10);
}
