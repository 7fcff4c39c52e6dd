//! Integration tests for container provisioning.
//!
//! These tests verify the provisioning pipeline end-to-end against a real
//! Docker/Podman runtime. Tests are skipped if no runtime is available or
//! SKIP_CONTAINER_TESTS=1.

use mcpup::container::{
    LivenessPolicy, ProvisionError, Provisioner, RuntimeClient, container_name_for, image_tag_for,
};
use mcpup::workspace::{Workspace, WorkspaceManager};
use serial_test::serial;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use test_tag::tag;

/// Check if container tests should run.
fn should_run_container_tests() -> bool {
    if let Ok(value) = std::env::var("SKIP_CONTAINER_TESTS") {
        if value == "1" || value.eq_ignore_ascii_case("true") {
            return false;
        }
    }

    std::process::Command::new("docker")
        .arg("info")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
        || std::process::Command::new("podman")
            .arg("info")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
}

/// Liveness policy with test-sized delays.
fn fast_policy() -> LivenessPolicy {
    LivenessPolicy {
        grace: Duration::from_millis(500),
        attempts: 5,
        initial_interval: Duration::from_millis(200),
    }
}

/// Materialize a workspace whose image runs the given command.
fn make_workspace(manager: &WorkspaceManager, name: &str, dockerfile: &str) -> Workspace {
    let files = HashMap::from([("Dockerfile".to_string(), dockerfile.to_string())]);
    manager.create(name, &files).unwrap()
}

/// Cleanup helper - removes the container and image for a workspace name.
async fn cleanup(provisioner: &Provisioner, name: &str) {
    let _ = provisioner.remove_container(&container_name_for(name)).await;
    let _ = std::process::Command::new("docker")
        .args(["rmi", "-f", &image_tag_for(name)])
        .output();
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn provision_healthy_workspace_succeeds() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests (no runtime or SKIP_CONTAINER_TESTS=1)");
        return;
    }

    let dir = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(dir.path());
    let workspace = make_workspace(
        &manager,
        "mcpup-it-healthy",
        "FROM alpine:3.20\nCMD [\"sleep\", \"300\"]\n",
    );

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client.clone(), fast_policy());
    let container_name = container_name_for("mcpup-it-healthy");

    let result = provisioner
        .provision(&workspace, 34181, &container_name, &HashMap::new())
        .await;

    let server = match result {
        Ok(server) => server,
        Err(e) => {
            cleanup(&provisioner, "mcpup-it-healthy").await;
            panic!("provision failed: {}", e);
        }
    };

    assert_eq!(server.port, 34181);
    assert_eq!(server.container_name, container_name);

    // Runtime shows one running instance under the derived name.
    let running = client.running_container_id(&container_name).await.unwrap();
    assert!(running.is_some());

    cleanup(&provisioner, "mcpup-it-healthy").await;
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn provision_with_env_injection() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests");
        return;
    }

    let dir = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(dir.path());
    // The container only stays up if the injected value reached it.
    let workspace = make_workspace(
        &manager,
        "mcpup-it-env",
        "FROM alpine:3.20\nCMD [\"sh\", \"-c\", \"test \\\"$GREETING\\\" = hello && sleep 300\"]\n",
    );

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client, fast_policy());
    let env = HashMap::from([("GREETING".to_string(), "hello".to_string())]);

    let result = provisioner
        .provision(&workspace, 34182, &container_name_for("mcpup-it-env"), &env)
        .await;

    let ok = result.is_ok();
    cleanup(&provisioner, "mcpup-it-env").await;
    assert!(ok, "env value did not reach the container");
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn build_failure_creates_no_instance() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests");
        return;
    }

    let dir = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(dir.path());
    let workspace = make_workspace(
        &manager,
        "mcpup-it-badbuild",
        "FROM alpine:3.20\nFORM not-an-instruction\n",
    );

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client.clone(), fast_policy());
    let container_name = container_name_for("mcpup-it-badbuild");

    let result = provisioner
        .provision(&workspace, 34183, &container_name, &HashMap::new())
        .await;

    match result {
        Err(ProvisionError::Build { stderr }) => assert!(!stderr.is_empty()),
        other => {
            cleanup(&provisioner, "mcpup-it-badbuild").await;
            panic!("expected Build error, got {:?}", other);
        }
    }

    // No instance was ever created for that name.
    let running = client.running_container_id(&container_name).await.unwrap();
    assert!(running.is_none());
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn crashing_service_fails_health_check_and_is_removed() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests");
        return;
    }

    let dir = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(dir.path());
    let workspace = make_workspace(
        &manager,
        "mcpup-it-crash",
        "FROM alpine:3.20\nCMD [\"sh\", \"-c\", \"echo boot failure >&2; exit 1\"]\n",
    );

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client.clone(), fast_policy());
    let container_name = container_name_for("mcpup-it-crash");

    let result = provisioner
        .provision(&workspace, 34184, &container_name, &HashMap::new())
        .await;

    match result {
        Err(ProvisionError::HealthCheck { stderr, .. }) => {
            assert!(stderr.contains("boot failure"), "stderr was: {:?}", stderr);
        }
        Ok(server) => {
            cleanup(&provisioner, "mcpup-it-crash").await;
            panic!("expected HealthCheck error, got running {}", server.container_id);
        }
        Err(other) => {
            cleanup(&provisioner, "mcpup-it-crash").await;
            panic!("expected HealthCheck error, got {}", other);
        }
    }

    // The failed instance was removed: querying by name finds nothing.
    let running = client.running_container_id(&container_name).await.unwrap();
    assert!(running.is_none());

    cleanup(&provisioner, "mcpup-it-crash").await;
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn port_conflict_fails_start_and_leaves_first_instance_untouched() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests");
        return;
    }

    let dir = TempDir::new().unwrap();
    let manager = WorkspaceManager::new(dir.path());
    let dockerfile = "FROM alpine:3.20\nCMD [\"sleep\", \"300\"]\n";
    let first_ws = make_workspace(&manager, "mcpup-it-first", dockerfile);
    let second_ws = make_workspace(&manager, "mcpup-it-second", dockerfile);

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client.clone(), fast_policy());
    let first_name = container_name_for("mcpup-it-first");
    let second_name = container_name_for("mcpup-it-second");

    let first = provisioner
        .provision(&first_ws, 34977, &first_name, &HashMap::new())
        .await;
    if let Err(e) = first {
        cleanup(&provisioner, "mcpup-it-first").await;
        panic!("first provision failed: {}", e);
    }

    // Same port, different name: the runtime rejects the start.
    let second = provisioner
        .provision(&second_ws, 34977, &second_name, &HashMap::new())
        .await;
    let second_is_start_failure = matches!(second, Err(ProvisionError::Start { .. }));

    // First instance is untouched, second left nothing behind.
    let first_running = client.running_container_id(&first_name).await.unwrap();
    let second_running = client.running_container_id(&second_name).await.unwrap();

    cleanup(&provisioner, "mcpup-it-first").await;
    cleanup(&provisioner, "mcpup-it-second").await;

    assert!(second_is_start_failure, "expected Start error");
    assert!(first_running.is_some(), "first instance was disturbed");
    assert!(second_running.is_none(), "second instance leaked");
}

#[tokio::test]
#[serial]
#[tag(integration, container)]
async fn remove_container_is_idempotent() {
    if !should_run_container_tests() {
        eprintln!("Skipping container tests");
        return;
    }

    let client = RuntimeClient::new().await.expect("runtime unavailable");
    let provisioner = Provisioner::with_client(client, fast_policy());

    provisioner
        .remove_container("mcpup-it-never-existed")
        .await
        .expect("removing an absent container must not error");
    provisioner
        .remove_container("mcpup-it-never-existed")
        .await
        .expect("second removal must not error either");
}
