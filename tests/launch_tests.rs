//! Integration tests for the vaultup binary
//!
//! Each test runs the real binary against a throwaway config directory
//! and a throwaway app root whose "server" is a shell one-liner, then
//! asserts on exit codes and console markers. Ports are picked fresh
//! per test so the reclaim path never fires against a real process.

use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use std::{fs, process::Output};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tempfile::TempDir;

const VAULTUP_BINARY: &str = env!("CARGO_BIN_EXE_vaultup");

/// Pick a port that nothing is listening on
fn free_port() -> u16 {
    TcpListener::bind(("127.0.0.1", 0))
        .expect("failed to bind an ephemeral port")
        .local_addr()
        .expect("failed to read the bound address")
        .port()
}

/// Create an app root with a pre-populated node_modules directory so
/// the dependency install step stays quiet
fn app_root_with_deps() -> TempDir {
    let dir = TempDir::new().expect("failed to create app root");
    fs::create_dir(dir.path().join("node_modules")).expect("failed to create node_modules");
    dir
}

/// Config whose "server" is `bash -c <script>`
///
/// bash rather than sh: the runtime check runs `--version`, which
/// dash (sh on Debian) refuses while bash answers with exit 0.
fn launcher_config(app_root: &Path, port: u16, script: &str, extra: &str) -> String {
    format!(
        "port = {port}\n\
         runtime = \"bash\"\n\
         server_args = [\"-c\", \"{script}\"]\n\
         install_command = [\"true\"]\n\
         app_root = \"{}\"\n\
         grace_period_ms = 150\n\
         shutdown_timeout_ms = 5000\n\
         browser_delay_ms = 0\n\
         reclaim_delay_ms = 100\n\
         browser_command = [\"true\"]\n\
         {extra}",
        app_root.display()
    )
}

fn write_config(config_dir: &TempDir, contents: &str) {
    fs::write(config_dir.path().join("config.toml"), contents).expect("failed to write config.toml");
}

fn run_vaultup(config_dir: &TempDir) -> Output {
    Command::new(VAULTUP_BINARY)
        .env("VAULTUP_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run vaultup binary")
}

#[test]
fn test_missing_runtime_aborts_cleanly() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    write_config(
        &config_dir,
        &format!(
            "port = {}\n\
             runtime = \"vaultup-test-no-such-runtime\"\n\
             app_root = \"{}\"\n",
            free_port(),
            app_root.path().display()
        ),
    );

    let output = run_vaultup(&config_dir);

    assert_eq!(
        output.status.code(),
        Some(0),
        "a missing runtime is an expected abort, not a crash"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("THE VAULT - YouTube Music Player"));
    assert!(stderr.contains("runtime not found"));
    assert!(
        !stdout.contains("Starting The Vault server"),
        "no server may be started without its runtime"
    );
}

#[test]
fn test_missing_node_shows_install_hint() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    write_config(
        &config_dir,
        &format!(
            "port = {}\napp_root = \"{}\"\n",
            free_port(),
            app_root.path().display()
        ),
    );

    // An empty PATH makes the default runtime (node) unresolvable
    let output = Command::new(VAULTUP_BINARY)
        .env("VAULTUP_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .env("PATH", "")
        .output()
        .expect("failed to run vaultup binary");

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please install Node.js from https://nodejs.org/"));
}

#[test]
fn test_early_server_exit_aborts_cleanly() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    write_config(
        &config_dir,
        &launcher_config(app_root.path(), free_port(), "exit 3", ""),
    );

    let output = run_vaultup(&config_dir);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Starting The Vault server"));
    assert!(stderr.contains("exited during startup"));
    assert!(!stdout.contains("Server is running!"));
    assert!(
        !stdout.contains("Opening in browser"),
        "a failed startup must not reach the browser"
    );
}

#[test]
fn test_successful_launch_reports_and_notifies_once() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    let port = free_port();
    write_config(
        &config_dir,
        &launcher_config(app_root.path(), port, "exec sleep 1", ""),
    );

    let output = run_vaultup(&config_dir);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[OK] Server is running!"));
    assert!(stdout.contains(&format!("The Vault is ready at: http://localhost:{}", port)));
    assert_eq!(
        stdout.matches("Opening in browser").count(),
        1,
        "the browser must be opened exactly once"
    );
    assert!(stdout.contains("The Vault is now running!"));
    assert!(stdout.contains("Press Ctrl+C to stop the server"));
    assert!(stdout.contains("Server exited on its own"));
    assert!(
        !stdout.contains("Shutting down vault server"),
        "self-exit must not trigger the teardown messages"
    );
}

#[test]
fn test_browser_can_be_disabled() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    write_config(
        &config_dir,
        &launcher_config(
            app_root.path(),
            free_port(),
            "exec sleep 1",
            "open_browser = false\n",
        ),
    );

    let output = run_vaultup(&config_dir);

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[OK] Server is running!"));
    assert!(!stdout.contains("Opening in browser"));
}

#[test]
fn test_manifest_is_announced() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    fs::write(
        app_root.path().join("package.json"),
        r#"{"name": "the-vault", "version": "2.3.4"}"#,
    )
    .expect("failed to write package.json");
    write_config(
        &config_dir,
        &launcher_config(app_root.path(), free_port(), "exec sleep 1", ""),
    );

    let output = run_vaultup(&config_dir);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Launching the-vault v2.3.4"));
}

#[test]
fn test_interrupt_shuts_the_server_down() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();
    write_config(
        &config_dir,
        &launcher_config(app_root.path(), free_port(), "exec sleep 30", ""),
    );

    let mut child = Command::new(VAULTUP_BINARY)
        .env("VAULTUP_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn vaultup binary");

    // Past the grace period and the running banner by now
    thread::sleep(Duration::from_millis(1200));

    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("failed to send SIGINT");

    let output = child.wait_with_output().expect("failed to collect output");

    assert_eq!(
        output.status.code(),
        Some(0),
        "an interrupted launch is a normal way to stop"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.matches("Shutting down vault server").count(),
        1,
        "teardown must run exactly once"
    );
    assert_eq!(stdout.matches("[OK] Server stopped").count(), 1);
}

#[test]
#[cfg(not(target_os = "macos"))]
fn test_unreclaimable_port_aborts_before_spawn() {
    use std::os::unix::fs::PermissionsExt;

    let config_dir = TempDir::new().expect("failed to create config dir");
    let app_root = app_root_with_deps();

    // Hold the port ourselves; a reclaim command that does nothing
    // makes that safe and forces the recheck to find it taken
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("failed to bind the blocker");
    let port = listener.local_addr().expect("failed to read address").port();

    let stub_dir = TempDir::new().expect("failed to create stub dir");
    let stub = stub_dir.path().join("fuser");
    fs::write(&stub, "#!/bin/sh\nexit 0\n").expect("failed to write the fuser stub");
    fs::set_permissions(&stub, fs::Permissions::from_mode(0o755))
        .expect("failed to mark the stub executable");

    write_config(
        &config_dir,
        &launcher_config(app_root.path(), port, "exec sleep 1", ""),
    );

    let path = format!(
        "{}:{}",
        stub_dir.path().display(),
        std::env::var("PATH").unwrap_or_default()
    );
    let output = Command::new(VAULTUP_BINARY)
        .env("VAULTUP_CONFIG_DIR", config_dir.path())
        .env("NO_COLOR", "1")
        .env("PATH", path)
        .env_remove("JOURNAL_STREAM")
        .output()
        .expect("failed to run vaultup binary");

    assert_eq!(
        output.status.code(),
        Some(0),
        "an unreclaimable port is an expected abort"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not be cleared"));
    assert!(
        !stdout.contains("Starting The Vault server"),
        "no server may be spawned while the port is taken"
    );
    // Diagnostics belong on stderr; stdout carries only status lines
    assert!(!stdout.contains("already in use"));
    assert!(
        std::net::TcpStream::connect(("127.0.0.1", port)).is_ok(),
        "the stubbed reclaim must leave the occupant alone"
    );
}

#[test]
fn test_invalid_config_is_a_hard_error() {
    let config_dir = TempDir::new().expect("failed to create config dir");
    write_config(&config_dir, "port = 0\n");

    let output = run_vaultup(&config_dir);

    assert_eq!(
        output.status.code(),
        Some(2),
        "a broken config file is a real error, not an expected abort"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration"));
}
