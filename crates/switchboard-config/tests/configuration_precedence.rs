//! Integration tests for configuration precedence across sources.

use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use switchboard_config::{
    Config, ServiceBinding, SocketEndpoint, default_listen_endpoint, default_log_filter,
    default_log_format, default_services,
};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    cli_args: std::cell::RefCell<Vec<OsString>>,
    env_overrides: std::cell::RefCell<Vec<(String, Option<OsString>)>>,
    loaded: std::cell::RefCell<Option<Config>>,
    error: std::cell::RefCell<Option<String>>,
    _env_guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            cli_args: std::cell::RefCell::new(vec![OsString::from("switchboardd")]),
            env_overrides: std::cell::RefCell::new(Vec::new()),
            loaded: std::cell::RefCell::new(None),
            error: std::cell::RefCell::new(None),
            _env_guard: ENV_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        }
    }

    fn write_config(&self, contents: &str) {
        let path = self.temp_dir.path().join("switchboard.toml");
        if let Err(error) = fs::write(&path, contents) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` under edition 2024. The harness
        // holds the environment mutex and restores overrides in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => {
                *self.loaded.borrow_mut() = Some(config);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error.to_string());
            }
        }
    }

    fn config(&self) -> Config {
        self.load();
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

fn parse_endpoint(socket: &str) -> SocketEndpoint {
    match socket.parse::<SocketEndpoint>() {
        Ok(endpoint) => endpoint,
        Err(error) => panic!("invalid socket '{socket}': {error}"),
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the listen endpoint to \"{socket}\"")]
fn given_configuration_file(harness: &Harness, socket: String) {
    let endpoint = parse_endpoint(&socket);
    harness.write_config(&format!("listen = \"{endpoint}\"\n"));
}

#[given("a configuration file binding the services \"{bindings}\"")]
fn given_service_file(harness: &Harness, bindings: String) {
    let entries = bindings
        .split(',')
        .map(|binding| format!("\"{}\"", binding.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    harness.write_config(&format!("services = [{entries}]\n"));
}

#[given("the environment overrides the listen endpoint to \"{socket}\"")]
fn given_environment_override(harness: &Harness, socket: String) {
    harness.set_env("SWITCHBOARD_LISTEN", &socket);
}

#[when("the command line sets the listen endpoint to \"{socket}\"")]
fn when_cli_override(harness: &Harness, socket: String) {
    harness.push_cli_arg("--listen");
    harness.push_cli_arg(OsString::from(&socket));
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration resolves the listen endpoint to \"{socket}\"")]
fn then_resolved_socket(harness: &Harness, socket: String) {
    assert_eq!(harness.config().listen(), &parse_endpoint(&socket));
}

#[then("loading the configuration registers {count} service(s)")]
fn then_service_count(harness: &Harness, count: usize) {
    assert_eq!(harness.config().services().len(), count);
}

#[then("the service {name} is bound to {kind}")]
fn then_service_bound(harness: &Harness, name: String, kind: String) {
    let expected = ServiceBinding::new(name.trim_matches('"'), kind.trim_matches('"'));
    assert!(
        harness.config().services().contains(&expected),
        "expected binding {expected} to be configured"
    );
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.config();
    assert_eq!(config.listen(), &default_listen_endpoint());
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert_eq!(config.services(), default_services().as_slice());
}

#[scenario(path = "tests/features/configuration_precedence.feature")]
fn configuration_precedence(#[from(harness)] harness: Harness) {
    let _ = harness;
}
