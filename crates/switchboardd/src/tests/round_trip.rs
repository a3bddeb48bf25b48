//! End-to-end requests over TCP against the default services.

use rstest::{fixture, rstest};
use serde_json::json;
use switchboard_config::{Config, ServiceBinding};

use super::support::{DaemonFixture, envelope, exit_status, fault, test_config};

#[fixture]
fn daemon() -> DaemonFixture {
    DaemonFixture::start()
}

#[rstest]
fn echoes_an_integer(daemon: DaemonFixture) {
    let lines = daemon.request("/test/echo", Some("[7]"), None);

    assert_eq!(exit_status(&lines), 0);
    assert_eq!(lines[0]["content_type"], "application/json");
    let body = envelope(&lines);
    assert_eq!(body["service"], "test");
    assert_eq!(body["method"], "echo(int)");
    assert_eq!(body["return"], 7);
}

#[rstest]
fn lists_services_for_the_root_path(daemon: DaemonFixture) {
    let lines = daemon.request("/", None, None);

    assert_eq!(lines[0], json!({ "kind": "services", "services": ["chat", "test"] }));
    assert_eq!(exit_status(&lines), 0);
}

#[rstest]
#[case::unknown_service("/nope/echo", "routing", 1)]
#[case::filtered_method("/test/_configure", "routing", 1)]
#[case::missing_method("/test", "routing", 1)]
fn reports_routing_faults(
    daemon: DaemonFixture,
    #[case] path: &str,
    #[case] category: &str,
    #[case] status: i64,
) {
    let lines = daemon.request(path, None, None);

    assert_eq!(fault(&lines)["category"], category);
    assert_eq!(exit_status(&lines), status);
}

#[rstest]
fn unknown_service_fault_names_the_service(daemon: DaemonFixture) {
    let lines = daemon.request("/nope/echo", None, None);

    assert_eq!(fault(&lines)["message"], "unknown service: nope");
}

#[rstest]
fn unparsable_arguments_are_a_configuration_fault(daemon: DaemonFixture) {
    let lines = daemon.request("/test/echo", Some("not json"), None);

    assert_eq!(fault(&lines)["category"], "configuration");
    assert_eq!(exit_status(&lines), 2);
}

#[rstest]
fn malformed_request_lines_are_rejected(daemon: DaemonFixture) {
    let lines = daemon.send_line("{\"path\":");

    assert_eq!(fault(&lines)["category"], "protocol");
    assert_eq!(exit_status(&lines), 1);
}

#[rstest]
fn exceptions_render_with_their_causes(daemon: DaemonFixture) {
    let lines = daemon.request("/test/throwException", None, None);

    assert_eq!(exit_status(&lines), 0);
    let body = envelope(&lines);
    assert_eq!(body["exception"]["class"], "Exception");
    assert_eq!(body["exception"]["message"], "exception!");
    assert_eq!(body["exception"]["cause"]["message"], "exception cause");
    assert_eq!(body["exception"]["cause"]["cause"]["class"], "Error");
}

#[rstest]
fn saved_values_are_scoped_to_the_session(daemon: DaemonFixture) {
    let saved = daemon.request("/test/saveValue", Some("[\"kept\"]"), Some("s-1"));
    assert_eq!(exit_status(&saved), 0);

    let same = daemon.request("/test/retrieveValue", None, Some("s-1"));
    let other = daemon.request("/test/retrieveValue", None, Some("s-2"));
    let sessionless = daemon.request("/test/retrieveValue", None, None);

    assert_eq!(envelope(&same)["return"], "kept");
    assert_eq!(envelope(&other)["return"], serde_json::Value::Null);
    assert_eq!(envelope(&sessionless)["return"], serde_json::Value::Null);
}

#[rstest]
fn chat_state_is_shared_between_connections(daemon: DaemonFixture) {
    let login = daemon.request("/chat/login", Some("[\"alice\"]"), Some("a"));
    assert_eq!(envelope(&login)["return"], true);

    let users = daemon.request("/chat/getUsers", Some("[0, 10]"), Some("b"));

    assert_eq!(envelope(&users)["return"], json!(["alice"]));
}

#[rstest]
fn describe_lists_the_exposed_methods(daemon: DaemonFixture) {
    let lines = daemon.request("/chat/_describe", None, None);

    let described = envelope(&lines)["return"].clone();
    let methods = described
        .as_array()
        .expect("method list")
        .iter()
        .map(|entry| entry["method"].as_str().expect("method name"))
        .collect::<Vec<_>>();
    assert!(methods.contains(&"login"), "{described}");
    assert!(!methods.contains(&"_describe"), "{described}");
}

#[test]
fn random_strings_are_remembered_per_session() {
    let daemon = DaemonFixture::start_with(Config {
        services: vec![ServiceBinding::new("dice", "random")],
        ..test_config()
    });

    let reply = daemon.request("/dice/createRandomString", Some("[8]"), Some("s-1"));
    let created = envelope(&reply)["return"]["created"].clone();
    assert_eq!(created.as_str().map(str::len), Some(8));

    let last = daemon.request("/dice/getLastRandomString", None, Some("s-1"));
    let other = daemon.request("/dice/getLastRandomString", None, Some("s-2"));
    assert_eq!(envelope(&last)["return"], created);
    assert_eq!(envelope(&other)["return"], serde_json::Value::Null);
}
