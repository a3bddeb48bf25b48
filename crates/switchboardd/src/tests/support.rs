//! Shared fixtures: a bootstrapped daemon on an ephemeral TCP port.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::Value as Json;
use switchboard_config::{Config, SocketEndpoint};

use crate::{
    RunningDaemon, StaticConfigLoader, StructuredHealthReporter, bootstrap_with, start_serving,
};

/// Configuration listening on an ephemeral TCP port with the default
/// services and quiet logging.
pub(crate) fn test_config() -> Config {
    Config {
        listen: SocketEndpoint::tcp("127.0.0.1", 0),
        log_filter: String::from("warn"),
        ..Config::default()
    }
}

/// A daemon serving the default services until dropped.
pub(crate) struct DaemonFixture {
    running: Option<RunningDaemon>,
    address: SocketAddr,
}

impl DaemonFixture {
    pub(crate) fn start() -> Self {
        Self::start_with(test_config())
    }

    pub(crate) fn start_with(config: Config) -> Self {
        let loader = StaticConfigLoader::new(config);
        let daemon = bootstrap_with(&loader, &StructuredHealthReporter).expect("bootstrap daemon");
        let running = start_serving(&daemon).expect("start serving");
        let address = running.local_addr().expect("tcp address");
        Self {
            running: Some(running),
            address,
        }
    }

    /// Sends one raw request line and returns every response line as JSON.
    pub(crate) fn send_line(&self, line: &str) -> Vec<Json> {
        let mut stream = TcpStream::connect(self.address).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        stream.write_all(line.as_bytes()).expect("write request");
        stream.write_all(b"\n").expect("write newline");
        stream.flush().expect("flush");

        BufReader::new(stream)
            .lines()
            .map(|line| serde_json::from_str(&line.expect("read line")).expect("json line"))
            .collect()
    }

    /// Sends a request for `path` with optional arguments and session.
    pub(crate) fn request(
        &self,
        path: &str,
        arguments: Option<&str>,
        session: Option<&str>,
    ) -> Vec<Json> {
        let mut request = serde_json::json!({ "path": path });
        if let Some(arguments) = arguments {
            request["parameters"] = serde_json::json!({ "a": arguments });
        }
        if let Some(session) = session {
            request["session"] = Json::from(session);
        }
        self.send_line(&request.to_string())
    }
}

impl Drop for DaemonFixture {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop();
        }
    }
}

/// Exit status from the terminal line.
pub(crate) fn exit_status(lines: &[Json]) -> i64 {
    lines
        .last()
        .filter(|line| line["kind"] == "exit")
        .and_then(|line| line["status"].as_i64())
        .expect("terminal exit line")
}

/// The rendered envelope carried by the `body` line.
pub(crate) fn envelope(lines: &[Json]) -> Json {
    let body = lines
        .iter()
        .find(|line| line["kind"] == "body")
        .expect("body line");
    serde_json::from_str(body["data"].as_str().expect("body data")).expect("json envelope")
}

/// The `fault` line.
pub(crate) fn fault(lines: &[Json]) -> &Json {
    lines
        .iter()
        .find(|line| line["kind"] == "fault")
        .expect("fault line")
}
