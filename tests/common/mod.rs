//! In-process stub for the run database HTTP API.
//!
//! Serves canned JSON bodies keyed by the decoded request target
//! (`path?query`), one request per connection. Unmatched targets get a 404 so
//! a test that forgets a route fails loudly instead of hanging.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

pub struct Route {
    target: String,
    status: u16,
    body: String,
}

impl Route {
    pub fn ok(target: &str, body: &str) -> Self {
        Self {
            target: target.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn error(target: &str, status: u16) -> Self {
        Self {
            target: target.to_string(),
            status,
            body: "{\"error\": \"internal\"}".to_string(),
        }
    }
}

pub struct StubRunDb {
    base_url: String,
}

impl StubRunDb {
    /// Bind a listener on an ephemeral port and serve `routes` until the test
    /// process exits.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                handle(stream, &routes);
            }
        });
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn handle(stream: TcpStream, routes: &[Route]) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers; GET requests carry no body.
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
            Err(_) => return,
        }
    }

    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("")
        .to_string();
    let decoded = percent_decode(&target);

    let (status, body) = match routes.iter().find(|route| route.target == decoded) {
        Some(route) => (route.status, route.body.as_str()),
        None => (404, "{\"error\": \"no such route\"}"),
    };
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
}

/// Undo percent-encoding so routes can be registered in readable form.
fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' && index + 2 < bytes.len() {
            if let Ok(value) = u8::from_str_radix(&raw[index + 1..index + 3], 16) {
                out.push(value);
                index += 3;
                continue;
            }
        }
        out.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
