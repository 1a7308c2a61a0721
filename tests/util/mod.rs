use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Canned response for one route.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Advertised `Content-Length` when it should differ from the body.
    pub content_length: Option<usize>,
}

#[allow(dead_code)]
impl Reply {
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
            content_length: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Vec::new(),
            content_length: None,
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::ok("application/json", value.to_string())
    }

    pub fn html(body: &str) -> Self {
        Self::ok("text/html", body)
    }

    /// One SSE message per fragment, each `data` a JSON string.
    pub fn sse(fragments: &[&str]) -> Self {
        let mut body = String::new();
        for fragment in fragments {
            body.push_str("data: ");
            body.push_str(&serde_json::to_string(fragment).unwrap());
            body.push_str("\n\n");
        }
        Self::ok("text/event-stream", body)
    }

    /// Advertise `missing` more bytes than are sent, so the connection drops
    /// in the middle of the body.
    pub fn cut_short(mut self, missing: usize) -> Self {
        self.content_length = Some(self.body.len() + missing);
        self
    }

    /// Raw SSE `data:` lines, not JSON-encoded.
    pub fn sse_raw(payloads: &[&str]) -> Self {
        let body: String = payloads.iter().map(|p| format!("data: {p}\n\n")).collect();
        Self::ok("text/event-stream", body)
    }
}

/// In-process HTTP/1.1 server with fixed routes keyed by path (query string
/// ignored). Unknown paths get a 404. Every request target is recorded.
#[allow(dead_code)]
pub struct MockSite {
    pub base: Url,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockSite {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let routes = routes.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let Some(target) = read_request_target(&mut socket).await else {
                        return;
                    };
                    log.lock().unwrap().push(target.clone());
                    let path = target.split('?').next().unwrap_or("").to_string();
                    let reply = routes
                        .get(&path)
                        .cloned()
                        .unwrap_or_else(|| Reply::status(404));
                    let _ = socket.write_all(&build_response(&reply)).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            requests,
        }
    }

    /// Request targets (path plus query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|target| target.split('?').next() == Some(path))
            .count()
    }
}

async fn read_request_target(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

fn build_response(reply: &Reply) -> Vec<u8> {
    let status_text = match reply.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let headers = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        reply.status,
        status_text,
        reply.content_type,
        reply.content_length.unwrap_or(reply.body.len())
    );
    let mut response = headers.into_bytes();
    response.extend_from_slice(&reply.body);
    response
}

/// `searchindex.js` body for the given `(docname, title)` pairs.
#[allow(dead_code)]
pub fn searchindex_js(pages: &[(&str, &str)]) -> String {
    let docnames: Vec<&str> = pages.iter().map(|(d, _)| *d).collect();
    let titles: Vec<&str> = pages.iter().map(|(_, t)| *t).collect();
    format!(
        "Search.setIndex({});",
        serde_json::json!({ "docnames": docnames, "titles": titles, "terms": {} })
    )
}
