use flate2::read::GzDecoder;
use minihttpd::{limits::ReqLimits, FileStore, Router, Server};
use std::{io::Read, net::SocketAddr};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

async fn start(store: Option<FileStore>) -> SocketAddr {
    let listener = minihttpd::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let server = Server::builder()
        .listener(listener)
        .handler(Router::new(store))
        .request_limits(ReqLimits {
            body_size: 64 * 1024,
            ..ReqLimits::default()
        })
        .build()
        .unwrap();

    let addr = server.local_addr().unwrap();
    tokio::spawn(server.launch());
    addr
}

async fn start_with_dir() -> (SocketAddr, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(Some(FileStore::new(dir.path()))).await;
    (addr, dir)
}

async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

struct Reply {
    head: String,
    body: Vec<u8>,
}

impl Reply {
    fn parse(raw: &[u8]) -> Self {
        let split = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response without head terminator");

        Reply {
            head: String::from_utf8(raw[..split + 4].to_vec()).unwrap(),
            body: raw[split + 4..].to_vec(),
        }
    }

    fn status_line(&self) -> &str {
        self.head.split("\r\n").next().unwrap()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head
            .split("\r\n")
            .skip(1)
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(": "))
    }
}

#[tokio::test]
async fn root_is_bare_ok() {
    let addr = start(None).await;

    let raw = send(addr, b"GET / HTTP/1.1\r\nHost: localhost:4221\r\n\r\n").await;
    assert_eq!(raw, b"HTTP/1.1 200 OK\r\n\r\n");
}

#[tokio::test]
async fn unknown_path_is_bare_not_found() {
    let addr = start(None).await;

    let raw = send(addr, b"GET /unknown/path HTTP/1.1\r\n\r\n").await;
    assert_eq!(raw, b"HTTP/1.1 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn echo() {
    let addr = start(None).await;

    let reply = Reply::parse(&send(addr, b"GET /echo/abc/def HTTP/1.1\r\n\r\n").await);

    assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(reply.header("Content-Type"), Some("text/plain"));
    assert_eq!(reply.header("Content-Length"), Some("7"));
    assert_eq!(reply.header("Content-Encoding"), None);
    assert_eq!(reply.body, b"abc/def");
}

#[tokio::test]
async fn echo_gzip() {
    let addr = start(None).await;

    let request = b"GET /echo/hello HTTP/1.1\r\nAccept-Encoding: deflate, gzip, br\r\n\r\n";
    let reply = Reply::parse(&send(addr, request).await);

    assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(reply.header("Content-Encoding"), Some("gzip"));
    assert_eq!(
        reply.header("Content-Length"),
        Some(reply.body.len().to_string().as_str())
    );

    let mut decoded = String::new();
    GzDecoder::new(&reply.body[..])
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, "hello");
}

#[tokio::test]
async fn user_agent() {
    let addr = start(None).await;

    let request = b"GET /user-agent HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test-agent/1.0\r\n\r\n";
    let reply = Reply::parse(&send(addr, request).await);

    assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(reply.header("Content-Length"), Some("14"));
    assert_eq!(reply.body, b"test-agent/1.0");
}

#[tokio::test]
async fn file_upload_then_download() {
    let (addr, dir) = start_with_dir().await;

    let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
    let mut upload = format!(
        "POST /files/blob.bin HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
        data.len()
    )
    .into_bytes();
    upload.extend_from_slice(&data);

    let raw = send(addr, &upload).await;
    assert_eq!(
        raw,
        b"HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
    );
    assert_eq!(std::fs::read(dir.path().join("blob.bin")).unwrap(), data);

    let reply = Reply::parse(&send(addr, b"GET /files/blob.bin HTTP/1.1\r\n\r\n").await);
    assert_eq!(reply.status_line(), "HTTP/1.1 200 OK");
    assert_eq!(reply.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(reply.header("Content-Length"), Some("5000"));
    assert_eq!(reply.body, data);
}

#[tokio::test]
async fn missing_file() {
    let (addr, _dir) = start_with_dir().await;

    let raw = send(addr, b"GET /files/never-written HTTP/1.1\r\n\r\n").await;
    assert_eq!(
        raw,
        b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn files_without_directory() {
    let addr = start(None).await;

    let raw = send(addr, b"POST /files/a HTTP/1.1\r\nContent-Length: 1\r\n\r\nx").await;
    assert_eq!(
        raw,
        b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let (addr, dir) = start_with_dir().await;
    std::fs::write(dir.path().join("a.txt"), b"stable").unwrap();

    let first = send(addr, b"GET /files/a.txt HTTP/1.1\r\n\r\n").await;
    let second = send(addr, b"GET /files/a.txt HTTP/1.1\r\n\r\n").await;

    assert_eq!(first, second);
    assert_eq!(Reply::parse(&first).body, b"stable");
}

#[tokio::test]
async fn oversized_requests() {
    let addr = start(None).await;

    let head = format!("GET /echo/x HTTP/1.1\r\nX-Pad: {}\r\n\r\n", "a".repeat(2000));
    assert_eq!(
        send(addr, head.as_bytes()).await,
        b"HTTP/1.1 431 Request Header Fields Too Large\r\nContent-Length: 0\r\n\r\n"
    );

    let upload = b"POST /files/a HTTP/1.1\r\nContent-Length: 99999999\r\n\r\n";
    assert_eq!(
        send(addr, upload).await,
        b"HTTP/1.1 413 Payload Too Large\r\nContent-Length: 0\r\n\r\n"
    );
}

#[tokio::test]
async fn malformed_request_gets_no_answer() {
    let addr = start(None).await;

    assert!(send(addr, b"NONSENSE\r\n\r\n").await.is_empty());
    assert!(send(addr, b"GET noslash HTTP/1.1\r\n\r\n").await.is_empty());
}

#[tokio::test]
async fn concurrent_echoes() {
    let addr = start(None).await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            tokio::spawn(async move {
                let request = format!("GET /echo/client-{i} HTTP/1.1\r\n\r\n");
                let reply = Reply::parse(&send(addr, request.as_bytes()).await);
                (i, reply.body)
            })
        })
        .collect();

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body, format!("client-{i}").into_bytes());
    }
}
