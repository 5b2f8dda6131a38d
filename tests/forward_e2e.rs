mod e2e_utils;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use url::Url;

use burrow::adapters::ReqwestDownloader;
use burrow::ports::FileDownloaderPort;
use e2e_utils::{closed_port, read_head, read_until_eof, spawn_origin, TestBurrowServer};

/// Origin that answers every request with the same canned response.
async fn canned_origin(response: &'static str) -> SocketAddr {
    spawn_origin(move |mut stream: TcpStream| async move {
        let _ = read_head(&mut stream).await;
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    })
    .await
}

async fn send_through(proxy: &TestBurrowServer, request: &str) -> String {
    let mut stream = TcpStream::connect(proxy.addr())
        .await
        .expect("Should be able to connect to burrow");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("Should be able to write request");
    String::from_utf8_lossy(&read_until_eof(&mut stream).await).into_owned()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_forward_relays_status_headers_and_body() {
    let origin = canned_origin(
        "HTTP/1.1 404 Not Found\r\nX-Custom: a\r\nX-Custom: b\r\n\
         Content-Length: 9\r\nConnection: close\r\n\r\nnot found",
    )
    .await;
    let proxy = TestBurrowServer::start().await;

    let response = send_through(
        &proxy,
        &format!("GET http://{origin}/missing HTTP/1.1\r\nHost: {origin}\r\nConnection: close\r\n\r\n"),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 404"), "Expected 404, got: {}", response);
    let lower = response.to_ascii_lowercase();
    let first = lower.find("x-custom: a").expect("first X-Custom value should be relayed");
    let second = lower.find("x-custom: b").expect("second X-Custom value should be relayed");
    assert!(first < second, "X-Custom values should keep their order: {}", response);
    assert!(response.ends_with("\r\n\r\nnot found"), "got: {}", response);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_forward_passes_request_through() {
    let (seen_tx, seen_rx) = oneshot::channel::<String>();
    let seen_tx = Arc::new(Mutex::new(Some(seen_tx)));

    let origin = spawn_origin(move |mut stream: TcpStream| {
        let seen_tx = seen_tx.clone();
        async move {
            let head = read_head(&mut stream).await;
            if let Some(tx) = seen_tx.lock().unwrap().take() {
                let _ = tx.send(head);
            }
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                .await;
        }
    })
    .await;
    let proxy = TestBurrowServer::start().await;

    let response = send_through(
        &proxy,
        &format!(
            "GET http://{origin}/path?q=1 HTTP/1.1\r\nHost: {origin}\r\n\
             X-Trace: abc\r\nConnection: close\r\n\r\n"
        ),
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {}", response);
    assert!(response.ends_with("ok"), "got: {}", response);

    let seen = tokio::time::timeout(Duration::from_secs(5), seen_rx)
        .await
        .expect("origin should receive the request")
        .unwrap();
    assert!(seen.starts_with("GET /path?q=1 HTTP/1.1\r\n"), "origin saw: {}", seen);
    assert!(seen.to_ascii_lowercase().contains("x-trace: abc"), "origin saw: {}", seen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_forward_origin_form_uses_host_header() {
    let origin = canned_origin("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
    let proxy = TestBurrowServer::start().await;

    let response = send_through(
        &proxy,
        &format!("GET /greeting HTTP/1.1\r\nHost: {origin}\r\nConnection: close\r\n\r\n"),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200"), "got: {}", response);
    assert!(response.ends_with("hello"), "got: {}", response);
}

#[tokio::test]
async fn test_forward_to_unreachable_origin_returns_503() {
    let proxy = TestBurrowServer::start().await;
    let port = closed_port().await;

    let response = send_through(
        &proxy,
        &format!("GET http://127.0.0.1:{port}/ HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n"),
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 503"), "Expected 503, got: {}", response);
    assert!(response.contains("dial tcp"), "body should carry the dial error, got: {}", response);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_request_aimed_at_proxy_itself_is_refused() {
    let proxy = TestBurrowServer::start().await;
    let own = proxy.addr();

    let origin_form = tokio::time::timeout(
        Duration::from_secs(5),
        send_through(&proxy, &format!("GET /x HTTP/1.1\r\nHost: {own}\r\nConnection: close\r\n\r\n")),
    )
    .await
    .expect("self-targeted request should be answered at once");
    assert!(origin_form.starts_with("HTTP/1.1 508"), "Expected 508, got: {}", origin_form);

    let absolute_form = tokio::time::timeout(
        Duration::from_secs(5),
        send_through(
            &proxy,
            &format!("GET http://{own}/x HTTP/1.1\r\nHost: {own}\r\nConnection: close\r\n\r\n"),
        ),
    )
    .await
    .expect("self-targeted request should be answered at once");
    assert!(absolute_form.starts_with("HTTP/1.1 508"), "Expected 508, got: {}", absolute_form);

    // Still serving other clients afterwards.
    let origin = canned_origin("HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok").await;
    let response = send_through(
        &proxy,
        &format!("GET http://{origin}/ HTTP/1.1\r\nHost: {origin}\r\nConnection: close\r\n\r\n"),
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {}", response);
}

#[tokio::test]
async fn test_forward_https_scheme_is_unsupported() {
    let proxy = TestBurrowServer::start().await;

    let response = send_through(
        &proxy,
        "GET https://example.com/ HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 503"), "Expected 503, got: {}", response);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_downloader_through_proxy() {
    let body = "file contents served through burrow\n";
    let origin = spawn_origin(move |mut stream: TcpStream| async move {
        let _ = read_head(&mut stream).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes()).await;
    })
    .await;
    let proxy = TestBurrowServer::start().await;

    let via = Url::parse(&format!("http://{}", proxy.addr())).unwrap();
    let downloader = ReqwestDownloader::new(Some(&via)).expect("Failed to create downloader");

    let destination = std::env::temp_dir().join(format!("burrow_fetch_{}.txt", std::process::id()));
    let url = Url::parse(&format!("http://{}/file.txt", origin)).unwrap();
    let written = downloader
        .download(&url, &destination)
        .await
        .expect("download through burrow should succeed");

    let contents = tokio::fs::read_to_string(&destination).await.unwrap();
    tokio::fs::remove_file(&destination).await.ok();

    assert_eq!(written, body.len() as u64);
    assert_eq!(contents, body);
}
