//! The configuration request must go straight to the mock server even when
//! the environment names an HTTP proxy.
//!
//! Kept in its own test binary because it sets process-wide proxy variables.

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use suggest_hooks::config::ConfigureSettings;
use suggest_hooks::{ConfigureClient, HttpConfigureClient};

#[tokio::test]
async fn configure_request_ignores_proxy_variables() {
    // Nothing listens on port 1, so a proxied request would fail to connect.
    for var in ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::set_var(var, "http://127.0.0.1:1");
    }
    std::env::remove_var("NO_PROXY");
    std::env::remove_var("no_proxy");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/__configure", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();

        let mut length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                if k.trim().eq_ignore_ascii_case("content-length") {
                    length = v.trim().parse().unwrap();
                }
            }
        }
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).await.unwrap();

        reader
            .get_mut()
            .write_all(b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        (request_line.trim_end().to_string(), String::from_utf8(body).unwrap())
    });

    let settings = ConfigureSettings {
        url,
        timeout_secs: 5,
        ..Default::default()
    };
    let client = HttpConfigureClient::new(&settings).unwrap();

    let status = client.configure("fixtures: {}\n".to_string()).await.unwrap();
    let (request_line, body) = server.await.unwrap();

    assert_eq!(status, 204);
    assert_eq!(request_line, "POST /__configure HTTP/1.1");
    assert_eq!(body, "fixtures: {}\n");
}
