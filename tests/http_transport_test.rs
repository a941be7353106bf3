use mockito::{Matcher, Server};
use slotmachine_client::{ClientConfig, ClientError, QueryOptions, SlotMachineClient};
use std::io::Write;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

const KEY: &str = "local-test-key-0123456789abcdef";

fn client_for(base_url: &str, timeout: Duration) -> SlotMachineClient {
    let config = ClientConfig::builder(KEY)
        .base_url(base_url)
        .timeout(timeout)
        .header("x-request-id", "it-1")
        .build()
        .unwrap();
    SlotMachineClient::new(config).unwrap()
}

#[test]
fn test_get_with_query_and_headers() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/slotmachine")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("spins".into(), "5".into()),
            Matcher::UrlEncoded("reels".into(), "3".into()),
            Matcher::UrlEncoded("bet".into(), "1".into()),
        ]))
        .match_header("x-api-key", KEY)
        .match_header("auth-mode", "rust")
        .match_header("accept", "application/json")
        .match_header("x-request-id", "it-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ok","error":null,"data":{"win":true}}"#)
        .create();

    let client = client_for(&server.url(), Duration::from_secs(5));
    let response = client
        .execute(&QueryOptions::new().spins(5).reels(3).bet(1.0))
        .unwrap();

    mock.assert();
    assert!(response.is_ok());
    assert_eq!(response.data(), Some(&serde_json::json!({"win": true})));
}

#[test]
fn test_custom_accept_header_on_the_wire() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/slotmachine")
        .match_header("accept", "text/plain")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create();

    let config = ClientConfig::builder(KEY)
        .base_url(server.url())
        .header("Accept", "text/plain")
        .build()
        .unwrap();
    let client = SlotMachineClient::new(config).unwrap();

    assert!(client.execute(&QueryOptions::new()).unwrap().is_ok());
    mock.assert();
}

#[test]
fn test_non_2xx_keeps_status_and_body() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/slotmachine")
        .with_status(401)
        .with_body(r#"{"status":"error","error":"Invalid API key"}"#)
        .create();
    let client = client_for(&server.url(), Duration::from_secs(5));

    let err = client.execute(&QueryOptions::new()).unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.body(), Some(r#"{"status":"error","error":"Invalid API key"}"#));
}

#[test]
fn test_html_body_is_invalid_response() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/slotmachine")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>maintenance</html>")
        .create();
    let client = client_for(&server.url(), Duration::from_secs(5));

    let err = client.execute(&QueryOptions::new()).unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse { status: Some(200), .. }));
    assert_eq!(err.body(), Some("<html>maintenance</html>"));
}

#[test]
fn test_refused_connection_is_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(&format!("http://{addr}"), Duration::from_secs(5));

    let err = client.execute(&QueryOptions::new()).unwrap_err();
    assert!(err.is_network(), "{err}");
}

#[test]
fn test_slow_body_times_out() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/slotmachine")
        .with_status(200)
        .with_chunked_body(|w| {
            thread::sleep(Duration::from_secs(2));
            w.write_all(br#"{"status":"ok"}"#)
        })
        .create();
    let client = client_for(&server.url(), Duration::from_millis(300));

    let err = client.execute(&QueryOptions::new()).unwrap_err();
    assert!(err.is_timeout(), "{err}");
}
