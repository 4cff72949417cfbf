mod common;

use common::{Reply, TWO_WELLS, serve};
use std::net::TcpListener;
use std::time::Duration;
use well_search::{Client, SuggestError};

fn client(base: &str, timeout_ms: u64) -> Client {
    Client::new("secret-key", timeout_ms).unwrap().with_base_url(base)
}

#[test]
fn sends_sanitized_query_and_headers() {
    let stub = serve(vec![Reply::ok(TWO_WELLS)]);
    let found = client(&stub.base_url, 2000)
        .suggest("Wel l-42!")
        .unwrap()
        .expect("a request is issued");
    assert_eq!(found.count(), 2);
    assert_eq!(found.wells[0].uuid, "w-1");
    assert_eq!(found.message.as_deref(), Some("2 wells"));

    let req = stub.requests.recv().unwrap().to_ascii_lowercase();
    assert!(req.starts_with("get /v1/suggest?query=wel42 "), "{req}");
    assert!(req.contains("x-api-key: secret-key"), "{req}");
    assert!(req.contains("content-type: application/json"), "{req}");
    stub.handle.join().unwrap();
    assert!(stub.requests.try_recv().is_err(), "exactly one request");
}

#[test]
fn empty_input_never_connects() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    let c = client(&base, 500);
    assert_eq!(c.suggest(""), Ok(None));
    assert_eq!(c.suggest("-- !!"), Ok(None));
    listener.set_nonblocking(true).unwrap();
    let err = listener.accept().unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
}

#[test]
fn ok_false_is_rejected_with_server_message() {
    let stub = serve(vec![Reply::ok(r#"{"ok": false, "message": "quota exceeded"}"#)]);
    let err = client(&stub.base_url, 2000).suggest("abc").unwrap_err();
    assert_eq!(err, SuggestError::ApiRejected("quota exceeded".into()));
}

#[test]
fn gateway_error_body_surfaces_its_message() {
    let stub = serve(vec![Reply {
        status: 403,
        body: r#"{"message":"Forbidden"}"#.into(),
        delay: Duration::ZERO,
    }]);
    let err = client(&stub.base_url, 2000).suggest("abc").unwrap_err();
    assert_eq!(err, SuggestError::ApiRejected("Forbidden".into()));
}

#[test]
fn http_error_with_non_json_body_is_network_failure() {
    let stub = serve(vec![Reply {
        status: 502,
        body: "<html>bad gateway</html>".into(),
        delay: Duration::ZERO,
    }]);
    let err = client(&stub.base_url, 2000).suggest("abc").unwrap_err();
    assert!(matches!(err, SuggestError::NetworkFailure(ref m) if m.contains("502")), "{err:?}");
}

#[test]
fn garbage_body_on_success_is_malformed() {
    let stub = serve(vec![Reply::ok("not json")]);
    let err = client(&stub.base_url, 2000).suggest("abc").unwrap_err();
    assert!(matches!(err, SuggestError::MalformedResponse(_)), "{err:?}");
}

#[test]
fn slow_server_times_out_without_retry() {
    let stub = serve(vec![Reply {
        status: 200,
        body: TWO_WELLS.into(),
        delay: Duration::from_millis(1500),
    }]);
    let err = client(&stub.base_url, 200).suggest("abc").unwrap_err();
    assert_eq!(err, SuggestError::NetworkTimeout { timeout_ms: 200 });
    stub.handle.join().unwrap();
    assert_eq!(stub.requests.try_iter().count(), 1);
}
