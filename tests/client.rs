//! Client behavior against an in-memory transport

mod common;

use common::{FakeTransport, Reply};
use serde_json::json;
use tether::{Client, Cookie, Directory, FileRef, FileSystem, LocalFileSystem, ResponseData, WireBody};

fn client_with(fake: &FakeTransport, root: &std::path::Path) -> Client {
    Client::builder()
        .transport(fake.clone())
        .files_root(root)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_not_found_is_returned_as_data() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().reply(
        "/missing",
        Reply::new(404, "application/json; charset=utf-8", r#"{"error":"missing"}"#),
    );
    let client = client_with(&fake, dir.path());

    let response = client.get("https://api.test/missing").send().await.unwrap();

    assert_eq!(response.status(), 404);
    assert!(response.is_client_error());
    assert_eq!(response.data(), &ResponseData::Json(json!({"error": "missing"})));
}

#[tokio::test]
async fn test_text_response_is_kept_raw() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().reply("/hello", Reply::new(200, "text/plain", "hello"));
    let client = client_with(&fake, dir.path());

    let response = client.get("https://api.test/hello").send().await.unwrap();

    assert_eq!(response.data().as_text(), Some("hello"));
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().reply("/broken", Reply::new(200, "application/json", "{not json"));
    let client = client_with(&fake, dir.path());

    let error = client.get("https://api.test/broken").send().await.unwrap_err();

    assert!(error.is_decode());
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_sending() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    for url in ["", "not a url", "ftp://files.test/a"] {
        let error = client.get(url).send().await.unwrap_err();
        assert!(error.is_invalid_request(), "{:?} gave {:?}", url, error);
    }
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_params_are_appended_to_the_url() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .get("https://api.test/items?sort=asc")
        .param("q", "a b")
        .param("page", "2")
        .send()
        .await
        .unwrap();

    assert_eq!(fake.last_request().url.query(), Some("sort=asc&q=a+b&page=2"));
}

#[tokio::test]
async fn test_response_header_names_are_lowercase() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().reply(
        "/headers",
        Reply::new(200, "text/plain", "ok").header("X-Request-Id", "42"),
    );
    let client = client_with(&fake, dir.path());

    let response = client.get("https://api.test/headers").send().await.unwrap();

    assert_eq!(response.headers.get("x-request-id"), Some("42"));
    assert!(response.headers.iter().all(|(name, _)| name == name.to_lowercase()));
}

#[tokio::test]
async fn test_header_names_differing_in_case_collapse() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .get("https://api.test/auth")
        .header("X-Token", "first")
        .header("x-token", "second")
        .send()
        .await
        .unwrap();

    let sent = fake.last_request();
    let values: Vec<_> = sent
        .headers
        .get_all("x-token")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(values, vec!["second"]);
}

#[tokio::test]
async fn test_json_body_reaches_the_transport_in_key_order() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .post("https://api.test/items")
        .json(json!({"name": "Max", "age": 5}))
        .send()
        .await
        .unwrap();

    let sent = fake.last_request();
    assert_eq!(sent.headers.get("content-type").unwrap(), "application/json");
    assert_eq!(sent.body, WireBody::Text(r#"{"name":"Max","age":5}"#.to_string()));
}

#[tokio::test]
async fn test_form_body_is_urlencoded() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .post("https://api.test/form")
        .form(json!({"name": "Max", "age": 5}))
        .send()
        .await
        .unwrap();

    assert_eq!(fake.last_request().body, WireBody::Text("name=Max&age=5".to_string()));
}

#[tokio::test]
async fn test_multipart_request_body_is_sent_as_form_text() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .post("https://api.test/generic")
        .header("Content-Type", "multipart/form-data")
        .body(json!({"name": "Max", "age": 5}))
        .send()
        .await
        .unwrap();

    assert_eq!(fake.last_request().body, WireBody::Text("name=Max&age=5".to_string()));
}

#[tokio::test]
async fn test_upload_then_download_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());
    let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    client
        .upload("https://files.test/blobs/one")
        .from_data(content.clone(), "one.bin")
        .header("Content-Type", "application/json")
        .send()
        .await
        .unwrap();

    let sent = fake.last_request();
    let content_type = sent.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let response = client
        .download("https://files.test/blobs/one")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.bytes_downloaded, 4096);
    assert_eq!(response.blob().unwrap().as_ref(), content.as_slice());
}

#[tokio::test]
async fn test_upload_from_file_and_download_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let files = LocalFileSystem::with_root(dir.path());
    files
        .write_file("photos/cat.jpg", Directory::Documents, "meow".into())
        .await
        .unwrap();

    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    client
        .upload("https://files.test/cats")
        .from_file(FileRef::new("photos/cat.jpg"))
        .content_type("image/jpeg")
        .send()
        .await
        .unwrap();

    match fake.last_request().body {
        WireBody::Bytes(body) => {
            let text = String::from_utf8_lossy(&body);
            assert!(text.contains(r#"name="file"; filename="cat.jpg""#));
            assert!(text.contains("Content-Type: image/jpeg"));
        }
        other => panic!("expected a multipart body, got {:?}", other),
    }

    let response = client
        .download("https://files.test/cats")
        .to_file(FileRef::in_directory("copies/cat.jpg", Directory::Cache))
        .send()
        .await
        .unwrap();

    let path = response.path().unwrap();
    assert!(path.starts_with(dir.path()));
    assert_eq!(tokio::fs::read(path).await.unwrap(), b"meow");
}

#[tokio::test]
async fn test_upload_of_missing_file_fails_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());

    let error = client
        .upload("https://files.test/cats")
        .from_file(FileRef::new("nope.jpg"))
        .send()
        .await
        .unwrap_err();

    assert!(matches!(error, tether::Error::FileAccess { .. }));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_cookie_operations_through_the_client() {
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new();
    let client = client_with(&fake, dir.path());
    let site = "https://shop.test/cart";

    assert!(client.get_cookies(site).unwrap().is_empty());

    client.set_cookie(site, &Cookie::new("session", "abc")).unwrap();
    client
        .set_cookie(site, &Cookie::new("theme", "dark").age_days(30))
        .unwrap();

    let mut keys: Vec<_> = client
        .get_cookies(site)
        .unwrap()
        .into_iter()
        .map(|cookie| cookie.key)
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["session", "theme"]);

    client.delete_cookie(site, "session").unwrap();
    assert_eq!(
        client.get_cookies(site).unwrap(),
        vec![Cookie::new("theme", "dark")]
    );

    client.clear_cookies(site).unwrap();
    assert!(client.get_cookies(site).unwrap().is_empty());
}

#[tokio::test]
async fn test_cookie_operations_reject_invalid_urls() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_with(&FakeTransport::new(), dir.path());

    let error = client.get_cookies("nope").unwrap_err();
    assert!(error.is_invalid_request());
}
