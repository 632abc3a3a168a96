//! HTTP-level tests for the relay client against a local mock server.

use httpmock::prelude::*;
use serde_json::json;

use profile_brief::{Profile, QuestionRequest, RelayClient, ServiceError, Summarizer};

fn jane() -> Profile {
    Profile::new("Jane Doe")
        .with_headline("Staff Engineer")
        .with_full_text("Jane Doe Staff Engineer Oslo")
}

#[tokio::test]
async fn summarize_posts_profile_payload() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/summarize").json_body_includes(
            json!({
                "success": true,
                "name": "Jane Doe",
                "headline": "Staff Engineer",
                "fullText": "Jane Doe Staff Engineer Oslo"
            })
            .to_string(),
        );
        then.status(200).json_body(json!({ "summary": "A" }));
    });

    let client = RelayClient::new(&server.base_url()).expect("relay client should be created");
    let summary = client.summarize(&jane()).await.expect("summarize should succeed");

    mock.assert();
    assert_eq!(summary, "A");
}

#[tokio::test]
async fn web_summarize_uses_its_own_endpoint() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/web-summarize");
        then.status(200).json_body(json!({ "summary": "B" }));
    });

    let client = RelayClient::new(&server.base_url()).expect("relay client should be created");
    let summary = client.web_summarize(&jane()).await.expect("web summarize should succeed");

    mock.assert();
    assert_eq!(summary, "B");
}

#[tokio::test]
async fn chat_sends_question_and_flag() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/chat").json_body_includes(
            json!({
                "question": "Where did they study?",
                "useWebSearch": true,
                "profile": { "name": "Jane Doe", "success": true }
            })
            .to_string(),
        );
        then.status(200).json_body(json!({ "answer": "NTNU" }));
    });

    let client = RelayClient::new(&server.base_url()).expect("relay client should be created");
    let request = QuestionRequest::new(jane(), "Where did they study?").with_web_search(true);
    let answer = client.chat(&request).await.expect("chat should succeed");

    mock.assert();
    assert_eq!(answer, "NTNU");
}

#[tokio::test]
async fn error_body_maps_to_rejection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/summarize");
        then.status(500).json_body(json!({ "error": "OpenAI call failed." }));
    });

    let client = RelayClient::new(&server.base_url()).expect("relay client should be created");
    let err = client.summarize(&jane()).await.unwrap_err();

    assert_eq!(
        err,
        ServiceError::Rejected {
            status: 500,
            message: "OpenAI call failed.".into()
        }
    );
}

#[tokio::test]
async fn unreachable_relay_is_transport_error() {
    // Port 9 (discard) is not served locally.
    let client = RelayClient::new("http://127.0.0.1:9").expect("relay client should be created");
    let err = client.summarize(&jane()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Unreachable(_)));
    assert_eq!(err.user_message(), "Backend unreachable.");
}
