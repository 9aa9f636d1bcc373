use receipt_categorizer::{
    CallPolicy, Categorizer, CategorizerConfig, ClassificationSource, Classifier, ClassifierError,
    FallbackReason, GeminiClient, GeminiConfig, ReceiptRecord,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn gemini_config(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        api_key: "test-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        base_url: server.uri(),
    }
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn records() -> Vec<ReceiptRecord> {
    vec![
        ReceiptRecord::try_from(json!({
            "amount": 34.99,
            "description": "Wall Charger 745883793740",
            "payee": "Walmart",
            "receiptId": "r-1"
        }))
        .unwrap(),
        ReceiptRecord::try_from(json!({"total": 5.25, "vendor": "Corner Store", "note": "milk and eggs"})).unwrap(),
    ]
}

fn categorizer(server: &MockServer, policy: CallPolicy) -> Categorizer {
    Categorizer::builder()
        .classifier(Arc::new(GeminiClient::new(gemini_config(server))))
        .call_policy(policy)
        .build()
}

#[tokio::test]
async fn sends_single_turn_json_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user"}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(gemini_config(&server));
    let body = client.generate("hello").await.unwrap();

    assert_eq!(body, candidate("[]"));

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["contents"][0]["parts"][0]["text"], json!("hello"));
    assert_eq!(sent["contents"].as_array().map(Vec::len), Some(1));
    assert!(sent["generationConfig"]["temperature"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn qualified_model_name_hits_same_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(GeminiConfig {
        model: "models/gemini-1.5-flash".to_string(),
        ..gemini_config(&server)
    });

    assert!(client.generate("hello").await.is_ok());
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = GeminiClient::new(gemini_config(&server)).generate("hello").await.unwrap_err();

    match err {
        ClassifierError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn non_json_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = GeminiClient::new(gemini_config(&server)).generate("hello").await.unwrap_err();

    assert!(matches!(err, ClassifierError::InvalidBody(_)));
}

#[tokio::test]
async fn classifier_reply_is_normalized_end_to_end() {
    let server = MockServer::start().await;
    let reply = r#"[
        {"categoryId": "shopping", "subcategoryId": "shopping:electronics-accessories"},
        {"categoryId": "foodAndDrinks", "subcategoryId": "Groceries"}
    ]"#;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = categorizer(&server, CallPolicy::default())
        .categorize_batch(records())
        .await;

    assert_eq!(outcome.source, ClassificationSource::Classifier);
    assert_eq!(outcome.records[0].get("subcategoryId"), Some(&json!("shopping:electronics-accessories")));
    assert_eq!(outcome.records[0].get("receiptId"), Some(&json!("r-1")));
    assert_eq!(outcome.records[1].get("category"), Some(&json!("foodAndDrinks")));
    assert_eq!(outcome.records[1].get("subcategoryId"), Some(&json!("foodAndDrinks:groceries")));
    assert_eq!(outcome.records[1].get("subcategory"), Some(&json!("Groceries")));
}

#[tokio::test]
async fn server_error_falls_back_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let categorizer = categorizer(&server, CallPolicy::default());
    let outcome = categorizer.categorize_batch(records()).await;

    assert!(matches!(
        outcome.source,
        ClassificationSource::Fallback(FallbackReason::ClassifierFailed(_))
    ));
    assert_eq!(outcome.records, categorizer.fallback().apply_all(&records()));
    assert_eq!(outcome.records[0].get("subcategoryId"), Some(&json!("shopping:electronics-accessories")));
}

#[tokio::test]
async fn retry_policy_recovers_from_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"[{"categoryId": "shopping"}, {"categoryId": "income", "subcategoryId": "income:sale"}]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let policy = CallPolicy {
        max_attempts: 2,
        backoff: Duration::from_millis(5),
        deadline: None,
    };
    let outcome = categorizer(&server, policy).categorize_batch(records()).await;

    assert_eq!(outcome.source, ClassificationSource::Classifier);
    assert_eq!(outcome.records[0].get("subcategoryId"), Some(&json!("shopping:clothes-shoes")));
    assert_eq!(outcome.records[1].get("subcategoryId"), Some(&json!("income:sale")));
}

#[tokio::test]
async fn deadline_expiry_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("[{}, {}]"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let policy = CallPolicy {
        deadline: Some(Duration::from_millis(100)),
        ..CallPolicy::default()
    };
    let outcome = categorizer(&server, policy).categorize_batch(records()).await;

    match outcome.source {
        ClassificationSource::Fallback(FallbackReason::ClassifierFailed(message)) => {
            assert!(message.contains("deadline"));
        }
        other => panic!("unexpected source: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_length_reply_falls_back_for_whole_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"[{"categoryId": "income", "subcategoryId": "income:sale"}]"#,
        )))
        .mount(&server)
        .await;

    let outcome = categorizer(&server, CallPolicy::default())
        .categorize_batch(records())
        .await;

    assert!(matches!(
        outcome.source,
        ClassificationSource::Fallback(FallbackReason::InvalidResponse(_))
    ));
    assert!(outcome
        .records
        .iter()
        .all(|record| record.get("category") != Some(&json!("income"))));
}

#[tokio::test]
async fn config_without_key_never_calls_out() {
    let categorizer = Categorizer::from_config(&CategorizerConfig::default()).unwrap();

    let outcome = categorizer.categorize_batch(records()).await;

    assert_eq!(
        outcome.source,
        ClassificationSource::Fallback(FallbackReason::MissingCredential)
    );
    assert_eq!(outcome.records[1].get("category"), Some(&json!("others")));
}
