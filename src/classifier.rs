// 🤖 Classifier Client - Batched generateContent calls
// The pipeline only sees the Classifier trait; tests swap in mocks.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Low temperature keeps the reply close to the requested schema.
pub const CLASSIFIER_TEMPERATURE: f32 = 0.2;
const MODEL_PATH_PREFIX: &str = "models/";

/// Everything that can go wrong before a usable body is in hand.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response body is not JSON: {0}")]
    InvalidBody(String),

    #[error("classifier call exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short provider label for logs
    fn name(&self) -> &str;

    /// Send the prompt, return the raw JSON response body.
    async fn generate(&self, prompt: &str) -> Result<Value, ClassifierError>;
}

// ============================================================================
// GEMINI WIRE FORMAT
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_turn(prompt: &'a str) -> Self {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: CLASSIFIER_TEMPERATURE,
                response_mime_type: "application/json",
            },
        }
    }
}

// ============================================================================
// GEMINI CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Bare (`gemini-1.5-flash`) or qualified (`models/gemini-1.5-flash`)
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// No timeout is configured on the HTTP client; deadlines belong to the
    /// caller's [`CallPolicy`].
    pub fn new(config: GeminiConfig) -> Self {
        GeminiClient {
            config,
            client: Client::new(),
        }
    }

    /// Endpoint without the credential, safe to log.
    pub fn endpoint(&self) -> String {
        build_endpoint(&self.config.base_url, &self.config.model)
    }
}

/// Qualify a model identifier as `models/<name>`.
pub fn qualify_model(model: &str) -> String {
    let model = model.trim();
    if model.starts_with(MODEL_PATH_PREFIX) {
        model.to_string()
    } else {
        format!("{}{}", MODEL_PATH_PREFIX, model)
    }
}

pub fn build_endpoint(base_url: &str, model: &str) -> String {
    let qualified = qualify_model(model);
    let name = &qualified[MODEL_PATH_PREFIX.len()..];
    format!(
        "{}/v1beta/{}{}:generateContent",
        base_url.trim_end_matches('/'),
        MODEL_PATH_PREFIX,
        urlencoding::encode(name)
    )
}

#[async_trait]
impl Classifier for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<Value, ClassifierError> {
        let endpoint = self.endpoint();
        debug!(model = %self.config.model, %endpoint, "calling classifier (key hidden)");

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&GenerateContentRequest::single_turn(prompt))
            .send()
            .await
            // Strip the URL: it carries the key as a query parameter.
            .map_err(|e| ClassifierError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClassifierError::Transport(e.without_url().to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClassifierError::InvalidBody(e.to_string()))
    }
}

// ============================================================================
// CALL POLICY
// ============================================================================

/// Retry and deadline settings wrapped around a classifier call.
///
/// The default is a single attempt with no deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPolicy {
    /// Total attempts, at least 1
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for each retry after it
    pub backoff: Duration,

    /// Upper bound for all attempts together
    pub deadline: Option<Duration>,
}

impl Default for CallPolicy {
    fn default() -> Self {
        CallPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
            deadline: None,
        }
    }
}

pub async fn call_with_policy(
    classifier: &Arc<dyn Classifier>,
    prompt: &str,
    policy: &CallPolicy,
) -> Result<Value, ClassifierError> {
    let max_attempts = policy.max_attempts.max(1);
    let backoff = ExponentialBuilder::default()
        .with_min_delay(policy.backoff)
        .with_factor(2.0)
        .with_max_times((max_attempts - 1) as usize);

    let mut attempt = 0u32;
    let attempts = (|| classifier.generate(prompt))
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .notify(|err: &ClassifierError, delay: Duration| {
            attempt += 1;
            warn!(
                classifier = classifier.name(),
                attempt,
                max_attempts,
                ?delay,
                error = %err,
                "classifier attempt failed, retrying"
            );
        });

    match policy.deadline {
        Some(deadline) => tokio::time::timeout(deadline, attempts)
            .await
            .unwrap_or(Err(ClassifierError::DeadlineExceeded(deadline))),
        None => attempts.await,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails `failures` times, then answers.
    struct FlakyClassifier {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Classifier for FlakyClassifier {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn generate(&self, _prompt: &str) -> Result<Value, ClassifierError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ClassifierError::Status {
                    status: 503,
                    body: "busy".to_string(),
                })
            } else {
                Ok(json!({"ok": true}))
            }
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl Classifier for SlowClassifier {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<Value, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(json!({}))
        }
    }

    #[test]
    fn test_qualify_model() {
        assert_eq!(qualify_model("gemini-1.5-flash"), "models/gemini-1.5-flash");
        assert_eq!(qualify_model("models/gemini-1.5-pro"), "models/gemini-1.5-pro");
    }

    #[test]
    fn test_build_endpoint() {
        let expected =
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

        assert_eq!(build_endpoint(DEFAULT_API_BASE_URL, "gemini-1.5-flash"), expected);
        assert_eq!(build_endpoint("https://generativelanguage.googleapis.com/", "models/gemini-1.5-flash"), expected);
        assert_eq!(
            build_endpoint("http://localhost:1234", "my model"),
            "http://localhost:1234/v1beta/models/my%20model:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::single_turn("hello")).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {"temperature": 0.2f32, "responseMimeType": "application/json"}
            })
        );
    }

    #[tokio::test]
    async fn test_default_policy_does_not_retry() {
        let flaky = Arc::new(FlakyClassifier { failures: 1, calls: AtomicU32::new(0) });
        let classifier: Arc<dyn Classifier> = flaky.clone();

        let result = call_with_policy(&classifier, "p", &CallPolicy::default()).await;

        assert!(matches!(result, Err(ClassifierError::Status { status: 503, .. })));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_policy_retries_until_success() {
        let flaky = Arc::new(FlakyClassifier { failures: 2, calls: AtomicU32::new(0) });
        let classifier: Arc<dyn Classifier> = flaky.clone();
        let policy = CallPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
            deadline: None,
        };

        let result = call_with_policy(&classifier, "p", &policy).await;

        assert_eq!(result.unwrap(), json!({"ok": true}));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_an_error() {
        let classifier: Arc<dyn Classifier> = Arc::new(SlowClassifier);
        let policy = CallPolicy {
            deadline: Some(Duration::from_millis(20)),
            ..CallPolicy::default()
        };

        let result = call_with_policy(&classifier, "p", &policy).await;

        assert!(matches!(result, Err(ClassifierError::DeadlineExceeded(_))));
    }
}
