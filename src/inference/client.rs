use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::prompt::Prompt;
use super::truncate_for_log;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

const MAX_ERROR_BODY_LOG_CHARS: usize = 500;
const MAX_OUTPUT_LOG_CHARS: usize = 2_000;

// ============================================================================
// Inference Errors
// ============================================================================
//
// Timeout and Unavailable are worth retrying by the caller. MalformedOutput is
// not: the same prompt will most likely produce the same broken answer.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference request timed out after {0:?}")]
    Timeout(Duration),
    #[error("inference endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("model output is not a JSON action: {0}")]
    MalformedOutput(String),
}

/// Raw text generation. Implementations only talk to the endpoint; JSON
/// extraction happens in `InferenceClient`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, InferenceError>;
}

// ============================================================================
// Together-style text generation client
// ============================================================================

#[derive(Debug, Clone)]
pub struct TogetherClientConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub stop: Vec<String>,
    pub timeout: Duration,
}

impl Default for TogetherClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.together.xyz/inference".to_string(),
            api_key: None,
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            max_tokens: 100,
            temperature: 0.1,
            top_p: 0.7,
            top_k: 50,
            repetition_penalty: 1.0,
            stop: vec!["\n".to_string(), "</s>".to_string()],
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
    stop: &'a [String],
}

/// Legacy responses nest choices under `output`; newer ones put them at the top.
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
    choices: Option<Vec<GenerationChoice>>,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    choices: Vec<GenerationChoice>,
}

#[derive(Debug, Deserialize)]
struct GenerationChoice {
    text: String,
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        let GenerationResponse { output, choices } = self;
        output
            .and_then(|o| o.choices.into_iter().next())
            .or_else(|| choices.and_then(|c| c.into_iter().next()))
            .map(|choice| choice.text)
    }
}

pub struct TogetherClient {
    client: reqwest::Client,
    config: TogetherClientConfig,
}

impl TogetherClient {
    pub fn new(config: TogetherClientConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn transport_error(&self, e: reqwest::Error) -> InferenceError {
        if e.is_timeout() {
            InferenceError::Timeout(self.config.timeout)
        } else {
            InferenceError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for TogetherClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, InferenceError> {
        let body = GenerationRequest {
            model: &self.config.model,
            prompt: prompt.as_str(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            top_k: self.config.top_k,
            repetition_penalty: self.config.repetition_penalty,
            stop: &self.config.stop,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                truncate_for_log(&text, MAX_ERROR_BODY_LOG_CHARS)
            )));
        }

        let parsed: GenerationResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;

        parsed
            .into_text()
            .ok_or_else(|| InferenceError::Unavailable("response has no generated choices".to_string()))
    }
}

// ============================================================================
// Inference Client - endpoint call + JSON extraction, behind a circuit breaker
// ============================================================================

pub struct InferenceClient {
    completion: Arc<dyn CompletionClient>,
    circuit_breaker: CircuitBreaker,
}

impl InferenceClient {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self::with_circuit_breaker(
            completion,
            CircuitBreakerConfig {
                failure_threshold: 5,
                timeout: Duration::from_secs(30),
                success_threshold: 1,
            },
        )
    }

    pub fn with_circuit_breaker(
        completion: Arc<dyn CompletionClient>,
        config: CircuitBreakerConfig,
    ) -> Self {
        Self {
            completion,
            circuit_breaker: CircuitBreaker::new(config),
        }
    }

    /// Ask the model for an action and return the JSON object it produced.
    /// The result is unvalidated; run it through the schema validator.
    pub async fn request_action(&self, prompt: &Prompt) -> Result<Value, InferenceError> {
        let text = match self.circuit_breaker.call(self.completion.complete(prompt)).await {
            Ok(text) => text,
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!("Inference circuit open, failing fast");
                return Err(InferenceError::Unavailable(
                    "circuit breaker open after repeated endpoint failures".to_string(),
                ));
            }
            Err(CircuitBreakerError::OperationFailed(e)) => return Err(e),
        };

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                model_output = %truncate_for_log(&text, MAX_OUTPUT_LOG_CHARS),
                "Raw model output"
            );
        }

        parse_generated_text(&text)
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state().await
    }
}

/// The slice from the first `{` to the last `}`, inclusive.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

pub fn parse_generated_text(text: &str) -> Result<Value, InferenceError> {
    let json = extract_json(text).ok_or_else(|| {
        InferenceError::MalformedOutput(format!(
            "no JSON object in {:?}",
            truncate_for_log(text, MAX_ERROR_BODY_LOG_CHARS)
        ))
    })?;

    serde_json::from_str(json).map_err(|e| InferenceError::MalformedOutput(e.to_string()))
}

/// Replays canned completions, one per call; the last one repeats.
#[cfg(test)]
pub struct ScriptedCompletionClient {
    responses: std::sync::Mutex<Vec<Result<String, InferenceError>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl ScriptedCompletionClient {
    pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
fn clone_result(result: &Result<String, InferenceError>) -> Result<String, InferenceError> {
    match result {
        Ok(text) => Ok(text.clone()),
        Err(InferenceError::Timeout(d)) => Err(InferenceError::Timeout(*d)),
        Err(InferenceError::Unavailable(m)) => Err(InferenceError::Unavailable(m.clone())),
        Err(InferenceError::MalformedOutput(m)) => Err(InferenceError::MalformedOutput(m.clone())),
    }
}

#[cfg(test)]
#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, InferenceError> {
        let index = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let responses = self.responses.lock().unwrap();
        let result = responses
            .get(index)
            .or_else(|| responses.last())
            .expect("scripted client needs at least one response");
        clone_result(result)
    }
}
