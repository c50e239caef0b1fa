use std::time::{Duration, Instant};

use crate::error::GatewayError;
use crate::metrics::UPSTREAM_LATENCY;
use crate::models::{GenerateContentRequest, GenerateContentResponse};

// Client for the Gemini generateContent endpoint
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            timeout,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;

        let start = Instant::now();
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .timeout(self.timeout)
            .json(req)
            .send()
            .await?;
        UPSTREAM_LATENCY.observe(start.elapsed().as_secs_f64());

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<GenerateContentResponse>().await?)
    }

    // Single-prompt request, first completion text
    pub async fn complete(&self, prompt: String) -> Result<Option<String>, GatewayError> {
        let resp = self
            .generate_content(&GenerateContentRequest::from_prompt(prompt))
            .await?;
        Ok(resp.first_text().map(str::to_string))
    }
}

// Parse the outermost JSON object in a completion, ignoring surrounding prose or fences
pub fn extract_json_object(text: &str) -> Result<serde_json::Value, GatewayError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(GatewayError::MalformedCompletion(
            "no JSON object in completion".to_string(),
        ));
    };
    if end < start {
        return Err(GatewayError::MalformedCompletion(
            "no JSON object in completion".to_string(),
        ));
    }

    serde_json::from_str(&text[start..=end])
        .map_err(|e| GatewayError::MalformedCompletion(e.to_string()))
}
