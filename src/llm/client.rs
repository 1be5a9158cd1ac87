use std::env;

use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::period::Period;
use crate::store::KeyValueStore;

use super::error::{GenerationError, Result};
use super::item::{DocumentBased, GeneratedItem, ItemKind, ItemShape, LongEssay, ShortAnswer};
use super::prompt::build_prompt;
use super::response::{GenerateContentRequest, completion_text, parse_completion};
use super::settings::Settings;

pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
pub const ENDPOINT_ENV: &str = "APUSH_GEMINI_ENDPOINT";

#[derive(Debug, Error)]
#[error("invalid Gemini endpoint `{endpoint}`: {reason}")]
pub struct EndpointError {
    endpoint: String,
    reason: String,
}

/// One item to generate.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub kind: ItemKind,
    pub period: &'a Period,
    pub topic: Option<&'a str>,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(kind: ItemKind, period: &'a Period) -> Self {
        Self {
            kind,
            period,
            topic: None,
        }
    }

    pub fn with_topic(mut self, topic: Option<&'a str>) -> Self {
        self.topic = topic;
        self
    }
}

/// Client for Gemini's `generateContent` endpoint.
///
/// Each call issues exactly one request and never retries. Requests carry no
/// explicit timeout.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
        }
    }

    pub fn with_endpoint(endpoint: &str) -> std::result::Result<Self, EndpointError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|err| EndpointError {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            http: Client::new(),
            endpoint,
        })
    }

    /// Uses `APUSH_GEMINI_ENDPOINT` when set.
    pub fn from_env() -> std::result::Result<Self, EndpointError> {
        match env::var(ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self::with_endpoint(&endpoint),
            _ => Ok(Self::new()),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn generate_short_answer<S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        period: &Period,
        topic: Option<&str>,
    ) -> Result<Option<ShortAnswer>> {
        self.generate_item(settings, period, topic).await
    }

    pub async fn generate_document_based<S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        period: &Period,
        topic: Option<&str>,
    ) -> Result<Option<DocumentBased>> {
        self.generate_item(settings, period, topic).await
    }

    pub async fn generate_long_essay<S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        period: &Period,
        topic: Option<&str>,
    ) -> Result<Option<LongEssay>> {
        self.generate_item(settings, period, topic).await
    }

    pub async fn generate<S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        request: &GenerationRequest<'_>,
    ) -> Result<Option<GeneratedItem>> {
        let GenerationRequest {
            kind,
            period,
            topic,
        } = *request;

        let item = match kind {
            ItemKind::ShortAnswer => self
                .generate_short_answer(settings, period, topic)
                .await?
                .map(ItemShape::into_item),
            ItemKind::DocumentBased => self
                .generate_document_based(settings, period, topic)
                .await?
                .map(ItemShape::into_item),
            ItemKind::LongEssay => self
                .generate_long_essay(settings, period, topic)
                .await?
                .map(ItemShape::into_item),
        };
        Ok(item)
    }

    /// `Ok(None)` means the caller should show static content instead.
    pub async fn generate_item<T: ItemShape, S: KeyValueStore>(
        &self,
        settings: &Settings<S>,
        period: &Period,
        topic: Option<&str>,
    ) -> Result<Option<T>> {
        let Some(api_key) = settings.api_key() else {
            warn!(
                kind = T::KIND.abbreviation(),
                "{}",
                GenerationError::MissingCredential
            );
            return Ok(None);
        };

        let result = self.attempt::<T>(&api_key, period, topic).await;
        apply_fallback(T::KIND, result, settings.fallback_enabled())
    }

    async fn attempt<T: ItemShape>(
        &self,
        api_key: &str,
        period: &Period,
        topic: Option<&str>,
    ) -> Result<T> {
        let prompt = build_prompt(T::KIND, period, topic);
        let text = self.request_completion(api_key, &prompt).await?;
        parse_completion(&text)
    }

    async fn request_completion(&self, api_key: &str, prompt: &str) -> Result<String> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", api_key);

        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "requesting completion");
        let response = self
            .http
            .post(url)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Transport {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "received completion");
        completion_text(&body)
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Swallows `result`'s error into `Ok(None)` when fallback is enabled,
/// otherwise hands it back unchanged.
pub fn apply_fallback<T>(
    kind: ItemKind,
    result: Result<T>,
    fallback_enabled: bool,
) -> Result<Option<T>> {
    match result {
        Ok(item) => Ok(Some(item)),
        Err(err) if fallback_enabled => {
            error!(
                kind = kind.abbreviation(),
                error = %err,
                "generation failed, using fallback content"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
