//! Translation backend client.
//!
//! The forum's translator is a black box behind a single HTTP call: raw text
//! plus a language code in, translated text out. No timeout is imposed — a
//! slow backend suspends the calling recipient task and nothing else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use herald_common::error::AppError;

/// Translation collaborator.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, lang: &str) -> Result<String, AppError>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated: String,
}

/// `Translator` over the forum's HTTP translation endpoint.
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranslator {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, lang: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest { text, lang })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Translation request failed: {}", e)))?;

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Malformed translation response: {}", e)))?;

        Ok(body.translated)
    }
}
