//! Translation agent backed by a LibreTranslate-compatible endpoint

use std::time::Duration;

use async_trait::async_trait;
use kora_llm::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{ToolError, ToolResult};
use crate::http;
use crate::tool::{Tool, ToolKind, ToolRequest};

/// Public LibreTranslate instance
pub const DEFAULT_TRANSLATE_URL: &str = "https://libretranslate.com";

/// Source language when the caller names none
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en-US";

const SERVICE: &str = "translate";

#[derive(Deserialize)]
struct TranslateArgs {
    sentence: String,
    target: String,
    #[serde(default = "default_source")]
    source: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE_LANGUAGE.to_string()
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: String,
    target: String,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Reduce a locale tag like `it-IT` to the language code `it`
pub fn language_code(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Translation agent
pub struct TranslateTool {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TranslateTool {
    /// Agent for the endpoint at `base_url`
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http: http::client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    #[instrument(skip(self, args), fields(target = %args.target, len = args.sentence.len()))]
    async fn translate(&self, args: TranslateArgs) -> ToolResult<String> {
        let target = language_code(&args.target);
        if target.is_empty() {
            return Err(ToolError::invalid("translate", "target language is empty"));
        }

        let body = TranslateBody {
            q: &args.sentence,
            source: language_code(&args.source),
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .http
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await?;
        let translated: TranslateResponse = http::json(SERVICE, response).await?;

        debug!("Translation completed");
        Ok(translated.translated_text)
    }
}

#[async_trait]
impl Tool for TranslateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Translate
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::function(
            "translate",
            "Translate a sentence into the target language",
            json!({
                "type": "object",
                "properties": {
                    "sentence": { "type": "string", "description": "Text to translate" },
                    "target": {
                        "type": "string",
                        "description": "Target language, e.g. it-IT, fr-FR, de-DE, es-ES"
                    },
                    "source": {
                        "type": "string",
                        "description": "Source language (default en-US)",
                        "default": DEFAULT_SOURCE_LANGUAGE
                    }
                },
                "required": ["sentence", "target"]
            }),
        )]
    }

    async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        match request.function.as_str() {
            "translate" => self.translate(request.parse()?).await,
            _ => Err(request.unknown()),
        }
    }
}
