//! Gmail agent over the Gmail REST API
//!
//! Authentication is a bearer access token stored in a JSON credentials file
//! (`{"access_token": "..."}`). The file is read on every call, so refreshing
//! it externally takes effect without a restart. Without the file every call
//! fails with [`ToolError::Unavailable`].

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use kora_llm::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::{ToolError, ToolResult};
use crate::http;
use crate::tool::{Tool, ToolKind, ToolRequest};

/// Gmail API base for the authenticated user
pub const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Results returned by `search_emails` when no limit is given
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

const MAX_SEARCH_LIMIT: u32 = 10;

const SERVICE: &str = "gmail";

#[derive(Deserialize)]
struct Credentials {
    #[serde(alias = "token")]
    access_token: String,
}

#[derive(Deserialize)]
struct SendArgs {
    to: String,
    subject: String,
    body: String,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT as i64
}

#[derive(Deserialize)]
struct ReadArgs {
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    id: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelList {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Label {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct EmailSummary {
    id: String,
    from: String,
    to: String,
    subject: String,
    date: String,
    snippet: String,
}

#[derive(Debug, Serialize)]
struct EmailContent {
    id: String,
    from: String,
    to: String,
    subject: String,
    date: String,
    body: String,
}

impl Message {
    fn header(&self, name: &str) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    fn summary(&self) -> EmailSummary {
        EmailSummary {
            id: self.id.clone(),
            from: self.header("From"),
            to: self.header("To"),
            subject: self.header("Subject"),
            date: self.header("Date"),
            snippet: self.snippet.clone().unwrap_or_default(),
        }
    }

    fn content(&self) -> EmailContent {
        let body = self
            .payload
            .as_ref()
            .and_then(|p| p.text("text/plain").or_else(|| p.text("text/html").map(|h| strip_html(&h))))
            .filter(|b| !b.trim().is_empty())
            .or_else(|| self.snippet.clone())
            .unwrap_or_else(|| "No body content available".to_string());

        EmailContent {
            id: self.id.clone(),
            from: self.header("From"),
            to: self.header("To"),
            subject: self.header("Subject"),
            date: self.header("Date"),
            body,
        }
    }
}

impl MessagePart {
    /// First body of `mime_type` in this part tree, depth first
    fn text(&self, mime_type: &str) -> Option<String> {
        if self.mime_type.as_deref() == Some(mime_type) {
            if let Some(text) = self.body.as_ref().and_then(|b| b.data.as_deref()).and_then(decode_body) {
                return Some(text);
            }
        }
        self.parts.iter().find_map(|p| p.text(mime_type))
    }
}

/// Decode base64url body data, tolerating padding
fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// RFC 2822 message, base64url-encoded for the `raw` field
fn encode_message(to: &str, subject: &str, body: &str) -> String {
    let message = format!(
        "To: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}"
    );
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

fn pretty<T: Serialize>(value: &T) -> ToolResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::computation(e.to_string()))
}

/// Gmail agent
pub struct GmailTool {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<PathBuf>,
}

impl GmailTool {
    /// Agent reading its token from `credentials`
    pub fn new(credentials: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            http: http::client(timeout),
            base_url: GMAIL_API_BASE.to_string(),
            credentials,
        }
    }

    /// Point at another API base
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn token(&self) -> ToolResult<String> {
        let path = self
            .credentials
            .as_ref()
            .ok_or_else(|| ToolError::unavailable(SERVICE, "GMAIL_CREDENTIALS is not set"))?;

        let raw = tokio::fs::read(path).await.map_err(|e| {
            ToolError::unavailable(
                SERVICE,
                format!("cannot read credentials {}: {e}", path.display()),
            )
        })?;
        let credentials: Credentials = serde_json::from_slice(&raw).map_err(|e| {
            ToolError::unavailable(SERVICE, format!("malformed credentials file: {e}"))
        })?;
        if credentials.access_token.trim().is_empty() {
            return Err(ToolError::unavailable(SERVICE, "credentials file has an empty token"));
        }
        Ok(credentials.access_token)
    }

    async fn get_message(&self, token: &str, id: &str, format: &str) -> ToolResult<Message> {
        let response = self
            .http
            .get(format!("{}/messages/{id}", self.base_url))
            .bearer_auth(token)
            .query(&[("format", format)])
            .send()
            .await?;
        http::json(SERVICE, response).await
    }

    #[instrument(skip(self, args), fields(to = %args.to))]
    async fn send_email(&self, args: SendArgs) -> ToolResult<String> {
        if !args.to.contains('@') || args.to.contains(['\r', '\n']) {
            return Err(ToolError::invalid("send_email", format!("invalid recipient '{}'", args.to)));
        }
        if args.subject.contains(['\r', '\n']) {
            return Err(ToolError::invalid("send_email", "subject must be a single line"));
        }

        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{}/messages/send", self.base_url))
            .bearer_auth(&token)
            .json(&json!({ "raw": encode_message(&args.to, &args.subject, &args.body) }))
            .send()
            .await?;
        let sent: MessageRef = http::json(SERVICE, response).await?;

        info!(message_id = %sent.id, "Email sent");
        Ok(format!(
            "Email sent successfully to {}. Message ID: {}",
            args.to, sent.id
        ))
    }

    #[instrument(skip(self, args), fields(query = %args.query))]
    async fn search_emails(&self, args: SearchArgs) -> ToolResult<String> {
        let limit = args.limit.clamp(1, MAX_SEARCH_LIMIT as i64);
        let token = self.token().await?;

        let response = self
            .http
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(&token)
            .query(&[("q", args.query.as_str())])
            .query(&[("maxResults", limit)])
            .send()
            .await?;
        let list: MessageList = http::json(SERVICE, response).await?;

        if list.messages.is_empty() {
            return Ok(format!("No emails found matching query: {}", args.query));
        }

        let mut summaries = Vec::with_capacity(list.messages.len());
        for reference in &list.messages {
            match self.get_message(&token, &reference.id, "metadata").await {
                Ok(message) => summaries.push(message.summary()),
                Err(e) => warn!(message_id = %reference.id, error = %e, "Skipping unreadable message"),
            }
        }

        debug!(found = summaries.len(), "Email search completed");
        Ok(format!("Found {} emails:\n{}", summaries.len(), pretty(&summaries)?))
    }

    #[instrument(skip(self))]
    async fn read_email(&self, message_id: &str) -> ToolResult<String> {
        let message_id = message_id.trim();
        if message_id.is_empty() {
            return Err(ToolError::invalid("read_email", "message_id is empty"));
        }
        // ids are spliced into the request path
        if !message_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ToolError::invalid(
                "read_email",
                format!("malformed message_id '{message_id}'"),
            ));
        }
        let token = self.token().await?;
        let message = self.get_message(&token, message_id, "full").await?;
        pretty(&message.content())
    }

    async fn get_labels(&self) -> ToolResult<String> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{}/labels", self.base_url))
            .bearer_auth(&token)
            .send()
            .await?;
        let list: LabelList = http::json(SERVICE, response).await?;
        Ok(format!("Found {} labels:\n{}", list.labels.len(), pretty(&list.labels)?))
    }
}

#[async_trait]
impl Tool for GmailTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Gmail
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::function(
                "send_email",
                "Send an email from the user's Gmail account",
                json!({
                    "type": "object",
                    "properties": {
                        "to": { "type": "string", "description": "Recipient email address" },
                        "subject": { "type": "string", "description": "Subject line" },
                        "body": { "type": "string", "description": "Plain-text body" }
                    },
                    "required": ["to", "subject", "body"]
                }),
            ),
            ToolDefinition::function(
                "search_emails",
                "Search the user's Gmail, e.g. 'from:alice@example.com' or 'subject:invoice'",
                json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Gmail search query" },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum results, 1-10 (default 5)",
                            "default": DEFAULT_SEARCH_LIMIT
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolDefinition::function(
                "read_email",
                "Read one email by its message id",
                json!({
                    "type": "object",
                    "properties": {
                        "message_id": { "type": "string", "description": "Gmail message id" }
                    },
                    "required": ["message_id"]
                }),
            ),
            ToolDefinition::function(
                "get_labels",
                "List the user's Gmail labels",
                json!({ "type": "object", "properties": {} }),
            ),
        ]
    }

    async fn invoke(&self, request: ToolRequest) -> ToolResult<String> {
        match request.function.as_str() {
            "send_email" => self.send_email(request.parse()?).await,
            "search_emails" => self.search_emails(request.parse()?).await,
            "read_email" => {
                let args: ReadArgs = request.parse()?;
                self.read_email(&args.message_id).await
            }
            "get_labels" => self.get_labels().await,
            _ => Err(request.unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(s: &str) -> String {
        URL_SAFE_NO_PAD.encode(s)
    }

    #[test]
    fn message_is_base64url_mime() {
        let raw = encode_message("bob@example.com", "Hi", "Hello there");
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap();
        assert!(decoded.starts_with("To: bob@example.com\r\nSubject: Hi\r\n"));
        assert!(decoded.ends_with("\r\n\r\nHello there"));
    }

    #[test]
    fn body_prefers_plain_text_in_nested_parts() {
        let message: Message = serde_json::from_value(json!({
            "id": "m1",
            "snippet": "snip",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [{"name": "Subject", "value": "Report"}],
                "parts": [
                    {"mimeType": "text/html", "body": {"data": b64("<p>html</p>")}},
                    {"mimeType": "multipart/related", "parts": [
                        {"mimeType": "text/plain", "body": {"data": b64("plain body")}}
                    ]}
                ]
            }
        }))
        .unwrap();

        let content = message.content();
        assert_eq!(content.body, "plain body");
        assert_eq!(content.subject, "Report");
        assert_eq!(content.from, "");
    }

    #[test]
    fn body_falls_back_to_html_then_snippet() {
        let html: Message = serde_json::from_value(json!({
            "id": "m2",
            "payload": {"mimeType": "text/html", "body": {"data": b64("<div>\n<b>Hi</b> there\n</div>")}}
        }))
        .unwrap();
        assert_eq!(html.content().body, "Hi there");

        let bare: Message = serde_json::from_value(json!({
            "id": "m3",
            "snippet": "just a snippet",
            "payload": {"mimeType": "text/plain", "body": {"size": 0}}
        }))
        .unwrap();
        assert_eq!(bare.content().body, "just a snippet");
    }

    #[test]
    fn padded_body_data_decodes() {
        assert_eq!(decode_body("aGk="), Some("hi".to_string()));
        assert_eq!(decode_body("aGk"), Some("hi".to_string()));
    }

    #[tokio::test]
    async fn missing_credentials_are_unavailable() {
        let tool = GmailTool::new(None, Duration::from_secs(5));
        let err = tool
            .invoke(ToolRequest::new("get_labels", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable { .. }));

        let tool = GmailTool::new(Some("/nonexistent/token.json".into()), Duration::from_secs(5));
        let err = tool
            .invoke(ToolRequest::new("search_emails", json!({"query": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn message_ids_must_be_plain_alphanumeric() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = dir.path().join("token.json");
        std::fs::write(&credentials, r#"{"access_token": "ya29.test"}"#).unwrap();
        let tool = GmailTool::new(Some(credentials), Duration::from_secs(5))
            .with_base_url("http://127.0.0.1:9");

        for id in ["../labels", "x?format=raw", "a/b", "18c2%2F", "id#frag"] {
            let err = tool
                .invoke(ToolRequest::new("read_email", json!({ "message_id": id })))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments { ref function, .. } if function == "read_email"),
                "{id:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn header_injection_is_rejected() {
        let tool = GmailTool::new(None, Duration::from_secs(5));
        let err = tool
            .invoke(ToolRequest::new(
                "send_email",
                json!({"to": "a@b.c\r\nBcc: evil@x.y", "subject": "s", "body": "b"}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
