use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LlmResult;
use crate::types::{ChatRequest, ChatResponse};

/// A chat-completion backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        (**self).chat(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    async fn chat(&self, request: ChatRequest) -> LlmResult<ChatResponse> {
        (**self).chat(request).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
