/*!
 * Mock provider implementations for testing.
 *
 * Behaviors cover the failure modes the pipeline must contain:
 * - `MockProvider::working()` - pseudo-translates every non-marker line
 * - `MockProvider::failing()` - always fails with an error
 * - `MockProvider::flaky(n)` - fails the first n requests, then succeeds
 * - `MockProvider::dropping_placeholders()` - strips `__KEEP_n__` tokens
 * - `MockProvider::truncating_batches()` - loses all but the first segment
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;

use super::{ChatRequest, Provider};

/// Behavior mode for the mock provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Pseudo-translate by prefixing each content line
    Working,
    /// Always fail with a connection error
    Failing,
    /// Fail the first `fail_first` requests, then behave like Working
    Flaky { fail_first: usize },
    /// Behave like Working but remove every placeholder token
    DropPlaceholders,
    /// Return only the first segment of a batched request
    TruncateBatch,
    /// Echo the input untouched
    Echo,
}

/// Mock provider for exercising translation behavior without a network.
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of completed `complete` calls
    call_count: Arc<AtomicUsize>,
    /// Custom response generator, overriding the behavior when set
    custom_response: Option<fn(&ChatRequest) -> String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// A provider that always succeeds with a marked-up pseudo-translation.
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// A provider that always errors.
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// A provider that fails the first `fail_first` requests.
    pub fn flaky(fail_first: usize) -> Self {
        Self::new(MockBehavior::Flaky { fail_first })
    }

    /// A provider that mangles protection placeholders.
    pub fn dropping_placeholders() -> Self {
        Self::new(MockBehavior::DropPlaceholders)
    }

    /// A provider that loses batch segments.
    pub fn truncating_batches() -> Self {
        Self::new(MockBehavior::TruncateBatch)
    }

    /// A provider that echoes its input.
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Set a custom response generator.
    pub fn with_custom_response(mut self, generator: fn(&ChatRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests that reached this provider.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, for asserting after moves.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.call_count.clone()
    }

    /// Pseudo-translate: prefix content lines, pass batch markers through.
    fn pseudo_translate(text: &str) -> String {
        text.lines()
            .map(|line| {
                if line.starts_with("<<SEG") || line.trim().is_empty() {
                    line.to_string()
                } else {
                    format!("[TR] {}", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove `__KEEP_<n>__` placeholders, simulating a translator that
    /// mangles them.
    fn strip_placeholders(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("__KEEP_") {
            out.push_str(&rest[..start]);
            let tail = &rest[start + "__KEEP_".len()..];
            let digits = tail.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 && tail[digits..].starts_with("__") {
                rest = &tail[digits + 2..];
            } else {
                out.push_str("__KEEP_");
                rest = tail;
            }
        }
        out.push_str(rest);
        out
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let call_index = self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(generator) = self.custom_response {
            return Ok(generator(&request));
        }

        match self.behavior {
            MockBehavior::Working => Ok(Self::pseudo_translate(&request.user_text)),
            MockBehavior::Failing => {
                Err(ProviderError::RequestFailed("mock provider configured to fail".to_string()))
            }
            MockBehavior::Flaky { fail_first } => {
                if call_index < fail_first {
                    Err(ProviderError::ConnectionError("mock transient failure".to_string()))
                } else {
                    Ok(Self::pseudo_translate(&request.user_text))
                }
            }
            MockBehavior::DropPlaceholders => {
                Ok(Self::strip_placeholders(&Self::pseudo_translate(&request.user_text)))
            }
            MockBehavior::TruncateBatch => {
                let first_segment = request
                    .user_text
                    .split("<<SEG_1>>")
                    .next()
                    .unwrap_or(&request.user_text)
                    .to_string();
                Ok(Self::pseudo_translate(&first_segment))
            }
            MockBehavior::Echo => Ok(request.user_text),
        }
    }
}
