//! Shared bounded-retry helper for LLM calls
//!
//! Every stage funnels its model calls through `complete_with_retry` so the
//! whole pipeline shares one retry policy: a fixed attempt bound with
//! exponential backoff on transient errors, immediate return on everything
//! else. Worst-case latency stays predictable.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::config::RetryConfig;

/// Send a completion request, retrying transient failures
///
/// `config.max_retries` counts *additional* attempts after the first; a
/// rate-limit response uses the server-provided delay when it is shorter
/// than the backoff window, otherwise the backoff wins.
pub async fn complete_with_retry(
    client: &Arc<dyn LlmClient>,
    request: CompletionRequest,
    config: &RetryConfig,
) -> Result<CompletionResponse, LlmError> {
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_delay(config, attempt, last_error.as_ref());
            warn!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying LLM call");
            tokio::time::sleep(backoff).await;
        }

        match client.complete(request.clone()).await {
            Ok(response) => {
                debug!(attempt, "complete_with_retry: success");
                return Ok(response);
            }
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                debug!(attempt, error = %e, "complete_with_retry: transient error");
                last_error = Some(e);
            }
            Err(e) => {
                debug!(attempt, error = %e, "complete_with_retry: giving up");
                return Err(e);
            }
        }
    }

    // Loop always returns before falling through; the bound above makes the
    // last iteration take the give-up branch.
    Err(last_error.unwrap_or_else(|| LlmError::Unavailable("retry bound exhausted".to_string())))
}

/// Deterministic backoff: initial * 2^(attempt-1), capped by a rate-limit hint
fn backoff_delay(config: &RetryConfig, attempt: u32, last_error: Option<&LlmError>) -> Duration {
    let exponential = Duration::from_millis(config.initial_backoff_ms * 2u64.pow(attempt - 1));
    match last_error.and_then(|e| e.retry_after()) {
        Some(hint) if hint < exponential => hint,
        _ => exponential,
    }
}
