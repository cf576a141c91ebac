//! Shared HTTP plumbing for providers.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use crate::errors::{MarketDataError, RetryPolicy};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "Mozilla/5.0 (compatible; tradebot/0.4)";

/// HTTP client bound to one provider, applying the retry policy.
///
/// A whole call including its retries produces exactly one `Result`, which is
/// what the circuit breaker above it accounts for.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    provider: &'static str,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(provider: &'static str, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            provider,
            retry,
        }
    }

    /// Send a GET built by `build` and return the body text.
    ///
    /// `build` is invoked once per attempt since request builders are not
    /// reusable after `send`.
    pub async fn get_text<F>(&self, build: F) -> Result<String, MarketDataError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt: u32 = 0;

        loop {
            let can_retry = attempt < self.retry.max_retries;

            let response = match build(&self.client).send().await {
                Ok(response) => response,
                Err(e) if (e.is_timeout() || e.is_connect()) && can_retry => {
                    debug!(
                        "{} request failed ({}), retry {}/{}",
                        self.provider,
                        e,
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(self.retry.backoff(attempt)).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => {
                    let message = if e.is_timeout() {
                        "Request timed out".to_string()
                    } else {
                        format!("Request failed: {}", e)
                    };
                    return Err(MarketDataError::transport(self.provider, message));
                }
            };

            let status = response.status();

            if RetryPolicy::is_retryable_status(status.as_u16()) {
                if can_retry {
                    debug!(
                        "{} returned HTTP {}, retry {}/{}",
                        self.provider,
                        status,
                        attempt + 1,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(self.retry.backoff(attempt)).await;
                    attempt += 1;
                    continue;
                }

                if status == StatusCode::TOO_MANY_REQUESTS {
                    warn!("{} rate limited after {} attempts", self.provider, attempt + 1);
                    return Err(MarketDataError::rate_limited(self.provider));
                }

                return Err(MarketDataError::transport(
                    self.provider,
                    format!("HTTP {} after {} attempts", status, attempt + 1),
                ));
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(MarketDataError::ProviderError {
                    source_name: self.provider.to_string(),
                    message: "Invalid or missing API key".to_string(),
                });
            }

            if !status.is_success() {
                return Err(MarketDataError::transport(
                    self.provider,
                    format!("HTTP {}", status),
                ));
            }

            return response
                .text()
                .await
                .map_err(|e| MarketDataError::transport(self.provider, e.to_string()));
        }
    }
}
