use crate::config::HttpConfig;
use crate::domain::ports::{HttpHeaders, HttpResponse, Transport};
use crate::utils::error::{ProfileError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "org-profile";

/// reqwest-backed transport with a fixed timeout and bounded retries.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    retry_attempts: u32,
    retry_backoff: Duration,
    retry_statuses: Vec<u16>,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            retry_statuses: config.retry_statuses.clone(),
        })
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_backoff * 2u32.saturating_pow(attempt)
    }

    async fn wait_before_retry(&self, attempt: u32, url: &str, reason: &str) {
        let delay = self.delay_for(attempt);
        tracing::warn!(
            "🔄 Retrying {} in {:?} ({}/{}): {}",
            url,
            delay,
            attempt + 1,
            self.retry_attempts,
            reason
        );
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse> {
        let mut attempt = 0;

        loop {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.retry_attempts => {
                    self.wait_before_retry(attempt, url, &e.to_string()).await;
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status().as_u16();
            tracing::debug!("API response status: {}", status);

            if self.retry_statuses.contains(&status) && attempt < self.retry_attempts {
                self.wait_before_retry(attempt, url, &format!("status {}", status))
                    .await;
                attempt += 1;
                continue;
            }

            if !response.status().is_success() {
                return Err(ProfileError::Transport {
                    url: url.to_string(),
                    status,
                });
            }

            let response_headers: HttpHeaders = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let body = response.bytes().await?.to_vec();

            return Ok(HttpResponse {
                url: url.to_string(),
                status,
                headers: response_headers,
                body,
            });
        }
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory transport returning scripted responses per URL, in FIFO order.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<String, VecDeque<std::result::Result<HttpResponse, u16>>>,
    requests: Vec<(String, HttpHeaders)>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .routes
            .entry(response.url.clone())
            .or_default()
            .push_back(Ok(response));
    }

    pub fn push_error(&self, url: &str, status: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .routes
            .entry(url.to_string())
            .or_default()
            .push_back(Err(status));
    }

    pub fn requests(&self) -> Vec<(String, HttpHeaders)> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url).collect()
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, headers: &HttpHeaders) -> Result<HttpResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push((url.to_string(), headers.clone()));

        match inner.routes.get_mut(url).and_then(|q| q.pop_front()) {
            Some(Ok(response)) => Ok(response),
            Some(Err(status)) => Err(ProfileError::Transport {
                url: url.to_string(),
                status,
            }),
            None => Err(ProfileError::Transport {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
