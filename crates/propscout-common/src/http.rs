use reqwest::{Client, ClientBuilder, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScoutError};

/// Per-request timeout. A call that exceeds this fails alone; sibling
/// source fetches for the same postal code are unaffected.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries after an HTTP 429, with 1s/2s/4s waits between attempts.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0";

/// A capped HTTP client that only talks to approved upstream hosts.
///
/// The allowlist is built from the configured source endpoints, so a
/// misconfigured adapter cannot reach arbitrary domains. All requests share
/// the same timeout and 429 retry policy.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SourceClient {
    pub fn new<I, S>(allowed_hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowlist = allowed_hosts.into_iter().map(Into::into).collect();
        let client = ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_host(&mut self, host: &str) {
        self.allowlist.insert(host.to_string());
    }

    /// Validates a URL against the allowlist (exact host or subdomain).
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{allowed}")))
    }

    /// Builds a GET request, refusing hosts outside the allowlist.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder> {
        if !self.is_allowed(url) {
            return Err(ScoutError::HostNotAllowed(url.to_string()));
        }
        Ok(self.client.get(url))
    }

    /// Sends a request, retrying on 429 with exponential backoff.
    ///
    /// Any other non-success status fails immediately; after the retry
    /// budget is spent the call fails with `RateLimited`, which callers
    /// demote to `SourceUnavailable`.
    pub async fn execute(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let mut attempt: u32 = 0;
        loop {
            let cloned = req
                .try_clone()
                .ok_or_else(|| ScoutError::Config("request body is not clonable".into()))?;
            let resp = cloned.send().await?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= MAX_RATE_LIMIT_RETRIES {
                    return Err(ScoutError::RateLimited);
                }
                let wait = Duration::from_secs(1 << attempt);
                debug!(attempt, wait_secs = wait.as_secs(), "429 from upstream, backing off");
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            if !resp.status().is_success() {
                return Err(ScoutError::UpstreamStatus(resp.status().as_u16()));
            }

            return Ok(resp);
        }
    }

    /// GET a URL and return the response body as text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.execute(self.get(url)?).await?;
        Ok(resp.text().await?)
    }

    /// GET a URL with query parameters and parse the body as JSON.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let mut req = self.get(url)?.query(query);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = self.execute(req).await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_exact_and_subdomain() {
        let client = SourceClient::new(["api.example.com", "example.org"]).unwrap();
        assert!(client.is_allowed("https://api.example.com/v1/listings"));
        assert!(client.is_allowed("https://data.example.org/search?zip=90210"));
        assert!(!client.is_allowed("https://evil.com/api.example.com"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_get_refuses_unlisted_host() {
        let client = SourceClient::new(["api.example.com"]).unwrap();
        assert!(matches!(
            client.get("https://other.example.net/x"),
            Err(ScoutError::HostNotAllowed(_))
        ));
    }

    #[test]
    fn test_allow_host_extends_allowlist() {
        let mut client = SourceClient::new(["api.example.com"]).unwrap();
        assert!(!client.is_allowed("https://late.example.net/"));
        client.allow_host("late.example.net");
        assert!(client.is_allowed("https://late.example.net/"));
    }
}
