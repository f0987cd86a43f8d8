// ABOUTME: Blocking HTTP client for the Tasks Collector API
// ABOUTME: Handles throttling, basic auth, pagination and fail-fast errors

use crate::config::Config;
use crate::model::{DailyResult, Habit, Observation, Page};
use crate::{Error, Result};
use chrono::NaiveDate;
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_string();
    }

    // Find a valid UTF-8 boundary at or before max_chars
    let mut boundary = max_chars;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }

    if boundary == 0 {
        return String::new();
    }

    format!("{}...", &s[..boundary])
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    user: String,
    password: SecretString,
    throttle_min: u64,
    throttle_max: u64,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        user: String,
        password: SecretString,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tasks-collector-tools/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user,
            password,
            throttle_min: 100,
            throttle_max: 300,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(
            config.url.clone(),
            config.user.clone(),
            SecretString::from(config.password.expose_secret().to_string()),
            config.timeout,
        )?;

        Ok(match config.throttle_ms {
            Some((min, max)) => client.with_throttle(min, max),
            None => client,
        })
    }

    pub fn with_throttle(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.throttle_min = min_ms;
        self.throttle_max = max_ms;
        self
    }

    pub fn disable_throttle(mut self) -> Self {
        self.throttle_min = 0;
        self.throttle_max = 0;
        self
    }

    fn throttle(&self) {
        if self.throttle_max > 0 {
            let sleep_ms = rand::thread_rng().gen_range(self.throttle_min..=self.throttle_max);
            std::thread::sleep(Duration::from_millis(sleep_ms));
        }
    }

    fn url(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, endpoint);
        let parsed = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        parsed
            .map(String::from)
            .map_err(|e| Error::Config(format!("invalid API url {}: {}", raw, e)))
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .basic_auth(&self.user, Some(self.password.expose_secret()))
            .header("Accept", "application/json")
            .send()?;

        self.throttle();

        let status = response.status();
        let endpoint = Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Auth {
                    endpoint,
                    status: status.as_u16(),
                })
            }
            StatusCode::NOT_FOUND => return Err(Error::NotFound(endpoint)),
            s if !s.is_success() => {
                let message = response.text().unwrap_or_default();
                return Err(Error::Api {
                    endpoint,
                    status: status.as_u16(),
                    message: truncate_str(&message, 100),
                });
            }
            _ => {}
        }

        // Get response text for better error messages
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                endpoint = %endpoint,
                body = %truncate_str(&body, 500),
                "failed to parse response: {}",
                e
            );
            Error::Parse(e)
        })
    }

    /// Lazily walks every page of a collection endpoint.
    pub fn list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Pages<'_, T>> {
        Ok(Pages {
            client: self,
            next: Some(self.url(endpoint, query)?),
            buffer: Vec::new().into_iter(),
            page: 0,
        })
    }

    pub fn observations(&self, query: &[(&str, String)]) -> Result<Pages<'_, Observation>> {
        let mut query = query.to_vec();
        query.push(("features", "updates".into()));
        self.list("/observation-api/", &query)
    }

    pub fn observation(&self, pk: u64) -> Result<Observation> {
        let url = self.url(
            &format!("/observation-api/{}/", pk),
            &[("features", "updates".into())],
        )?;
        self.get(&url).map_err(|e| match e {
            Error::NotFound(_) => Error::NotFound(format!("observation {}", pk)),
            other => other,
        })
    }

    pub fn daily(&self, date: NaiveDate, thread: &str) -> Result<DailyResult> {
        let url = self.url(
            "/api/events/daily/",
            &[("date", date.to_string()), ("thread", thread.to_string())],
        )?;
        self.get(&url)
    }

    pub fn habits(&self) -> Result<Pages<'_, Habit>> {
        self.list("/habit-api/", &[])
    }
}

/// Iterator over the records of a paginated collection.
///
/// Each page is requested only once the previous one is drained; the first error ends the walk.
pub struct Pages<'a, T> {
    client: &'a ApiClient,
    next: Option<String>,
    buffer: std::vec::IntoIter<T>,
    page: usize,
}

impl<T: DeserializeOwned> Iterator for Pages<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }

            let url = self.next.take()?;
            self.page += 1;

            match self.client.get::<Page<T>>(&url) {
                Ok(page) => {
                    tracing::info!(page = self.page, count = ?page.count, "fetched page");
                    self.next = page.next;
                    self.buffer = page.results.into_iter();
                }
                Err(e) => {
                    tracing::error!(page = self.page, url = %url, "page fetch failed: {}", e);
                    return Some(Err(e));
                }
            }
        }
    }
}
