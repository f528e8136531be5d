//! Wikipedia lookup used when the knowledge base has no match

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::config::InternetConfig;
use crate::errors::HealthRagError;
use crate::errors::Result;

pub const NO_SUMMARY_ANSWER: &str = "I couldn't find a good internet summary for that query.";
pub const LOOKUP_FAILED_ANSWER: &str = "Internet lookup failed or not available.";
/// Source content when no page URL is known
pub const INTERNET_SOURCE: &str = "internet";

/// Answer text and the URL (or marker) it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAnswer {
    pub answer: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    title: Option<String>,
    extract: Option<String>,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<PageUrl>,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: Option<String>,
}

/// Client for the MediaWiki opensearch and REST summary endpoints
pub struct WebLookup {
    client: Client,
    base: Url,
}

impl WebLookup {
    pub fn new(config: &InternetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("healthrag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HealthRagError::HttpError(e.to_string()))?;
        let base = Url::parse(config.endpoint.trim_end_matches('/')).map_err(|e| {
            HealthRagError::ConfigError(format!("Invalid internet.endpoint: {e}"))
        })?;
        Ok(Self { client, base })
    }

    /// Best-effort summary for `question`; failures become apology answers
    pub async fn lookup(&self, question: &str) -> WebAnswer {
        match self.try_lookup(question).await {
            Ok(Some(answer)) => answer,
            Ok(None) => WebAnswer {
                answer: NO_SUMMARY_ANSWER.to_string(),
                source: INTERNET_SOURCE.to_string(),
            },
            Err(e) => {
                warn!("Internet search failed: {}", e);
                WebAnswer {
                    answer: LOOKUP_FAILED_ANSWER.to_string(),
                    source: INTERNET_SOURCE.to_string(),
                }
            }
        }
    }

    async fn try_lookup(&self, question: &str) -> Result<Option<WebAnswer>> {
        let Some(title) = self.search_title(question).await? else {
            return Ok(None);
        };

        let summary_url = self.page_url(&["api", "rest_v1", "page", "summary", &title])?;
        debug!("Fetching page summary: {}", summary_url);
        let summary: PageSummary = self
            .client
            .get(summary_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| HealthRagError::HttpError(e.to_string()))?
            .json()
            .await
            .map_err(|e| HealthRagError::HttpError(e.to_string()))?;

        let extract = summary
            .extract
            .filter(|e| !e.is_empty())
            .or(summary.title)
            .unwrap_or_default();
        let source = match summary
            .content_urls
            .and_then(|u| u.desktop)
            .and_then(|d| d.page)
        {
            Some(page) => page,
            None => self.page_url(&["wiki", &title])?.to_string(),
        };

        Ok(Some(WebAnswer {
            answer: format!("According to Wikipedia ({title}):\n\n{extract}"),
            source,
        }))
    }

    /// Title of the best opensearch hit
    async fn search_title(&self, question: &str) -> Result<Option<String>> {
        let mut url = self.page_url(&["w", "api.php"])?;
        url.query_pairs_mut()
            .append_pair("action", "opensearch")
            .append_pair("search", question)
            .append_pair("limit", "1")
            .append_pair("namespace", "0")
            .append_pair("format", "json");
        debug!("Searching Wikipedia: {}", url);

        // [query, [titles], [descriptions], [urls]]
        let body: serde_json::Value = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| HealthRagError::HttpError(e.to_string()))?
            .json()
            .await
            .map_err(|e| HealthRagError::HttpError(e.to_string()))?;

        Ok(body
            .get(1)
            .and_then(|titles| titles.get(0))
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    fn page_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                HealthRagError::ConfigError("internet.endpoint cannot be a base URL".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(endpoint: &str) -> WebLookup {
        WebLookup::new(&InternetConfig {
            enabled: true,
            endpoint: endpoint.to_string(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_page_url_encodes_title() {
        let web = lookup("https://en.wikipedia.org");
        let url = web
            .page_url(&["api", "rest_v1", "page", "summary", "Atrial fibrillation"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Atrial%20fibrillation"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = WebLookup::new(&InternetConfig {
            enabled: true,
            endpoint: "not a url".to_string(),
            timeout_secs: 1,
        });
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_gives_apology() {
        // Port 9 (discard) is closed on test machines
        let web = lookup("http://127.0.0.1:9");
        let answer = web.lookup("hypertension").await;
        assert_eq!(answer.answer, LOOKUP_FAILED_ANSWER);
        assert_eq!(answer.source, INTERNET_SOURCE);
    }
}
