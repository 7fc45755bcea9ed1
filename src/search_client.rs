use std::collections::HashMap;

use async_trait::async_trait;
use eyre::Result;
use scraper::{Html, Selector};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::cli::chat::pipeline::SearchProvider;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search request returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("search returned no results")]
    NoResults,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Web search against the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoClient {
    search_url: String,
    region: String,
    client: reqwest::Client,
}

impl DuckDuckGoClient {
    pub fn new(config: &Config) -> Self {
        Self {
            search_url: config.search_url.clone(),
            region: config.search_region.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn search_results(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let mut form_data = HashMap::new();
        form_data.insert("q", query);
        form_data.insert("kl", self.region.as_str());

        debug!("Searching DuckDuckGo for: {}", query);

        let response = self
            .client
            .post(&self.search_url)
            .form(&form_data)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let html = response.text().await?;
        let results = parse_html_results(&html);

        debug!("DuckDuckGo returned {} results", results.len());

        if results.is_empty() {
            return Err(SearchError::NoResults);
        }

        Ok(results)
    }
}

fn parse_html_results(html: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    // DuckDuckGo HTML result selectors
    let result_selector = Selector::parse("div.result").unwrap();
    let title_selector = Selector::parse("a.result__a").unwrap();
    let snippet_selector = Selector::parse("a.result__snippet").unwrap();

    let mut results = Vec::new();

    for element in document.select(&result_selector) {
        let title_elem = match element.select(&title_selector).next() {
            Some(t) => t,
            None => continue,
        };

        let title = title_elem.text().collect::<String>();
        if title.is_empty() {
            continue;
        }

        let href = title_elem.value().attr("href").unwrap_or_default();
        let url = resolve_redirect(href);

        // Skip DuckDuckGo internal links
        if url.is_empty() || url.contains("duckduckgo.com") {
            continue;
        }

        let snippet = element
            .select(&snippet_selector)
            .next()
            .map(|s| s.text().collect::<String>())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
        });
    }

    results
}

/// Result links come back as protocol-relative redirects of the form
/// `//duckduckgo.com/l/?uddg=<encoded target>`; unwrap them to the real
/// destination so the report can cite usable sources.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    if let Ok(parsed) = Url::parse(&absolute) {
        let is_internal = parsed
            .domain()
            .map_or(false, |domain| domain.ends_with("duckduckgo.com"));

        if is_internal {
            if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
                return target.into_owned();
            }
        }
    }

    absolute
}

fn render_results(results: &[SearchResult]) -> String {
    let mut rendered = String::new();

    for (index, result) in results.iter().enumerate() {
        if index > 0 {
            rendered.push('\n');
        }
        rendered.push_str(&format!("{}. {}\n", index + 1, result.title));
        if !result.snippet.is_empty() {
            rendered.push_str(&format!("{}\n", result.snippet));
        }
        rendered.push_str(&format!("{}\n", result.url));
    }

    rendered
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn search(&self, query: &str) -> Result<String> {
        let results = self.search_results(query).await?;
        Ok(render_results(&results))
    }
}
