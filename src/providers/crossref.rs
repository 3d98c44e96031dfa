//! CrossRef identifier lookup.
//!
//! Uses the CrossRef REST works API to find the single best match for a
//! publication title. CrossRef asks politely-identified clients to include
//! a mailto in the user agent.

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::Doi;
use crate::providers::ProviderError;
use crate::resolver::{DoiLookup, LookupMatch};
use crate::utils::HttpClient;

const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef-backed [`DoiLookup`].
#[derive(Debug, Clone)]
pub struct CrossRefLookup {
    client: HttpClient,
    base_url: String,
}

impl CrossRefLookup {
    pub fn new() -> Self {
        let user_agent = format!(
            "{}/{} (mailto:crossref@crossref.org)",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        Self {
            client: HttpClient::with_user_agent(&user_agent),
            base_url: CROSSREF_API_BASE.to_string(),
        }
    }

    /// Point the lookup at a different base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }
}

impl Default for CrossRefLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DoiLookup for CrossRefLookup {
    async fn best_match(&self, title: &str) -> Result<Option<LookupMatch>, ProviderError> {
        let url = format!(
            "{}/works?query.title={}&rows=1",
            self.base_url,
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to query CrossRef: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "CrossRef API returned status: {}",
                response.status()
            )));
        }

        let data: CrResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse CrossRef JSON: {}", e)))?;

        let Some(item) = data.message.items.into_iter().next() else {
            return Ok(None);
        };

        // Items occasionally come back without a title array; treat those
        // as no match rather than a parse failure.
        let canonical = item.title.and_then(|t| t.into_iter().next());
        let (Some(canonical), Some(doi)) = (canonical, item.doi.and_then(Doi::new)) else {
            return Ok(None);
        };

        Ok(Some(LookupMatch {
            title: canonical,
            doi,
        }))
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CrResponse {
    message: CrMessage,
}

#[derive(Debug, Deserialize)]
struct CrMessage {
    #[serde(default)]
    items: Vec<CrItem>,
}

#[derive(Debug, Deserialize)]
struct CrItem {
    title: Option<Vec<String>>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn works_body(title: &str, doi: &str) -> String {
        format!(
            r#"{{"message": {{"items": [{{"title": ["{}"], "DOI": "{}"}}]}}}}"#,
            title, doi
        )
    }

    #[tokio::test]
    async fn test_best_match_parses_title_and_doi() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/works")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query.title".into(), "Foo Bar".into()),
                mockito::Matcher::UrlEncoded("rows".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(works_body("Foo Bar", "10.1234/foo"))
            .create_async()
            .await;

        let lookup = CrossRefLookup::with_base_url(server.url());
        let found = lookup.best_match("Foo Bar").await.unwrap().unwrap();

        assert_eq!(found.title, "Foo Bar");
        assert_eq!(found.doi.as_str(), "10.1234/foo");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_items_is_no_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"message": {"items": []}}"#)
            .create_async()
            .await;

        let lookup = CrossRefLookup::with_base_url(server.url());
        assert!(lookup.best_match("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_item_without_title_is_no_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"message": {"items": [{"DOI": "10.1/x"}]}}"#)
            .create_async()
            .await;

        let lookup = CrossRefLookup::with_base_url(server.url());
        assert!(lookup.best_match("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let lookup = CrossRefLookup::with_base_url(server.url());
        match lookup.best_match("anything").await {
            Err(ProviderError::Api(_)) => {}
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
