use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, Stream};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::errors::RetrievalError;

use super::types::{SearchHit, SearchOptions};

/// Lazily paged stream of ranked hits.
///
/// Single-pass and non-restartable: dropping it mid-sequence abandons the
/// remaining remote pages without fetching them.
pub type HitStream = Pin<Box<dyn Stream<Item = Result<SearchHit, RetrievalError>> + Send>>;

/// Issues combined lexical + vector queries against a remote index.
///
/// Ranking is entirely the index's hybrid fusion; implementations must not
/// re-sort. Zero matches is an empty stream, not an error.
#[async_trait]
pub trait HybridSearchClient: Send + Sync {
    async fn search(
        &self,
        query: &str,
        vector: Vec<f32>,
        options: &SearchOptions,
    ) -> Result<HitStream, RetrievalError>;
}

/// Azure AI Search implementation of `HybridSearchClient`.
#[derive(Clone)]
pub struct AzureAiSearchClient {
    client: Client,
    endpoint: String,
    index_name: String,
    api_key: String,
    api_version: String,
}

impl AzureAiSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RetrievalError::config)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index_name, self.api_version
        )
    }
}

#[async_trait]
impl HybridSearchClient for AzureAiSearchClient {
    async fn search(
        &self,
        query: &str,
        vector: Vec<f32>,
        options: &SearchOptions,
    ) -> Result<HitStream, RetrievalError> {
        let body = json!({
            "search": query,
            "searchFields": options.search_fields.join(","),
            "select": options.select.join(","),
            "vectorQueries": [{
                "kind": "vector",
                "fields": options.vector_field,
                "k": options.k_nearest,
                "vector": vector,
            }],
        });

        let url = self.search_url();
        tracing::debug!(index = %self.index_name, k = options.k_nearest, "issuing hybrid query");

        let payload = post_search(&self.client, &url, &self.api_key, &body).await?;
        let (buffered, next) = parse_page(payload)?;

        let cursor = PageCursor {
            client: self.client.clone(),
            url,
            api_key: self.api_key.clone(),
            buffered,
            next,
        };

        let hits = stream::try_unfold(cursor, |mut cursor| async move {
            loop {
                if let Some(hit) = cursor.buffered.pop_front() {
                    return Ok(Some((hit, cursor)));
                }

                let next = match cursor.next.take() {
                    Some(next) => next,
                    None => return Ok(None),
                };

                let payload = match next {
                    NextPage::Params(params) => {
                        post_search(&cursor.client, &cursor.url, &cursor.api_key, &params).await?
                    }
                    NextPage::Link(link) => {
                        get_page(&cursor.client, &link, &cursor.api_key).await?
                    }
                };
                tracing::debug!("fetched next result page");

                let (buffered, next) = parse_page(payload)?;
                cursor.buffered = buffered;
                cursor.next = next;
            }
        });

        Ok(Box::pin(hits))
    }
}

/// Continuation token for the next server page.
enum NextPage {
    /// Request body to POST back to the search URL.
    Params(Value),
    /// Absolute URL to GET.
    Link(String),
}

/// Cursor state threaded through the lazy page stream.
struct PageCursor {
    client: Client,
    url: String,
    api_key: String,
    buffered: VecDeque<SearchHit>,
    next: Option<NextPage>,
}

async fn post_search(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &Value,
) -> Result<Value, RetrievalError> {
    let res = client
        .post(url)
        .header("api-key", api_key)
        .json(body)
        .send()
        .await
        .map_err(RetrievalError::search)?;

    if !res.status().is_success() {
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        return Err(RetrievalError::Search(format!(
            "index query failed ({}): {}",
            status, text
        )));
    }

    res.json().await.map_err(RetrievalError::search)
}

async fn get_page(client: &Client, url: &str, api_key: &str) -> Result<Value, RetrievalError> {
    let res = client
        .get(url)
        .header("api-key", api_key)
        .send()
        .await
        .map_err(RetrievalError::search)?;

    if !res.status().is_success() {
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        return Err(RetrievalError::Search(format!(
            "result page fetch failed ({}): {}",
            status, text
        )));
    }

    res.json().await.map_err(RetrievalError::search)
}

fn parse_page(payload: Value) -> Result<(VecDeque<SearchHit>, Option<NextPage>), RetrievalError> {
    let mut hits = VecDeque::new();
    let items = payload
        .get("value")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    for item in items {
        let score = item
            .get("@search.score")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;
        let document = serde_json::from_value(item).map_err(RetrievalError::search)?;
        hits.push_back(SearchHit { document, score });
    }

    let next = if let Some(params) = payload
        .get("@search.nextPageParameters")
        .cloned()
        .filter(|v| !v.is_null())
    {
        Some(NextPage::Params(params))
    } else if let Some(link) = payload.get("@odata.nextLink").and_then(|v| v.as_str()) {
        Some(NextPage::Link(link.to_string()))
    } else {
        None
    };

    Ok((hits, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_keeps_index_order() {
        let payload = json!({
            "value": [
                { "@search.score": 2.5, "chunk_id": "1", "chunk": "first", "title": "Doc1" },
                { "@search.score": 1.0, "chunk_id": "2", "chunk": "second", "title": "Doc2" }
            ]
        });

        let (hits, next) = parse_page(payload).expect("parse");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.chunk_id, "1");
        assert_eq!(hits[0].score, 2.5);
        assert_eq!(hits[1].document.chunk.as_deref(), Some("second"));
        assert!(next.is_none());
    }

    #[test]
    fn test_parse_page_empty_result() {
        let (hits, next) = parse_page(json!({ "value": [] })).expect("parse");
        assert!(hits.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn test_parse_page_with_next_page_parameters() {
        let payload = json!({
            "value": [{ "@search.score": 1.2, "chunk_id": "1" }],
            "@odata.nextLink": "https://search.example.net/indexes/idx/docs/search?page=2",
            "@search.nextPageParameters": { "search": "q", "skip": 50 }
        });

        let (_, next) = parse_page(payload).expect("parse");
        match next {
            Some(NextPage::Params(params)) => assert_eq!(params["skip"], 50),
            _ => panic!("expected POST continuation"),
        }
    }

    #[test]
    fn test_parse_page_with_next_link_only() {
        let payload = json!({
            "value": [],
            "@odata.nextLink": "https://search.example.net/page2"
        });

        let (_, next) = parse_page(payload).expect("parse");
        assert!(matches!(next, Some(NextPage::Link(link)) if link.ends_with("page2")));
    }

    #[test]
    fn test_parse_page_missing_score_defaults_to_zero() {
        let payload = json!({ "value": [{ "chunk_id": "9" }] });
        let (hits, _) = parse_page(payload).expect("parse");
        assert_eq!(hits[0].score, 0.0);
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_hybrid_query() {
        use crate::config::RetrieverConfig;

        let config = RetrieverConfig::from_env().expect("config from env");
        let client = AzureAiSearchClient::new(&config.search).expect("client");
        let stream = client
            .search("contract law", vec![0.0; 1536], &config.options)
            .await;
        assert!(stream.is_ok());
    }
}
