//! The two tools the agent can invoke mid-turn
//!
//! Both tools deliberately never return an error to the agent loop:
//! failures come back as descriptive strings so the model can react to
//! them (retry, tell the user) without crashing the conversation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use serde_json::json;
use url::Url;

use ragserve_core::{Error, Result, Tool, VectorStore};
use ragserve_store::{chunk_text, format_query_results};

const WEB_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const WEB_CHUNK_SIZE: usize = 1800;
const WEB_CHUNK_OVERLAP: usize = 150;
const DEFAULT_N_RESULTS: usize = 4;

/// Shared query path so the agent tool and the UI preview give the same
/// answers for the same question.
pub async fn run_knowledge_base_query<V: VectorStore>(
    store: &V,
    query_text: &str,
    n_results: usize,
) -> String {
    match store.query(query_text, n_results).await {
        Ok(results) => format_query_results(results.as_deref(), store.metric()),
        Err(e) => format!("Knowledge base query failed: {e}"),
    }
}

/// Similarity search over the knowledge base, formatted for the model
pub struct KnowledgeBaseQueryTool<V: VectorStore> {
    store: Arc<V>,
}

impl<V: VectorStore> KnowledgeBaseQueryTool<V> {
    pub fn new(store: Arc<V>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<V: VectorStore + 'static> Tool for KnowledgeBaseQueryTool<V> {
    fn name(&self) -> &str {
        "query_knowledge_base"
    }

    fn description(&self) -> &str {
        "Searches the knowledge base and returns formatted hits with sources and scores."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query_text": {
                    "type": "string",
                    "description": "The question or phrase to search for",
                },
                "n_results": {
                    "type": "integer",
                    "description": "How many hits to return (default 4)",
                },
            },
            "required": ["query_text"],
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> String {
        let Some(query_text) = arguments.get("query_text").and_then(|v| v.as_str()) else {
            return "Missing required 'query_text' argument.".to_string();
        };
        let n_results = arguments
            .get("n_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_N_RESULTS);

        run_knowledge_base_query(self.store.as_ref(), query_text, n_results).await
    }
}

/// Fetches a web page, strips it to visible text, chunks and stores it
pub struct WebFetchTool<V: VectorStore> {
    store: Arc<V>,
    client: Client,
}

impl<V: VectorStore> WebFetchTool<V> {
    pub fn new(store: Arc<V>) -> Result<Self> {
        let client = Client::builder()
            .timeout(WEB_FETCH_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { store, client })
    }

    async fn fetch_and_store(&self, url: &str) -> Result<String> {
        let url = Url::parse(url).map_err(|e| Error::Network(format!("invalid URL: {e}")))?;
        tracing::info!(%url, "fetching web page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "request returned status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let text = html_to_text(&body);
        let chunks = chunk_text(&text, WEB_CHUNK_SIZE, WEB_CHUNK_OVERLAP)?;
        let count = chunks.len();

        let metadatas = chunks
            .iter()
            .map(|_| {
                json!({"source": url.as_str(), "type": "web"})
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();
        self.store
            .add_documents(chunks, Some(metadatas), None)
            .await?;

        tracing::info!(%url, chunks = count, "web fetch stored");
        Ok(format!("Stored {count} text chunks from {url}."))
    }
}

#[async_trait]
impl<V: VectorStore + 'static> Tool for WebFetchTool<V> {
    fn name(&self) -> &str {
        "web_fetch_and_store"
    }

    fn description(&self) -> &str {
        "Fetches a URL, strips it to plain text and stores it in the knowledge base."
    }

    fn parameters(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The full URL of the page to ingest",
                },
            },
            "required": ["url"],
        })
    }

    async fn invoke(&self, arguments: serde_json::Value) -> String {
        let Some(url) = arguments.get("url").and_then(|v| v.as_str()) else {
            return "Missing required 'url' argument.".to_string();
        };

        match self.fetch_and_store(url).await {
            Ok(message) => message,
            Err(e @ Error::Network(_)) => {
                tracing::warn!(url, error = %e, "web fetch failed");
                format!(
                    "Fetch/store failed: the URL could not be reached or network \
                     access is unavailable. ({e})"
                )
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "web fetch failed unexpectedly");
                format!("Fetch/store failed: {e}")
            }
        }
    }
}

/// Reduce an HTML document to its visible text, one fragment per line.
///
/// Script, style and noscript blocks are cut out before parsing so their
/// contents never end up in the knowledge base.
fn html_to_text(html: &str) -> String {
    let invisible =
        Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
            .expect("static regex");
    let stripped = invisible.replace_all(html, " ");

    let document = Html::parse_document(&stripped);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragserve_store::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_html_to_text_drops_markup_and_scripts() {
        let html = "<html><head><style>body { color: red; }</style>\
                    <script>var secret = 42;</script></head>\
                    <body><h1>Title</h1><p>First paragraph.</p>\
                    <p>Second <b>bold</b> paragraph.</p></body></html>";
        let text = html_to_text(html);

        assert!(text.contains("Title"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("bold"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("color: red"));
    }

    #[tokio::test]
    async fn test_fetch_success_chunks_and_stores_with_metadata() {
        let server = MockServer::start().await;
        let paragraph = "Example domain text. ".repeat(50);
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<html><body><p>{paragraph}</p></body></html>"
            )))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let tool = WebFetchTool::new(store.clone()).unwrap();
        let url = format!("{}/page", server.uri());
        let message = tool.invoke(json!({"url": url})).await;

        assert!(message.starts_with("Stored 1 text chunks"), "got: {message}");
        assert_eq!(store.count().await.unwrap(), 1);

        let hits = store.query("example domain", 1).await.unwrap().unwrap();
        assert_eq!(hits[0].metadata["source"], url.as_str());
        assert_eq!(hits[0].metadata["type"], "web");
    }

    #[tokio::test]
    async fn test_unreachable_url_returns_string_and_stores_nothing() {
        // Bind then drop a listener so the port is known to refuse connections.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let store = Arc::new(MemoryStore::new());
        let tool = WebFetchTool::new(store.clone()).unwrap();
        let message = tool
            .invoke(json!({"url": format!("http://127.0.0.1:{port}/")}))
            .await;

        assert!(message.contains("could not be reached"), "got: {message}");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        let tool = WebFetchTool::new(store.clone()).unwrap();
        let message = tool
            .invoke(json!({"url": format!("{}/missing", server.uri())}))
            .await;

        assert!(message.contains("Fetch/store failed"), "got: {message}");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_tool_on_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let tool = KnowledgeBaseQueryTool::new(store);
        let message = tool.invoke(json!({"query_text": "anything"})).await;
        assert_eq!(message, "The knowledge base is empty.");
    }

    #[tokio::test]
    async fn test_query_tool_formats_hits() {
        let store = Arc::new(MemoryStore::new());
        let meta = json!({"source": "handbook"}).as_object().cloned().unwrap();
        store
            .add_documents(
                vec!["The onboarding handbook covers laptop setup".to_string()],
                Some(vec![meta]),
                None,
            )
            .await
            .unwrap();

        let tool = KnowledgeBaseQueryTool::new(store);
        let message = tool
            .invoke(json!({"query_text": "onboarding handbook", "n_results": 2}))
            .await;

        assert!(message.contains("[1] Source: handbook"), "got: {message}");
        assert!(message.contains("onboarding handbook covers"));
    }

    #[tokio::test]
    async fn test_query_tool_requires_query_text() {
        let store = Arc::new(MemoryStore::new());
        let tool = KnowledgeBaseQueryTool::new(store);
        let message = tool.invoke(json!({})).await;
        assert!(message.contains("query_text"));
    }
}
