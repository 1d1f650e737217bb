//! Main LearnLab API client.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::routes::ApiRoutes;
use crate::types::ProgressPayload;
use async_trait::async_trait;
use learnlab_playback::{AnalyticsSummary, PlaybackItem, ProgressReport, Transcript};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Source of playable items and their listening statistics
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Podcasts generated from a source file
    async fn list_items(&self, file_id: &str) -> Result<Vec<PlaybackItem>>;

    /// Aggregate listening statistics for one podcast
    async fn analytics(&self, item_id: &str) -> Result<AnalyticsSummary>;
}

/// Client for the LearnLab podcast API.
///
/// Cloning is cheap and shares the underlying connection pool.
///
/// # Example
///
/// ```ignore
/// use learnlab_client::{ClientConfig, ItemSource, LearnLabClient};
///
/// let client = LearnLabClient::new(ClientConfig::load()?)?;
///
/// let items = client.list_items("file-42").await?;
/// println!("Found {} podcasts", items.len());
///
/// if let Some(transcript) = client.fetch_transcript(&items[0]).await? {
///     println!("{} transcript lines", transcript.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LearnLabClient {
    http: Client,
    routes: ApiRoutes,
    access_token: Option<String>,
}

impl LearnLabClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let routes = ApiRoutes::new(&config.api_url)?;

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("LearnLab/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            api_url = %routes.base(),
            authenticated = config.access_token.is_some(),
            "Created LearnLab client"
        );

        Ok(Self {
            http,
            routes,
            access_token: config.access_token,
        })
    }

    /// Endpoint builder
    pub fn routes(&self) -> &ApiRoutes {
        &self.routes
    }

    /// Check if the client has an access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Persist a progress sample.
    pub async fn save_progress(&self, report: &ProgressReport) -> Result<()> {
        let url = self.routes.progress(&report.item_id);
        debug!(
            url = %url,
            position = report.position_seconds,
            completion = report.completion_percentage,
            "Saving progress"
        );

        let response = self
            .authorized(self.http.post(url))
            .json(&ProgressPayload::from(report))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Download and parse an item's transcript.
    ///
    /// Returns `None` when the item has no transcript. The WebVTT locator
    /// is preferred over plain text.
    pub async fn fetch_transcript(&self, item: &PlaybackItem) -> Result<Option<Transcript>> {
        let Some(locator) = item.transcript_url() else {
            debug!(item_id = %item.id, "No transcript available");
            return Ok(None);
        };

        let url = self.routes.resolve(locator)?;
        debug!(url = %url, item_id = %item.id, "Fetching transcript");

        let response = check_status(self.http.get(url).send().await?).await?;
        let body = response.text().await?;
        let transcript = Transcript::parse(locator, &body, item.duration_seconds());

        debug!(item_id = %item.id, lines = transcript.len(), "Parsed transcript");
        Ok(Some(transcript))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(url = %url, "Fetching {}", what);
        let response = self.authorized(self.http.get(url)).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }
}

#[async_trait]
impl ItemSource for LearnLabClient {
    async fn list_items(&self, file_id: &str) -> Result<Vec<PlaybackItem>> {
        let items: Vec<PlaybackItem> = self
            .get_json(self.routes.items(file_id), "podcast list")
            .await?;
        debug!(file_id, count = items.len(), "Fetched podcasts");
        Ok(items)
    }

    async fn analytics(&self, item_id: &str) -> Result<AnalyticsSummary> {
        self.get_json(self.routes.analytics(item_id), "analytics")
            .await
    }
}

/// Map non-success responses to errors
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        Ok(response)
    } else if status.as_u16() == 401 {
        Err(ClientError::AuthRequired)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}
