//! LearnLab API Client
//!
//! HTTP collaborators for podcast playback tracking.
//!
//! # Features
//!
//! - **Items**: Fetch the podcasts generated from a source file
//! - **Analytics**: Fetch aggregate listening statistics
//! - **Progress**: Persist sampled progress, fire-and-forget via [`HttpProgressSink`]
//! - **Transcripts**: Download and parse WebVTT or plain-text transcripts
//!
//! # Example
//!
//! ```ignore
//! use learnlab_client::{ClientConfig, HttpProgressSink, ItemSource, LearnLabClient};
//! use learnlab_playback::{MediaTracker, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LEARNLAB_API_URL / LEARNLAB_ACCESS_TOKEN or learnlab.toml
//!     let client = LearnLabClient::new(ClientConfig::load()?)?;
//!
//!     let items = client.list_items("file-42").await?;
//!     let analytics = client.analytics(&items[0].id).await?;
//!     println!("{} sessions so far", analytics.session_count);
//!
//!     let sink = HttpProgressSink::current(client).expect("inside runtime");
//!     let tracker = MediaTracker::new(TrackerConfig::default(), Box::new(resource))
//!         .with_progress_sink(Box::new(sink));
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod routes;
mod sink;
mod types;

// Re-export main types
pub use client::{ItemSource, LearnLabClient};
pub use config::{ClientConfig, CONFIG_FILE, ENV_PREFIX};
pub use error::{ClientError, Result};
pub use routes::ApiRoutes;
pub use sink::HttpProgressSink;
pub use types::ProgressPayload;
