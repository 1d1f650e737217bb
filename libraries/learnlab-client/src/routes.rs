//! LearnLab API endpoints.

use crate::error::{ClientError, Result};
use url::Url;

/// Builds endpoint URLs relative to the API base
///
/// IDs are percent-encoded as single path segments, so an ID can never
/// escape its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoutes {
    base: Url,
}

impl ApiRoutes {
    /// Parse and check the API base URL
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{} cannot be a base", base)));
        }

        Ok(Self { base })
    }

    /// API base URL
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `GET /api/podcasts/files/{file_id}` - podcasts generated from a file
    pub fn items(&self, file_id: &str) -> Url {
        self.endpoint(&["api", "podcasts", "files", file_id])
    }

    /// `GET /api/podcasts/{id}/analytics`
    pub fn analytics(&self, item_id: &str) -> Url {
        self.endpoint(&["api", "podcasts", item_id, "analytics"])
    }

    /// `POST /api/podcasts/{id}/progress`
    pub fn progress(&self, item_id: &str) -> Url {
        self.endpoint(&["api", "podcasts", item_id, "progress"])
    }

    /// Resolve a resource locator (absolute, or relative to the base)
    pub fn resolve(&self, locator: &str) -> Result<Url> {
        Url::parse(locator)
            .or_else(|_| self.base.join(locator))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", locator, e)))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in new(): the base can always take path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
