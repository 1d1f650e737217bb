//! Fire-and-forget progress persistence.

use crate::client::LearnLabClient;
use learnlab_playback::{ProgressReport, ProgressSink};
use tokio::runtime::Handle;
use tracing::warn;

/// [`ProgressSink`] that posts each report to the API
///
/// Every report is saved on its own task on the given runtime. Failures are
/// logged and dropped; the tracker never waits on the network.
#[derive(Debug, Clone)]
pub struct HttpProgressSink {
    client: LearnLabClient,
    runtime: Handle,
}

impl HttpProgressSink {
    /// Create a sink spawning onto `runtime`
    pub fn new(client: LearnLabClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    /// Create a sink on the runtime of the calling context
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current(client: LearnLabClient) -> Option<Self> {
        Handle::try_current()
            .ok()
            .map(|runtime| Self::new(client, runtime))
    }
}

impl ProgressSink for HttpProgressSink {
    fn report(&self, report: &ProgressReport) {
        let client = self.client.clone();
        let report = report.clone();

        self.runtime.spawn(async move {
            if let Err(e) = client.save_progress(&report).await {
                warn!(
                    item_id = %report.item_id,
                    position = report.position_seconds,
                    error = %e,
                    "Failed to save progress"
                );
            }
        });
    }
}
