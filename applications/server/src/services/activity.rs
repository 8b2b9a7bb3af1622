/// Best-effort activity recording
use chorus_core::{ActivityEvent, ActivitySink};
use std::sync::Arc;

/// Wraps an [`ActivitySink`] so a failed write never reaches the caller.
///
/// Services call this only after their transaction has committed.
#[derive(Clone)]
pub struct ActivityRecorder {
    sink: Arc<dyn ActivitySink>,
}

impl ActivityRecorder {
    pub fn new(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, event: ActivityEvent) {
        let activity_type = event.activity_type;
        let entity_id = event.entity_id.clone();

        if let Err(e) = self.sink.record(event).await {
            tracing::warn!(
                "Failed to record {} activity for {}: {}",
                activity_type.as_str(),
                entity_id,
                e
            );
        }
    }
}
