//! Incubating-feature notices.

use parking_lot::Mutex;
use std::fmt::Debug;
use tracing::info;

/// Receives the name of each incubating feature a build tree uses.
///
/// Implementations need not be idempotent; the controller calls it at most once
/// per feature per build tree.
pub trait NoticeSink: Send + Sync + Debug {
    fn incubating_feature_used(&self, feature: &str);
}

/// Reports notices through `tracing` under the `arbor::incubating` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn incubating_feature_used(&self, feature: &str) {
        info!(target: "arbor::incubating", feature, "{feature} is an incubating feature.");
    }
}

/// Keeps every notice in arrival order.
#[derive(Debug, Default)]
pub struct RecordingNoticeSink {
    notices: Mutex<Vec<String>>,
}

impl RecordingNoticeSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn incubating_feature_used(&self, feature: &str) {
        self.notices.lock().push(feature.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingNoticeSink::new();
        sink.incubating_feature_used("Configuration cache");
        sink.incubating_feature_used("Configuration on demand");

        assert_eq!(sink.notices(), vec!["Configuration cache", "Configuration on demand"]);
    }
}
