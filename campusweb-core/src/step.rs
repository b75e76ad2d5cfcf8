use crate::{
    Error,
    notify::{Notifier, Severity},
};

/// Per-flow record of which protocol step is executing and the last session
/// identifier seen, used to enrich error reports. Each flow owns its own
/// value, so concurrent flows never interfere.
pub(crate) struct StepContext {
    step: &'static str,
    last_sid: String,
}

impl StepContext {
    pub(crate) fn new() -> Self {
        Self {
            step: "init",
            last_sid: String::new(),
        }
    }

    pub(crate) fn enter(&mut self, step: &'static str) {
        self.step = step;
    }

    pub(crate) fn record_sid(&mut self, sid: &str) {
        if !sid.is_empty() {
            self.last_sid = sid.to_string();
        }
    }

    /// Truncated identifier, safe for diagnostics.
    pub(crate) fn short_sid(&self) -> &str {
        let end = self
            .last_sid
            .char_indices()
            .nth(8)
            .map_or(self.last_sid.len(), |(i, _)| i);
        &self.last_sid[..end]
    }

    /// Reports the failure to the sink, then wraps the error with this
    /// context. The original error is preserved as the source.
    pub(crate) async fn fail(&self, notifier: &dyn Notifier, err: Error) -> Error {
        let sid = self.short_sid().to_string();
        notifier
            .notify(
                "CRITICAL_FAILURE",
                &format!("Step: {}\nSID: {}\nError: {}", self.step, sid, err),
                Severity::Error,
            )
            .await;
        Error::Step {
            step: self.step,
            sid,
            source: Box::new(err),
        }
    }
}
