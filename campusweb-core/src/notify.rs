use std::fmt;

use async_trait::async_trait;

/// Severity tag attached to every notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Sink for diagnostics raised while driving the portal.
///
/// Implementations must tolerate concurrent invocation; flows running in
/// parallel share a single sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// Discards everything. The default when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _title: &str, _message: &str, _severity: Severity) {}
}

/// Routes notifications to `tracing` at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!("[{}] {}", title, message),
            Severity::Warning => tracing::warn!("[{}] {}", title, message),
            Severity::Error => tracing::error!("[{}] {}", title, message),
        }
    }
}
