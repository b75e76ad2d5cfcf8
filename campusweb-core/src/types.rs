use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Grade shown while a course has no final result yet.
pub const GRADE_IN_PROGRESS: &str = "履修中";

/// Server-issued session identifier (a `JSESSIONID` cookie value).
///
/// Opaque and immutable; validity is only established by whether requests
/// made with it succeed. No expiry is tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The raw identifier, observed as uppercase alphanumeric.
    pub sid: String,
}

impl Session {
    pub fn new(sid: impl Into<String>) -> Self {
        Self { sid: sid.into() }
    }
}

/// One row of the grades report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Course name
    pub subject: String,
    /// Numeric score, possibly empty
    pub score: String,
    /// Letter grade, or [`GRADE_IN_PROGRESS`] while none is published
    pub grade: String,
}

/// One VEVENT from the portal's ICS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event id. Falls back to a positional `event-<n>` when the feed omits
    /// UID; that synthetic id is not stable across re-fetches of a feed
    /// whose contents shift.
    pub uid: String,
    /// Event or course title
    pub summary: String,
    /// Start time, feed-local
    pub dtstart: NaiveDateTime,
    /// End time; defaults to `dtstart` when the feed has no DTEND
    pub dtend: NaiveDateTime,
    /// Room
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recurrence rule for repeating classes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrule: Option<String>,
}

/// The two calendar export URLs discovered on the calendar settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUrls {
    /// Personal calendar ICS URL
    pub calendar_url: String,
    /// Campus-wide calendar ICS URL; empty when the portal exposes none
    pub campus_calendar_url: String,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Student/user id
    pub username: String,
    /// Password
    pub password: String,
}

/// Portal endpoint configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the Campus Square deployment, no trailing slash
    pub base_url: String,
    /// User-Agent presented on every request
    pub user_agent: String,
}

/// Default Campus Square deployment.
pub const DEFAULT_BASE_URL: &str = "https://csweb.u-aizu.ac.jp/campusweb";

/// Browser signature the portal is known to accept.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

impl PortalConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
