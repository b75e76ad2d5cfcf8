//! Public façade over the login and retrieval flows.

use std::sync::Arc;

use crate::{
    CalendarEvent, CalendarUrls, Credentials, Grade, PortalConfig, Result, Session,
    calendar::CalendarRetrieval,
    client::PortalClient,
    grades::GradesRetrieval,
    login::LoginFlow,
    notify::{NoopNotifier, Notifier},
};

/// Entry point for portal interaction.
///
/// Holds the HTTP client and the notification sink; sessions are handed out
/// as [`AuthenticatedSession`] values borrowing from it. Independent flows on
/// one service may run concurrently; nothing mutable is shared between them
/// beyond the sink.
pub struct CampusSquare {
    client: PortalClient,
    notifier: Arc<dyn Notifier>,
}

impl CampusSquare {
    pub fn new(config: PortalConfig) -> Result<Self> {
        Self::with_notifier(config, Arc::new(NoopNotifier))
    }

    pub fn with_notifier(config: PortalConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Ok(Self {
            client: PortalClient::new(config)?,
            notifier,
        })
    }

    /// Runs the login flow and wraps the validated session.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedSession<'_>> {
        let session = LoginFlow::new(&self.client, &*self.notifier)
            .login(credentials)
            .await?;
        Ok(AuthenticatedSession {
            service: self,
            session,
        })
    }

    /// Wraps a caller-supplied identifier without validating it; whether it
    /// works is only discovered by the requests made with it.
    pub fn from_session_id(&self, sid: impl Into<String>) -> AuthenticatedSession<'_> {
        AuthenticatedSession {
            service: self,
            session: Session::new(sid),
        }
    }
}

/// A session identifier bound to the service that produced it.
pub struct AuthenticatedSession<'a> {
    service: &'a CampusSquare,
    session: Session,
}

impl AuthenticatedSession<'_> {
    pub fn sid(&self) -> &str {
        &self.session.sid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetches the grades report.
    pub async fn grades(&self) -> Result<Vec<Grade>> {
        GradesRetrieval::new(&self.service.client, &*self.service.notifier)
            .fetch(&self.session)
            .await
    }

    /// Discovers the calendar export URLs.
    pub async fn calendar_urls(&self) -> Result<CalendarUrls> {
        CalendarRetrieval::new(&self.service.client, &*self.service.notifier)
            .fetch_url(&self.session)
            .await
    }

    /// Fetches events from a discovered ICS URL. The feed is public, so the
    /// session is not attached; the method lives here for convenience.
    pub async fn calendar_events(&self, ics_url: &str) -> Result<Vec<CalendarEvent>> {
        CalendarRetrieval::new(&self.service.client, &*self.service.notifier)
            .fetch_events(ics_url)
            .await
    }
}
