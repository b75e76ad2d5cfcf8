//! Session acquisition.
//!
//! The portal has no token endpoint; a session is obtained by walking the
//! web login like a browser would: LANDING → LOGIN_SUBMIT → VERIFY. Every
//! step depends on state the previous one left behind on the server, so the
//! order is fixed and a single failure aborts the whole flow.

use std::time::Duration;

use reqwest::{Response, header};

use crate::{
    Credentials, Error, Result, Session,
    client::PortalClient,
    extract,
    notify::{Notifier, Severity},
    step::StepContext,
};

/// Delay before touching the landing page. The portal rejects immediately
/// repeated logins; this smooths the rate and is not correctness-critical.
const LANDING_SETTLE: Duration = Duration::from_millis(200);

const LOGIN_WORKFLOW_ID: &str = "nwf_PTW0000002_login";

/// The main page shows one of these only to an authenticated session.
const LOGOUT_MARKERS: [&str; 2] = ["ログアウト", "Logout"];

/// Drives the login exchange and produces a validated [`Session`].
pub struct LoginFlow<'a> {
    client: &'a PortalClient,
    notifier: &'a dyn Notifier,
}

impl<'a> LoginFlow<'a> {
    pub fn new(client: &'a PortalClient, notifier: &'a dyn Notifier) -> Self {
        Self { client, notifier }
    }

    /// Exchanges credentials for a session identifier.
    ///
    /// On success the logout marker was observed on the main page, so the
    /// identifier was valid at that moment; nothing guarantees it stays so.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let mut ctx = StepContext::new();
        match self.run(credentials, &mut ctx).await {
            Ok(session) => Ok(session),
            Err(err) => Err(ctx.fail(self.notifier, err).await),
        }
    }

    async fn run(&self, credentials: &Credentials, ctx: &mut StepContext) -> Result<Session> {
        tokio::time::sleep(LANDING_SETTLE).await;

        ctx.enter("landing");
        let landing_url = self.client.url("/campusportal.do?locale=ja_JP");
        let response = self.client.get_public(&landing_url).await?;
        if !response.status().is_success() {
            // Observed to be tolerable; the flow proceeds anyway.
            self.notifier
                .notify(
                    "landing",
                    &format!("HTTP error: {}", response.status()),
                    Severity::Warning,
                )
                .await;
        }
        let initial_sid = first_session_cookie(&response).unwrap_or_default();
        ctx.record_sid(&initial_sid);
        let body = response.text().await?;
        let rwf_hash = extract::hidden_token(&body).unwrap_or_default();
        if rwf_hash.is_empty() {
            self.notifier
                .notify("landing", "rwfHash not found in HTML", Severity::Warning)
                .await;
        }

        ctx.enter("login submit");
        let response = self
            .client
            .http()
            .post(self.client.url("/campusportal.do"))
            .header(header::COOKIE, format!("JSESSIONID={initial_sid}"))
            .header(header::REFERER, &landing_url)
            .header(header::ORIGIN, self.client.origin())
            .form(&login_form(credentials, &rwf_hash))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                step: "login submit",
                status: response.status(),
            });
        }
        // The server does not always rotate the identifier on login; carry
        // the provisional one forward when no new cookie arrives.
        let sid = first_session_cookie(&response).unwrap_or(initial_sid);
        ctx.record_sid(&sid);

        ctx.enter("verify");
        let body = self
            .client
            .get(
                "verify",
                "/campusportal.do?page=main",
                &sid,
                &self.client.url("/campusportal.do"),
            )
            .await?
            .text()
            .await?;
        if !contains_logout_marker(&body) {
            // A 2xx status proves nothing on this portal; only the marker
            // does.
            self.notifier
                .notify(
                    "LOGIN_FAILED",
                    &format!("Marker missing. SID: {}", ctx.short_sid()),
                    Severity::Error,
                )
                .await;
            return Err(Error::LoginMarkerMissing {
                sid: ctx.short_sid().to_string(),
            });
        }

        Ok(Session::new(sid))
    }
}

/// Fixed login form, credentials and anti-forgery token filled in.
fn login_form<'a>(credentials: &'a Credentials, rwf_hash: &'a str) -> [(&'static str, &'a str); 9] {
    [
        ("wfId", LOGIN_WORKFLOW_ID),
        ("userName", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
        ("locale", "ja_JP"),
        ("undefined", ""),
        ("action", "rwf"),
        ("tabId", "home"),
        ("page", ""),
        ("rwfHash", rwf_hash),
    ]
}

fn contains_logout_marker(body: &str) -> bool {
    LOGOUT_MARKERS.iter().any(|marker| body.contains(marker))
}

/// First session identifier among a response's `Set-Cookie` headers.
fn first_session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(extract::session_id)
}

#[cfg(test)]
mod tests;
