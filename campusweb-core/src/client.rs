use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url, header, redirect};

use crate::{Error, PortalConfig, Result};

/// HTTP client for authenticated exchanges with the portal.
///
/// The portal's session management is a single `JSESSIONID` cookie, so no
/// cookie jar is used: the identifier is attached to each request by hand.
/// Redirect following is disabled because the module entry steps have to
/// observe raw 302 responses to capture the flow execution key.
///
/// Every authenticated helper treats a non-success status as fatal and
/// reports it with the step name; only the module entries additionally
/// accept redirection statuses, which their callers handle.
pub struct PortalClient {
    http: Client,
    config: PortalConfig,
    origin: String,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        let origin = url.origin().ascii_serialization();

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            config,
            origin,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Scheme + host of the portal, for the Origin header on login.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Joins a path-and-query onto the configured base URL.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.config.base_url, path_and_query)
    }

    /// Raw request builder access for steps with one-off header sets.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Unauthenticated GET, used for the landing page and public ICS feeds.
    /// Status policy stays with the caller: the landing page tolerates
    /// failures, the ICS fetch does not.
    pub async fn get_public(&self, url: &str) -> Result<Response> {
        Ok(self.http.get(url).send().await?)
    }

    /// Authenticated GET against a portal path. Non-success is fatal.
    pub async fn get(
        &self,
        step: &'static str,
        path: &str,
        sid: &str,
        referer: &str,
    ) -> Result<Response> {
        let response = self
            .authenticated(self.http.get(self.url(path)), sid, referer)
            .send()
            .await?;
        Self::checked(step, response)
    }

    /// Authenticated GET marked as iframe navigation, required by the
    /// module entry points. Redirection statuses pass through: entries
    /// legitimately answer 302 with the flow key in the Location header.
    pub async fn get_iframe(
        &self,
        step: &'static str,
        path: &str,
        sid: &str,
        referer: &str,
    ) -> Result<Response> {
        let response = self
            .authenticated(self.http.get(self.url(path)), sid, referer)
            .header("sec-fetch-dest", "iframe")
            .send()
            .await?;
        if response.status().is_redirection() {
            return Ok(response);
        }
        Self::checked(step, response)
    }

    /// Resolves a redirect `Location` against the portal and GETs it with
    /// the same session and headers as the entry it came from.
    pub async fn follow(
        &self,
        step: &'static str,
        location: &str,
        sid: &str,
        referer: &str,
    ) -> Result<Response> {
        let response = self
            .authenticated(self.http.get(self.resolve(location)), sid, referer)
            .header("sec-fetch-dest", "iframe")
            .send()
            .await?;
        Self::checked(step, response)
    }

    /// Authenticated URL-encoded form POST against a portal path.
    /// Non-success is fatal.
    pub async fn post_form(
        &self,
        step: &'static str,
        path: &str,
        sid: &str,
        referer: &str,
        form: &[(&str, &str)],
    ) -> Result<Response> {
        let response = self
            .authenticated(self.http.post(self.url(path)), sid, referer)
            .form(form)
            .send()
            .await?;
        Self::checked(step, response)
    }

    fn authenticated(&self, builder: RequestBuilder, sid: &str, referer: &str) -> RequestBuilder {
        builder
            .header(header::COOKIE, format!("JSESSIONID={sid}"))
            .header(header::REFERER, referer)
    }

    fn checked(step: &'static str, response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::Status {
                step,
                status: response.status(),
            })
        }
    }

    /// Location headers come back absolute, host-relative, or relative to
    /// the portal path; normalize all three.
    fn resolve(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else if location.starts_with('/') {
            format!("{}{}", self.origin, location)
        } else {
            format!("{}/{}", self.config.base_url, location)
        }
    }
}
