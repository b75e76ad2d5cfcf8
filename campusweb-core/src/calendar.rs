//! Calendar URL discovery and ICS feed parsing.
//!
//! URL discovery needs an authenticated session; the ICS feed itself is a
//! public resource once its URL is known.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use reqwest::header;

use crate::{
    CalendarEvent, CalendarUrls, Error, Result, Session,
    client::PortalClient,
    extract,
    notify::Notifier,
    step::StepContext,
};

const TAB_BRIDGE_SETTLE: Duration = Duration::from_millis(300);

const CALENDAR_FLOW: &str = "POW2401000-flow";

/// Drives the calendar module.
pub struct CalendarRetrieval<'a> {
    client: &'a PortalClient,
    notifier: &'a dyn Notifier,
}

impl<'a> CalendarRetrieval<'a> {
    pub fn new(client: &'a PortalClient, notifier: &'a dyn Notifier) -> Self {
        Self { client, notifier }
    }

    /// Discovers the personal and campus-wide ICS export URLs.
    ///
    /// The personal URL is required; the campus-wide one is reported as an
    /// empty string when the portal exposes none.
    pub async fn fetch_url(&self, session: &Session) -> Result<CalendarUrls> {
        let mut ctx = StepContext::new();
        ctx.record_sid(&session.sid);
        match self.run_url(session, &mut ctx).await {
            Ok(urls) => Ok(urls),
            Err(err) => Err(ctx.fail(self.notifier, err).await),
        }
    }

    async fn run_url(&self, session: &Session, ctx: &mut StepContext) -> Result<CalendarUrls> {
        let sid = session.sid.as_str();

        ctx.enter("tab bridge");
        self.client
            .get(
                "tab bridge",
                "/campusportal.do?page=main&tabId=po",
                sid,
                &self.client.url("/campusportal.do?page=main"),
            )
            .await?;
        tokio::time::sleep(TAB_BRIDGE_SETTLE).await;

        ctx.enter("calendar entry");
        let entry_referer = self.client.url("/campusportal.do?page=main&tabId=po");
        let mut response = self
            .client
            .get_iframe(
                "calendar entry",
                &format!("/campussquare.do?_flowId={CALENDAR_FLOW}"),
                sid,
                &entry_referer,
            )
            .await?;
        if response.status().is_redirection() {
            // The module sometimes bounces to its settings page instead of
            // rendering it inline; follow the one hop.
            let location = response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
                .ok_or(Error::Status {
                    step: "calendar entry",
                    status: response.status(),
                })?;
            response = self
                .client
                .follow("calendar entry", &location, sid, &entry_referer)
                .await?;
        }
        let body = response.text().await?;

        let calendar_url =
            extract::attribute_value(&body, "calendarNm").ok_or(Error::CalendarUrlNotFound)?;
        let campus_calendar_url =
            extract::attribute_value(&body, "comonCalendarNm").unwrap_or_default();

        Ok(CalendarUrls {
            calendar_url,
            campus_calendar_url,
        })
    }

    /// Fetches and parses a discovered ICS feed. No session is attached.
    pub async fn fetch_events(&self, ics_url: &str) -> Result<Vec<CalendarEvent>> {
        let mut ctx = StepContext::new();
        ctx.enter("ics fetch");
        match self.run_events(ics_url).await {
            Ok(events) => Ok(events),
            Err(err) => Err(ctx.fail(self.notifier, err).await),
        }
    }

    async fn run_events(&self, ics_url: &str) -> Result<Vec<CalendarEvent>> {
        let response = self.client.get_public(ics_url).await?;
        if !response.status().is_success() {
            return Err(Error::Status {
                step: "ics fetch",
                status: response.status(),
            });
        }
        Ok(parse_ics(&response.text().await?))
    }
}

static VEVENT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)BEGIN:VEVENT.*?END:VEVENT").unwrap());

static COMPACT_DATETIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})(\d{2})(\d{2})T?(\d{2})?(\d{2})?(\d{2})?").unwrap());

/// Parses an ICS text into calendar events.
///
/// Blocks are independent: one malformed VEVENT is logged and skipped, never
/// aborting the rest of the feed.
pub fn parse_ics(text: &str) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for block in VEVENT_BLOCK.find_iter(text) {
        match parse_vevent(block.as_str(), events.len()) {
            Some(event) => events.push(event),
            None => tracing::warn!("skipping malformed VEVENT block"),
        }
    }
    events
}

fn parse_vevent(block: &str, position: usize) -> Option<CalendarEvent> {
    let summary = field(block, "SUMMARY")?;
    let dtstart = parse_ics_datetime(&field(block, "DTSTART")?)?;
    let dtend = field(block, "DTEND")
        .and_then(|raw| parse_ics_datetime(&raw))
        .unwrap_or(dtstart);

    Some(CalendarEvent {
        uid: field(block, "UID").unwrap_or_else(|| format!("event-{position}")),
        summary,
        dtstart,
        dtend,
        location: field(block, "LOCATION"),
        description: field(block, "DESCRIPTION"),
        rrule: field(block, "RRULE"),
    })
}

/// First line starting with `NAME:` or `NAME;`, unescaped. Empty values
/// count as absent.
fn field(block: &str, name: &str) -> Option<String> {
    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if line.len() > name.len()
            && line.is_char_boundary(name.len())
            && line[..name.len()].eq_ignore_ascii_case(name)
        {
            let sep = line.as_bytes()[name.len()];
            if sep == b':' || sep == b';' {
                let value = line[name.len() + 1..]
                    .replace("\\n", "\n")
                    .replace("\\,", ",")
                    .trim()
                    .to_string();
                return (!value.is_empty()).then_some(value);
            }
        }
    }
    None
}

/// Parses an ICS date-time value, tolerating a parameter prefix
/// (`TZID=...:`) and a missing time component.
fn parse_ics_datetime(raw: &str) -> Option<NaiveDateTime> {
    let value = match raw.find(':') {
        Some(i) => &raw[i + 1..],
        None => raw,
    };

    if let Some(c) = COMPACT_DATETIME.captures(value) {
        let number = |i: usize| c.get(i).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let date = NaiveDate::from_ymd_opt(c[1].parse().ok()?, number(2), number(3))?;
        return date.and_hms_opt(number(4), number(5), number(6));
    }

    // Some feeds expand to RFC 3339 or plain dates; fall back to generic
    // parsing for those.
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests;
