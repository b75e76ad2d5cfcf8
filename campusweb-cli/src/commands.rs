use std::sync::Arc;

use anyhow::{Result, bail};
use campusweb_core::{
    Credentials, PortalConfig,
    notify::{NoopNotifier, Notifier, TracingNotifier},
    service::{AuthenticatedSession, CampusSquare},
};

/// Common parameters shared by every subcommand.
pub struct PortalParams {
    pub user: Option<String>,
    pub pass: Option<String>,
    pub url: String,
    pub sid: Option<String>,
    pub json: bool,
}

fn build_service(params: &PortalParams) -> Result<CampusSquare> {
    tracing::debug!("using portal at {}", params.url);
    let config = PortalConfig::new(&params.url);
    // JSON mode is for scripts; keep diagnostics out of the stream.
    let notifier: Arc<dyn Notifier> = if params.json {
        Arc::new(NoopNotifier)
    } else {
        Arc::new(TracingNotifier)
    };
    Ok(CampusSquare::with_notifier(config, notifier)?)
}

async fn establish<'a>(
    params: &PortalParams,
    service: &'a CampusSquare,
) -> Result<AuthenticatedSession<'a>> {
    if let Some(sid) = &params.sid {
        return Ok(service.from_session_id(sid.clone()));
    }

    let (Some(user), Some(pass)) = (&params.user, &params.pass) else {
        bail!("User ID (-u) and Password (-p) are required");
    };

    if !params.json {
        eprintln!("Logging in...");
    }
    let credentials = Credentials {
        username: user.clone(),
        password: pass.clone(),
    };
    Ok(service.login(&credentials).await?)
}

/// Logs in (or adopts `--sid`) and prints the session id.
pub async fn login_command(params: PortalParams) -> Result<()> {
    let service = build_service(&params)?;
    let session = establish(&params, &service).await?;

    if params.json {
        println!("{}", serde_json::json!({ "sid": session.sid() }));
    } else {
        println!("Session ID: {}", session.sid());
    }

    Ok(())
}

/// Fetches the grades report and prints it as JSON.
pub async fn grades_command(params: PortalParams) -> Result<()> {
    let service = build_service(&params)?;
    let session = establish(&params, &service).await?;

    if !params.json {
        eprintln!("Fetching grades...");
    }
    let grades = session.grades().await?;
    println!("{}", serde_json::to_string_pretty(&grades)?);

    Ok(())
}

/// Discovers the calendar URL, fetches its events, prints both as JSON.
pub async fn calendar_command(params: PortalParams) -> Result<()> {
    let service = build_service(&params)?;
    let session = establish(&params, &service).await?;

    if !params.json {
        eprintln!("Fetching calendar...");
    }
    let urls = session.calendar_urls().await?;
    let events = session.calendar_events(&urls.calendar_url).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "calendarUrl": urls.calendar_url,
            "events": events,
        }))?
    );

    Ok(())
}
