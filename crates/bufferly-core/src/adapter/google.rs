//! Google Calendar adapter.
//!
//! Implements [`CalendarAdapter`] over the Calendar v3 events API using
//! OAuth2 with keyring-stored tokens. All HTTP is awaited sequentially on
//! an internal current-thread runtime, keeping adapter query windows
//! consistent with prior mutations within a pass.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde_json::json;
use tokio::runtime::Runtime;

use super::oauth::{self, OAuthConfig, OAuthTokens};
use super::{keyring_store, CalendarAdapter};
use crate::error::{AdapterError, CoreError, OAuthError};
use crate::event::{CalendarEvent, Guest, Interval, ResponseStatus};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const SERVICE: &str = "google";

/// Google Calendar adapter.
pub struct GoogleCalendarAdapter {
    client_id: String,
    client_secret: String,
    api_base: String,
    client: Client,
    runtime: Runtime,
}

impl GoogleCalendarAdapter {
    /// Load OAuth client credentials from the keyring. Missing credentials
    /// are tolerated here; token use fails later with a clear error.
    pub fn new() -> Result<Self, CoreError> {
        let client_id = keyring_store::get("google_client_id")
            .ok()
            .flatten()
            .unwrap_or_default();
        let client_secret = keyring_store::get("google_client_secret")
            .ok()
            .flatten()
            .unwrap_or_default();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            client_id,
            client_secret,
            api_base: API_BASE.to_string(),
            client: Client::new(),
            runtime,
        })
    }

    /// Persist OAuth client credentials to the OS keyring.
    pub fn set_credentials(client_id: &str, client_secret: &str) -> Result<(), CoreError> {
        keyring_store::set("google_client_id", client_id)
            .map_err(|e| CoreError::Custom(e.to_string()))?;
        keyring_store::set("google_client_secret", client_secret)
            .map_err(|e| CoreError::Custom(e.to_string()))?;
        Ok(())
    }

    fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            service_name: SERVICE.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            redirect_port: 19824,
        }
    }

    /// Run the browser OAuth flow and store the tokens.
    pub fn login(&self) -> Result<(), CoreError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(OAuthError::CredentialsNotConfigured {
                service: SERVICE.to_string(),
            }
            .into());
        }
        let config = self.oauth_config();
        self.runtime.block_on(oauth::authorize(&config))?;
        Ok(())
    }

    /// Remove stored tokens.
    pub fn logout(&self) -> Result<(), CoreError> {
        keyring_store::delete(SERVICE).map_err(|e| CoreError::Custom(e.to_string()))
    }

    pub fn is_authenticated(&self) -> bool {
        oauth::load_tokens(SERVICE).is_some()
    }

    /// Return a valid access token, refreshing if expired.
    fn access_token(&self) -> Result<String, AdapterError> {
        let tokens = oauth::load_tokens(SERVICE).ok_or(AdapterError::NotAuthenticated {
            service: SERVICE.to_string(),
        })?;

        if !oauth::is_expired(&tokens) {
            return Ok(tokens.access_token);
        }

        let refresh = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| AdapterError::Api("no refresh token available".to_string()))?;

        let config = self.oauth_config();
        let refreshed: OAuthTokens = self
            .runtime
            .block_on(oauth::refresh_token(&config, refresh))
            .map_err(|e| AdapterError::Api(e.to_string()))?;

        Ok(refreshed.access_token)
    }

    fn get_json(&self, url: &str) -> Result<serde_json::Value, AdapterError> {
        let token = self.access_token()?;
        let body: serde_json::Value = self.runtime.block_on(async {
            self.client
                .get(url)
                .bearer_auth(&token)
                .send()
                .await?
                .json()
                .await
        })?;
        check_api_error(&body)?;
        Ok(body)
    }
}

fn check_api_error(body: &serde_json::Value) -> Result<(), AdapterError> {
    match body.get("error") {
        Some(err) => Err(AdapterError::Api(err.to_string())),
        None => Ok(()),
    }
}

fn parse_instant(value: &serde_json::Value) -> Option<(DateTime<Utc>, bool)> {
    if let Some(dt) = value.get("dateTime").and_then(|v| v.as_str()) {
        return DateTime::parse_from_rfc3339(dt)
            .ok()
            .map(|t| (t.with_timezone(&Utc), false));
    }
    // Date-only means an all-day event; pin to midnight UTC.
    let date = value.get("date").and_then(|v| v.as_str())?;
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((
        naive.and_hms_opt(0, 0, 0)?.and_utc(),
        true,
    ))
}

fn parse_response_status(status: &str) -> ResponseStatus {
    match status {
        "accepted" => ResponseStatus::Accepted,
        "declined" => ResponseStatus::Declined,
        "tentative" => ResponseStatus::Tentative,
        // Unrecognized statuses fail the acceptance check conservatively
        _ => ResponseStatus::NeedsAction,
    }
}

/// Convert one API item into the core event view. Items without usable
/// start/end instants (e.g. cancelled stubs) yield `None`.
fn parse_event(item: &serde_json::Value, calendar_id: &str) -> Option<CalendarEvent> {
    let (start, start_all_day) = parse_instant(item.get("start")?)?;
    let (end, _) = parse_instant(item.get("end")?)?;

    let guests = item
        .get("attendees")
        .and_then(|v| v.as_array())
        .map(|attendees| {
            attendees
                .iter()
                .filter_map(|a| {
                    Some(Guest {
                        email: a.get("email")?.as_str()?.to_string(),
                        response: parse_response_status(
                            a.get("responseStatus").and_then(|v| v.as_str())?,
                        ),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let conference_entry_points = item
        .pointer("/conferenceData/entryPoints")
        .and_then(|v| v.as_array())
        .map(|eps| {
            eps.iter()
                .filter_map(|ep| ep.get("uri").and_then(|v| v.as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(CalendarEvent {
        id: item.get("id")?.as_str()?.to_string(),
        title: item
            .get("summary")
            .and_then(|v| v.as_str())
            .unwrap_or("(No title)")
            .to_string(),
        start,
        end,
        all_day: start_all_day,
        location: item
            .get("location")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        description: item
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        meeting_link: item
            .get("hangoutLink")
            .and_then(|v| v.as_str())
            .map(String::from),
        conference_entry_points,
        source_calendar: calendar_id.to_string(),
        organizer: item
            .pointer("/organizer/email")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        guests,
    })
}

impl CalendarAdapter for GoogleCalendarAdapter {
    fn current_identity(&self) -> Result<String, AdapterError> {
        let url = format!("{}/calendars/primary", self.api_base);
        let body = self.get_json(&url)?;
        body.get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| AdapterError::IdentityUnresolved("missing calendar id".to_string()))
    }

    fn list_events(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, AdapterError> {
        let url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.api_base,
            calendar_id,
            from.to_rfc3339(),
            to.to_rfc3339(),
        );
        let body = self.get_json(&url)?;
        let items = body["items"]
            .as_array()
            .ok_or_else(|| AdapterError::MalformedResponse("missing items".to_string()))?;
        Ok(items
            .iter()
            .filter_map(|item| parse_event(item, calendar_id))
            .collect())
    }

    fn create_event(
        &mut self,
        calendar_id: &str,
        title: &str,
        description: &str,
        interval: Interval,
    ) -> Result<CalendarEvent, AdapterError> {
        interval
            .validate()
            .map_err(|e| AdapterError::Api(e.to_string()))?;
        let token = self.access_token()?;
        let url = format!("{}/calendars/{}/events", self.api_base, calendar_id);
        let payload = json!({
            "summary": title,
            "description": description,
            "start": { "dateTime": interval.start.to_rfc3339() },
            "end": { "dateTime": interval.end.to_rfc3339() },
        });
        let body: serde_json::Value = self.runtime.block_on(async {
            self.client
                .post(&url)
                .bearer_auth(&token)
                .json(&payload)
                .send()
                .await?
                .json()
                .await
        })?;
        check_api_error(&body)?;
        parse_event(&body, calendar_id)
            .ok_or_else(|| AdapterError::MalformedResponse("unparseable created event".to_string()))
    }

    fn delete_event(&mut self, calendar_id: &str, event_id: &str) -> Result<(), AdapterError> {
        let token = self.access_token()?;
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, calendar_id, event_id
        );
        let status = self.runtime.block_on(async {
            self.client
                .delete(&url)
                .bearer_auth(&token)
                .send()
                .await
                .map(|r| r.status())
        })?;
        if status.is_success() {
            Ok(())
        } else {
            Err(AdapterError::Api(format!("delete returned {status}")))
        }
    }

    fn set_visual_style(
        &mut self,
        calendar_id: &str,
        event_id: &str,
        style: &str,
    ) -> Result<(), AdapterError> {
        let token = self.access_token()?;
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.api_base, calendar_id, event_id
        );
        let body: serde_json::Value = self.runtime.block_on(async {
            self.client
                .patch(&url)
                .bearer_auth(&token)
                .json(&json!({ "colorId": style }))
                .send()
                .await?
                .json()
                .await
        })?;
        check_api_error(&body)
    }
}
