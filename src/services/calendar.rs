//! Calendar gateway: free/busy queries and event mirroring in Google Calendar

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use crate::{
    config::CalendarConfig,
    error::{AppError, AppResult},
    models::BusyInterval,
};

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
const SERVICE: &str = "calendar";
/// Tokens are refreshed this long before Google expires them
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// When an event takes place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTiming {
    Timed {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Whole days; `end_exclusive` is the day after the last covered day
    AllDay {
        start: NaiveDate,
        end_exclusive: NaiveDate,
    },
}

/// Event to create in the external calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub timing: EventTiming,
    /// Provider color id (Google uses "11" for red)
    pub color_id: Option<String>,
    /// Popup reminder before the start
    pub reminder_minutes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Busy periods between `time_min` and `time_max`
    async fn query_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<BusyInterval>>;

    /// Create an event, returning its external id
    async fn create_event(&self, event: &CalendarEvent) -> AppResult<String>;

    async fn delete_event(&self, event_id: &str) -> AppResult<DeleteOutcome>;
}

/// Google Calendar accessed with a service account
#[derive(Clone)]
pub struct GoogleCalendar {
    http: Client,
    config: CalendarConfig,
    /// IANA name attached to timed events
    time_zone: String,
    token: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn usable_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: i64,
}

fn default_token_lifetime() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: std::collections::HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusyPeriod>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

struct Credentials<'a> {
    calendar_id: &'a str,
    client_email: &'a str,
    private_key: &'a str,
}

impl GoogleCalendar {
    pub fn new(http: Client, config: CalendarConfig, time_zone: impl Into<String>) -> Self {
        Self {
            http,
            config,
            time_zone: time_zone.into(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    fn credentials(&self) -> AppResult<Credentials<'_>> {
        let missing = |name: &str| {
            AppError::Configuration(format!("Google Calendar is not configured: {} is missing", name))
        };
        Ok(Credentials {
            calendar_id: present(&self.config.calendar_id).ok_or_else(|| missing("calendar_id"))?,
            client_email: present(&self.config.client_email).ok_or_else(|| missing("client_email"))?,
            private_key: present(&self.config.private_key).ok_or_else(|| missing("private_key"))?,
        })
    }

    /// Access token for the API, reused until shortly before it expires
    async fn access_token(&self, creds: &Credentials<'_>) -> AppResult<String> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.usable_at(Utc::now()) {
                return Ok(cached.value.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another request may have refreshed it while we waited for the lock
        if let Some(cached) = slot.as_ref() {
            if cached.usable_at(Utc::now()) {
                return Ok(cached.value.clone());
            }
        }
        let fresh = self.fetch_token(creds).await?;
        let value = fresh.value.clone();
        *slot = Some(fresh);
        Ok(value)
    }

    /// Exchange a signed service-account assertion for an access token
    async fn fetch_token(&self, creds: &Credentials<'_>) -> AppResult<CachedToken> {
        // Keys passed through env vars usually carry escaped newlines
        let pem = creds.private_key.replace("\\n", "\n");
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
            AppError::Configuration(format!("Invalid Google service account key: {}", e))
        })?;

        let now = Utc::now().timestamp();
        let claims = ServiceAccountClaims {
            iss: creds.client_email,
            scope: CALENDAR_SCOPE,
            aud: GOOGLE_TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AppError::Internal(format!("Failed to sign calendar assertion: {}", e)))?;

        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Token request failed: {}", e)))?;

        let response = check_status(response, "Token exchange").await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse token response: {}", e)))?;
        tracing::debug!(expires_in = token.expires_in, "Calendar access token refreshed");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now_after(token.expires_in),
        })
    }

    fn url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(GOOGLE_CALENDAR_API_BASE)
            .map_err(|e| AppError::Internal(format!("Invalid calendar API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Calendar API base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn event_body(&self, event: &CalendarEvent) -> serde_json::Value {
        let (start, end) = match &event.timing {
            EventTiming::Timed { start, end } => (
                json!({ "dateTime": start.to_rfc3339(), "timeZone": self.time_zone }),
                json!({ "dateTime": end.to_rfc3339(), "timeZone": self.time_zone }),
            ),
            EventTiming::AllDay { start, end_exclusive } => (
                json!({ "date": start.format("%Y-%m-%d").to_string() }),
                json!({ "date": end_exclusive.format("%Y-%m-%d").to_string() }),
            ),
        };

        let mut body = json!({
            "summary": event.summary,
            "description": event.description,
            "start": start,
            "end": end,
        });
        if let Some(color_id) = &event.color_id {
            body["colorId"] = json!(color_id);
        }
        if let Some(minutes) = event.reminder_minutes {
            body["reminders"] = json!({
                "useDefault": false,
                "overrides": [{ "method": "popup", "minutes": minutes }],
            });
        }
        body
    }
}

fn now_after(seconds: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(seconds)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

async fn check_status(response: reqwest::Response, what: &str) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let details = response.json::<serde_json::Value>().await.ok();
    Err(AppError::Upstream {
        service: SERVICE,
        message: format!("{} failed ({})", what, status),
        details,
    })
}

#[async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn query_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> AppResult<Vec<BusyInterval>> {
        let creds = self.credentials()?;
        let token = self.access_token(&creds).await?;

        let response = self
            .http
            .post(self.url(&["freeBusy"])?)
            .bearer_auth(token)
            .json(&json!({
                "timeMin": time_min.to_rfc3339(),
                "timeMax": time_max.to_rfc3339(),
                "items": [{ "id": creds.calendar_id }],
            }))
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Free/busy request failed: {}", e)))?;

        let response = check_status(response, "Free/busy query").await?;
        let body: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse free/busy response: {}", e)))?;

        let calendar = body.calendars.get(creds.calendar_id).ok_or_else(|| {
            AppError::upstream(SERVICE, format!("Calendar {} missing from free/busy response", creds.calendar_id))
        })?;
        if !calendar.errors.is_empty() {
            return Err(AppError::Upstream {
                service: SERVICE,
                message: format!("Free/busy query rejected for {}", creds.calendar_id),
                details: Some(json!(calendar.errors)),
            });
        }

        Ok(calendar
            .busy
            .iter()
            .map(|p| BusyInterval::new(p.start, p.end))
            .collect())
    }

    async fn create_event(&self, event: &CalendarEvent) -> AppResult<String> {
        let creds = self.credentials()?;
        let token = self.access_token(&creds).await?;

        let response = self
            .http
            .post(self.url(&["calendars", creds.calendar_id, "events"])?)
            .bearer_auth(token)
            .json(&self.event_body(event))
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Event insert failed: {}", e)))?;

        let response = check_status(response, "Event insert").await?;
        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Failed to parse event response: {}", e)))?;
        Ok(inserted.id)
    }

    async fn delete_event(&self, event_id: &str) -> AppResult<DeleteOutcome> {
        let creds = self.credentials()?;
        let token = self.access_token(&creds).await?;

        let response = self
            .http
            .delete(self.url(&["calendars", creds.calendar_id, "events", event_id])?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("Event delete failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(DeleteOutcome::NotFound),
            _ => {
                check_status(response, "Event delete").await?;
                Ok(DeleteOutcome::Deleted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn calendar(config: CalendarConfig) -> GoogleCalendar {
        GoogleCalendar::new(Client::new(), config, "Europe/Kyiv")
    }

    #[tokio::test]
    async fn test_missing_credentials_is_configuration_error() {
        let gateway = calendar(CalendarConfig {
            calendar_id: Some("studio@group.calendar.google.com".to_string()),
            client_email: None,
            private_key: None,
        });
        let now = Utc::now();
        let result = gateway.query_busy(now, now).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_url_escapes_calendar_id() {
        let gateway = calendar(CalendarConfig::default());
        let url = gateway
            .url(&["calendars", "studio#holidays@group.calendar.google.com", "events"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/studio%23holidays@group.calendar.google.com/events"
        );
    }

    #[test]
    fn test_all_day_event_body_uses_dates() {
        let gateway = calendar(CalendarConfig::default());
        let body = gateway.event_body(&CalendarEvent {
            summary: "Vacation: Blocked".to_string(),
            description: String::new(),
            timing: EventTiming::AllDay {
                start: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
                end_exclusive: NaiveDate::from_ymd_opt(2030, 1, 13).unwrap(),
            },
            color_id: Some("11".to_string()),
            reminder_minutes: None,
        });
        assert_eq!(body["start"]["date"], "2030-01-10");
        assert_eq!(body["end"]["date"], "2030-01-13");
        assert_eq!(body["colorId"], "11");
        assert!(body.get("reminders").is_none());
    }

    #[test]
    fn test_timed_event_body_carries_timezone_and_reminder() {
        let gateway = calendar(CalendarConfig::default());
        let start = Utc.with_ymd_and_hms(2030, 1, 7, 7, 0, 0).unwrap();
        let body = gateway.event_body(&CalendarEvent {
            summary: "Photo session: portrait".to_string(),
            description: "Client: Olena".to_string(),
            timing: EventTiming::Timed {
                start,
                end: start + chrono::Duration::minutes(120),
            },
            color_id: None,
            reminder_minutes: Some(30),
        });
        assert_eq!(body["start"]["timeZone"], "Europe/Kyiv");
        assert_eq!(body["end"]["dateTime"], "2030-01-07T09:00:00+00:00");
        assert_eq!(body["reminders"]["overrides"][0]["minutes"], 30);
    }

    fn configured() -> CalendarConfig {
        CalendarConfig {
            calendar_id: Some("studio@group.calendar.google.com".to_string()),
            client_email: Some("booking@studio.iam.gserviceaccount.com".to_string()),
            private_key: Some("not a key".to_string()),
        }
    }

    #[test]
    fn test_token_refreshed_before_expiry() {
        let now = Utc::now();
        let token = CachedToken {
            value: "ya29.token".to_string(),
            expires_at: now + Duration::seconds(3599),
        };
        assert!(token.usable_at(now));
        assert!(!token.usable_at(now + Duration::seconds(3599 - TOKEN_REFRESH_MARGIN_SECS)));
    }

    #[tokio::test]
    async fn test_cached_token_skips_exchange() {
        let gateway = calendar(configured());
        *gateway.token.write().await = Some(CachedToken {
            value: "ya29.cached".to_string(),
            expires_at: Utc::now() + Duration::minutes(30),
        });

        // The key is unusable, so only the cache can answer
        let creds = gateway.credentials().unwrap();
        assert_eq!(gateway.access_token(&creds).await.unwrap(), "ya29.cached");
    }

    #[tokio::test]
    async fn test_expired_token_is_not_reused() {
        let gateway = calendar(configured());
        *gateway.token.write().await = Some(CachedToken {
            value: "ya29.stale".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        });

        let creds = gateway.credentials().unwrap();
        let result = gateway.access_token(&creds).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
