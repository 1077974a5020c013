use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{ClinicHours, EventTypeMap, Specialty};
use crate::services::scheduling::DateOrder;

const REQUIRED: [&str; 7] = [
    "OPENAI_API_KEY",
    "CALENDLY_API_KEY",
    "CALENDLY_USER_URI",
    "EMAIL_USERNAME",
    "EMAIL_PASSWORD",
    "EMAIL_SMTP_SERVER",
    "EMAIL_SMTP_PORT",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub calendly_api_key: String,
    pub calendly_user_uri: String,
    pub calendly_base_url: String,
    pub event_types: EventTypeMap,
    pub email_username: String,
    pub email_password: String,
    pub email_smtp_server: String,
    pub email_smtp_port: u16,
    pub email_sender_name: String,
    pub email_template_path: PathBuf,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
    pub date_order: DateOrder,
    pub clinic_hours: ClinicHours,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED.iter().copied().filter(|k| get(k).is_none()).collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        let required = |key: &str| get(key).unwrap_or_default();
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let date_order = match get("SLASH_DATE_ORDER") {
            Some(v) => DateOrder::parse(&v).ok_or_else(|| {
                AppError::Config(format!(
                    "SLASH_DATE_ORDER must be day-first or month-first, got {v:?}"
                ))
            })?,
            None => DateOrder::default(),
        };

        let clinic_hours = match get("CLINIC_HOURS") {
            Some(json) => ClinicHours::from_json(&json)
                .map_err(|e| AppError::Config(format!("CLINIC_HOURS is invalid: {e}")))?,
            None => ClinicHours::default(),
        };

        let mut event_types = EventTypeMap::with_defaults();
        for sp in Specialty::ALL {
            if let Some(id) = get(&format!("CALENDLY_EVENT_TYPE_{}", sp.env_suffix())) {
                event_types.set(sp, id);
            }
        }

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY"),
            openai_model: or("OPENAI_MODEL", "gpt-3.5-turbo"),
            openai_base_url: or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            temperature: parse_number(&get, "TEMPERATURE", 0.7)?,
            calendly_api_key: required("CALENDLY_API_KEY"),
            calendly_user_uri: required("CALENDLY_USER_URI"),
            calendly_base_url: or("CALENDLY_BASE_URL", "https://api.calendly.com"),
            event_types,
            email_username: required("EMAIL_USERNAME"),
            email_password: required("EMAIL_PASSWORD"),
            email_smtp_server: required("EMAIL_SMTP_SERVER"),
            email_smtp_port: parse_number(&get, "EMAIL_SMTP_PORT", 587)?,
            email_sender_name: or("EMAIL_SENDER_NAME", "Hospital Appointment System"),
            email_template_path: or("EMAIL_TEMPLATE_PATH", "templates/confirmation_email.html").into(),
            data_dir: or("DATA_DIR", "data").into(),
            http_timeout: Duration::from_secs(parse_number(&get, "HTTP_TIMEOUT_SECS", 30)?),
            date_order,
            clinic_hours,
        })
    }
}

fn parse_number<T, F>(get: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} is not a valid number: {raw:?}"))),
        None => Ok(default),
    }
}
