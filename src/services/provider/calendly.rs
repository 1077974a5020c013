use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::SchedulingProvider;
use crate::errors::ProviderError;
use crate::models::{BookingReceipt, BookingSubmission, EventType, OpenSlot};
use crate::services::scheduling::format_instant;

pub struct CalendlyProvider {
    base_url: String,
    api_key: String,
    user_uri: String,
    client: reqwest::Client,
}

impl CalendlyProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        user_uri: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            user_uri,
            client,
        })
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value, ProviderError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v["message"].as_str().or_else(|| v["title"].as_str()))
        .map(|s| s.to_string())
        .unwrap_or_else(|| body.trim().to_string())
}

fn list_field<T: DeserializeOwned>(data: &Value) -> Result<Vec<T>, ProviderError> {
    let items = data
        .get("collection")
        .or_else(|| data.get("data"))
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    serde_json::from_value(items).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn parse_receipt(data: &Value) -> BookingReceipt {
    let resource = data
        .get("resource")
        .or_else(|| data.get("data"))
        .unwrap_or(data);

    let booking_id = resource["id"]
        .as_str()
        .map(|s| s.to_string())
        .or_else(|| {
            resource["uri"]
                .as_str()
                .and_then(|uri| uri.rsplit('/').next())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        });

    BookingReceipt {
        booking_id,
        status: resource["status"].as_str().map(|s| s.to_string()),
    }
}

#[async_trait]
impl SchedulingProvider for CalendlyProvider {
    async fn list_event_types(&self) -> Result<Vec<EventType>, ProviderError> {
        let resp = self
            .client
            .get(format!("{}/event_types", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("user", self.user_uri.as_str()), ("active", "true")])
            .send()
            .await?;

        let data = Self::read_json(resp).await?;
        list_field(&data)
    }

    async fn list_available_slots(
        &self,
        event_type_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OpenSlot>, ProviderError> {
        let event_type = format!("{}/event_types/{}", self.base_url, event_type_id);
        let resp = self
            .client
            .get(format!("{}/event_type_available_times", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("event_type", event_type),
                ("start_time", format_instant(start)),
                ("end_time", format_instant(end)),
            ])
            .send()
            .await?;

        let data = Self::read_json(resp).await?;
        let slots: Vec<OpenSlot> = list_field(&data)?;
        tracing::debug!(event_type_id, count = slots.len(), "fetched open slots");
        Ok(slots)
    }

    async fn create_booking(
        &self,
        submission: &BookingSubmission,
    ) -> Result<BookingReceipt, ProviderError> {
        let resp = self
            .client
            .post(format!("{}/scheduled_events", self.base_url))
            .bearer_auth(&self.api_key)
            .json(submission)
            .send()
            .await?;

        let data = Self::read_json(resp).await?;
        Ok(parse_receipt(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_prefers_provider_text() {
        let body = r#"{"title":"Invalid Argument","message":"The start time is no longer available."}"#;
        assert_eq!(error_message(body), "The start time is no longer available.");
        assert_eq!(error_message(r#"{"title":"Unauthenticated"}"#), "Unauthenticated");
        assert_eq!(error_message("  gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn test_list_field_collection_or_data() {
        let slots: Vec<OpenSlot> = list_field(&json!({
            "collection": [{"status": "available", "start_time": "2025-03-10T11:00:00Z"}]
        }))
        .unwrap();
        assert_eq!(slots[0].start_time, "2025-03-10T11:00:00Z");

        let slots: Vec<OpenSlot> =
            list_field(&json!({"data": [{"start_time": "2025-03-10T14:00:00Z"}]})).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].status, None);

        let empty: Vec<OpenSlot> = list_field(&json!({})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_list_field_rejects_bad_shape() {
        let result: Result<Vec<OpenSlot>, _> = list_field(&json!({"collection": [{"nope": 1}]}));
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_receipt_from_uri() {
        let receipt = parse_receipt(&json!({
            "resource": {"uri": "https://api.calendly.com/scheduled_events/EVT42", "status": "active"}
        }));
        assert_eq!(receipt.booking_id.as_deref(), Some("EVT42"));
        assert_eq!(receipt.status.as_deref(), Some("active"));
    }

    #[test]
    fn test_parse_receipt_from_data_id() {
        let receipt = parse_receipt(&json!({"data": {"id": "abc-1"}}));
        assert_eq!(receipt.booking_id.as_deref(), Some("abc-1"));
        assert_eq!(receipt.status, None);

        assert_eq!(parse_receipt(&json!({})), BookingReceipt::default());
    }
}
