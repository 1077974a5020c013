pub mod calendly;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ProviderError;
use crate::models::{BookingReceipt, BookingSubmission, EventType, OpenSlot};

#[async_trait]
pub trait SchedulingProvider: Send + Sync {
    async fn list_event_types(&self) -> Result<Vec<EventType>, ProviderError>;

    async fn list_available_slots(
        &self,
        event_type_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OpenSlot>, ProviderError>;

    async fn create_booking(
        &self,
        submission: &BookingSubmission,
    ) -> Result<BookingReceipt, ProviderError>;
}
