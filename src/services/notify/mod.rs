pub mod smtp;
pub mod template;

use async_trait::async_trait;

use crate::models::AppointmentRecord;

#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, record: &AppointmentRecord) -> anyhow::Result<()>;
}
