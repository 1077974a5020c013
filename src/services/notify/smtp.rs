use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as Email, Tokio1Executor};

use super::template::render;
use super::ConfirmationMailer;
use crate::errors::AppError;
use crate::models::AppointmentRecord;

pub const SUBJECT: &str = "Hospital Appointment Confirmation";

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    template: String,
}

impl SmtpMailer {
    pub fn new(
        server: &str,
        port: u16,
        username: String,
        password: String,
        sender_name: &str,
        template: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let address = username
            .parse()
            .map_err(|e| AppError::Config(format!("EMAIL_USERNAME is not an address: {e}")))?;
        let sender = Mailbox::new(Some(sender_name.to_string()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
            .map_err(|e| AppError::Config(format!("invalid SMTP server {server}: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            sender,
            template,
        })
    }

    fn build_email(&self, record: &AppointmentRecord) -> Result<Email, AppError> {
        let to: Mailbox = record
            .details
            .email
            .parse()
            .map_err(|e| AppError::Notification(format!("bad recipient address: {e}")))?;

        Email::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render(&self.template, record))
            .map_err(|e| AppError::Notification(e.to_string()))
    }
}

#[async_trait]
impl ConfirmationMailer for SmtpMailer {
    async fn send_confirmation(&self, record: &AppointmentRecord) -> anyhow::Result<()> {
        let email = self.build_email(record)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Notification(e.to_string()))?;

        tracing::info!(appointment_id = %record.id, "confirmation email sent");
        Ok(())
    }
}
