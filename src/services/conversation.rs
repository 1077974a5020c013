use std::sync::LazyLock;

use chrono::{DateTime, Local, Utc};
use regex::Regex;

use crate::models::{
    AppointmentDetails, AppointmentRecord, AppointmentStatus, AvailabilityCheck, BookingReceipt,
    BookingSubmission, ConversationState, Phase,
};
use crate::services::ai::prompts::system_prompt;
use crate::services::ai::Message;
use crate::services::completeness::{self, Completeness};
use crate::services::extractor::extract;
use crate::services::scheduling::{format_instant, Reconciler};
use crate::state::AppState;

pub const LLM_FAILURE_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

pub const GOODBYE: &str = "Goodbye! Thank you for using the Hospital Clinic Appointment System.";

const EXIT_COMMANDS: [&str; 3] = ["bye", "exit", "quit"];

const MIN_PHONE_DIGITS: usize = 7;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email shape pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnOutcome {
    pub replies: Vec<String>,
    pub finished: bool,
}

impl TurnOutcome {
    fn finished(reply: impl Into<String>) -> Self {
        Self {
            replies: vec![reply.into()],
            finished: true,
        }
    }
}

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim();
    EXIT_COMMANDS.iter().any(|c| c.eq_ignore_ascii_case(input))
}

pub fn validate_contact(details: &AppointmentDetails) -> Result<(), String> {
    if !EMAIL_SHAPE.is_match(details.email.trim()) {
        return Err(format!(
            "The email address \"{}\" doesn't look right. Could you please provide a valid email address?",
            details.email
        ));
    }

    let digits = details.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(format!(
            "The phone number \"{}\" seems too short. Could you please provide a full phone number?",
            details.phone
        ));
    }

    Ok(())
}

pub async fn process_turn(
    state: &AppState,
    mut conv: ConversationState,
    input: &str,
) -> (ConversationState, TurnOutcome) {
    let input = input.trim();

    if is_exit_command(input) {
        tracing::info!(phase = conv.phase.as_str(), "user ended the conversation");
        return (conv, TurnOutcome::finished(GOODBYE));
    }
    if conv.phase.is_done() {
        return (conv, TurnOutcome::finished(GOODBYE));
    }

    let mut outcome = TurnOutcome::default();
    conv.push_user(input);

    let prompt = system_prompt(Local::now().date_naive(), &state.config.clinic_hours);
    let history: Vec<Message> = conv.transcript.iter().map(Message::from).collect();
    let reply = match state.llm.chat(&prompt, &history).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "llm call failed");
            LLM_FAILURE_REPLY.to_string()
        }
    };
    say(&mut conv, &mut outcome, reply);

    conv.request = extract(&conv.transcript_lines(), &state.patterns);
    let details = match completeness::check(&conv.request) {
        Completeness::Complete(details) => details,
        Completeness::Incomplete { missing } => {
            tracing::debug!(missing = ?missing, "request incomplete");
            return (conv, outcome);
        }
    };

    if let Err(problem) = validate_contact(&details) {
        tracing::info!(%problem, "contact details rejected");
        say(&mut conv, &mut outcome, problem);
        return (conv, outcome);
    }

    if conv.rejected.as_ref() == Some(&details) {
        tracing::debug!("request unchanged since last rejection, waiting for new details");
        return (conv, outcome);
    }

    outcome.replies.push(format!(
        "Processing appointment with the following details:\n{}",
        details.summary()
    ));
    conv.phase = Phase::Reconciling(details);
    advance(state, &mut conv, &mut outcome).await;

    outcome.finished = conv.phase.is_done();
    (conv, outcome)
}

async fn advance(state: &AppState, conv: &mut ConversationState, outcome: &mut TurnOutcome) {
    loop {
        let phase = std::mem::replace(&mut conv.phase, Phase::Collecting);
        let from = phase.as_str();

        let next = match phase {
            Phase::Collecting => return,
            Phase::Done(record) => {
                conv.phase = Phase::Done(record);
                return;
            }
            Phase::Reconciling(details) => reconcile(state, conv, outcome, details).await,
            Phase::Booking { details, start } => book(state, conv, outcome, details, start).await,
            Phase::Notifying { details, receipt } => {
                notify(state, conv, outcome, details, receipt).await
            }
        };

        tracing::info!(from, to = next.as_str(), "phase transition");
        conv.phase = next;
    }
}

async fn reconcile(
    state: &AppState,
    conv: &mut ConversationState,
    outcome: &mut TurnOutcome,
    details: AppointmentDetails,
) -> Phase {
    let reconciler = Reconciler::new(
        state.scheduler.as_ref(),
        &state.config.event_types,
        state.config.date_order,
    );
    let check = reconciler
        .check_availability(&details.specialty, &details.date, &details.time)
        .await;

    let message = match check {
        AvailabilityCheck::Available(slot) => {
            return Phase::Booking {
                details,
                start: slot.start,
            };
        }
        AvailabilityCheck::Unavailable(slot) if slot.alternatives.is_empty() => format!(
            "I'm sorry, there are no available {} appointments on {}. Could you please choose a different date?",
            details.specialty, details.date
        ),
        AvailabilityCheck::Unavailable(slot) => format!(
            "I'm sorry, {} on {} is not available for {}. Available times that day: {}. Which time would you prefer?",
            details.time,
            details.date,
            details.specialty,
            slot.alternatives.join(", ")
        ),
        AvailabilityCheck::Unparseable { .. } => format!(
            "I couldn't understand the requested date and time ({} at {}). Please give the date as YYYY-MM-DD and the time as HH:MM or like 2:30 PM.",
            details.date, details.time
        ),
        AvailabilityCheck::ProviderFailed { .. } => {
            say(
                conv,
                outcome,
                "I'm sorry, I couldn't check availability right now. Please try again in a moment.",
            );
            return Phase::Collecting;
        }
    };

    conv.rejected = Some(details);
    say(conv, outcome, message);
    Phase::Collecting
}

async fn book(
    state: &AppState,
    conv: &mut ConversationState,
    outcome: &mut TurnOutcome,
    details: AppointmentDetails,
    start: DateTime<Utc>,
) -> Phase {
    let event_type_id = state.config.event_types.resolve(&details.specialty);
    let submission = BookingSubmission::new(event_type_id, format_instant(start), &details);

    match state.scheduler.create_booking(&submission).await {
        Ok(receipt) => {
            tracing::info!(
                event_type_id,
                booking_id = ?receipt.booking_id,
                "booking created"
            );
            Phase::Notifying { details, receipt }
        }
        Err(e) => {
            tracing::warn!(error = %e, rejected = e.is_rejection(), "booking failed");
            if e.is_rejection() {
                conv.rejected = Some(details);
            }
            say(
                conv,
                outcome,
                format!("I'm sorry, the appointment could not be booked: {e}"),
            );
            Phase::Collecting
        }
    }
}

async fn notify(
    state: &AppState,
    conv: &mut ConversationState,
    outcome: &mut TurnOutcome,
    details: AppointmentDetails,
    receipt: BookingReceipt,
) -> Phase {
    let mut message = confirmation_headline(&details, receipt.booking_id.as_deref());
    let status = AppointmentStatus::from_confirmation(&message);
    let record = AppointmentRecord::new(details, status, receipt.booking_id);

    if record.external_booking_id.is_none() {
        message.push_str(&format!(" Your reference number is {}.", record.id));
    }

    match state.mailer.send_confirmation(&record).await {
        Ok(()) => message.push_str(&format!(
            " A confirmation email has been sent to {}.",
            record.details.email
        )),
        Err(e) => tracing::warn!(appointment_id = %record.id, error = %e, "confirmation email failed"),
    }
    message.push_str(" Thank you for using our appointment system.");

    if let Err(e) = state.store.save_appointment(&record) {
        tracing::error!(appointment_id = %record.id, error = %e, "failed to persist appointment");
    }

    say(conv, outcome, message);

    if let Err(e) = state
        .store
        .save_transcript(&conv.transcript_lines(), record.created_at)
    {
        tracing::warn!(error = %e, "failed to persist transcript");
    }

    tracing::info!(
        appointment_id = %record.id,
        status = record.status.as_str(),
        "appointment recorded"
    );
    Phase::Done(record)
}

fn confirmation_headline(details: &AppointmentDetails, booking_id: Option<&str>) -> String {
    match booking_id {
        Some(id) => format!(
            "Your appointment for {} has been confirmed for {} at {}. Your confirmation number is {}.",
            details.specialty, details.date, details.time, id
        ),
        None => format!(
            "Your appointment request for {} on {} at {} has been submitted and is awaiting confirmation.",
            details.specialty, details.date, details.time
        ),
    }
}

fn say(conv: &mut ConversationState, outcome: &mut TurnOutcome, text: impl Into<String>) {
    let text = text.into();
    conv.push_assistant(text.clone());
    outcome.replies.push(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> AppointmentDetails {
        AppointmentDetails {
            patient_name: "Jane Doe".to_string(),
            specialty: "Cardiology".to_string(),
            reason: "chest pain".to_string(),
            date: "2025-03-10".to_string(),
            time: "10:00".to_string(),
            phone: "555-123-4567".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("bye"));
        assert!(is_exit_command("  QUIT "));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("goodbye for now"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_validate_contact_accepts_good_details() {
        assert!(validate_contact(&details()).is_ok());
    }

    #[test]
    fn test_validate_contact_rejects_bad_email() {
        let mut d = details();
        d.email = "jane at example".to_string();
        let err = validate_contact(&d).unwrap_err();
        assert!(err.contains("jane at example"));

        d.email = "jane@localhost".to_string();
        assert!(validate_contact(&d).is_err());
    }

    #[test]
    fn test_validate_contact_rejects_short_phone() {
        let mut d = details();
        d.phone = "555-12".to_string();
        assert!(validate_contact(&d).unwrap_err().contains("phone number"));

        d.phone = "(555) 123 4".to_string();
        assert!(validate_contact(&d).is_ok());
    }

    #[test]
    fn test_headline_drives_status() {
        let confirmed = confirmation_headline(&details(), Some("EVT42"));
        assert!(confirmed.contains("confirmation number is EVT42"));
        assert_eq!(
            AppointmentStatus::from_confirmation(&confirmed),
            AppointmentStatus::Confirmed
        );

        let pending = confirmation_headline(&details(), None);
        assert!(pending.contains("awaiting confirmation"));
        assert_eq!(
            AppointmentStatus::from_confirmation(&pending),
            AppointmentStatus::Pending
        );
    }
}
