use serde::{Deserialize, Serialize};

use crate::models::AppointmentDetails;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventType {
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl EventType {
    pub fn id(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or(&self.uri)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenSlot {
    pub start_time: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invitee {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingSubmission {
    pub event_type_uuid: String,
    pub start_time: String,
    pub invitee: Invitee,
    pub custom_questions: Vec<CustomAnswer>,
}

impl BookingSubmission {
    pub fn new(event_type_id: &str, start_time: String, details: &AppointmentDetails) -> Self {
        Self {
            event_type_uuid: event_type_id.to_string(),
            start_time,
            invitee: Invitee {
                name: details.patient_name.clone(),
                email: details.email.clone(),
                phone_number: details.phone.clone(),
            },
            custom_questions: vec![
                CustomAnswer {
                    question: "Reason for Visit".to_string(),
                    answer: details.reason.clone(),
                },
                CustomAnswer {
                    question: "Consultation Type".to_string(),
                    answer: details.specialty.clone(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookingReceipt {
    pub booking_id: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_id_from_uri() {
        let et = EventType {
            uri: "https://api.calendly.com/event_types/ABC123".to_string(),
            name: "Cardiology".to_string(),
            slug: None,
        };
        assert_eq!(et.id(), "ABC123");
    }

    #[test]
    fn test_submission_payload_shape() {
        let details = AppointmentDetails {
            patient_name: "Jane Doe".to_string(),
            specialty: "Cardiology".to_string(),
            reason: "chest pain".to_string(),
            date: "2025-03-10".to_string(),
            time: "10:00".to_string(),
            phone: "555-1234".to_string(),
            email: "jane@example.com".to_string(),
        };
        let submission =
            BookingSubmission::new("evt-cardio", "2025-03-10T10:00:00Z".to_string(), &details);
        let value = serde_json::to_value(&submission).unwrap();

        assert_eq!(value["event_type_uuid"], "evt-cardio");
        assert_eq!(value["invitee"]["phone_number"], "555-1234");
        assert_eq!(value["custom_questions"][0]["question"], "Reason for Visit");
        assert_eq!(value["custom_questions"][1]["answer"], "Cardiology");
    }
}
