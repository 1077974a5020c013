use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PatientName,
    Specialty,
    Reason,
    Date,
    Time,
    Phone,
    Email,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::PatientName,
        Field::Specialty,
        Field::Reason,
        Field::Date,
        Field::Time,
        Field::Phone,
        Field::Email,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::PatientName => "Patient Name",
            Field::Specialty => "Consultation Type",
            Field::Reason => "Reason for Visit",
            Field::Date => "Preferred Date",
            Field::Time => "Preferred Time",
            Field::Phone => "Phone Number",
            Field::Email => "Email Address",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    pub patient_name: Option<String>,
    pub specialty: Option<String>,
    pub reason: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl AppointmentRequest {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::PatientName => &self.patient_name,
            Field::Specialty => &self.specialty,
            Field::Reason => &self.reason,
            Field::Date => &self.date,
            Field::Time => &self.time,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::PatientName => &mut self.patient_name,
            Field::Specialty => &mut self.specialty,
            Field::Reason => &mut self.reason,
            Field::Date => &mut self.date,
            Field::Time => &mut self.time,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
        };
        *slot = Some(value.into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDetails {
    pub patient_name: String,
    #[serde(rename = "consultation_type")]
    pub specialty: String,
    pub reason: String,
    pub date: String,
    pub time: String,
    pub phone: String,
    pub email: String,
}

impl AppointmentDetails {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::PatientName => &self.patient_name,
            Field::Specialty => &self.specialty,
            Field::Reason => &self.reason,
            Field::Date => &self.date,
            Field::Time => &self.time,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
        }
    }

    pub fn summary(&self) -> String {
        Field::ALL
            .iter()
            .map(|f| format!("{}: {}", f.label(), self.get(*f)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
        }
    }

    pub fn from_confirmation(text: &str) -> Self {
        if text.to_lowercase().contains("confirmed") {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRecord {
    pub id: String,
    pub status: AppointmentStatus,
    pub external_booking_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: AppointmentDetails,
}

impl AppointmentRecord {
    pub fn new(
        details: AppointmentDetails,
        status: AppointmentStatus,
        external_booking_id: Option<String>,
    ) -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("appt-{}", &uuid[..8]),
            status,
            external_booking_id,
            created_at: Utc::now(),
            details,
        }
    }
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
            phone: "555-1234".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[test]
    fn test_summary_uses_canonical_labels_in_order() {
        let summary = details().summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Patient Name: Jane Doe");
        assert_eq!(lines[1], "Consultation Type: Cardiology");
        assert_eq!(lines[6], "Email Address: jane@example.com");
    }

    #[test]
    fn test_request_set_overwrites() {
        let mut req = AppointmentRequest::default();
        req.set(Field::Time, "10:00");
        req.set(Field::Time, "11:00");
        assert_eq!(req.get(Field::Time), Some("11:00"));
        assert_eq!(req.get(Field::Date), None);
    }

    #[test]
    fn test_record_id_and_serialized_shape() {
        let record = AppointmentRecord::new(details(), AppointmentStatus::Confirmed, Some("evt-1".to_string()));
        assert!(record.id.starts_with("appt-"));
        assert_eq!(record.id.len(), "appt-".len() + 8);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "confirmed");
        assert_eq!(value["patient_name"], "Jane Doe");
        assert_eq!(value["consultation_type"], "Cardiology");
        assert_eq!(value["external_booking_id"], "evt-1");
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn test_status_from_confirmation_text() {
        assert_eq!(
            AppointmentStatus::from_confirmation("Your appointment has been CONFIRMED."),
            AppointmentStatus::Confirmed
        );
        assert_eq!(
            AppointmentStatus::from_confirmation("Awaiting confirmation from the clinic."),
            AppointmentStatus::Pending
        );
    }
}
