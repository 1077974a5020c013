use std::path::Path;

use crate::models::AppointmentRecord;

pub const FALLBACK_TEMPLATE: &str = r#"<html>
<body>
<h2>Appointment Confirmation</h2>
<p>Dear {{name}},</p>
<p>Your appointment has been scheduled with the following details:</p>
<ul>
<li><strong>Consultation Type:</strong> {{consultation_type}}</li>
<li><strong>Reason for Visit:</strong> {{reason}}</li>
<li><strong>Date:</strong> {{date}}</li>
<li><strong>Time:</strong> {{time}}</li>
<li><strong>Phone:</strong> {{phone}}</li>
<li><strong>Email:</strong> {{email}}</li>
<li><strong>Confirmation Number:</strong> {{confirmation_number}}</li>
</ul>
<p>Please arrive 15 minutes before your appointment time.</p>
</body>
</html>
"#;

pub fn load_template(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "email template is empty, using fallback");
            FALLBACK_TEMPLATE.to_string()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "email template unreadable, using fallback");
            FALLBACK_TEMPLATE.to_string()
        }
    }
}

pub fn confirmation_number(record: &AppointmentRecord) -> &str {
    record
        .external_booking_id
        .as_deref()
        .unwrap_or(&record.id)
}

// Unknown placeholders are left alone.
pub fn render(template: &str, record: &AppointmentRecord) -> String {
    let d = &record.details;
    let values = [
        ("name", d.patient_name.as_str()),
        ("consultation_type", d.specialty.as_str()),
        ("reason", d.reason.as_str()),
        ("date", d.date.as_str()),
        ("time", d.time.as_str()),
        ("phone", d.phone.as_str()),
        ("email", d.email.as_str()),
        ("confirmation_number", confirmation_number(record)),
    ];

    values
        .iter()
        .fold(template.to_string(), |body, (key, value)| {
            body.replace(&format!("{{{{{key}}}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentDetails, AppointmentStatus};

    fn record(external: Option<&str>) -> AppointmentRecord {
        AppointmentRecord::new(
            AppointmentDetails {
                patient_name: "Jane Doe".to_string(),
                specialty: "Cardiology".to_string(),
                reason: "chest pain".to_string(),
                date: "2025-03-10".to_string(),
                time: "10:00".to_string(),
                phone: "555-123-4567".to_string(),
                email: "jane@example.com".to_string(),
            },
            AppointmentStatus::Confirmed,
            external.map(|s| s.to_string()),
        )
    }

    #[test]
    fn test_render_fills_placeholders() {
        let body = render(
            "Hi {{name}}, {{consultation_type}} on {{date}} at {{time}} (#{{confirmation_number}})",
            &record(Some("EVT42")),
        );
        assert_eq!(body, "Hi Jane Doe, Cardiology on 2025-03-10 at 10:00 (#EVT42)");
    }

    #[test]
    fn test_confirmation_number_falls_back_to_record_id() {
        let rec = record(None);
        let body = render("{{confirmation_number}}", &rec);
        assert_eq!(body, rec.id);
        assert!(body.starts_with("appt-"));
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        assert_eq!(render("{{doctor}} {{name}}", &record(None)), "{{doctor}} Jane Doe");
    }

    #[test]
    fn test_fallback_template_has_no_leftovers() {
        let body = render(FALLBACK_TEMPLATE, &record(Some("EVT42")));
        assert!(!body.contains("{{"));
        assert!(body.contains("chest pain"));
    }

    #[test]
    fn test_load_template_missing_file_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let body = load_template(&dir.path().join("nope.html"));
        assert_eq!(body, FALLBACK_TEMPLATE);
    }

    #[test]
    fn test_load_template_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("confirm.html");
        std::fs::write(&path, "<p>{{name}}</p>").unwrap();
        assert_eq!(load_template(&path), "<p>{{name}}</p>");
    }
}
