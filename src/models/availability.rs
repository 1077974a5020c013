use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningSlot {
    pub day: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicHours {
    pub slots: Vec<OpeningSlot>,
}

impl ClinicHours {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let hours: ClinicHours = serde_json::from_str(s)?;
        for slot in &hours.slots {
            parse_weekday(&slot.day)?;
            parse_time(&slot.start)?;
            parse_time(&slot.end)?;
        }
        Ok(hours)
    }

    pub fn to_human_readable(&self) -> String {
        if self.slots.is_empty() {
            return String::new();
        }

        let day_order = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

        let mut sorted_slots = self.slots.clone();
        sorted_slots.sort_by_key(|s| {
            day_order
                .iter()
                .position(|d| *d == s.day.to_lowercase())
                .unwrap_or(7)
        });

        sorted_slots
            .iter()
            .map(|s| format!("{}: {}-{}", capitalize(&s.day), s.start, s.end))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ClinicHours {
    fn default() -> Self {
        let slot = |day: &str, start: &str, end: &str| OpeningSlot {
            day: day.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        };
        Self {
            slots: vec![
                slot("mon", "09:00", "17:00"),
                slot("tue", "09:00", "17:00"),
                slot("wed", "09:00", "17:00"),
                slot("thu", "09:00", "17:00"),
                slot("fri", "09:00", "17:00"),
                slot("sat", "09:00", "12:00"),
            ],
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + &c.as_str().to_lowercase(),
    }
}

fn parse_weekday(s: &str) -> anyhow::Result<()> {
    match s.to_lowercase().as_str() {
        "mon" | "tue" | "wed" | "thu" | "fri" | "sat" | "sun" => Ok(()),
        _ => Err(anyhow::anyhow!("invalid weekday: {s}")),
    }
}

fn parse_time(s: &str) -> anyhow::Result<()> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .map(|_| ())
        .map_err(|_| anyhow::anyhow!("invalid time: {s}"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySlot {
    pub specialty: String,
    pub start: DateTime<Utc>,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityCheck {
    Available(AvailabilitySlot),
    Unavailable(AvailabilitySlot),
    Unparseable { reason: String },
    ProviderFailed { reason: String },
}

impl AvailabilityCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityCheck::Available(_))
    }

    pub fn alternatives(&self) -> &[String] {
        match self {
            AvailabilityCheck::Unavailable(slot) => &slot.alternatives,
            _ => &[],
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            AvailabilityCheck::Available(_) => "available",
            AvailabilityCheck::Unavailable(_) => "unavailable",
            AvailabilityCheck::Unparseable { .. } => "unparseable",
            AvailabilityCheck::ProviderFailed { .. } => "provider_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{"slots":[{"day":"mon","start":"09:00","end":"17:00"},{"day":"sat","start":"09:00","end":"12:00"}]}"#;
        let hours = ClinicHours::from_json(json).unwrap();
        assert_eq!(hours.slots.len(), 2);
        assert_eq!(hours.slots[1].day, "sat");
    }

    #[test]
    fn test_parse_invalid_day() {
        let json = r#"{"slots":[{"day":"xyz","start":"09:00","end":"17:00"}]}"#;
        assert!(ClinicHours::from_json(json).is_err());
    }

    #[test]
    fn test_parse_invalid_time() {
        let json = r#"{"slots":[{"day":"mon","start":"25:00","end":"17:00"}]}"#;
        assert!(ClinicHours::from_json(json).is_err());
    }

    #[test]
    fn test_default_hours_readable() {
        let readable = ClinicHours::default().to_human_readable();
        assert!(readable.starts_with("Mon: 09:00-17:00"));
        assert!(readable.ends_with("Sat: 09:00-12:00"));
        assert!(!readable.contains("Sun"));
    }

    #[test]
    fn test_to_human_readable_sorts_days() {
        let json = r#"{"slots":[{"day":"fri","start":"10:00","end":"16:00"},{"day":"mon","start":"09:00","end":"17:00"}]}"#;
        let hours = ClinicHours::from_json(json).unwrap();
        assert_eq!(hours.to_human_readable(), "Mon: 09:00-17:00, Fri: 10:00-16:00");
    }

    #[test]
    fn test_only_unavailable_carries_alternatives() {
        let slot = AvailabilitySlot {
            specialty: "Cardiology".to_string(),
            start: Utc::now(),
            alternatives: vec!["11:00 AM".to_string()],
        };
        let unavailable = AvailabilityCheck::Unavailable(slot.clone());
        assert!(!unavailable.is_available());
        assert_eq!(unavailable.alternatives(), ["11:00 AM".to_string()]);

        let failed = AvailabilityCheck::Unparseable { reason: "bad time".to_string() };
        assert!(!failed.is_available());
        assert!(failed.alternatives().is_empty());
        assert_eq!(failed.outcome(), "unparseable");
    }
}
