use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use regex::Regex;

use crate::errors::ProviderError;
use crate::models::{AvailabilityCheck, AvailabilitySlot, EventTypeMap, Specialty};
use crate::services::provider::SchedulingProvider;

pub const MAX_ALTERNATIVES: usize = 3;

// Both slash orders are always tried; this picks which goes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

impl DateOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day-first" | "dmy" => Some(DateOrder::DayFirst),
            "month-first" | "mdy" => Some(DateOrder::MonthFirst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateOrder::DayFirst => "day-first",
            DateOrder::MonthFirst => "month-first",
        }
    }

    pub fn formats(&self) -> [&'static str; 5] {
        match self {
            DateOrder::DayFirst => ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d/%m/%Y", "%m/%d/%Y"],
            DateOrder::MonthFirst => ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%d/%m/%Y"],
        }
    }
}

struct TimeFormat {
    regex: Regex,
}

// 24-hour first, then 12-hour with minutes, then hour-only 12-hour.
static TIME_FORMATS: LazyLock<Vec<TimeFormat>> = LazyLock::new(|| {
    [
        r"^(?P<h>\d{1,2}):(?P<m>\d{2})$",
        r"(?i)^(?P<h>\d{1,2}):(?P<m>\d{2})\s*(?P<ap>[ap])m$",
        r"(?i)^(?P<h>\d{1,2})\s*(?P<ap>[ap])m$",
    ]
    .into_iter()
    .map(|p| TimeFormat {
        regex: Regex::new(p).expect("time pattern is valid"),
    })
    .collect()
});

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS.iter().find_map(|fmt| {
        let caps = fmt.regex.captures(text)?;
        let hour: u32 = caps["h"].parse().ok()?;
        let minute: u32 = match caps.name("m") {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let hour = match caps.name("ap") {
            None => hour,
            Some(ap) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let pm = ap.as_str().eq_ignore_ascii_case("p");
                hour % 12 + if pm { 12 } else { 0 }
            }
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    })
}

pub fn parse_date(text: &str, order: DateOrder) -> Option<NaiveDate> {
    let text = text.trim();
    order
        .formats()
        .iter()
        .find_map(|fmt| {
            // chrono's %Y takes any digit count; only four-digit years count.
            NaiveDate::parse_from_str(text, fmt)
                .ok()
                .filter(|date| date.year() >= 1000)
        })
}

pub fn resolve_instant(
    date_text: &str,
    time_text: &str,
    order: DateOrder,
) -> Result<DateTime<Utc>, String> {
    let date = parse_date(date_text, order)
        .ok_or_else(|| format!("could not parse date: {date_text}"))?;
    let time = parse_time(time_text)
        .ok_or_else(|| format!("could not parse time: {time_text}"))?;
    Ok(date.and_time(time).and_utc())
}

pub fn parse_slot_start(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = s.trim().trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|n| n.and_utc())
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_alternative(instant: DateTime<Utc>) -> String {
    instant.format("%I:%M %p").to_string()
}

fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = date
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or(start);
    (start, end)
}

pub struct Reconciler<'a> {
    provider: &'a dyn SchedulingProvider,
    event_types: &'a EventTypeMap,
    date_order: DateOrder,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        provider: &'a dyn SchedulingProvider,
        event_types: &'a EventTypeMap,
        date_order: DateOrder,
    ) -> Self {
        Self {
            provider,
            event_types,
            date_order,
        }
    }

    // Exact instant match only. Never errors.
    pub async fn check_availability(
        &self,
        specialty: &str,
        date_text: &str,
        time_text: &str,
    ) -> AvailabilityCheck {
        let start = match resolve_instant(date_text, time_text, self.date_order) {
            Ok(start) => start,
            Err(reason) => {
                tracing::warn!(
                    outcome = "unparseable",
                    date = date_text,
                    time = time_text,
                    %reason,
                    "requested slot could not be resolved"
                );
                return AvailabilityCheck::Unparseable { reason };
            }
        };

        let event_type_id = self.event_types.resolve(specialty);
        let (day_start, day_end) = day_bounds(start.date_naive());

        let open = match self
            .provider
            .list_available_slots(event_type_id, day_start, day_end)
            .await
        {
            Ok(open) => open,
            Err(e) => {
                tracing::warn!(outcome = "provider_failed", error = %e, event_type_id, "availability query failed");
                return AvailabilityCheck::ProviderFailed {
                    reason: e.to_string(),
                };
            }
        };

        let starts: Vec<DateTime<Utc>> = open
            .iter()
            .filter_map(|slot| {
                let parsed = parse_slot_start(&slot.start_time);
                if parsed.is_none() {
                    tracing::warn!(start_time = %slot.start_time, "ignoring unparseable provider slot");
                }
                parsed
            })
            .collect();

        let mut slot = AvailabilitySlot {
            specialty: specialty.to_string(),
            start,
            alternatives: Vec::new(),
        };

        if starts.contains(&start) {
            tracing::info!(outcome = "available", start = %format_instant(start), "requested slot is open");
            return AvailabilityCheck::Available(slot);
        }

        slot.alternatives = starts
            .iter()
            .take(MAX_ALTERNATIVES)
            .map(|s| format_alternative(*s))
            .collect();
        tracing::info!(
            outcome = "unavailable",
            start = %format_instant(start),
            alternatives = ?slot.alternatives,
            "requested slot is taken"
        );
        AvailabilityCheck::Unavailable(slot)
    }
}

pub async fn unknown_event_types(
    provider: &dyn SchedulingProvider,
    event_types: &EventTypeMap,
) -> Result<Vec<(Specialty, String)>, ProviderError> {
    let offered = provider.list_event_types().await?;
    let mut unknown: Vec<(Specialty, String)> = event_types
        .ids()
        .filter(|(_, id)| !offered.iter().any(|et| et.id() == *id || et.slug.as_deref() == Some(*id)))
        .map(|(sp, id)| (sp, id.to_string()))
        .collect();
    unknown.sort_by_key(|(sp, _)| Specialty::ALL.iter().position(|s| s == sp));
    Ok(unknown)
}
