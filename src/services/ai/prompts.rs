use chrono::NaiveDate;

use crate::models::{ClinicHours, Field, Specialty};

pub fn system_prompt(today: NaiveDate, hours: &ClinicHours) -> String {
    let specialties = Specialty::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let summary_format = Field::ALL
        .iter()
        .map(|f| format!("{}: ", f.label()))
        .collect::<Vec<_>>()
        .join("\n");

    let hours = if hours.slots.is_empty() {
        "Ask the patient for a time that suits them.".to_string()
    } else {
        format!(
            "Clinic hours: {}. The clinic is closed on any day not listed.",
            hours.to_human_readable()
        )
    };

    format!(
        r#"Do not generate user responses on your own and avoid repeating questions.

You are a helpful appointment scheduling assistant for a hospital clinic. Your task is to help users schedule medical consultations.
The clinic offers these specialties: {specialties}.
{hours}

To schedule an appointment, collect the following information one item at a time:
1. Patient's full name
2. Type of consultation/specialty needed
3. Reason for the visit (symptoms or checkup)
4. Preferred date and time
5. Phone number
6. Email address (required for appointment confirmation)

Allow users to give the time in any format.
After collecting all the information, display the details to the user in exactly this format:

{summary_format}

Today is {today} ({weekday}). Resolve relative days against today and always show the date as YYYY-MM-DD.
If the preferred time is not available, inform the user and ask for an alternative time.
"#,
        today = today.format("%Y-%m-%d"),
        weekday = today.format("%A"),
    )
}
