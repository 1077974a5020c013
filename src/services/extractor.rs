use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AppointmentRequest, Field, Specialty};

static SUMMARY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)Patient Name:\s*(.*?)\s*\nConsultation Type:\s*(.*?)\s*\nReason for Visit:\s*(.*?)\s*\nPreferred Date:\s*(.*?)\s*\nPreferred Time:\s*(.*?)\s*\nPhone Number:\s*(.*?)\s*\nEmail Address:\s*(.*?)(?:\s*\n|$)",
    )
    .expect("summary block pattern is valid")
});

static DEFAULT_PATTERNS: LazyLock<PatternSet> = LazyLock::new(PatternSet::builtin);

#[derive(Debug, Clone)]
pub struct FieldPattern {
    regex: Regex,
}

impl FieldPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("(?i){pattern}"))?,
        })
    }

    pub fn last_match(&self, text: &str) -> Option<String> {
        self.regex
            .captures_iter(text)
            .last()
            .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str().trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PatternSet {
    rules: Vec<(Field, Vec<FieldPattern>)>,
}

impl PatternSet {
    pub fn new(rules: Vec<(Field, Vec<FieldPattern>)>) -> Self {
        Self { rules }
    }

    pub fn from_strs(rules: &[(Field, &[&str])]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(field, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| FieldPattern::new(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((*field, compiled))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    fn builtin() -> Self {
        Self::from_strs(&[
            (
                Field::PatientName,
                &[
                    r"\bPatient Name:\s*(.*)",
                    r"\bname is\s+([^.,]+)",
                    r"\bmy name is\s+([^.,]+)",
                    r"\bcall me\s+([^.,]+)",
                ],
            ),
            (
                Field::Specialty,
                &[
                    r"\bConsultation Type:\s*(.*)",
                    r"\bspecialty(?:\s+is|\s+needed|\s+required)?:\s*([^.,]+)",
                    r"\b(?:I need|I want|I would like|I require|need) (?:a|an)?\s+([^.,]+)(?:\s+consultation|\s+appointment)",
                    r"\bsee (?:a|an)\s+([^.,]+)(?:\s+doctor|\s+specialist)",
                    r"(?:General Medicine|Cardiology|Orthopedics|Pediatrics|Neurology|Dermatology|Ophthalmology)",
                ],
            ),
            (
                Field::Reason,
                &[
                    r"\bReason for Visit:\s*(.*)",
                    r"\bthe reason is\s+([^.]+)",
                    r"\bvisit reason(?:\s+is)?:\s*([^.]+)",
                    r"\bvisiting for\s+([^.]+)",
                    r"\bI have (?:a|an)\s+([^.]+)",
                    r"\bI am having\s+([^.]+)",
                    r"\bI'm having\s+([^.]+)",
                    r"\bsuffering from\s+([^.]+)",
                ],
            ),
            (
                Field::Date,
                &[
                    r"\bPreferred Date:\s*(.*)",
                    r"\bdate(?:\s+is|\s+would be)?\s*:\s*([^.,]+)",
                    r"\b(?:on|for)\s+((?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?)",
                    r"\b(?:on|for)\s+(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
                    r"\b(?:next|this)\s+(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)",
                    r"\b(tomorrow|today|day after tomorrow)",
                    r"\b(in \d+ days)",
                ],
            ),
            (
                Field::Time,
                &[
                    r"\bPreferred Time:\s*(.*)",
                    r"\btime(?:\s+is|\s+would be)?\s*:\s*([^.,]+)",
                    r"\bat\s+(\d{1,2}(?::\d{2})?\s*(?:am|pm))",
                    r"\bat\s+(\d{1,2}(?::\d{2})?)",
                ],
            ),
            (
                Field::Phone,
                &[
                    r"\bPhone Number:\s*(.*)",
                    r"\bphone(?:\s+is|\s+number is)?\s*:\s*([^.,]+)",
                    r"\bcall me at\s+([^.,]+)",
                    r"\breached at\s+([^.,]+)",
                    r"\bmy number is\s+([^.,]+)",
                    r"\b(\+?1?\s*\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4})",
                ],
            ),
            (
                Field::Email,
                &[
                    r"\bEmail Address:\s*(.*)",
                    r"\bemail(?:\s+is|address is)?\s*:\s*([^.,]+)",
                    r"\bemailing\s+([^.,]+)",
                    r"\bcontact me at\s+([^.,]+@[^.,]+)",
                    r"\b([a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+)",
                ],
            ),
        ])
        .expect("built-in field patterns are valid")
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        DEFAULT_PATTERNS.clone()
    }
}

// A complete labeled summary wins, most recent first. Otherwise the first
// pattern to match a field decides and its last match is kept.
pub fn extract<S: AsRef<str>>(transcript: &[S], patterns: &PatternSet) -> AppointmentRequest {
    if let Some(request) = structured_block(transcript) {
        tracing::debug!("using labeled summary block");
        return request;
    }

    let full_text = transcript
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join(" ");

    let mut request = AppointmentRequest::default();
    for (field, candidates) in &patterns.rules {
        let Some(value) = candidates.iter().find_map(|p| p.last_match(&full_text)) else {
            continue;
        };
        let value = if *field == Field::Specialty {
            Specialty::normalize(&value)
        } else {
            value
        };
        request.set(*field, value);
    }
    request
}

fn structured_block<S: AsRef<str>>(transcript: &[S]) -> Option<AppointmentRequest> {
    transcript.iter().rev().find_map(|message| {
        let caps = SUMMARY_BLOCK.captures(message.as_ref())?;
        let mut request = AppointmentRequest::default();
        for (i, field) in Field::ALL.iter().enumerate() {
            let value = caps.get(i + 1).map(|m| m.as_str().trim()).unwrap_or_default();
            request.set(*field, value);
        }
        Some(request)
    })
}
