use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Specialty {
    GeneralMedicine,
    Cardiology,
    Orthopedics,
    Pediatrics,
    Neurology,
    Dermatology,
    Ophthalmology,
}

impl Specialty {
    pub const ALL: [Specialty; 7] = [
        Specialty::GeneralMedicine,
        Specialty::Cardiology,
        Specialty::Orthopedics,
        Specialty::Pediatrics,
        Specialty::Neurology,
        Specialty::Dermatology,
        Specialty::Ophthalmology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralMedicine => "General Medicine",
            Specialty::Cardiology => "Cardiology",
            Specialty::Orthopedics => "Orthopedics",
            Specialty::Pediatrics => "Pediatrics",
            Specialty::Neurology => "Neurology",
            Specialty::Dermatology => "Dermatology",
            Specialty::Ophthalmology => "Ophthalmology",
        }
    }

    pub fn env_suffix(&self) -> &'static str {
        match self {
            Specialty::GeneralMedicine => "GENERAL_MEDICINE",
            Specialty::Cardiology => "CARDIOLOGY",
            Specialty::Orthopedics => "ORTHOPEDICS",
            Specialty::Pediatrics => "PEDIATRICS",
            Specialty::Neurology => "NEUROLOGY",
            Specialty::Dermatology => "DERMATOLOGY",
            Specialty::Ophthalmology => "OPHTHALMOLOGY",
        }
    }

    pub fn slug(&self) -> String {
        self.as_str().to_lowercase().replace(' ', "-")
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|sp| sp.as_str().eq_ignore_ascii_case(s))
    }

    pub fn find_in(raw: &str) -> Option<Self> {
        let haystack = raw.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|sp| haystack.contains(&sp.as_str().to_lowercase()))
    }

    pub fn normalize(raw: &str) -> String {
        match Self::find_in(raw) {
            Some(sp) => sp.as_str().to_string(),
            None => raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventTypeMap {
    ids: HashMap<Specialty, String>,
}

impl EventTypeMap {
    pub fn new(ids: HashMap<Specialty, String>) -> Self {
        Self { ids }
    }

    pub fn with_defaults() -> Self {
        Self {
            ids: Specialty::ALL.into_iter().map(|sp| (sp, sp.slug())).collect(),
        }
    }

    pub fn set(&mut self, specialty: Specialty, id: String) {
        self.ids.insert(specialty, id);
    }

    // Unknown specialties book as General Medicine.
    pub fn resolve(&self, specialty: &str) -> &str {
        let sp = Specialty::parse(specialty).unwrap_or(Specialty::GeneralMedicine);
        self.get(sp)
    }

    pub fn get(&self, specialty: Specialty) -> &str {
        self.ids
            .get(&specialty)
            .or_else(|| self.ids.get(&Specialty::GeneralMedicine))
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn ids(&self) -> impl Iterator<Item = (Specialty, &str)> {
        self.ids.iter().map(|(sp, id)| (*sp, id.as_str()))
    }
}

impl Default for EventTypeMap {
    fn default() -> Self {
        Self::with_defaults()
    }
}
