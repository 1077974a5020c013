use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::AppointmentRecord;

const APPOINTMENTS_DIR: &str = "appointments";
const CONVERSATIONS_DIR: &str = "conversations";

#[derive(Debug, Clone)]
pub struct AppointmentStore {
    root: PathBuf,
}

impl AppointmentStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(root.join(APPOINTMENTS_DIR))?;
        fs::create_dir_all(root.join(CONVERSATIONS_DIR))?;
        Ok(Self { root })
    }

    pub fn save_appointment(&self, record: &AppointmentRecord) -> Result<PathBuf, AppError> {
        let file_name = format!(
            "{}_{}.json",
            sanitize_name(&record.details.patient_name),
            timestamp(record.created_at)
        );
        let path = self.root.join(APPOINTMENTS_DIR).join(file_name);
        let json = serde_json::to_string_pretty(record)?;
        write_atomic(&path, json.as_bytes())?;

        tracing::info!(appointment_id = %record.id, path = %path.display(), "appointment saved");
        Ok(path)
    }

    pub fn load_appointment(&self, path: &Path) -> Result<AppointmentRecord, AppError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn list_appointments(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(self.root.join(APPOINTMENTS_DIR))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub fn save_transcript(&self, lines: &[String], at: DateTime<Utc>) -> Result<PathBuf, AppError> {
        let path = self
            .root
            .join(CONVERSATIONS_DIR)
            .join(format!("conversation_{}.txt", timestamp(at)));
        let mut body = lines.join("\n");
        body.push('\n');
        write_atomic(&path, body.as_bytes())?;

        tracing::debug!(path = %path.display(), lines = lines.len(), "transcript saved");
        Ok(path)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

// Readers never see a half-written file: write beside it, then rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentDetails, AppointmentStatus};

    fn record(name: &str) -> AppointmentRecord {
        AppointmentRecord::new(
            AppointmentDetails {
                patient_name: name.to_string(),
                specialty: "Cardiology".to_string(),
                reason: "chest pain".to_string(),
                date: "2025-03-10".to_string(),
                time: "10:00".to_string(),
                phone: "555-123-4567".to_string(),
                email: "jane@example.com".to_string(),
            },
            AppointmentStatus::Confirmed,
            Some("EVT42".to_string()),
        )
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize_name("O'Brien, Pat"), "O_Brien__Pat");
        assert_eq!(sanitize_name("../../etc"), "______etc");
        assert_eq!(sanitize_name("  "), "unknown");
        assert_eq!(sanitize_name("!!"), "unknown");
    }

    #[test]
    fn test_open_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        let store = AppointmentStore::open(&root).unwrap();
        assert!(root.join("appointments").is_dir());
        assert!(root.join("conversations").is_dir());
        assert!(store.list_appointments().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_appointment() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppointmentStore::open(dir.path()).unwrap();
        let rec = record("Jane Doe");

        let path = store.save_appointment(&rec).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Jane_Doe_"));
        assert!(name.ends_with(".json"));

        let loaded = store.load_appointment(&path).unwrap();
        assert_eq!(loaded, rec);
    }

    #[test]
    fn test_saved_json_uses_flat_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppointmentStore::open(dir.path()).unwrap();
        let path = store.save_appointment(&record("Jane Doe")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["consultation_type"], "Cardiology");
        assert_eq!(raw["status"], "confirmed");
        assert_eq!(raw["external_booking_id"], "EVT42");
        assert!(raw["id"].as_str().unwrap().starts_with("appt-"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppointmentStore::open(dir.path()).unwrap();
        store.save_appointment(&record("Jane Doe")).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("appointments"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(store.list_appointments().unwrap().len(), 1);
    }

    #[test]
    fn test_save_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppointmentStore::open(dir.path()).unwrap();
        let lines = vec!["User: hi".to_string(), "Assistant: hello".to_string()];

        let path = store.save_transcript(&lines, Utc::now()).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("conversation_"));
        assert_eq!(fs::read_to_string(path).unwrap(), "User: hi\nAssistant: hello\n");
    }
}
