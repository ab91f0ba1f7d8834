//! Service case report: a validated form rendered to a plain-text document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HackroreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub technician: String,
    pub client: String,
    pub device: String,
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn require_len(field: &str, value: &str, min: usize, label: &str) -> Result<()> {
    if value.trim().chars().count() < min {
        return Err(HackroreError::invalid(format!("{}: {}", field, label)));
    }
    Ok(())
}

impl CaseReport {
    pub fn validate(&self) -> Result<()> {
        require_len("technician", &self.technician, 2, "Technician name is required")?;
        require_len("client", &self.client, 2, "Client name is required")?;
        require_len("device", &self.device, 2, "Device model is required")?;
        require_len("issue", &self.issue, 5, "Issue description must be at least 5 characters")?;
        Ok(())
    }

    /// Render the report. Fails if the form does not validate.
    pub fn render(&self, created: DateTime<Utc>) -> Result<String> {
        self.validate()?;

        let mut out = String::new();
        out.push_str("Service Case Log\n");
        out.push_str(&"=".repeat(16));
        out.push('\n');
        out.push_str(&format!("Date: {}\n\n", created.format("%Y-%m-%d %H:%M UTC")));
        out.push_str(&format!("Technician: {}\n", self.technician.trim()));
        out.push_str(&format!("Client: {}\n", self.client.trim()));
        out.push_str(&format!("Device: {}\n\n", self.device.trim()));
        out.push_str("Issue:\n");
        out.push_str(self.issue.trim());
        out.push('\n');

        if let Some(notes) = self.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            out.push_str("\nNotes:\n");
            out.push_str(notes);
            out.push('\n');
        }
        Ok(out)
    }

    /// `case-log-<unix millis>.txt`
    pub fn file_name(created: DateTime<Utc>) -> String {
        format!("case-log-{}.txt", created.timestamp_millis())
    }

    /// Render into `dir` and return the written path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let created = Utc::now();
        let body = self.render(created)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::file_name(created));
        fs::write(&path, body)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn report() -> CaseReport {
        CaseReport {
            technician: "Sam".to_string(),
            client: "Acme Corp".to_string(),
            device: "ThinkPad X1".to_string(),
            issue: "Boot loop after BIOS update".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_render_layout() {
        let created = Utc.with_ymd_and_hms(2024, 3, 18, 9, 30, 0).unwrap();
        let text = report().render(created).unwrap();
        assert!(text.starts_with("Service Case Log\n"));
        assert!(text.contains("Date: 2024-03-18 09:30 UTC"));
        assert!(text.contains("Device: ThinkPad X1"));
        assert!(!text.contains("Notes:"));
    }

    #[test]
    fn test_notes_included_when_present() {
        let mut r = report();
        r.notes = Some("Reflashed firmware".to_string());
        let text = r.render(Utc::now()).unwrap();
        assert!(text.contains("Notes:\nReflashed firmware"));
    }

    #[test]
    fn test_validation_limits() {
        let mut r = report();
        r.issue = "dead".to_string();
        assert!(matches!(r.validate(), Err(HackroreError::InvalidArgument(_))));

        let mut r = report();
        r.technician = "S".to_string();
        assert!(r.render(Utc::now()).is_err());
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempdir().unwrap();
        let path = report().write_to(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("case-log-") && name.ends_with(".txt"));
        assert!(fs::read_to_string(path).unwrap().contains("Acme Corp"));
    }
}
