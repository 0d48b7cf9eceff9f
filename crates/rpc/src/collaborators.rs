//! Reference collaborators for the CLI
//!
//! `CertificateWriter` renders a plain-text certificate to disk. `LogNotifier`
//! stands in for a mail provider and only logs deliveries.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use clearance_core::Subject;
use clearance_workflow::{ArtifactGenerator, ArtifactRef, CollaboratorError, Notifier};
use sha2::{Digest, Sha256};

/// Writes `<dir>/<subject id>.txt` and returns its path and SHA-256
pub struct CertificateWriter {
    dir: PathBuf,
}

impl CertificateWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Certificate path for a subject; the id is reduced to `[A-Za-z0-9_-]`
    /// so the file always lands directly inside `dir`
    pub fn path_for(&self, subject_id: &str) -> PathBuf {
        let stem: String = subject_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.txt", stem))
    }

    fn render(subject: &Subject) -> String {
        let mut text = String::new();
        text.push_str("CLEARANCE CERTIFICATE\n");
        text.push_str("=====================\n\n");
        text.push_str(&format!("Student: {} ({})\n", subject.name, subject.id));
        text.push_str(&format!("Issued:  {}\n\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
        text.push_str("Cleared by:\n");
        for (department, status) in &subject.status_by_department {
            text.push_str(&format!("  {:<12} {}\n", department.name(), status));
        }
        text
    }
}

#[async_trait]
impl ArtifactGenerator for CertificateWriter {
    async fn generate(&self, subject: &Subject) -> Result<ArtifactRef, CollaboratorError> {
        let content = Self::render(subject);
        let path = self.path_for(&subject.id);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CollaboratorError::GenerationFailed(e.to_string()))?;
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| CollaboratorError::GenerationFailed(e.to_string()))?;

        let fingerprint = hex::encode(Sha256::digest(content.as_bytes()));
        Ok(ArtifactRef::new(path.display().to_string()).with_fingerprint(fingerprint))
    }
}

/// Logs every notification instead of delivering it
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        address: &str,
        subject_line: &str,
        body: &str,
    ) -> Result<(), CollaboratorError> {
        tracing::info!(to = address, subject = subject_line, body, "📧 Notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_core::{ClearanceStatus, Department};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_certificate_written_with_fingerprint() {
        let dir = TempDir::new().unwrap();
        let writer = CertificateWriter::new(dir.path().join("certificates"));

        let mut subject = Subject::new("S1", "Ada Obi", "ada@example.edu");
        for department in Department::all() {
            subject
                .status_by_department
                .insert(department, ClearanceStatus::Approved);
        }

        let artifact = writer.generate(&subject).await.unwrap();
        let content = std::fs::read_to_string(writer.path_for("S1")).unwrap();

        assert!(content.contains("Student: Ada Obi (S1)"));
        assert!(content.contains("approved"));
        assert_eq!(artifact.location, writer.path_for("S1").display().to_string());
        assert_eq!(
            artifact.fingerprint,
            Some(hex::encode(Sha256::digest(content.as_bytes())))
        );
    }

    #[test]
    fn test_path_stays_inside_directory() {
        let writer = CertificateWriter::new("/var/clearance/certificates");

        for id in ["../x", "../../etc/passwd", "/abs/path", "a/b", "..", "S 1"] {
            let path = writer.path_for(id);
            assert_eq!(
                path.parent(),
                Some(Path::new("/var/clearance/certificates")),
                "{id}"
            );
        }
        assert!(writer.path_for("../x").ends_with("___x.txt"));
        assert!(writer.path_for("S-1_b").ends_with("S-1_b.txt"));
    }

    #[tokio::test]
    async fn test_traversal_id_written_inside_directory() {
        let dir = TempDir::new().unwrap();
        let certificates = dir.path().join("certificates");
        let writer = CertificateWriter::new(&certificates);

        let subject = Subject::new("../escape", "Eve", "eve@example.edu");
        writer.generate(&subject).await.unwrap();

        assert!(certificates.join("___escape.txt").exists());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_everything() {
        let notifier = LogNotifier;
        assert!(notifier.notify("a@b.c", "subject", "body").await.is_ok());
    }
}
