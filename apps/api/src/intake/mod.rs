// Input Acquisition: turns the user's chosen source into in-memory resume documents.
// Exactly one source per request: uploaded files, a local folder, or an object-store URL.

pub mod local;
pub mod object_store;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::intake::local::scan_directory;
use crate::intake::object_store::{download_to_scratch, ObjectFetcher, ObjectLocation};
use crate::models::resume::{has_pdf_extension, ResumeDocument};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid folder path. Please enter a valid folder path containing PDF files.")]
    InvalidDirectory(PathBuf),

    #[error("Invalid object URL '{url}': {reason}")]
    InvalidObjectUrl { url: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Download failed: {0}")]
    Download(String),
}

#[derive(Debug)]
pub enum InputSource {
    Upload(Vec<ResumeDocument>),
    LocalDirectory(PathBuf),
    ObjectStore(String),
}

/// Documents gathered for one request plus a status line for the user.
#[derive(Debug, Default)]
pub struct Acquisition {
    pub documents: Vec<ResumeDocument>,
    pub notice: Option<String>,
}

/// Resolves `source` into documents.
///
/// An unusable directory or URL is an `IntakeError`. A failed download is not:
/// it yields an empty set and a notice so the page can explain what happened.
pub async fn acquire(
    source: InputSource,
    fetcher: &dyn ObjectFetcher,
    scratch_parent: Option<&Path>,
) -> Result<Acquisition, IntakeError> {
    match source {
        InputSource::Upload(uploads) => {
            let documents: Vec<_> = uploads
                .into_iter()
                .filter(|d| has_pdf_extension(&d.file_name))
                .collect();
            let notice = (!documents.is_empty())
                .then(|| format!("{} PDFs Uploaded Successfully", documents.len()));
            Ok(Acquisition { documents, notice })
        }
        InputSource::LocalDirectory(dir) => {
            let documents = scan_directory(&dir).await?;
            let notice = Some(format!(
                "{} PDFs in the folder: {}",
                documents.len(),
                dir.display()
            ));
            Ok(Acquisition { documents, notice })
        }
        InputSource::ObjectStore(url) => {
            let location = ObjectLocation::parse(&url)?;
            match download_to_scratch(fetcher, &location, scratch_parent).await {
                Ok(documents) => {
                    let notice = Some(format!("{} PDFs in the folder: {}", documents.len(), url.trim()));
                    Ok(Acquisition { documents, notice })
                }
                Err(e) => {
                    warn!("Could not fetch resumes from {url}: {e}");
                    Ok(Acquisition {
                        documents: Vec::new(),
                        notice: Some(format!("Could not download resumes from {}: {e}", url.trim())),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::object_store::tests::MemoryStore;

    #[tokio::test]
    async fn test_upload_keeps_pdfs_and_reports_count() {
        let store = MemoryStore::default();
        let uploads = vec![
            ResumeDocument::new("a.pdf", b"%PDF".to_vec()),
            ResumeDocument::new("b.docx", b"PK".to_vec()),
        ];

        let acquisition = acquire(InputSource::Upload(uploads), &store, None).await.unwrap();

        assert_eq!(acquisition.documents.len(), 1);
        assert_eq!(acquisition.notice.as_deref(), Some("1 PDFs Uploaded Successfully"));
    }

    #[tokio::test]
    async fn test_empty_upload_has_no_notice() {
        let store = MemoryStore::default();
        let acquisition = acquire(InputSource::Upload(vec![]), &store, None).await.unwrap();
        assert!(acquisition.documents.is_empty());
        assert!(acquisition.notice.is_none());
    }

    #[tokio::test]
    async fn test_local_directory_notice() {
        let store = MemoryStore::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cv.pdf"), b"%PDF").unwrap();

        let acquisition = acquire(
            InputSource::LocalDirectory(dir.path().to_path_buf()),
            &store,
            None,
        )
        .await
        .unwrap();

        assert_eq!(acquisition.documents.len(), 1);
        assert_eq!(
            acquisition.notice,
            Some(format!("1 PDFs in the folder: {}", dir.path().display()))
        );
    }

    #[tokio::test]
    async fn test_invalid_directory_is_an_input_error() {
        let store = MemoryStore::default();
        let err = acquire(
            InputSource::LocalDirectory(PathBuf::from("/definitely/not/here")),
            &store,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid folder path"));
    }

    #[tokio::test]
    async fn test_object_store_download_failure_yields_empty_set() {
        let mut store = MemoryStore::with(&[("resumes", "cv/a.pdf", b"%PDF".as_slice())]);
        store.fail_downloads = true;

        let acquisition = acquire(
            InputSource::ObjectStore("s3://resumes/cv/".to_string()),
            &store,
            None,
        )
        .await
        .unwrap();

        assert!(acquisition.documents.is_empty());
        assert!(acquisition
            .notice
            .unwrap()
            .starts_with("Could not download resumes from s3://resumes/cv/"));
    }

    #[tokio::test]
    async fn test_object_store_success() {
        let store = MemoryStore::with(&[("resumes", "cv/a.pdf", b"%PDF-a".as_slice())]);

        let acquisition = acquire(
            InputSource::ObjectStore("s3://resumes/cv/".to_string()),
            &store,
            None,
        )
        .await
        .unwrap();

        assert_eq!(acquisition.documents.len(), 1);
        assert_eq!(acquisition.documents[0].file_name, "a.pdf");
    }

    #[tokio::test]
    async fn test_malformed_url_is_an_input_error() {
        let store = MemoryStore::default();
        let result = acquire(InputSource::ObjectStore("not a url".to_string()), &store, None).await;
        assert!(matches!(result, Err(IntakeError::InvalidObjectUrl { .. })));
    }
}
