use std::path::{Path, PathBuf};

use tracing::debug;

use crate::intake::IntakeError;
use crate::models::resume::{has_pdf_extension, ResumeDocument};

/// Reads every regular `.pdf` file directly inside `dir`, sorted by file name.
pub async fn scan_directory(dir: &Path) -> Result<Vec<ResumeDocument>, IntakeError> {
    let metadata = tokio::fs::metadata(dir).await;
    if !metadata.map(|m| m.is_dir()).unwrap_or(false) {
        return Err(IntakeError::InvalidDirectory(dir.to_path_buf()));
    }

    let io_error = |source: std::io::Error| IntakeError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && has_pdf_extension(&path) {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push((file_name, path));
        }
    }

    read_documents(files).await
}

/// Reads every regular `.pdf` file at any depth under `root`. Each document is
/// named by its `/`-separated path relative to `root` (`team-a/cv.pdf`), so
/// equal file names in different subdirectories stay distinct.
pub async fn scan_tree(root: &Path) -> Result<Vec<ResumeDocument>, IntakeError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| IntakeError::Io { path, source }
    };

    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(io_error(dir.as_path()))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error(dir.as_path()))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(io_error(path.as_path()))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && has_pdf_extension(&path) {
                let relative = path.strip_prefix(root).unwrap_or(&path);
                let file_name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push((file_name, path));
            }
        }
    }

    read_documents(files).await
}

/// Reads `(file_name, path)` pairs into documents, sorted by file name.
async fn read_documents(
    mut files: Vec<(String, PathBuf)>,
) -> Result<Vec<ResumeDocument>, IntakeError> {
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for (file_name, path) in files {
        let bytes = tokio::fs::read(&path).await.map_err(|source| IntakeError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} ({} bytes)", file_name, bytes.len());
        documents.push(ResumeDocument::new(file_name, bytes));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scans_only_pdf_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-b").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"%PDF-a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let documents = scan_directory(dir.path()).await.unwrap();

        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
        assert_eq!(&documents[1].bytes[..], b"%PDF-b");
    }

    #[tokio::test]
    async fn test_missing_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            scan_directory(&missing).await,
            Err(IntakeError::InvalidDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_file_path_is_invalid_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cv.pdf");
        std::fs::write(&file, b"%PDF").unwrap();
        assert!(matches!(
            scan_directory(&file).await,
            Err(IntakeError::InvalidDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_directory_yields_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_directory(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tree_scan_names_files_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("team-b")).unwrap();
        std::fs::create_dir_all(dir.path().join("team-a/senior")).unwrap();
        std::fs::write(dir.path().join("team-b/cv.pdf"), b"%PDF-b").unwrap();
        std::fs::write(dir.path().join("team-a/senior/cv.pdf"), b"%PDF-a").unwrap();
        std::fs::write(dir.path().join("top.pdf"), b"%PDF-top").unwrap();
        std::fs::write(dir.path().join("team-a/notes.txt"), b"skip").unwrap();

        let documents = scan_tree(dir.path()).await.unwrap();

        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["team-a/senior/cv.pdf", "team-b/cv.pdf", "top.pdf"]);
        assert_eq!(&documents[1].bytes[..], b"%PDF-b");
    }
}
