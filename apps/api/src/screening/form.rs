//! Multipart form submitted by the screening page (and the JSON endpoint).

use std::path::PathBuf;
use std::str::FromStr;

use axum::extract::Multipart;
use tracing::debug;

use crate::errors::AppError;
use crate::intake::InputSource;
use crate::models::resume::ResumeDocument;
use crate::models::screening::Action;
use crate::screening::batch::ScreeningRequest;

/// Which input source the sidebar selector picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Upload,
    LocalFolder,
    ObjectStore,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Upload => "upload",
            InputMode::LocalFolder => "folder",
            InputMode::ObjectStore => "s3",
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "upload" => Ok(InputMode::Upload),
            "folder" => Ok(InputMode::LocalFolder),
            "s3" => Ok(InputMode::ObjectStore),
            other => Err(format!("unknown file selection method '{other}'")),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScreenForm {
    pub action: Option<Action>,
    pub job_description: String,
    pub mode: InputMode,
    pub location: String,
    pub uploads: Vec<ResumeDocument>,
}

impl ScreenForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ScreenForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "action" => {
                    let value = field.text().await?;
                    form.action = Some(value.parse().map_err(AppError::Validation)?);
                }
                "job_description" => form.job_description = field.text().await?,
                "mode" => {
                    let value = field.text().await?;
                    form.mode = value.parse().map_err(AppError::Validation)?;
                }
                "location" => form.location = field.text().await?.trim().to_string(),
                "files" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen.
                    if !file_name.is_empty() && !data.is_empty() {
                        form.uploads.push(ResumeDocument::new(file_name, data));
                    }
                }
                other => {
                    debug!("Ignoring unknown form field '{other}'");
                    let _ = field.bytes().await?;
                }
            }
        }

        Ok(form)
    }

    pub fn action(&self) -> Result<Action, AppError> {
        self.action
            .ok_or_else(|| AppError::Validation("Choose an action".to_string()))
    }

    pub fn request(&self, action: Action) -> ScreeningRequest {
        let job_description = Some(self.job_description.clone()).filter(|jd| !jd.trim().is_empty());
        ScreeningRequest {
            action,
            job_description,
        }
    }

    /// Moves the uploads out; the location text is only used by the other modes.
    pub fn take_source(&mut self) -> InputSource {
        match self.mode {
            InputMode::Upload => InputSource::Upload(std::mem::take(&mut self.uploads)),
            InputMode::LocalFolder => InputSource::LocalDirectory(PathBuf::from(&self.location)),
            InputMode::ObjectStore => InputSource::ObjectStore(self.location.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_mode_values() {
        for mode in [InputMode::Upload, InputMode::LocalFolder, InputMode::ObjectStore] {
            assert_eq!(mode.as_str().parse::<InputMode>().unwrap(), mode);
        }
        assert!("ftp".parse::<InputMode>().is_err());
    }

    #[test]
    fn test_blank_job_description_becomes_none() {
        let form = ScreenForm {
            job_description: " \n ".to_string(),
            ..Default::default()
        };
        assert!(form.request(Action::FitForRole).job_description.is_none());
    }

    #[test]
    fn test_take_source_by_mode() {
        let mut form = ScreenForm {
            mode: InputMode::LocalFolder,
            location: "/data/resumes".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            form.take_source(),
            InputSource::LocalDirectory(p) if p == PathBuf::from("/data/resumes")
        ));

        form.mode = InputMode::Upload;
        form.uploads = vec![ResumeDocument::new("a.pdf", b"%PDF".to_vec())];
        match form.take_source() {
            InputSource::Upload(docs) => assert_eq!(docs.len(), 1),
            other => panic!("unexpected source {other:?}"),
        }
        assert!(form.uploads.is_empty());
    }
}
