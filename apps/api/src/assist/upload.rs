//! Multipart form parsing for the assistant endpoints.

use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// A résumé file as received from the client.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Fields shared by every assistant form. Unknown fields are drained and ignored.
#[derive(Debug, Default)]
pub struct AssistForm {
    pub resume: Option<ResumeUpload>,
    pub job_description: String,
    pub linkedin: Option<String>,
    pub tone: Option<String>,
}

impl AssistForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AssistForm::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                "resume" => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await?;
                    debug!(
                        "Received resume upload {:?} ({} bytes)",
                        file_name,
                        bytes.len()
                    );
                    form.resume = Some(ResumeUpload { file_name, bytes });
                }
                "job_description" => form.job_description = field.text().await?,
                "linkedin" => form.linkedin = Some(field.text().await?),
                "tone" => form.tone = Some(field.text().await?),
                _ => {
                    let _ = field.bytes().await?;
                }
            }
        }

        Ok(form)
    }

    /// Returns the uploaded PDF bytes, or `NoDocument` if none were sent.
    pub fn require_resume(&self) -> Result<Bytes, AppError> {
        let upload = self
            .resume
            .as_ref()
            .filter(|u| !u.bytes.is_empty())
            .ok_or(AppError::NoDocument)?;

        if let Some(name) = &upload.file_name {
            if !name.to_ascii_lowercase().ends_with(".pdf") {
                return Err(AppError::Validation(format!(
                    "Invalid file type '{name}'. Only PDF resumes are accepted"
                )));
            }
        }

        Ok(upload.bytes.clone())
    }
}
