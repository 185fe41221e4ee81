use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::CaptchaConfig;

const RECOGNITION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Text recognition timed out")]
    Timeout,
}

/// A text recognition engine for single-line images.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &GrayImage) -> Result<String, RecognitionError>;
}

/// Runs the `tesseract` CLI, piping the image through stdin/stdout.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
    page_seg_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<String>, page_seg_mode: u8) -> Self {
        Self {
            program: program.into(),
            page_seg_mode,
        }
    }

    pub fn from_config(config: &CaptchaConfig) -> Self {
        Self::new(config.tesseract_bin.clone(), config.page_seg_mode)
    }

    fn spawn_error(&self, source: std::io::Error) -> RecognitionError {
        RecognitionError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::from_config(&CaptchaConfig::default())
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &GrayImage) -> Result<String, RecognitionError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.program)
            .arg("stdin")
            .arg("stdout")
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&png).await.map_err(|e| self.spawn_error(e))?;
        }

        let output = tokio::time::timeout(RECOGNITION_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| RecognitionError::Timeout)?
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(RecognitionError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .replace('\u{0000}', "")
            .trim()
            .to_string())
    }
}
