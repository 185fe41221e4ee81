//! Best-effort CAPTCHA reading.
//!
//! An empty guess is a normal outcome: the solver never fails past its own
//! boundary, and the pipeline submits whatever it returns.

pub mod preprocess;
pub mod recognizer;

pub use recognizer::{RecognitionError, TesseractRecognizer, TextRecognizer};

use crate::backend::{Backend, BackendError};
use crate::config::{CaptchaConfig, FormIds};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
enum SolveError {
    #[error("could not capture CAPTCHA image: {0}")]
    Capture(#[from] BackendError),

    #[error("could not decode CAPTCHA image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

pub struct CaptchaSolver<R: TextRecognizer> {
    recognizer: R,
    image_id: String,
    threshold: u8,
}

impl<R: TextRecognizer> CaptchaSolver<R> {
    pub fn new(recognizer: R, image_id: impl Into<String>, threshold: u8) -> Self {
        Self {
            recognizer,
            image_id: image_id.into(),
            threshold,
        }
    }

    pub fn from_config(recognizer: R, form: &FormIds, captcha: &CaptchaConfig) -> Self {
        Self::new(recognizer, form.captcha_image.clone(), captcha.threshold)
    }

    /// Returns the recognised text, or an empty string when no guess is available.
    pub async fn solve<B: Backend + ?Sized>(&self, backend: &mut B) -> String {
        match self.try_solve(backend).await {
            Ok(guess) => {
                debug!("CAPTCHA guess: {:?}", guess);
                guess
            }
            Err(e) => {
                warn!("CAPTCHA auto-solve failed: {}", e);
                String::new()
            }
        }
    }

    async fn try_solve<B: Backend + ?Sized>(&self, backend: &mut B) -> Result<String, SolveError> {
        let png = backend.element_screenshot(&self.image_id).await?;
        let bitmap = preprocess::binarize_png(&png, self.threshold)?;
        let raw = self.recognizer.recognize(&bitmap).await?;
        Ok(preprocess::clean_guess(&raw))
    }
}
