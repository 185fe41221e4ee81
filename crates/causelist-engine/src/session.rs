//! Ownership of the single browser session a pipeline run drives.
//!
//! The manager is the only writer of the backend: resolver levels and the
//! pipeline borrow it mutably one at a time, so the cascading selection state
//! left on the page by one level is what the next level sees. Runs that must
//! proceed concurrently each need their own manager.

use crate::backend::{Backend, BackendError};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Browser session unavailable: {0}")]
    Launch(BackendError),

    #[error("Failed to load form page: {0}")]
    Navigation(BackendError),
}

impl SessionError {
    pub fn backend_error(&self) -> &BackendError {
        match self {
            SessionError::Launch(e) | SessionError::Navigation(e) => e,
        }
    }
}

pub struct SessionManager<B: Backend + ?Sized> {
    backend: Box<B>,
    form_url: String,
    launched: bool,
    page_loaded: bool,
}

impl<B: Backend + ?Sized> SessionManager<B> {
    pub fn new(backend: Box<B>, form_url: impl Into<String>) -> Self {
        Self {
            backend,
            form_url: form_url.into(),
            launched: false,
            page_loaded: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.launched
    }

    /// Direct access to the backend without launching it.
    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    /// Launch the browser on first use; later calls return the live session.
    /// A failed launch is reported to the caller and not retried here.
    pub async fn ensure_session(&mut self) -> Result<&mut B, SessionError> {
        if self.launched && self.backend.is_ready().await {
            return Ok(&mut *self.backend);
        }

        info!("Launching browser session...");
        self.page_loaded = false;
        match self.backend.launch().await {
            Ok(()) => {
                self.launched = true;
                Ok(&mut *self.backend)
            }
            Err(e) => {
                warn!("Browser session could not be started: {}", e);
                Err(SessionError::Launch(e))
            }
        }
    }

    /// Load the form page unless the session already sits on it.
    pub async fn ensure_form_page(&mut self) -> Result<&mut B, SessionError> {
        if self.page_loaded && self.launched && self.backend.is_ready().await {
            return Ok(&mut *self.backend);
        }
        self.reload_form_page().await
    }

    /// Navigate to the form page, discarding any selection state on it.
    pub async fn reload_form_page(&mut self) -> Result<&mut B, SessionError> {
        self.ensure_session().await?;
        self.page_loaded = false;
        let result = self
            .backend
            .navigate(&self.form_url)
            .await
            .map_err(SessionError::Navigation)?;
        debug!("Form page loaded: {} ({})", result.url, result.title);
        self.page_loaded = true;
        Ok(&mut *self.backend)
    }

    /// Mark the page state as unknown so the next level reloads it.
    pub fn invalidate_page(&mut self) {
        self.page_loaded = false;
    }

    /// Terminate the browser. Teardown errors are logged and swallowed;
    /// calling this on an already released session is a no-op.
    pub async fn release(&mut self) {
        if !self.launched {
            return;
        }
        info!("Releasing browser session...");
        if let Err(e) = self.backend.close().await {
            warn!("Error while closing browser session (ignored): {}", e);
        }
        self.launched = false;
        self.page_loaded = false;
    }
}
