//! End-to-end acquisition of one cause list.
//!
//! The live path fills the portal form, submits it and extracts the results
//! table. Any failure on that path is absorbed: the run substitutes synthetic
//! records and still renders a document. Only a rendering failure is reported
//! back as `success: false`.

use crate::backend::{Backend, BackendError};
use crate::captcha::{CaptchaSolver, TesseractRecognizer, TextRecognizer};
use crate::config::{CauselistConfig, FormIds, TimingConfig};
use crate::extract::extract_records;
use crate::render::DocumentRenderer;
use crate::session::{SessionError, SessionManager};
use causelist_common::protocol::{
    AcquisitionResult, CaseRecord, CauseListRequest, ListType, Locator, RecordSource,
};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Purpose given to every synthetic record.
pub const SYNTHETIC_PURPOSE: &str = "Hearing";

#[derive(Debug, Error)]
pub enum LiveError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("No submit control found for {0} list")]
    NoSubmitControl(ListType),
}

impl LiveError {
    /// Backend error code carried into the fallback log line.
    pub fn code(&self) -> &'static str {
        match self {
            LiveError::Session(e) => e.backend_error().code(),
            LiveError::Backend(e) => e.code(),
            LiveError::NoSubmitControl(_) => "ELEMENT_NOT_FOUND",
        }
    }
}

pub struct AcquisitionPipeline<R: TextRecognizer> {
    form: FormIds,
    timing: TimingConfig,
    solver: CaptchaSolver<R>,
    renderer: DocumentRenderer,
    synthetic_records: usize,
}

impl AcquisitionPipeline<TesseractRecognizer> {
    pub fn from_config(config: &CauselistConfig) -> Self {
        Self::with_recognizer(config, TesseractRecognizer::from_config(&config.captcha))
    }
}

impl<R: TextRecognizer> AcquisitionPipeline<R> {
    pub fn new(
        form: FormIds,
        timing: TimingConfig,
        solver: CaptchaSolver<R>,
        renderer: DocumentRenderer,
        synthetic_records: usize,
    ) -> Self {
        Self {
            form,
            timing,
            solver,
            renderer,
            synthetic_records,
        }
    }

    pub fn with_recognizer(config: &CauselistConfig, recognizer: R) -> Self {
        Self::new(
            config.portal.form.clone(),
            config.timing.clone(),
            CaptchaSolver::from_config(recognizer, &config.portal.form, &config.captcha),
            DocumentRenderer::from_config(&config.output),
            config.output.synthetic_records,
        )
    }

    pub async fn run<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        request: &CauseListRequest,
    ) -> AcquisitionResult {
        let location = &request.location;
        info!(
            "Acquiring {} cause list for {}/{}/{}/{} on {}",
            request.list_type,
            location.state,
            location.district,
            location.complex,
            location.court,
            request.date
        );

        let (records, source, reason) = match self.acquire_live(session, request).await {
            Ok(records) => {
                info!("Extracted {} record(s) from live portal", records.len());
                (records, RecordSource::Live, None)
            }
            Err(e) => {
                warn!(
                    code = e.code(),
                    "Live acquisition failed, generating sample data: {}",
                    e
                );
                session.invalidate_page();
                let records =
                    synthesize_records(&location.state, &location.district, self.synthetic_records);
                (records, RecordSource::Synthetic, Some(e.to_string()))
            }
        };

        match self.renderer.render(&records, &request.metadata()).await {
            Ok(path) => AcquisitionResult::rendered(records, path, source, reason),
            Err(e) => {
                error!("Failed to render cause list: {}", e);
                AcquisitionResult::failed(e.to_string())
            }
        }
    }

    async fn acquire_live<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        request: &CauseListRequest,
    ) -> Result<Vec<CaseRecord>, LiveError> {
        let backend = session.reload_form_page().await?;
        backend
            .wait_for(
                &Locator::id(&self.form.state),
                self.timing.page_ready_timeout(),
            )
            .await?;
        sleep(self.timing.page_settle()).await;

        let location = &request.location;
        let selections = [
            (&self.form.state, &location.state),
            (&self.form.district, &location.district),
            (&self.form.court_complex, &location.complex),
            (&self.form.court, &location.court),
        ];
        for (id, value) in selections {
            backend
                .wait_for(&Locator::id(id), self.timing.dependent_timeout())
                .await?;
            debug!("Selecting {} = {}", id, value);
            backend.select_value(id, value).await?;
            sleep(self.timing.selection_settle()).await;
        }

        backend.set_value(&self.form.date, &request.date).await?;

        let guess = self.solver.solve(&mut *backend).await;
        if guess.is_empty() {
            info!("No CAPTCHA guess available, submitting empty answer");
        }
        backend.type_text(&self.form.captcha, &guess).await?;

        let submit = self.submit_control(&mut *backend, request.list_type).await?;
        info!("Submitting form via #{}", submit);
        backend.click(&submit).await?;

        backend
            .wait_for(
                &Locator::class(&self.form.results_table_class),
                self.timing.results_timeout(),
            )
            .await?;
        let html = backend.page_source().await?;
        Ok(extract_records(&html, &self.form.results_table_class))
    }

    /// The control for the requested list type, or the other variant when the
    /// page only carries that one.
    async fn submit_control<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        list_type: ListType,
    ) -> Result<String, LiveError> {
        for candidate in [list_type, list_type.other()] {
            let id = self.form.submit_for(candidate);
            if backend.exists(&Locator::id(id)).await? {
                if candidate != list_type {
                    debug!("No {} submit control, using {}", list_type, candidate);
                }
                return Ok(id.to_string());
            }
        }
        Err(LiveError::NoSubmitControl(list_type))
    }
}

/// Placeholder records for a location; the same inputs always give the same records.
pub fn synthesize_records(state: &str, district: &str, count: usize) -> Vec<CaseRecord> {
    (1..=count)
        .map(|i| CaseRecord {
            sr_no: i.to_string(),
            case_no: format!("{}/{}/{}", state, district, i),
            petitioner: format!("Petitioner {}", i),
            respondent: format!("Respondent {}", i),
            purpose: SYNTHETIC_PURPOSE.to_string(),
        })
        .collect()
}
