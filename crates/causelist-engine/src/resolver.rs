//! Cascading selector resolution: state -> district -> complex -> court.
//!
//! Every level is answered in two phases. The live phase drives the portal
//! form; its outcome is an explicit `Result`, and only an `Err` or an empty
//! option list switches to the fallback catalog. The fallback phase never
//! fails: an unknown parent code yields an empty list.

use crate::backend::{Backend, BackendError};
use crate::config::{CauselistConfig, FormIds, TimingConfig};
use crate::session::{SessionError, SessionManager};
use causelist_common::catalog::FallbackCatalog;
use causelist_common::protocol::{Locator, ResolvedOptions, SelectOption};
use std::fmt;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    States,
    Districts,
    Complexes,
    Courts,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::States => "states",
            Level::Districts => "districts",
            Level::Complexes => "court complexes",
            Level::Courts => "courts",
        };
        f.write_str(name)
    }
}

/// Why the live phase of a level did not produce options.
#[derive(Debug, Error)]
pub enum LiveLookupError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("live portal returned no selectable options")]
    Empty,
}

pub struct SelectorResolver {
    form: FormIds,
    timing: TimingConfig,
    catalog: FallbackCatalog,
}

impl SelectorResolver {
    pub fn new(form: FormIds, timing: TimingConfig, catalog: FallbackCatalog) -> Self {
        Self {
            form,
            timing,
            catalog,
        }
    }

    pub fn from_config(config: &CauselistConfig) -> Self {
        Self::new(
            config.portal.form.clone(),
            config.timing.clone(),
            config.fallback.clone(),
        )
    }

    pub async fn list_states<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
    ) -> ResolvedOptions {
        let live = self.live_states(session).await;
        self.settle(session, Level::States, live, || self.catalog.states())
    }

    pub async fn list_districts<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        state: &str,
    ) -> ResolvedOptions {
        let parents = [(self.form.state.as_str(), state)];
        let live = self
            .live_dependent(session, &parents, &self.form.district)
            .await;
        self.settle(session, Level::Districts, live, || {
            self.catalog.districts(state)
        })
    }

    pub async fn list_complexes<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        state: &str,
        district: &str,
    ) -> ResolvedOptions {
        let parents = [
            (self.form.state.as_str(), state),
            (self.form.district.as_str(), district),
        ];
        let live = self
            .live_dependent(session, &parents, &self.form.court_complex)
            .await;
        self.settle(session, Level::Complexes, live, || {
            self.catalog.complexes(district)
        })
    }

    pub async fn list_courts<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        state: &str,
        district: &str,
        complex: &str,
    ) -> ResolvedOptions {
        let parents = [
            (self.form.state.as_str(), state),
            (self.form.district.as_str(), district),
            (self.form.court_complex.as_str(), complex),
        ];
        let live = self
            .live_dependent(session, &parents, &self.form.court)
            .await;
        self.settle(session, Level::Courts, live, || self.catalog.courts(complex))
    }

    fn settle<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        level: Level,
        live: Result<Vec<SelectOption>, LiveLookupError>,
        fallback: impl FnOnce() -> Vec<SelectOption>,
    ) -> ResolvedOptions {
        match live {
            Ok(options) => {
                info!("Resolved {} {} from live portal", options.len(), level);
                ResolvedOptions::live(options)
            }
            Err(e) => {
                warn!("Live {} lookup failed, using fallback catalog: {}", level, e);
                // The page may be half-way through a cascade; the next level reloads it.
                session.invalidate_page();
                ResolvedOptions::fallback(fallback(), e.to_string())
            }
        }
    }

    async fn live_states<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
    ) -> Result<Vec<SelectOption>, LiveLookupError> {
        let backend = session.reload_form_page().await?;
        backend
            .wait_for(
                &Locator::id(&self.form.state),
                self.timing.page_ready_timeout(),
            )
            .await?;
        sleep(self.timing.page_settle()).await;
        read_selectable(backend, &self.form.state).await
    }

    /// Re-select every parent so the page's own change handlers reload the
    /// target selector, then read it.
    async fn live_dependent<B: Backend + ?Sized>(
        &self,
        session: &mut SessionManager<B>,
        parents: &[(&str, &str)],
        target: &str,
    ) -> Result<Vec<SelectOption>, LiveLookupError> {
        let backend = session.ensure_form_page().await?;

        for (index, (id, value)) in parents.iter().enumerate() {
            let timeout = if index == 0 {
                self.timing.page_ready_timeout()
            } else {
                self.timing.dependent_timeout()
            };
            backend.wait_for(&Locator::id(*id), timeout).await?;
            debug!("Selecting {} = {}", id, value);
            backend.select_value(id, value).await?;
            sleep(self.timing.selection_settle()).await;
        }

        backend
            .wait_for(&Locator::id(target), self.timing.dependent_timeout())
            .await?;
        sleep(self.timing.dependent_settle()).await;
        read_selectable(backend, target).await
    }
}

async fn read_selectable<B: Backend + ?Sized>(
    backend: &mut B,
    id: &str,
) -> Result<Vec<SelectOption>, LiveLookupError> {
    let options: Vec<SelectOption> = backend
        .read_options(id)
        .await?
        .into_iter()
        .map(|option| SelectOption::new(option.value, option.text.trim()))
        .filter(SelectOption::is_selectable)
        .collect();

    if options.is_empty() {
        return Err(LiveLookupError::Empty);
    }
    Ok(options)
}
