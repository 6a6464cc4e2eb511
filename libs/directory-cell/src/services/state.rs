use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use shared_models::error::AppError;

use crate::models::{DirectoryAudience, DoctorRecord, SearchSurface, ALL_SPECIALTIES};
use crate::services::loader::DirectoryLoader;
use crate::services::search::filter;
use crate::services::specialty::build_index;

/// Generation counter shared between a screen and its in-flight loads.
///
/// Every load takes a ticket; a result is applied only if no newer load
/// started and the screen was not torn down in the meantime.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    current: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadTicket {
        LoadTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Makes every outstanding ticket stale (unmount or navigation away).
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

struct VisibleMemo {
    specialty: String,
    query: String,
    version: u64,
    rows: Vec<DoctorRecord>,
}

/// Screen-local directory state shared by the search, guest home and
/// dashboard screens.
pub struct DirectoryState {
    audience: DirectoryAudience,
    surface: SearchSurface,
    generation: LoadGeneration,
    doctors: Vec<DoctorRecord>,
    specialties: Vec<String>,
    selected_specialty: String,
    query: String,
    loading: bool,
    error: Option<String>,
    version: u64,
    memo: Option<VisibleMemo>,
}

impl DirectoryState {
    pub fn new(audience: DirectoryAudience, surface: SearchSurface) -> Self {
        Self {
            audience,
            surface,
            generation: LoadGeneration::new(),
            doctors: Vec::new(),
            specialties: vec![ALL_SPECIALTIES.to_string()],
            selected_specialty: ALL_SPECIALTIES.to_string(),
            query: String::new(),
            loading: false,
            error: None,
            version: 0,
            memo: None,
        }
    }

    /// Handle for tearing the screen down from outside the load.
    pub fn generation(&self) -> LoadGeneration {
        self.generation.clone()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        self.generation.begin()
    }

    /// Applies a finished load if its ticket is still current.
    ///
    /// Returns `false` and leaves the state untouched for stale results.
    /// A failed load keeps the previous list and records the user message.
    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<DoctorRecord>, AppError>) -> bool {
        if !self.generation.is_current(ticket) {
            debug!("Discarding stale directory load {:?}", ticket);
            return false;
        }

        self.loading = false;
        match result {
            Ok(mut doctors) => {
                if self.audience == DirectoryAudience::Patient {
                    doctors.retain(|d| !d.is_suspended);
                }
                self.specialties = build_index(&doctors);
                if !self.specialties.contains(&self.selected_specialty) {
                    self.selected_specialty = ALL_SPECIALTIES.to_string();
                }
                self.doctors = doctors;
                self.error = None;
                self.version += 1;
            }
            Err(e) => {
                warn!("Directory load failed: {}", e);
                self.error = Some(e.report());
            }
        }
        true
    }

    /// Load through `loader` and apply the result under a fresh ticket.
    pub async fn refresh(&mut self, loader: &DirectoryLoader) -> bool {
        let ticket = self.begin_load();
        let result = loader.load(self.audience).await;
        self.apply_load(ticket, result)
    }

    /// Unknown chips fall back to `"All"`.
    pub fn select_specialty(&mut self, specialty: &str) {
        self.selected_specialty = if self.specialties.iter().any(|s| s == specialty) {
            specialty.to_string()
        } else {
            ALL_SPECIALTIES.to_string()
        };
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn visible(&mut self) -> &[DoctorRecord] {
        let stale = match &self.memo {
            Some(memo) => memo.specialty != self.selected_specialty
                || memo.query != self.query
                || memo.version != self.version,
            None => true,
        };

        if stale {
            let rows = filter(&self.doctors, &self.selected_specialty, &self.query, self.surface);
            self.memo = Some(VisibleMemo {
                specialty: self.selected_specialty.clone(),
                query: self.query.clone(),
                version: self.version,
                rows,
            });
        }

        self.memo.as_ref().map(|m| m.rows.as_slice()).unwrap_or(&[])
    }

    pub fn doctors(&self) -> &[DoctorRecord] {
        &self.doctors
    }

    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    pub fn selected_specialty(&self) -> &str {
        &self.selected_specialty
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
