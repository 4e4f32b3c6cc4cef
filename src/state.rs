use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::cache::TableCache;
use crate::data::filter::{filter, RangeError};
use crate::data::model::{FilterCriteria, FilteredView, UnifiedTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Filtering is pull-based:
/// widgets mutate `criteria` and call [`AppState::refilter`]; nothing
/// re-runs behind the scenes.
#[derive(Default)]
pub struct AppState {
    /// Path of the currently loaded archive (None until a load succeeds).
    pub archive_path: Option<PathBuf>,

    /// Memoized archive loads.
    pub cache: TableCache,

    /// Loaded unified table, shared read-only.
    pub table: Option<Arc<UnifiedTable>>,

    /// Current filter criteria (None until a table is loaded).
    pub criteria: Option<FilterCriteria>,

    /// Row indices passing the current criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Per-source line colours.
    pub color_map: Option<ColorMap>,

    /// Set while the criteria's date range is inverted; suppresses the
    /// chart, table, and export until the user fixes the inputs.
    pub range_error: Option<RangeError>,

    /// Load error / status text shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` through the cache and install the table on success.
    pub fn open_archive(&mut self, path: PathBuf) {
        match self.cache.load(&path) {
            Ok(table) => {
                self.archive_path = Some(path);
                self.set_table(table);
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Invalidate the current archive in the cache and load it again.
    pub fn reload(&mut self) {
        if let Some(path) = self.archive_path.clone() {
            self.cache.invalidate(&path);
            self.open_archive(path);
        }
    }

    /// Install a freshly loaded table: spanning criteria, colours, refilter.
    pub fn set_table(&mut self, table: Arc<UnifiedTable>) {
        self.criteria = FilterCriteria::spanning(&table);
        self.color_map = Some(ColorMap::new(&table.sources));
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` from the current criteria.
    pub fn refilter(&mut self) {
        let (Some(table), Some(criteria)) = (&self.table, &self.criteria) else {
            self.visible_indices.clear();
            self.range_error = None;
            return;
        };
        match filter(table, criteria) {
            Ok(view) => {
                self.visible_indices = view.into_indices();
                self.range_error = None;
            }
            Err(e) => {
                self.visible_indices.clear();
                self.range_error = Some(e);
            }
        }
    }

    /// The current view, recomputed on demand (used by export).
    pub fn filtered_view(&self) -> Option<FilteredView<'_>> {
        let (table, criteria) = (self.table.as_deref()?, self.criteria.as_ref()?);
        filter(table, criteria).ok()
    }

    /// Toggle one source in the selection.
    pub fn toggle_source(&mut self, source: &str) {
        if let Some(criteria) = &mut self.criteria {
            if !criteria.selected_sources.remove(source) {
                criteria.selected_sources.insert(source.to_string());
            }
            self.refilter();
        }
    }

    /// Select every source in the table.
    pub fn select_all_sources(&mut self) {
        if let (Some(table), Some(criteria)) = (&self.table, &mut self.criteria) {
            criteria.selected_sources = table.sources.iter().cloned().collect();
            self.refilter();
        }
    }

    /// Deselect every source.
    pub fn select_no_sources(&mut self) {
        if let Some(criteria) = &mut self.criteria {
            criteria.selected_sources.clear();
            self.refilter();
        }
    }
}
