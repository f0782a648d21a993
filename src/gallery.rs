use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::Action;
use crate::error::Result;
use crate::fetch::FetchSlot;
use crate::source::PhotoSource;
use crate::types::Photo;

pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Read model of the paginated gallery.
#[derive(Debug, Clone)]
pub struct GalleryState {
    /// Photos in page-arrival order.
    pub items: Vec<Photo>,
    pub current_page: u32,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub has_more: bool,
    pub last_error: Option<String>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
            is_loading_initial: false,
            is_loading_more: false,
            has_more: true,
            last_error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading_initial || self.is_loading_more
    }

    /// All pages are in and nothing went wrong.
    pub fn reached_end(&self) -> bool {
        !self.is_loading() && !self.has_more && self.last_error.is_none() && !self.items.is_empty()
    }
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion of one page fetch, routed back through the action channel.
#[derive(Debug)]
pub struct PageLoad {
    pub generation: u64,
    pub page: u32,
    pub result: Result<Vec<Photo>>,
}

/// Owns the gallery state and the list fetch slot.
pub struct PageFetchController {
    state: GalleryState,
    page_size: usize,
    slot: FetchSlot,
    source: Arc<dyn PhotoSource>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl PageFetchController {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        page_size: usize,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            state: GalleryState::new(),
            page_size: page_size.max(1),
            slot: FetchSlot::new(),
            source,
            action_tx,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Initial load of a session.
    pub fn start(&mut self) {
        self.dispatch(self.state.current_page);
    }

    /// Move on to the next page. Returns false (and does nothing) while a
    /// fetch is in flight or once the catalogue is exhausted.
    pub fn advance_page(&mut self) -> bool {
        if !self.state.has_more || self.state.is_loading() {
            debug!(
                page = self.state.current_page,
                has_more = self.state.has_more,
                "advance_page ignored"
            );
            return false;
        }

        self.state.current_page += 1;
        self.dispatch(self.state.current_page);
        true
    }

    /// Drop everything and load page 1 again.
    pub fn reset(&mut self) {
        info!("resetting gallery");
        self.state.items.clear();
        self.state.current_page = 1;
        self.state.has_more = true;
        self.state.last_error = None;
        self.dispatch(1);
    }

    /// Re-fetch the current page after it failed, keeping the photos
    /// already loaded. Returns false when there is nothing to retry.
    pub fn retry_current(&mut self) -> bool {
        if self.state.last_error.is_none() || self.state.is_loading() {
            debug!(page = self.state.current_page, "retry_current ignored");
            return false;
        }
        if self.state.current_page <= 1 {
            self.reset();
            return true;
        }
        self.state.has_more = true;
        self.dispatch(self.state.current_page);
        true
    }

    fn dispatch(&mut self, page: u32) {
        let ticket = self.slot.begin();
        self.state.last_error = None;
        self.state.is_loading_initial = page == 1;
        self.state.is_loading_more = page > 1;
        debug!(page, generation = ticket.generation, "dispatching page fetch");

        let source = Arc::clone(&self.source);
        let tx = self.action_tx.clone();
        let limit = self.page_size;
        tokio::spawn(async move {
            if let Some(result) = ticket.run(source.list_photos(page, limit)).await {
                tx.send(Action::PageLoaded(PageLoad {
                    generation: ticket.generation,
                    page,
                    result,
                }))
                .ok();
            }
        });
    }

    /// Apply a page completion. Stale completions are dropped untouched;
    /// returns whether the state changed.
    pub fn on_page_loaded(&mut self, load: PageLoad) -> bool {
        if !self.slot.settle(load.generation) {
            debug!(
                page = load.page,
                generation = load.generation,
                "discarding stale page"
            );
            return false;
        }

        self.state.is_loading_initial = false;
        self.state.is_loading_more = false;

        match load.result {
            Ok(photos) => {
                self.state.has_more = photos.len() >= self.page_size;
                debug!(
                    page = load.page,
                    count = photos.len(),
                    has_more = self.state.has_more,
                    "page loaded"
                );
                if load.page == 1 {
                    self.state.items = photos;
                } else {
                    self.state.items.extend(photos);
                }
            }
            Err(e) => {
                debug!(page = load.page, error = %e, "page fetch failed");
                self.state.last_error = Some(e.to_string());
                self.state.has_more = false;
            }
        }
        true
    }
}
