use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::action::Action;
use crate::error::Result;
use crate::fetch::FetchSlot;
use crate::source::PhotoSource;
use crate::types::Photo;

/// Read model of the detail view for one photo id.
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub id: String,
    pub photo: Option<Photo>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Completion of a single-photo fetch.
#[derive(Debug)]
pub struct DetailLoad {
    pub generation: u64,
    pub id: String,
    pub result: Result<Photo>,
}

/// Resolves a photo id from the loaded gallery, falling back to a
/// single-item fetch.
pub struct DetailResolver {
    state: Option<DetailState>,
    slot: FetchSlot,
    source: Arc<dyn PhotoSource>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl DetailResolver {
    pub fn new(source: Arc<dyn PhotoSource>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            state: None,
            slot: FetchSlot::new(),
            source,
            action_tx,
        }
    }

    pub fn state(&self) -> Option<&DetailState> {
        self.state.as_ref()
    }

    /// Activate the detail view for `id`. A photo already present in
    /// `items` is returned right away without touching the network.
    pub fn resolve(&mut self, id: &str, items: &[Photo]) -> Option<&Photo> {
        self.slot.cancel();

        if let Some(cached) = items.iter().find(|p| p.id == id) {
            debug!(id, "detail resolved from gallery");
            self.state = Some(DetailState {
                id: id.to_string(),
                photo: Some(cached.clone()),
                loading: false,
                error: None,
            });
        } else {
            self.state = Some(DetailState {
                id: id.to_string(),
                ..DetailState::default()
            });
            self.dispatch();
        }

        self.state.as_ref().and_then(|s| s.photo.as_ref())
    }

    /// Re-issue the fetch for the current id after a failure.
    pub fn retry(&mut self) {
        match &self.state {
            Some(state) if state.photo.is_none() => self.dispatch(),
            _ => {}
        }
    }

    /// Leave the detail context. Any pending fetch is cancelled.
    pub fn deactivate(&mut self) {
        self.slot.cancel();
        self.state = None;
    }

    /// The gallery grew; pick the current id from it if it showed up.
    pub fn refresh_from(&mut self, items: &[Photo]) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.photo.is_some() {
            return;
        }
        if let Some(cached) = items.iter().find(|p| p.id == state.id) {
            debug!(id = %state.id, "detail picked up from gallery");
            self.slot.cancel();
            state.photo = Some(cached.clone());
            state.loading = false;
            state.error = None;
        }
    }

    fn dispatch(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let ticket = self.slot.begin();
        state.loading = true;
        state.error = None;
        debug!(id = %state.id, generation = ticket.generation, "dispatching detail fetch");

        let id = state.id.clone();
        let source = Arc::clone(&self.source);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Some(result) = ticket.run(source.photo_info(&id)).await {
                tx.send(Action::DetailLoaded(DetailLoad {
                    generation: ticket.generation,
                    id,
                    result,
                }))
                .ok();
            }
        });
    }

    /// Apply a detail completion. Returns false for stale completions.
    pub fn on_detail_loaded(&mut self, load: DetailLoad) -> bool {
        if !self.slot.settle(load.generation) {
            debug!(id = %load.id, "discarding stale detail");
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.id != load.id {
            return false;
        }

        state.loading = false;
        match load.result {
            Ok(photo) => state.photo = Some(photo),
            Err(e) => {
                debug!(id = %load.id, error = %e, "detail fetch failed");
                state.error = Some(e.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;
    use crate::source::scripted::{photo, photos, ScriptedSource};

    fn setup() -> (
        DetailResolver,
        mpsc::UnboundedReceiver<Action>,
        Arc<ScriptedSource>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(ScriptedSource::new());
        (DetailResolver::new(source.clone(), tx), rx, source)
    }

    async fn next_load(rx: &mut mpsc::UnboundedReceiver<Action>) -> DetailLoad {
        match rx.recv().await {
            Some(Action::DetailLoaded(load)) => load,
            other => panic!("expected DetailLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cached_photo_resolves_synchronously() {
        let (mut resolver, mut rx, source) = setup();
        let items = photos(0, 10);

        let resolved = resolver.resolve("4", &items).cloned();
        assert_eq!(resolved.map(|p| p.id), Some("4".to_string()));

        let state = resolver.state().unwrap();
        assert!(!state.loading);
        assert!(state.error.is_none());

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert!(source.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn missing_photo_is_fetched() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Ok(photo("77")));

        assert!(resolver.resolve("77", &photos(0, 3)).is_none());
        assert!(resolver.state().unwrap().loading);

        let load = next_load(&mut rx).await;
        assert!(resolver.on_detail_loaded(load));
        let state = resolver.state().unwrap();
        assert!(!state.loading);
        assert_eq!(state.photo.as_ref().map(|p| p.id.as_str()), Some("77"));
        assert_eq!(source.detail_calls(), vec!["77".to_string()]);
    }

    #[tokio::test]
    async fn failure_can_be_retried() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Err(GalleryError::Status {
            status: 404,
            context: "Failed to load photo 9000".into(),
        }));
        source.push_detail(Ok(photo("9000")));

        resolver.resolve("9000", &[]);
        let load = next_load(&mut rx).await;
        resolver.on_detail_loaded(load);
        {
            let state = resolver.state().unwrap();
            assert!(!state.loading);
            assert_eq!(
                state.error.as_deref(),
                Some("Failed to load photo 9000 (HTTP 404)")
            );
            assert!(state.photo.is_none());
        }

        resolver.retry();
        assert!(resolver.state().unwrap().loading);
        assert!(resolver.state().unwrap().error.is_none());
        let load = next_load(&mut rx).await;
        resolver.on_detail_loaded(load);
        assert!(resolver.state().unwrap().photo.is_some());
        assert_eq!(source.detail_calls().len(), 2);
    }

    #[tokio::test]
    async fn switching_id_discards_previous_fetch() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Ok(photo("1")));
        source.push_detail(Ok(photo("2")));

        resolver.resolve("1", &[]);
        let first = next_load(&mut rx).await;

        resolver.resolve("2", &[]);
        assert!(!resolver.on_detail_loaded(first));
        assert!(resolver.state().unwrap().photo.is_none());

        let second = next_load(&mut rx).await;
        assert!(resolver.on_detail_loaded(second));
        assert_eq!(
            resolver.state().unwrap().photo.as_ref().map(|p| p.id.as_str()),
            Some("2")
        );
    }

    #[tokio::test]
    async fn deactivate_drops_pending_fetch() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Ok(photo("5")));

        resolver.resolve("5", &[]);
        let load = next_load(&mut rx).await;
        resolver.deactivate();
        assert!(resolver.state().is_none());
        assert!(!resolver.on_detail_loaded(load));
        assert!(resolver.state().is_none());
    }

    #[tokio::test]
    async fn cancelled_fetch_never_reports() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Ok(photo("5")));

        resolver.resolve("5", &[]);
        resolver.deactivate();
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert!(source.detail_calls().is_empty());
    }

    #[tokio::test]
    async fn pending_detail_picks_up_gallery_page() {
        let (mut resolver, mut rx, source) = setup();
        source.push_detail(Ok(photo("40")));

        resolver.resolve("40", &photos(0, 30));
        let load = next_load(&mut rx).await;

        resolver.refresh_from(&photos(0, 60));
        let state = resolver.state().unwrap();
        assert!(!state.loading);
        assert_eq!(state.photo.as_ref().map(|p| p.id.as_str()), Some("40"));
        assert!(!resolver.on_detail_loaded(load));
    }

    #[tokio::test]
    async fn retry_after_success_is_noop() {
        let (mut resolver, _rx, source) = setup();
        resolver.resolve("2", &photos(0, 5));
        resolver.retry();
        tokio::task::yield_now().await;
        assert!(source.detail_calls().is_empty());
    }
}
