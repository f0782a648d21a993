use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::Action;
use crate::config::Config;
use crate::detail::{DetailResolver, DetailState};
use crate::event::Event;
use crate::gallery::{GalleryState, PageFetchController};
use crate::source::PhotoSource;
use crate::types::Photo;
use crate::viewport::{GridLayout, ViewportTrigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Gallery, // Infinite photo grid
    Detail,  // One photo
}

pub struct App {
    pub screen: Screen,
    pub gallery: PageFetchController,
    pub detail: DetailResolver,
    pub trigger: ViewportTrigger,
    pub grid: GridLayout,
    pub selected: usize,
    pub first_row: usize,
    pub flash: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
    initial_photo: Option<String>,
    source: Arc<dyn PhotoSource>,
}

impl App {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        config: &Config,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            screen: Screen::Gallery,
            gallery: PageFetchController::new(
                Arc::clone(&source),
                config.api.page_size,
                action_tx.clone(),
            ),
            detail: DetailResolver::new(Arc::clone(&source), action_tx),
            trigger: ViewportTrigger::new(config.throttle(), config.scroll.lookahead_rows),
            grid: GridLayout::for_area(80, 22),
            selected: 0,
            first_row: 0,
            flash: None,
            error: None,
            should_quit: false,
            initial_photo: None,
            source,
        }
    }

    /// Open this photo's detail view once the session starts.
    pub fn with_initial_photo(mut self, id: Option<String>) -> Self {
        self.initial_photo = id;
        self
    }

    pub fn source(&self) -> &dyn PhotoSource {
        self.source.as_ref()
    }

    pub fn state(&self) -> &GalleryState {
        self.gallery.state()
    }

    pub fn detail_state(&self) -> Option<&DetailState> {
        self.detail.state()
    }

    pub fn selected_photo(&self) -> Option<&Photo> {
        self.gallery.state().items.get(self.selected)
    }

    /// Photo the user is looking at on the current screen.
    pub fn current_photo(&self) -> Option<&Photo> {
        match self.screen {
            Screen::Gallery => self.selected_photo(),
            Screen::Detail => self.detail.state().and_then(|d| d.photo.as_ref()),
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Start,
            Event::Tick => Action::Tick,
            Event::Resize(width, height) => Action::Resize(width, height),
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => match self.screen {
                Screen::Gallery => Action::Quit,
                Screen::Detail => Action::Back,
            },
            KeyCode::Backspace => Action::Back,
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Char('h') | KeyCode::Left => Action::MoveLeft,
            KeyCode::Char('l') | KeyCode::Right => Action::MoveRight,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Select,
            KeyCode::Char('r') => Action::Retry,
            KeyCode::Char('R') => Action::Reset,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(
            action,
            Action::Tick | Action::PageLoaded(_) | Action::DetailLoaded(_) | Action::Resize(..)
        ) {
            self.error = None;
            self.flash = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::Gallery => self.should_quit = true,
                Screen::Detail => {
                    self.detail.deactivate();
                    self.screen = Screen::Gallery;
                    self.check_viewport(Instant::now());
                }
            },
            Action::MoveUp => self.move_selection(-(self.grid.columns as isize)),
            Action::MoveDown => self.move_selection(self.grid.columns as isize),
            Action::MoveLeft => self.move_selection(-1),
            Action::MoveRight => self.move_selection(1),
            Action::PageUp => {
                let step = self.grid.columns * self.grid.visible_rows;
                self.move_selection(-(step as isize));
            }
            Action::PageDown => {
                let step = self.grid.columns * self.grid.visible_rows;
                self.move_selection(step as isize);
            }
            Action::GoToTop => self.move_selection(isize::MIN),
            Action::GoToBottom => self.move_selection(isize::MAX),
            Action::Select => {
                if self.screen == Screen::Gallery {
                    if let Some(id) = self.selected_photo().map(|p| p.id.clone()) {
                        self.open_detail(id);
                    }
                }
            }

            Action::Start => {
                self.gallery.start();
                if let Some(id) = self.initial_photo.take() {
                    self.open_detail(id);
                }
            }
            Action::Retry => match self.screen {
                Screen::Gallery => {
                    self.gallery.retry_current();
                }
                Screen::Detail => self.detail.retry(),
            },
            Action::Reset => {
                self.selected = 0;
                self.first_row = 0;
                self.gallery.reset();
            }
            Action::PageLoaded(load) => {
                if self.gallery.on_page_loaded(load) {
                    self.detail.refresh_from(&self.gallery.state().items);
                    self.clamp_selection();
                    self.check_viewport(Instant::now());
                }
            }

            Action::DetailLoaded(load) => {
                self.detail.on_detail_loaded(load);
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.current_photo().map(|p| p.download_url.clone()) {
                    match open::that(&url) {
                        Ok(()) => self.flash = Some(format!("Opened {}", url)),
                        Err(e) => self.error = Some(format!("Failed to open browser: {}", e)),
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.current_photo().map(|p| p.download_url.clone()) {
                    match arboard::Clipboard::new().and_then(|mut c| c.set_text(url.clone())) {
                        Ok(()) => self.flash = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard error: {}", e)),
                    }
                }
            }

            Action::Resize(width, height) => {
                // header and status bar take one line each
                self.grid = GridLayout::for_area(width, height.saturating_sub(2));
                self.first_row = self.grid.follow(self.first_row, self.selected);
                self.check_viewport(Instant::now());
            }
            Action::Tick => self.check_viewport(Instant::now()),
            Action::None => {}
        }
    }

    fn open_detail(&mut self, id: String) {
        info!(id = %id, "opening photo");
        self.screen = Screen::Detail;
        self.detail.resolve(&id, &self.gallery.state().items);
        self.trigger.sync(false, self.gallery.state().has_more);
    }

    fn move_selection(&mut self, delta: isize) {
        if self.screen != Screen::Gallery {
            return;
        }
        let len = self.gallery.state().items.len();
        if len == 0 {
            return;
        }
        let target = (self.selected as isize).saturating_add(delta);
        self.selected = target.clamp(0, len as isize - 1) as usize;
        self.first_row = self.grid.follow(self.first_row, self.selected);
        self.check_viewport(Instant::now());
    }

    fn clamp_selection(&mut self) {
        let len = self.gallery.state().items.len();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.first_row = self.grid.follow(self.first_row, self.selected);
    }

    /// Feed the sentinel's visibility to the trigger and load the next
    /// page when it fires.
    pub fn check_viewport(&mut self, now: Instant) {
        let state = self.gallery.state();
        self.trigger.sync(self.screen == Screen::Gallery, state.has_more);
        // nothing to extend before the first page
        if !self.trigger.is_attached() || state.items.is_empty() {
            return;
        }
        let visible = self.grid.sentinel_visible(
            self.first_row,
            state.items.len(),
            self.trigger.lookahead_rows(),
        );
        if self.trigger.observe(visible, state, now) {
            debug!(page = state.current_page + 1, "sentinel visible");
            self.gallery.advance_page();
        }
    }
}
