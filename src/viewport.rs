use std::time::{Duration, Instant};

use tracing::debug;

use crate::gallery::GalleryState;

pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(200);
pub const DEFAULT_LOOKAHEAD_ROWS: usize = 3;

/// Width and height of one photo card, borders included.
pub const CARD_WIDTH: u16 = 28;
pub const CARD_HEIGHT: u16 = 5;

/// Grid geometry of the gallery body, in cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub visible_rows: usize,
}

impl GridLayout {
    /// Layout for a body area of `width` × `height` cells. The last line
    /// of the area is kept for the footer.
    pub fn for_area(width: u16, height: u16) -> Self {
        Self {
            columns: (width / CARD_WIDTH).max(1) as usize,
            visible_rows: (height.saturating_sub(1) / CARD_HEIGHT).max(1) as usize,
        }
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    pub fn total_rows(&self, items: usize) -> usize {
        items.div_ceil(self.columns)
    }

    /// Scroll offset (first visible row) that keeps `selected` on screen.
    pub fn follow(&self, first_row: usize, selected: usize) -> usize {
        let row = self.row_of(selected);
        if row < first_row {
            row
        } else if row >= first_row + self.visible_rows {
            row + 1 - self.visible_rows
        } else {
            first_row
        }
    }

    /// Whether the sentinel row placed after the last card is within
    /// `lookahead` rows of the bottom edge of the viewport.
    pub fn sentinel_visible(&self, first_row: usize, items: usize, lookahead: usize) -> bool {
        let sentinel_row = self.total_rows(items);
        sentinel_row < first_row + self.visible_rows + lookahead
    }
}

/// Turns sentinel visibility into `advance_page` requests.
#[derive(Debug)]
pub struct ViewportTrigger {
    throttle: Duration,
    lookahead_rows: usize,
    attached: bool,
    last_fired: Option<Instant>,
}

impl ViewportTrigger {
    pub fn new(throttle: Duration, lookahead_rows: usize) -> Self {
        Self {
            throttle,
            lookahead_rows,
            attached: false,
            last_fired: None,
        }
    }

    pub fn lookahead_rows(&self) -> usize {
        self.lookahead_rows
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Attach while the gallery is mounted and more pages exist, detach
    /// otherwise.
    pub fn sync(&mut self, mounted: bool, has_more: bool) {
        let attach = mounted && has_more;
        if attach != self.attached {
            debug!(attach, mounted, has_more, "viewport trigger");
            self.attached = attach;
            if !attach {
                self.last_fired = None;
            }
        }
    }

    /// Report the sentinel's visibility. Returns true when the caller
    /// should advance to the next page.
    pub fn observe(&mut self, visible: bool, state: &GalleryState, now: Instant) -> bool {
        if !self.attached || !visible || !state.has_more || state.is_loading() {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now.saturating_duration_since(last) < self.throttle {
                return false;
            }
        }
        self.last_fired = Some(now);
        true
    }
}

impl Default for ViewportTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE, DEFAULT_LOOKAHEAD_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(has_more: bool) -> GalleryState {
        GalleryState {
            has_more,
            ..GalleryState::new()
        }
    }

    fn attached() -> ViewportTrigger {
        let mut trigger = ViewportTrigger::default();
        trigger.sync(true, true);
        trigger
    }

    #[test]
    fn fires_when_visible_and_idle() {
        let mut trigger = attached();
        assert!(trigger.observe(true, &idle(true), Instant::now()));
    }

    #[test]
    fn hidden_sentinel_never_fires() {
        let mut trigger = attached();
        assert!(!trigger.observe(false, &idle(true), Instant::now()));
    }

    #[test]
    fn suspended_while_loading() {
        let mut trigger = attached();
        let now = Instant::now();
        let initial = GalleryState {
            is_loading_initial: true,
            ..GalleryState::new()
        };
        let more = GalleryState {
            is_loading_more: true,
            ..GalleryState::new()
        };
        assert!(!trigger.observe(true, &initial, now));
        assert!(!trigger.observe(true, &more, now));
    }

    #[test]
    fn suspended_without_more_pages() {
        let mut trigger = attached();
        assert!(!trigger.observe(true, &idle(false), Instant::now()));
    }

    #[test]
    fn throttles_repeat_fires() {
        let mut trigger = attached();
        let state = idle(true);
        let t0 = Instant::now();
        assert!(trigger.observe(true, &state, t0));
        assert!(!trigger.observe(true, &state, t0 + Duration::from_millis(50)));
        assert!(!trigger.observe(true, &state, t0 + Duration::from_millis(199)));
        assert!(trigger.observe(true, &state, t0 + Duration::from_millis(200)));
    }

    #[test]
    fn detached_trigger_is_inert() {
        let mut trigger = ViewportTrigger::default();
        assert!(!trigger.observe(true, &idle(true), Instant::now()));

        trigger.sync(true, true);
        assert!(trigger.is_attached());
        trigger.sync(false, true);
        assert!(!trigger.is_attached());
        assert!(!trigger.observe(true, &idle(true), Instant::now()));
    }

    #[test]
    fn detaches_when_pages_run_out() {
        let mut trigger = attached();
        trigger.sync(true, false);
        assert!(!trigger.is_attached());
        trigger.sync(true, true);
        assert!(trigger.is_attached());
    }

    #[test]
    fn grid_layout_from_area() {
        let grid = GridLayout::for_area(120, 31);
        assert_eq!(grid.columns, 4);
        assert_eq!(grid.visible_rows, 6);

        let tiny = GridLayout::for_area(10, 2);
        assert_eq!(tiny.columns, 1);
        assert_eq!(tiny.visible_rows, 1);
    }

    #[test]
    fn follow_keeps_selection_in_view() {
        let grid = GridLayout {
            columns: 4,
            visible_rows: 3,
        };
        assert_eq!(grid.follow(0, 5), 0);
        assert_eq!(grid.follow(0, 12), 1);
        assert_eq!(grid.follow(5, 4), 1);
    }

    #[test]
    fn sentinel_respects_lookahead() {
        let grid = GridLayout {
            columns: 4,
            visible_rows: 3,
        };
        // 30 items → 8 rows, sentinel sits on row 8.
        assert!(!grid.sentinel_visible(0, 30, 3));
        assert!(grid.sentinel_visible(3, 30, 3));
        assert!(!grid.sentinel_visible(2, 30, 3));
        assert!(grid.sentinel_visible(2, 30, 4));
        // An empty grid shows its sentinel immediately.
        assert!(grid.sentinel_visible(0, 0, 0));
    }
}
