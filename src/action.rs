use crate::detail::DetailLoad;
use crate::gallery::PageLoad;

#[derive(Debug)]
pub enum Action {
    Quit,
    Back,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Select,

    // Gallery paging
    Start,
    Retry,
    Reset,
    PageLoaded(PageLoad),

    // Detail
    DetailLoaded(DetailLoad),

    // Polish
    OpenInBrowser,
    YankUrl,

    Resize(u16, u16),
    Tick,
    None,
}
