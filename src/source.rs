use async_trait::async_trait;

use crate::error::Result;
use crate::types::{variant_height, Photo, THUMB_HEIGHT, THUMB_WIDTH, VARIANT_WIDTHS};

#[async_trait]
pub trait PhotoSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// URL of a rendition of `id` at the requested pixel size.
    fn image_url(&self, id: &str, width: u32, height: u32) -> String;

    /// One page of the catalogue. Pages are 1-based; a page shorter than
    /// `limit` is the last one.
    async fn list_photos(&self, page: u32, limit: usize) -> Result<Vec<Photo>>;

    async fn photo_info(&self, id: &str) -> Result<Photo>;

    fn thumbnail_url(&self, id: &str) -> String {
        self.image_url(id, THUMB_WIDTH, THUMB_HEIGHT)
    }

    /// (width, url) pairs for the responsive renditions of `id`.
    fn variant_urls(&self, id: &str) -> Vec<(u32, String)> {
        VARIANT_WIDTHS
            .iter()
            .map(|&w| (w, self.image_url(id, w, variant_height(w))))
            .collect()
    }
}

#[cfg(test)]
pub mod scripted {
    //! In-memory source that replays queued responses in call order.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::GalleryError;

    #[derive(Debug, Default)]
    pub struct ScriptedSource {
        pages: Mutex<VecDeque<Result<Vec<Photo>>>>,
        details: Mutex<VecDeque<Result<Photo>>>,
        pub page_calls: Mutex<Vec<(u32, usize)>>,
        pub detail_calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_page(&self, page: Result<Vec<Photo>>) {
            self.pages.lock().unwrap().push_back(page);
        }

        pub fn push_detail(&self, detail: Result<Photo>) {
            self.details.lock().unwrap().push_back(detail);
        }

        pub fn page_calls(&self) -> Vec<(u32, usize)> {
            self.page_calls.lock().unwrap().clone()
        }

        pub fn detail_calls(&self) -> Vec<String> {
            self.detail_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PhotoSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn image_url(&self, id: &str, width: u32, height: u32) -> String {
            format!("mem://{}/{}/{}", id, width, height)
        }

        async fn list_photos(&self, page: u32, limit: usize) -> Result<Vec<Photo>> {
            self.page_calls.lock().unwrap().push((page, limit));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GalleryError::Transport("no scripted page".into())))
        }

        async fn photo_info(&self, id: &str) -> Result<Photo> {
            self.detail_calls.lock().unwrap().push(id.to_string());
            self.details
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GalleryError::Transport("no scripted detail".into())))
        }
    }

    pub fn photo(id: impl Into<String>) -> Photo {
        let id = id.into();
        Photo {
            author: format!("Author {}", id),
            width: 4000,
            height: 3000,
            url: format!("https://unsplash.com/photos/{}", id),
            download_url: format!("mem://{}/4000/3000", id),
            id,
        }
    }

    /// `count` photos with ids starting at `first`.
    pub fn photos(first: usize, count: usize) -> Vec<Photo> {
        (first..first + count).map(|i| photo(i.to_string())).collect()
    }
}
