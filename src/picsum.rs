use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{GalleryError, Result};
use crate::source::PhotoSource;
use crate::types::Photo;

pub struct Picsum {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for Picsum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picsum")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Picsum {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pixgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GalleryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self, page: u32, limit: usize) -> String {
        format!("{}/v2/list?page={}&limit={}", self.base_url, page, limit)
    }

    fn info_url(&self, id: &str) -> String {
        format!("{}/id/{}/info", self.base_url, urlencoding::encode(id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, context));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        decode(&body)
    }
}

fn transport_error(err: reqwest::Error) -> GalleryError {
    if err.is_timeout() {
        GalleryError::Transport("request timed out".to_string())
    } else if err.is_connect() {
        GalleryError::Transport(format!("could not connect: {}", err))
    } else {
        GalleryError::Transport(err.to_string())
    }
}

fn status_error(status: StatusCode, context: &str) -> GalleryError {
    GalleryError::Status {
        status: status.as_u16(),
        context: context.to_string(),
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| GalleryError::Decode(e.to_string()))
}

#[async_trait]
impl PhotoSource for Picsum {
    fn name(&self) -> &str {
        "Lorem Picsum"
    }

    fn image_url(&self, id: &str, width: u32, height: u32) -> String {
        format!(
            "{}/id/{}/{}/{}",
            self.base_url,
            urlencoding::encode(id),
            width,
            height
        )
    }

    async fn list_photos(&self, page: u32, limit: usize) -> Result<Vec<Photo>> {
        let url = self.list_url(page, limit);
        self.get_json(&url, "Failed to load photo list").await
    }

    async fn photo_info(&self, id: &str) -> Result<Photo> {
        let url = self.info_url(id);
        self.get_json(&url, &format!("Failed to load photo {}", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picsum() -> Picsum {
        Picsum::new("https://picsum.photos/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn list_url_carries_page_and_limit() {
        assert_eq!(
            picsum().list_url(3, 30),
            "https://picsum.photos/v2/list?page=3&limit=30"
        );
    }

    #[test]
    fn info_url_escapes_id() {
        assert_eq!(picsum().info_url("10"), "https://picsum.photos/id/10/info");
        assert_eq!(
            picsum().info_url("a/b"),
            "https://picsum.photos/id/a%2Fb/info"
        );
    }

    #[test]
    fn image_url_template() {
        assert_eq!(
            picsum().image_url("237", 480, 360),
            "https://picsum.photos/id/237/480/360"
        );
        assert_eq!(
            picsum().thumbnail_url("237"),
            "https://picsum.photos/id/237/480/360"
        );
    }

    #[test]
    fn decode_list_body() {
        let body = br#"[
            {"id":"0","author":"A","width":10,"height":20,"url":"u0","download_url":"d0"},
            {"id":"1","author":"B","width":30,"height":40,"url":"u1","download_url":"d1"}
        ]"#;
        let photos: Vec<Photo> = decode(body).unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[1].author, "B");
    }

    #[test]
    fn decode_wrong_shape_is_decode_error() {
        let err = decode::<Vec<Photo>>(br#"{"error":"nope"}"#).unwrap_err();
        assert!(matches!(err, GalleryError::Decode(_)));
    }

    #[test]
    fn status_error_includes_code() {
        let err = status_error(StatusCode::NOT_FOUND, "Failed to load photo 99");
        assert_eq!(err.to_string(), "Failed to load photo 99 (HTTP 404)");
    }
}
