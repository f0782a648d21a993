use serde::Deserialize;

/// Card thumbnail size used by the gallery grid.
pub const THUMB_WIDTH: u32 = 480;
pub const THUMB_HEIGHT: u32 = 360;

/// Widths offered as responsive variants, 4:3 aspect.
pub const VARIANT_WIDTHS: [u32; 4] = [320, 480, 640, 800];

/// A photo as listed by the catalogue. Identity is `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub id: String,
    pub author: String,
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub download_url: String,
}

impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Photo {}

impl Photo {
    pub fn aspect_label(&self) -> String {
        format!("{} × {}px", self.width, self.height)
    }
}

/// Height of a 4:3 variant for the given width.
pub fn variant_height(width: u32) -> u32 {
    (f64::from(width) * 0.75).round() as u32
}
