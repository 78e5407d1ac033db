use image::RgbaImage;

use crate::error::Error;
use crate::item::Item;

/// A generated cover image, sized to the viewport.
pub type CoverImage = RgbaImage;

/// Renders the visual asset for an item. Implemented by the host (e.g. an
/// album-art compositor); called on the generation worker thread.
///
/// `reuse` is a buffer reclaimed from the cache's oldest entry. When it is
/// present and matches the target dimensions the generator may overwrite
/// it instead of allocating; it must tolerate `None` and allocate fresh.
pub trait AssetGenerator: Send {
    fn generate(
        &self,
        item: &Item,
        width: u32,
        height: u32,
        reuse: Option<CoverImage>,
    ) -> Result<CoverImage, Error>;
}
