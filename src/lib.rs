//! Interaction core for a flingable three-tile cover art carousel.
//!
//! The carousel shows a previous/current/next triptych of generated cover
//! images, lets the user drag or fling between them and snaps to whichever
//! tile should become current. The host platform owns the window, decodes
//! raw input into [`PointerEvent`]s and drives [`CoverCarousel::tick`] from
//! its render loop; everything else (gesture classification, snap
//! animation, the cover cache and the background generation worker) lives
//! here.

pub mod asset;
pub mod cache;
pub mod carousel;
pub mod config;
mod easing;
pub mod error;
pub mod gesture;
pub mod item;
pub mod pipeline;
pub mod render;
pub mod scroller;

pub use asset::{AssetGenerator, CoverImage};
pub use carousel::{CarouselCallback, CoverCarousel, Slot};
pub use config::Config;
pub use error::Error;
pub use gesture::{GestureAction, PointerEvent};
pub use item::{Item, ItemSource, NO_ITEM_ID};
