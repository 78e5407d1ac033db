//! The triptych controller: owns the three slots, the cover cache, the
//! generation pipeline, the gesture tracker and the snap animator, and
//! exposes the surface the host drives (resize / set_items / pointer
//! events / tick / render).

use std::sync::Arc;

use image::RgbaImage;
use log::{debug, warn};

use crate::asset::{AssetGenerator, CoverImage};
use crate::cache::CoverCache;
use crate::config::Config;
use crate::error::Error;
use crate::gesture::{
    GestureAction, GestureContext, GestureTracker, GestureUpdate, PointerEvent, Release,
};
use crate::item::{Item, ItemSource};
use crate::pipeline::{AssetPipeline, GenerateRequest};
use crate::render;
use crate::scroller::Scroller;

/// Reactions the host implements: navigation commits, vertical swipes and
/// the tap/long-press activations on the current tile.
pub trait CarouselCallback {
    fn on_next(&mut self);
    fn on_previous(&mut self);
    fn on_swipe_up(&mut self);
    fn on_swipe_down(&mut self);
    fn on_activate(&mut self) {}
    fn on_activate_long(&mut self) {}
}

/// One of the three display slots: the item assigned to it and the cover
/// currently shown for it. The cover may lag the item while generation is
/// in flight.
#[derive(Default)]
pub struct Slot {
    pub(crate) item: Option<Item>,
    pub(crate) cover: Option<Arc<CoverImage>>,
}

impl Slot {
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn cover(&self) -> Option<&Arc<CoverImage>> {
        self.cover.as_ref()
    }
}

/// Logical slot indices.
pub const SLOT_PREVIOUS: usize = 0;
pub const SLOT_CURRENT: usize = 1;
pub const SLOT_NEXT: usize = 2;

pub struct CoverCarousel {
    config: Config,
    width: u32,
    height: u32,
    slots: [Slot; 3],
    cache: CoverCache,
    pipeline: AssetPipeline,
    gesture: GestureTracker,
    scroller: Scroller,
    scroll_x: f32,
    /// Slot a running snap animation will commit to, when not the center.
    tentative: Option<usize>,
    source: Box<dyn ItemSource>,
    callback: Box<dyn CarouselCallback>,
    needs_redraw: bool,
}

impl CoverCarousel {
    pub fn new(
        config: Config,
        generator: Box<dyn AssetGenerator>,
        source: Box<dyn ItemSource>,
        callback: Box<dyn CarouselCallback>,
    ) -> Result<Self, Error> {
        let pipeline = AssetPipeline::new(generator, config.max_pending_generations)?;
        let cache = CoverCache::new(config.cover_cache_capacity);
        Ok(CoverCarousel {
            config,
            width: 0,
            height: 0,
            slots: [Slot::default(), Slot::default(), Slot::default()],
            cache,
            pipeline,
            gesture: GestureTracker::new(),
            scroller: Scroller::new(),
            scroll_x: 0.0,
            tentative: None,
            source,
            callback,
            needs_redraw: false,
        })
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_x
    }

    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub fn cache(&self) -> &CoverCache {
        &self.cache
    }

    pub fn is_animating(&self) -> bool {
        !self.scroller.is_finished()
    }

    /// Coalesced repaint signal for the host; reading it clears it.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Adopt new viewport dimensions. Cached covers are sized to the
    /// viewport, so everything is dropped and regenerated; the scroll
    /// position resets to center. Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;

        let dropped = self.cache.clear();
        debug!(
            "resized to {}x{}, discarded {} cached covers",
            width,
            height,
            dropped.len()
        );
        drop(dropped);
        for slot in &mut self.slots {
            slot.cover = None;
        }
        for index in 0..self.slots.len() {
            let item = self.slots[index].item.clone();
            self.request_slot(index, item);
        }
        self.reset_scroll();
    }

    /// Assign all three slots and recenter. Covers already cached appear
    /// synchronously; the rest arrive through the pipeline.
    pub fn set_items(&mut self, prev: Option<Item>, current: Option<Item>, next: Option<Item>) {
        self.request_slot(SLOT_PREVIOUS, prev);
        self.request_slot(SLOT_CURRENT, current);
        self.request_slot(SLOT_NEXT, next);
        self.reset_scroll();
    }

    /// Pull the current (previous, current, next) triple from the item
    /// source and apply it.
    pub fn refresh_items(&mut self) {
        let (prev, current, next) = self.source.triple();
        self.set_items(prev, current, next);
    }

    /// Feed one decoded pointer event from the host input boundary.
    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        let ctx = GestureContext {
            offset: self.scroll_x,
            width: self.width as f32,
            has_previous: self.has_previous(),
        };
        match self.gesture.handle(event, ctx, &self.config) {
            GestureUpdate::None => {}
            GestureUpdate::Pressed => self.interrupt_animation(),
            GestureUpdate::Scroll(dx) => self.apply_scroll_delta(dx),
            GestureUpdate::Released(release) => self.finish_gesture(release, event.t_ms()),
        }
    }

    /// Advance time: long-press detection, pipeline completions and the
    /// snap animation (committing navigation when it lands off-center).
    pub fn tick(&mut self, now_ms: u64) {
        if self.gesture.poll_long_press(now_ms, &self.config) {
            self.callback.on_activate_long();
        }

        self.apply_finished_generations();

        if let Some(offset) = self.scroller.tick(now_ms) {
            self.scroll_x = offset;
            self.needs_redraw = true;
            if self.scroller.is_finished() {
                if let Some(target) = self.tentative.take() {
                    self.commit_navigation(target);
                }
            }
        }
    }

    /// Paint the current state into `surface`.
    pub fn render(&self, surface: &mut RgbaImage) {
        render::compose(&self.slots, self.scroll_x, self.width, self.height, surface);
    }

    fn has_previous(&self) -> bool {
        self.slots[SLOT_PREVIOUS]
            .item
            .as_ref()
            .is_some_and(|item| !item.is_none())
    }

    fn center(&self) -> f32 {
        self.width as f32
    }

    fn reset_scroll(&mut self) {
        self.scroller.abort();
        self.tentative = None;
        self.scroll_x = self.center();
        self.needs_redraw = true;
    }

    fn apply_scroll_delta(&mut self, dx: f32) {
        let width = self.width as f32;
        let min = if self.has_previous() { 0.0 } else { width };
        let clamped = (self.scroll_x + dx).clamp(min, 2.0 * width);
        if clamped != self.scroll_x {
            self.scroll_x = clamped;
            self.needs_redraw = true;
        }
    }

    /// A press lands mid-animation: jump to the animation's end state
    /// (committing a pending navigation) so the new gesture starts from a
    /// settled carousel.
    fn interrupt_animation(&mut self) {
        if self.scroller.is_finished() {
            return;
        }
        self.scroll_x = self.scroller.final_offset();
        self.scroller.abort();
        self.needs_redraw = true;
        if let Some(target) = self.tentative.take() {
            self.commit_navigation(target);
        }
    }

    fn finish_gesture(&mut self, release: Release, now_ms: u64) {
        match release.action {
            Some(GestureAction::Activate) => self.callback.on_activate(),
            Some(GestureAction::SwipeUp) => self.callback.on_swipe_up(),
            Some(GestureAction::SwipeDown) => self.callback.on_swipe_down(),
            None => {}
        }
        self.scroller
            .start(self.scroll_x, release.target, self.width as f32, now_ms);
        self.tentative = (release.target != SLOT_CURRENT).then_some(release.target);
        self.needs_redraw = true;
    }

    /// Shift the triptych one step and let the host catch up: callbacks
    /// first (so the source advances), then re-pull the triple. The two
    /// surviving covers come straight back out of the cache.
    fn commit_navigation(&mut self, target: usize) {
        debug!("committing navigation to slot {}", target);
        if target == SLOT_NEXT {
            self.slots.rotate_left(1);
            self.slots[SLOT_NEXT] = Slot::default();
            self.callback.on_next();
        } else {
            self.slots.rotate_right(1);
            self.slots[SLOT_PREVIOUS] = Slot::default();
            self.callback.on_previous();
        }
        self.refresh_items();
    }

    /// Assign `item` to a slot: absent items blank the slot, cached covers
    /// bind synchronously, anything else keeps the stale cover visible and
    /// goes through the pipeline.
    fn request_slot(&mut self, index: usize, item: Option<Item>) {
        self.slots[index].item = item.clone();
        let item = match item {
            Some(item) if !item.is_none() => item,
            _ => {
                self.slots[index].cover = None;
                self.needs_redraw = true;
                return;
            }
        };

        if let Some(cover) = self.cache.get(item.id) {
            self.cache.touch(item.id);
            self.slots[index].cover = Some(cover);
            self.needs_redraw = true;
            return;
        }

        if self.width == 0 || self.height == 0 {
            // nothing to generate yet; resize will re-request
            return;
        }

        let reuse = if self.cache.is_full() {
            self.cache.discard_oldest()
        } else {
            None
        };
        let request = GenerateRequest {
            slot: index,
            item,
            width: self.width,
            height: self.height,
            reuse,
        };
        if let Err(err) = self.pipeline.submit(request) {
            warn!("cover request for slot {} dropped: {}", index, err);
        }
    }

    fn apply_finished_generations(&mut self) {
        for result in self.pipeline.poll() {
            let cover = Arc::new(result.cover);
            let evicted = self.cache.put(result.item_id, cover.clone());
            drop(evicted);

            let slot = &mut self.slots[result.slot];
            match &slot.item {
                Some(item) if item.id == result.item_id => {
                    slot.cover = Some(cover);
                    self.needs_redraw = true;
                }
                _ => {
                    // the slot moved on while this was in flight
                    debug!(
                        "discarding stale cover for item {} (slot {})",
                        result.item_id, result.slot
                    );
                }
            }
        }
    }
}
