//! End-to-end flows through the public carousel surface: a test host
//! provides the playlist, the callbacks and a deterministic generator;
//! time is driven by hand through `tick`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use coverflick::{
    AssetGenerator, CarouselCallback, Config, CoverCarousel, CoverImage, Error, Item, ItemSource,
    PointerEvent,
};

#[derive(Default)]
struct HostState {
    items: Vec<Item>,
    pos: usize,
    next: usize,
    previous: usize,
    swipe_up: usize,
    swipe_down: usize,
    activate: usize,
    activate_long: usize,
}

/// Shared playlist + callback recorder standing in for the media player.
#[derive(Clone)]
struct Host(Arc<Mutex<HostState>>);

impl Host {
    fn new(ids: &[i64], pos: usize) -> Self {
        Host(Arc::new(Mutex::new(HostState {
            items: ids.iter().map(|&id| Item::with_id(id)).collect(),
            pos,
            ..Default::default()
        })))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.0.lock().unwrap()
    }
}

impl ItemSource for Host {
    fn triple(&self) -> (Option<Item>, Option<Item>, Option<Item>) {
        let state = self.state();
        let at = |offset: isize| -> Option<Item> {
            let index = state.pos as isize + offset;
            if index < 0 {
                return None;
            }
            state.items.get(index as usize).cloned()
        };
        (at(-1), at(0), at(1))
    }
}

impl CarouselCallback for Host {
    fn on_next(&mut self) {
        let mut state = self.state();
        state.pos += 1;
        state.next += 1;
    }

    fn on_previous(&mut self) {
        let mut state = self.state();
        state.pos -= 1;
        state.previous += 1;
    }

    fn on_swipe_up(&mut self) {
        self.state().swipe_up += 1;
    }

    fn on_swipe_down(&mut self) {
        self.state().swipe_down += 1;
    }

    fn on_activate(&mut self) {
        self.state().activate += 1;
    }

    fn on_activate_long(&mut self) {
        self.state().activate_long += 1;
    }
}

/// Fills each cover with a shade derived from the item id and counts how
/// often a reusable buffer was handed in.
struct ShadeGenerator {
    reused: Arc<AtomicUsize>,
}

impl AssetGenerator for ShadeGenerator {
    fn generate(
        &self,
        item: &Item,
        width: u32,
        height: u32,
        reuse: Option<CoverImage>,
    ) -> Result<CoverImage, Error> {
        if reuse.is_some() {
            self.reused.fetch_add(1, Ordering::SeqCst);
        }
        let mut cover = match reuse {
            Some(buffer) if buffer.dimensions() == (width, height) => buffer,
            _ => CoverImage::new(width, height),
        };
        let shade = item.id as u8;
        for pixel in cover.pixels_mut() {
            *pixel = image::Rgba([shade, shade, shade, 255]);
        }
        Ok(cover)
    }
}

const WIDTH: u32 = 300;
const HEIGHT: u32 = 300;

struct Fixture {
    carousel: CoverCarousel,
    host: Host,
    reused: Arc<AtomicUsize>,
    now: u64,
}

impl Fixture {
    fn new(ids: &[i64], pos: usize) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let host = Host::new(ids, pos);
        let reused = Arc::new(AtomicUsize::new(0));
        let generator = ShadeGenerator {
            reused: reused.clone(),
        };
        let mut carousel = CoverCarousel::new(
            Config::default(),
            Box::new(generator),
            Box::new(host.clone()),
            Box::new(host.clone()),
        )
        .unwrap();
        carousel.resize(WIDTH, HEIGHT);
        carousel.refresh_items();
        Fixture {
            carousel,
            host,
            reused,
            now: 1_000,
        }
    }

    /// Tick (advancing time) until `cond` holds, sleeping between rounds
    /// so the worker can make progress.
    fn pump_until(&mut self, cond: impl Fn(&CoverCarousel) -> bool) {
        for _ in 0..1000 {
            self.carousel.tick(self.now);
            if cond(&self.carousel) {
                return;
            }
            self.now += 20;
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("condition not reached while pumping");
    }

    fn wait_for_covers(&mut self, slots: &[usize]) {
        let slots = slots.to_vec();
        self.pump_until(move |carousel| slots.iter().all(|&i| carousel.slot(i).cover().is_some()));
    }

    fn down(&mut self, x: f32, y: f32) {
        self.carousel.on_pointer_event(PointerEvent::Down {
            pointer: 1,
            x,
            y,
            t_ms: self.now,
        });
    }

    fn move_to(&mut self, x: f32, y: f32, after_ms: u64) {
        self.now += after_ms;
        self.carousel.on_pointer_event(PointerEvent::Move {
            pointer: 1,
            x,
            y,
            t_ms: self.now,
        });
    }

    fn up(&mut self, x: f32, y: f32, after_ms: u64) {
        self.now += after_ms;
        self.carousel.on_pointer_event(PointerEvent::Up {
            pointer: 1,
            x,
            y,
            t_ms: self.now,
        });
    }
}

#[test]
fn initial_load_generates_all_three_covers() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    assert_eq!(fixture.carousel.slot(1).item().unwrap().id, 2);
    assert_eq!(fixture.carousel.scroll_offset(), WIDTH as f32);
    assert_eq!(fixture.carousel.cache().len(), 3);

    let mut surface = CoverImage::new(WIDTH, HEIGHT);
    fixture.carousel.render(&mut surface);
    // center of the window shows the current item's cover
    assert_eq!(
        surface.get_pixel(WIDTH / 2, HEIGHT / 2),
        &image::Rgba([2, 2, 2, 255])
    );
}

#[test]
fn slow_half_drag_commits_to_previous() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    // drag the finger 150px right, slowly enough that release velocity
    // falls inside the window with no movement left in it
    fixture.down(100.0, 150.0);
    fixture.move_to(150.0, 150.0, 300);
    fixture.move_to(200.0, 150.0, 300);
    fixture.move_to(250.0, 150.0, 300);
    assert_eq!(fixture.carousel.scroll_offset(), 150.0);
    fixture.up(250.0, 150.0, 500);

    fixture.pump_until(|carousel| !carousel.is_animating());
    fixture.pump_until(|carousel| carousel.scroll_offset() == WIDTH as f32);

    let state = fixture.host.state();
    assert_eq!(state.previous, 1);
    assert_eq!(state.next, 0);
    assert_eq!(state.pos, 0);
    drop(state);

    // track 1 is now current and there is nothing before it
    assert_eq!(fixture.carousel.slot(1).item().unwrap().id, 1);
    assert!(fixture.carousel.slot(0).item().is_none());
}

#[test]
fn fast_left_fling_commits_to_next() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    fixture.down(250.0, 150.0);
    fixture.move_to(200.0, 150.0, 30);
    fixture.move_to(150.0, 150.0, 30);
    fixture.up(130.0, 150.0, 20);

    fixture.pump_until(|carousel| carousel.scroll_offset() == WIDTH as f32 && !carousel.is_animating());

    let state = fixture.host.state();
    assert_eq!(state.next, 1);
    assert_eq!(state.pos, 2);
    drop(state);
    assert_eq!(fixture.carousel.slot(1).item().unwrap().id, 3);
    assert!(fixture.carousel.slot(2).item().is_none());
}

#[test]
fn fling_toward_missing_previous_is_clamped() {
    // already at the first track: no previous item
    let mut fixture = Fixture::new(&[1, 2], 0);
    fixture.wait_for_covers(&[1, 2]);

    fixture.down(100.0, 150.0);
    fixture.move_to(180.0, 150.0, 30);
    fixture.up(260.0, 150.0, 30);

    fixture.pump_until(|carousel| !carousel.is_animating());

    let state = fixture.host.state();
    assert_eq!(state.previous, 0);
    assert_eq!(state.pos, 0);
    drop(state);
    assert_eq!(fixture.carousel.slot(1).item().unwrap().id, 1);
    // dragging right could not move past center either
    assert_eq!(fixture.carousel.scroll_offset(), WIDTH as f32);
}

#[test]
fn tap_activates_current_exactly_once() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    fixture.down(150.0, 150.0);
    fixture.up(153.0, 148.0, 120);
    fixture.pump_until(|carousel| !carousel.is_animating());

    let state = fixture.host.state();
    assert_eq!(state.activate, 1);
    assert_eq!(state.activate_long, 0);
    assert_eq!(state.next + state.previous, 0);
}

#[test]
fn long_press_fires_and_suppresses_tap() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    fixture.down(150.0, 150.0);
    let long_press_at = fixture.now + 600;
    fixture.carousel.tick(long_press_at);
    assert_eq!(fixture.host.state().activate_long, 1);

    fixture.now = long_press_at;
    fixture.up(151.0, 150.0, 50);
    fixture.pump_until(|carousel| !carousel.is_animating());

    let state = fixture.host.state();
    assert_eq!(state.activate_long, 1);
    assert_eq!(state.activate, 0);
}

#[test]
fn vertical_fling_swipes_and_recenters() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    fixture.down(150.0, 250.0);
    fixture.move_to(150.0, 150.0, 40);
    fixture.up(150.0, 60.0, 40);
    fixture.pump_until(|carousel| !carousel.is_animating());

    let state = fixture.host.state();
    assert_eq!(state.swipe_up, 1);
    assert_eq!(state.swipe_down, 0);
    assert_eq!(state.next + state.previous, 0);
    drop(state);
    assert_eq!(fixture.carousel.scroll_offset(), WIDTH as f32);
    assert_eq!(fixture.carousel.slot(1).item().unwrap().id, 2);
}

#[test]
fn overflow_generation_reuses_the_evicted_buffer() {
    // empty playlist: nothing is generated until set_items below
    let mut fixture = Fixture::new(&[], 0);

    // fill the cache with 8 distinct covers
    fixture.carousel.set_items(
        Some(Item::with_id(10)),
        Some(Item::with_id(11)),
        Some(Item::with_id(12)),
    );
    fixture.pump_until(|carousel| carousel.cache().len() >= 3);
    fixture.carousel.set_items(
        Some(Item::with_id(13)),
        Some(Item::with_id(14)),
        Some(Item::with_id(15)),
    );
    fixture.pump_until(|carousel| carousel.cache().len() >= 6);
    fixture
        .carousel
        .set_items(Some(Item::with_id(16)), Some(Item::with_id(17)), None);
    fixture.pump_until(|carousel| carousel.cache().len() >= 8);
    assert_eq!(fixture.reused.load(Ordering::SeqCst), 0);

    // a ninth id: the oldest entry (10) surrenders its buffer to the
    // in-flight generation, then its mapping is evicted by the insert
    fixture.carousel.set_items(
        Some(Item::with_id(16)),
        Some(Item::with_id(17)),
        Some(Item::with_id(5)),
    );
    fixture.pump_until(|carousel| carousel.cache().get(5).is_some());

    assert_eq!(fixture.reused.load(Ordering::SeqCst), 1);
    assert_eq!(fixture.carousel.cache().len(), 8);
    assert!(fixture.carousel.cache().get(10).is_none());
    for id in 11..=17 {
        assert!(fixture.carousel.cache().get(id).is_some(), "id {} missing", id);
    }
}

#[test]
fn stale_result_is_cached_but_not_displayed() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);

    fixture
        .carousel
        .set_items(None, Some(Item::with_id(20)), None);
    // supersede before the first generation lands
    fixture
        .carousel
        .set_items(None, Some(Item::with_id(21)), None);

    fixture.pump_until(|carousel| {
        carousel.cache().get(20).is_some() && carousel.cache().get(21).is_some()
    });
    fixture.pump_until(|carousel| carousel.slot(1).cover().is_some());

    let shown = fixture.carousel.slot(1).cover().unwrap();
    let cached = fixture.carousel.cache().get(21).unwrap();
    assert!(Arc::ptr_eq(shown, &cached));
    assert_eq!(shown.get_pixel(0, 0), &image::Rgba([21, 21, 21, 255]));
}

#[test]
fn resize_regenerates_at_new_dimensions() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);
    assert_eq!(fixture.carousel.slot(1).cover().unwrap().dimensions(), (WIDTH, HEIGHT));

    fixture.carousel.resize(120, 90);
    // the cache was invalidated wholesale; new covers have not landed yet
    assert!(fixture.carousel.cache().is_empty());
    fixture.wait_for_covers(&[0, 1, 2]);

    assert_eq!(fixture.carousel.slot(1).cover().unwrap().dimensions(), (120, 90));
    assert_eq!(fixture.carousel.scroll_offset(), 120.0);
    // zero dimensions are ignored
    fixture.carousel.resize(0, 50);
    assert_eq!(fixture.carousel.viewport(), (120, 90));
}

#[test]
fn drag_deltas_never_leave_the_valid_range() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    fixture.down(150.0, 150.0);
    // a huge rightward move is absorbed at the low edge
    fixture.move_to(5000.0, 150.0, 100);
    assert_eq!(fixture.carousel.scroll_offset(), 0.0);
    // and a huge leftward move at the high edge
    fixture.move_to(-9000.0, 150.0, 100);
    assert_eq!(fixture.carousel.scroll_offset(), 2.0 * WIDTH as f32);
    fixture.up(-9000.0, 150.0, 600);
    fixture.pump_until(|carousel| !carousel.is_animating());
}

#[test]
fn redraw_requests_coalesce() {
    let mut fixture = Fixture::new(&[1, 2, 3], 1);
    fixture.wait_for_covers(&[0, 1, 2]);

    let _ = fixture.carousel.take_redraw_request();
    assert!(!fixture.carousel.take_redraw_request());

    fixture.down(150.0, 150.0);
    fixture.move_to(100.0, 150.0, 16);
    fixture.move_to(80.0, 150.0, 16);
    assert!(fixture.carousel.take_redraw_request());
    assert!(!fixture.carousel.take_redraw_request());
    fixture.up(80.0, 150.0, 600);
    fixture.pump_until(|carousel| !carousel.is_animating());
}
