//! Shared in-memory host for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use homesheet::{HomeConfig, HomeEvent, HomeHost, HomeScreen, RailId, Slide};
use homesheet_core::geometry::Point;
use homesheet_core::viewport::{MemoryViewport, ScrollableViewport};
use homesheet_core::{Duration, Instant};

pub const VIEWPORT_W: f64 = 393.0;
pub const VIEWPORT_H: f64 = 852.0;

pub struct TestHost {
    pub carousel: MemoryViewport,
    pub content: MemoryViewport,
    pub rails: BTreeMap<RailId, MemoryViewport>,
}

impl TestHost {
    pub fn new(slides: usize) -> Self {
        Self {
            carousel: MemoryViewport::new(VIEWPORT_W, VIEWPORT_W * (slides as f64 + 2.0)),
            content: MemoryViewport::new(VIEWPORT_H - 67.0, 3200.0),
            rails: BTreeMap::new(),
        }
    }
}

impl HomeHost for TestHost {
    fn carousel(&mut self) -> &mut dyn ScrollableViewport {
        &mut self.carousel
    }

    fn content(&mut self) -> &mut dyn ScrollableViewport {
        &mut self.content
    }

    fn rail(&self, id: RailId) -> Option<&dyn ScrollableViewport> {
        self.rails.get(&id).map(|r| r as &dyn ScrollableViewport)
    }
}

pub fn slides(n: usize) -> Vec<Slide> {
    (0..n)
        .map(|i| Slide::image(format!("slide-{i}"), format!("media/{i}.jpg")))
        .collect()
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A mounted screen, its host, and a clock.
pub struct Harness {
    pub screen: HomeScreen,
    pub host: TestHost,
    pub t0: Instant,
    pub now: Instant,
}

impl Harness {
    pub fn new(slides_len: usize) -> Self {
        Self::with_config(HomeConfig::default(), slides_len)
    }

    pub fn with_config(config: HomeConfig, slides_len: usize) -> Self {
        let mut host = TestHost::new(slides_len);
        let mut screen = HomeScreen::new(config, VIEWPORT_W, VIEWPORT_H);
        let t0 = Instant::now();
        screen.mount(slides(slides_len), &mut host, t0);
        let mut h = Self {
            screen,
            host,
            t0,
            now: t0,
        };
        h.frame();
        h
    }

    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }

    pub fn frame(&mut self) -> Vec<HomeEvent> {
        self.screen.frame(self.now, &mut self.host)
    }

    /// Run 16ms frames for `total`.
    pub fn run_for(&mut self, total: Duration) -> Vec<HomeEvent> {
        let mut events = Vec::new();
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.advance(ms(16));
            elapsed += ms(16);
            events.extend(self.frame());
        }
        events
    }

    /// Run frames until the sheet stops settling.
    pub fn settle(&mut self) -> Vec<HomeEvent> {
        let mut events = Vec::new();
        for _ in 0..300 {
            self.advance(ms(16));
            events.extend(self.frame());
            if !self.screen.panel().is_settling() {
                break;
            }
        }
        events
    }

    /// A pointer path sampled every 10ms, then released 5ms after the last
    /// point.
    pub fn drag(
        &mut self,
        origin: homesheet::PointerOrigin,
        path: &[(f64, f64)],
    ) -> Vec<HomeEvent> {
        let Some((&(x, y), rest)) = path.split_first() else {
            return Vec::new();
        };
        self.screen
            .pointer_down(Point::new(x, y), origin, self.now, &mut self.host);
        for &(x, y) in rest {
            self.advance(ms(10));
            self.screen
                .pointer_move(Point::new(x, y), self.now, &mut self.host);
        }
        self.advance(ms(5));
        self.screen.pointer_up(self.now, &mut self.host)
    }

    pub fn expand(&mut self) {
        let path: Vec<_> = (0..=10).map(|i| (200.0, 470.0 - 15.0 * i as f64)).collect();
        self.drag(homesheet::PointerOrigin::Handle, &path);
        self.settle();
        assert_eq!(self.screen.mode(), homesheet::PanelMode::Expanded);
    }
}

/// Vertical path from `y0` moving `dy` in `steps` equal moves.
pub fn vertical(x: f64, y0: f64, dy: f64, steps: usize) -> Vec<(f64, f64)> {
    (0..=steps)
        .map(|i| (x, y0 + dy * i as f64 / steps as f64))
        .collect()
}
