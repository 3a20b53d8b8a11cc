#![forbid(unsafe_code)]

//! Gesture and animation engine for a layered home screen.
//!
//! # Role in homesheet
//! This crate composes the primitives from `homesheet-core` into the four
//! components of the home screen and the [`HomeScreen`] that wires them to a
//! host platform.
//!
//! # Primary responsibilities
//! - **GestureRouter**: one-time axis lock per gesture and the decision
//!   between dragging the sheet and letting a scroller have the pointer.
//! - **PanelController**: the collapsed/expanded sheet as a pure state
//!   machine plus a cancellable spring settle.
//! - **CarouselEngine**: the clone-padded looping media carousel, its settle
//!   detection, autoplay and preload hints.
//! - **ElasticRail**: throttled drag bounds for rails in the sheet content.
//! - **HomeConfig**: every tunable in one validated, loadable struct.
//!
//! # Example
//! ```
//! use homesheet::{HomeConfig, HomeHost, HomeScreen, PanelMode, PointerOrigin, RailId, Slide};
//! use homesheet_core::geometry::Point;
//! use homesheet_core::viewport::{MemoryViewport, ScrollableViewport};
//! use homesheet_core::{Duration, Instant};
//!
//! struct Host {
//!     carousel: MemoryViewport,
//!     content: MemoryViewport,
//! }
//!
//! impl HomeHost for Host {
//!     fn carousel(&mut self) -> &mut dyn ScrollableViewport { &mut self.carousel }
//!     fn content(&mut self) -> &mut dyn ScrollableViewport { &mut self.content }
//!     fn rail(&self, _id: RailId) -> Option<&dyn ScrollableViewport> { None }
//! }
//!
//! let mut host = Host {
//!     carousel: MemoryViewport::new(393.0, 393.0 * 4.0),
//!     content: MemoryViewport::new(700.0, 2400.0),
//! };
//! let mut screen = HomeScreen::new(HomeConfig::default(), 393.0, 852.0);
//! let t = Instant::now();
//! screen.mount(vec![Slide::image("a", "a.jpg"), Slide::image("b", "b.jpg")], &mut host, t);
//!
//! screen.pointer_down(Point::new(200.0, 470.0), PointerOrigin::Handle, t, &mut host);
//! screen.pointer_move(Point::new(200.0, 320.0), t + Duration::from_millis(40), &mut host);
//! screen.pointer_up(t + Duration::from_millis(50), &mut host);
//! assert_eq!(screen.mode(), PanelMode::Expanded);
//! ```

pub mod carousel;
pub mod config;
pub mod gesture;
pub mod layout;
pub mod panel;
pub mod rail;
pub mod screen;

pub use carousel::{CarouselConfig, CarouselEngine, CloneJump, MediaType, Slide, SlideSettled};
pub use config::{ConfigError, HomeConfig};
pub use gesture::{ForwardTarget, GestureConfig, GestureRouter, PointerOrigin, Routing};
pub use layout::{LayoutConfig, ScreenLayout};
pub use panel::{
    DragOutcome, PanelBounds, PanelConfig, PanelController, PanelEffect, PanelEvent,
    PanelMachine, PanelMode, PanelState, SpringConfig,
};
pub use rail::{ElasticRail, RailConfig, RailConstraint, RailId, RailUpdate};
pub use screen::{FrameConfig, HomeEvent, HomeHost, HomeObserver, HomeScreen};
