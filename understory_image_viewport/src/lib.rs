// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_image_viewport --heading-base-level=0

//! Understory Image Viewport: scale and session coordination for an image shown
//! inside a pan/zoom viewport.
//!
//! This crate is the headless core of a zoomable image view. It decides:
//! - The pixel size of the image, from an explicit hint or an asynchronous
//!   dimension probe.
//! - The initial scale that makes the image *cover* the viewport, and the
//!   zoom ceiling.
//! - When pan/zoom state must be thrown away because the image changed.
//!
//! It does **not** decode or draw images, and it does not implement gestures.
//! Callers are expected to:
//! - Provide a [`DimensionProbe`] for remote sources and feed completions back
//!   through [`ImageViewport::deliver_probe`].
//! - Implement [`TransformEngine`] on top of their pan/zoom engine.
//! - Forward layout and load notifications to the [`ImageViewport`].
//!
//! The decisions themselves are made by a pure reducer ([`reduce`]) over
//! [`Event`]s; [`ImageViewport`] is a thin composition root that executes the
//! resulting [`Effect`]s.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_image_viewport::{
//!     ImageSource, ImageViewport, PixelRatio, ProbeRequest, RenderMode, ResetCommand,
//!     TransformConfig, TransformEngine, ViewportOptions, ViewportProps, DimensionProbe,
//!     ProbeOutcome,
//! };
//!
//! #[derive(Default)]
//! struct Requests(Vec<ProbeRequest>);
//!
//! impl DimensionProbe for Requests {
//!     fn probe(&mut self, request: ProbeRequest) {
//!         self.0.push(request);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Engine(Option<TransformConfig>);
//!
//! impl TransformEngine for Engine {
//!     fn configure(&mut self, config: &TransformConfig) {
//!         self.0 = Some(*config);
//!     }
//!     fn reset_transform(&mut self, _command: ResetCommand) {}
//! }
//!
//! let props = ViewportProps::new(ImageSource::remote("https://example.com/photo.jpg"))
//!     .with_options(ViewportOptions::default().with_automatic_cover_scale(true));
//! let mut viewport =
//!     ImageViewport::new(props, PixelRatio::ONE, Requests::default(), Engine::default(), ());
//!
//! viewport.mount();
//! viewport.on_layout(Size::new(300.0, 200.0));
//! // Nothing to show until the image size is known.
//! assert_eq!(viewport.render_mode(), RenderMode::Measuring);
//!
//! let ticket = viewport.probe().0[0].ticket;
//! viewport.deliver_probe(ticket, ProbeOutcome::Size { width: 600, height: 600 });
//! viewport.on_load(viewport.session());
//!
//! let config = viewport.engine().0.unwrap();
//! assert_eq!(config.initial_scale, 1.5);
//! assert_eq!(config.max_scale, 3.0);
//! assert!(config.transform_enabled);
//! ```
//!
//! ## Cover fit
//!
//! The renderer is assumed to draw the image at *contain* scale. The cover
//! scale is the extra multiplier needed so the image fills the viewport along
//! both axes; it is always at least `1`. See [`compute_cover`].
//!
//! ## Sessions
//!
//! Each image identity gets its own [`SessionId`]. Changing the source (see
//! [`same_source`]) starts a new session, so the engine never carries a zoom
//! level over to an unrelated image. Probe results and load signals for an
//! earlier session are discarded.
//!
//! ## Features
//!
//! - `std` (default): build with the standard library.
//! - `libm`: `no_std` float math through Kurbo.
//! - `serde`: serialize and deserialize [`ViewportOptions`] and friends.
//! - `image_probe`: `FileDimensionProbe`, which reads dimensions from image
//!   files.
//!
//! This crate is `no_std` and uses `alloc`. Diagnostics are emitted through
//! `tracing`; no subscriber is installed.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod controller;
mod error;
#[cfg(feature = "image_probe")]
mod file_probe;
mod options;
mod resolve;
mod scale;
mod session;
mod size;
mod source;
mod viewport;

pub use controller::{
    ControllerState, Effect, Effects, Event, Platform, RenderMode, ResetCommand, TransformConfig,
    TransformSessionController, Transition, ViewportSnapshot, reduce,
};
pub use error::ViewportError;
#[cfg(feature = "image_probe")]
pub use file_probe::FileDimensionProbe;
pub use options::{ViewportOptions, ViewportProps};
pub use resolve::{
    DimensionProbe, DimensionResolver, NoProbe, ProbeDelivery, ProbeOutcome, ProbeRequest,
    ProbeTicket, Resolution, resolve,
};
pub use scale::{
    MAX_SCALE_HEADROOM, PixelRatio, ScaleConfig, compute_cover, compute_max_scale,
    reconcile_max_scale,
};
pub use session::{LoadState, Session, SessionId};
pub use size::{PixelSize, is_measured};
pub use source::{EmbeddedRef, ImageSource, same_source};
pub use viewport::{ImageViewport, TransformEngine, ViewTransform, ViewportListener};
