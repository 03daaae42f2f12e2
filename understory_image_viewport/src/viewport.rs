// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition root: wires the controller to a probe, a transform engine and
//! the caller's listener.
//!
//! [`ImageViewport`] turns host callbacks into controller [`Event`]s and
//! executes the resulting [`Effect`]s:
//!
//! - probe requests go to the [`DimensionProbe`],
//! - engine configuration and resets go to the [`TransformEngine`],
//! - resolved sizes, load progress, gestures and diagnostics go to the
//!   [`ViewportListener`].
//!
//! The engine only exists while the viewport renders interactively; while a
//! cover fit is still being measured it is neither configured nor reset.

use kurbo::{Size, Vec2};
use tracing::{error, warn};

use crate::controller::{
    Effect, Event, Platform, RenderMode, ResetCommand, TransformConfig,
    TransformSessionController, ViewportSnapshot,
};
use crate::error::ViewportError;
use crate::options::ViewportProps;
use crate::resolve::{DimensionProbe, ProbeOutcome, ProbeTicket};
use crate::scale::PixelRatio;
use crate::session::SessionId;
use crate::size::PixelSize;

/// The external pan/zoom engine.
pub trait TransformEngine {
    /// Applies a new configuration. A changed [`TransformConfig::session`]
    /// means the engine must discard all gesture state and start over.
    fn configure(&mut self, config: &TransformConfig);

    /// Jumps to a freshly computed scale, dropping the live transform.
    fn reset_transform(&mut self, command: ResetCommand);
}

/// Pan/zoom state reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Current zoom factor.
    pub scale: f64,
    /// Current translation.
    pub translate: Vec2,
}

/// Caller callbacks. Every method defaults to doing nothing.
#[expect(unused_variables, reason = "default implementations ignore their arguments")]
pub trait ViewportListener {
    /// A probe resolved the image's pixel size.
    fn size_resolved(&mut self, size: PixelSize) {}

    /// The user let go of a pan/zoom gesture.
    fn transform_gesture_released(&mut self, transform: ViewTransform) {}

    /// The engine's transform changed.
    fn view_transformed(&mut self, transform: ViewTransform) {}

    /// The renderer started loading the image.
    fn load_start(&mut self) {}

    /// The renderer finished loading the image.
    fn load(&mut self) {}

    /// A recoverable problem occurred.
    fn diagnostic(&mut self, error: &ViewportError) {}
}

impl ViewportListener for () {}

/// A headless image viewport.
#[derive(Debug)]
pub struct ImageViewport<P, E, L = ()> {
    controller: TransformSessionController,
    probe: P,
    engine: E,
    listener: L,
    configured: Option<TransformConfig>,
    last_reset: Option<(SessionId, ResetCommand)>,
}

impl<P: DimensionProbe, E: TransformEngine, L: ViewportListener> ImageViewport<P, E, L> {
    /// Creates an unmounted viewport.
    pub fn new(
        props: ViewportProps,
        pixel_ratio: PixelRatio,
        probe: P,
        engine: E,
        listener: L,
    ) -> Self {
        let platform = Platform {
            pixel_ratio,
            probe_available: probe.is_available(),
        };
        Self {
            controller: TransformSessionController::new(props, platform),
            probe,
            engine,
            listener,
            configured: None,
            last_reset: None,
        }
    }

    /// Mounts the viewport and starts resolving the image size.
    pub fn mount(&mut self) {
        self.dispatch(Event::Mount);
    }

    /// Applies new caller props.
    pub fn set_props(&mut self, props: ViewportProps) {
        self.dispatch(Event::PropsChanged(props));
    }

    /// Records a layout measurement of the viewport, in layout units.
    pub fn on_layout(&mut self, size: Size) {
        self.dispatch(Event::Layout(size));
    }

    /// The renderer started loading the image of `session`.
    ///
    /// `session` is the [`TransformConfig::session`] the renderer was set up
    /// with. Signals for an earlier session are dropped.
    pub fn on_load_start(&mut self, session: SessionId) {
        let current = session == self.session();
        self.dispatch(Event::LoadStart(session));
        if current {
            self.listener.load_start();
        }
    }

    /// The renderer finished loading the image of `session`.
    ///
    /// Signals for an earlier session are dropped.
    pub fn on_load(&mut self, session: SessionId) {
        let current = session == self.session();
        self.dispatch(Event::LoadEnd(session));
        if current {
            self.listener.load();
        }
    }

    /// Feeds a probe completion back in.
    pub fn deliver_probe(&mut self, ticket: ProbeTicket, outcome: ProbeOutcome) {
        self.dispatch(Event::ProbeFinished { ticket, outcome });
    }

    /// Forwards a gesture release from the engine.
    pub fn on_transform_gesture_released(&mut self, transform: ViewTransform) {
        self.listener.transform_gesture_released(transform);
    }

    /// Forwards a transform change from the engine.
    pub fn on_view_transformed(&mut self, transform: ViewTransform) {
        self.listener.view_transformed(transform);
    }

    /// The current transform session.
    #[must_use]
    pub fn session(&self) -> SessionId {
        self.controller.state().session().id
    }

    /// What to render right now.
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.controller.state().render_mode()
    }

    /// See [`TransformSessionController::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        self.controller.snapshot()
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &TransformSessionController {
        &self.controller
    }

    /// The dimension probe.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// The dimension probe, mutably.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// The transform engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The listener, mutably.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    fn dispatch(&mut self, event: Event) {
        let effects = self.controller.handle(event);
        // Configure first so a reset lands on the current session's engine.
        self.sync_engine();
        for effect in effects {
            self.perform(effect);
        }
    }

    fn sync_engine(&mut self) {
        let snapshot = self.controller.snapshot();
        if snapshot.render_mode != RenderMode::Interactive {
            return;
        }
        if self.configured != Some(snapshot.transform) {
            self.engine.configure(&snapshot.transform);
            self.configured = Some(snapshot.transform);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::StartProbe(request) => self.probe.probe(request),
            Effect::Reset(command) => {
                let session = self.session();
                if self.last_reset == Some((session, command)) {
                    return;
                }
                self.last_reset = Some((session, command));
                self.engine.reset_transform(command);
            }
            Effect::SizeResolved(size) => self.listener.size_resolved(size),
            Effect::Diagnostic(err) => {
                match &err {
                    ViewportError::DimensionProbeFailure { .. } => {
                        error!(error = %err, "image dimensions unavailable");
                    }
                    _ => warn!(error = %err, "image viewport misconfigured"),
                }
                self.listener.diagnostic(&err);
            }
        }
    }
}
