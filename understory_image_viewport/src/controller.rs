// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform session controller: a pure reducer over viewport events.
//!
//! All coordination state lives in one [`ControllerState`] record. Each
//! [`Event`] is folded into it by [`reduce`], which returns the next state
//! together with the side effects the host must perform ([`Effect`]). Nothing
//! is mutated in place: [`TransformSessionController::handle`] swaps the whole
//! record, so a render pass never observes a viewport size paired with a scale
//! computed for another one.
//!
//! ## State
//!
//! Load progress (`Unloaded → Loading → Loaded`) and scale knowledge
//! (unknown → known) are tracked independently:
//!
//! - Gestures are enabled only once the current image has loaded. Load
//!   signals name the session they belong to; signals for an earlier session
//!   are dropped.
//! - The cover-fit initial scale is computed as soon as both the viewport and
//!   the image size are known, in whatever order they arrive.
//! - A new image identity (see [`same_source`]) starts a new session: the
//!   session id moves forward, load progress and any computed cover scale are
//!   dropped, and dimensions are resolved again.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Size;
//! use understory_image_viewport::{
//!     Effect, Event, ImageSource, Platform, ProbeOutcome, RenderMode,
//!     TransformSessionController, ViewportOptions, ViewportProps,
//! };
//!
//! let props = ViewportProps::new(ImageSource::remote("https://example.com/a.jpg"))
//!     .with_options(ViewportOptions::default().with_automatic_cover_scale(true));
//! let mut controller = TransformSessionController::new(props, Platform::default());
//!
//! // Mounting asks the host to probe the image size.
//! let effects = controller.handle(Event::Mount);
//! let Some(Effect::StartProbe(request)) = effects.first() else { unreachable!() };
//! let ticket = request.ticket;
//!
//! controller.handle(Event::Layout(Size::new(300.0, 200.0)));
//! assert_eq!(controller.state().render_mode(), RenderMode::Measuring);
//!
//! controller.handle(Event::ProbeFinished {
//!     ticket,
//!     outcome: ProbeOutcome::Size { width: 600, height: 600 },
//! });
//! let snapshot = controller.snapshot();
//! assert_eq!(snapshot.render_mode, RenderMode::Interactive);
//! assert_eq!(snapshot.scale.initial_scale, Some(1.5));
//! ```

use kurbo::{Size, Vec2};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::ViewportError;
use crate::options::ViewportProps;
use crate::resolve::{
    DimensionResolver, ProbeDelivery, ProbeOutcome, ProbeRequest, ProbeTicket, Resolution,
    resolve,
};
use crate::scale::{PixelRatio, ScaleConfig, compute_cover};
use crate::session::{LoadState, Session, SessionId};
use crate::size::{PixelSize, is_measured};
use crate::source::same_source;

/// Something that happened to the viewport.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The viewport was mounted. Only the first mount has an effect.
    Mount,
    /// The caller supplied new props.
    PropsChanged(ViewportProps),
    /// Layout measured the viewport, in layout units.
    Layout(Size),
    /// The renderer started loading the image for the given session.
    LoadStart(SessionId),
    /// The renderer finished loading the image for the given session.
    LoadEnd(SessionId),
    /// A dimension probe called back.
    ProbeFinished {
        /// Ticket of the request the outcome belongs to.
        ticket: ProbeTicket,
        /// What the probe reported.
        outcome: ProbeOutcome,
    },
}

/// Instruction for the transform engine to drop its live gesture state and
/// jump to a freshly computed scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResetCommand {
    /// Scale to apply.
    pub scale: f64,
    /// Translation to apply.
    pub translate: Vec2,
}

impl ResetCommand {
    /// A reset to `scale`, centered.
    #[must_use]
    pub fn centered(scale: f64) -> Self {
        Self {
            scale,
            translate: Vec2::ZERO,
        }
    }
}

/// A side effect requested by the reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Start a dimension probe.
    StartProbe(ProbeRequest),
    /// Reset the live transform of the engine.
    Reset(ResetCommand),
    /// A probe resolved the image size.
    SizeResolved(PixelSize),
    /// Report a recoverable problem.
    Diagnostic(ViewportError),
}

/// Effects produced by one event. Usually zero, one or two.
pub type Effects = SmallVec<[Effect; 2]>;

/// What the composition layer should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// A cover-fit scale is requested but not known yet; render an empty
    /// placeholder that only reports layout.
    Measuring,
    /// Render the image inside the transform engine.
    Interactive,
}

/// Host capabilities the controller depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    /// Device pixels per layout unit.
    pub pixel_ratio: PixelRatio,
    /// Whether a dimension probe exists.
    pub probe_available: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            pixel_ratio: PixelRatio::ONE,
            probe_available: true,
        }
    }
}

/// Configuration consumed by the external pan/zoom transform engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformConfig {
    /// Session key. When it changes the engine must start from scratch.
    pub session: SessionId,
    /// Gestures are accepted at all.
    pub transform_enabled: bool,
    /// Zoom gestures are accepted.
    pub scale_enabled: bool,
    /// Pan gestures are accepted.
    pub translate_enabled: bool,
    /// Rubber-band resistance past the limits.
    pub enable_resistance: bool,
    /// Clamp to `max_scale` and the content bounds.
    pub enable_limits: bool,
    /// Zoom ceiling.
    pub max_scale: f64,
    /// Starting scale; `1` while the initial scale is undetermined.
    pub initial_scale: f64,
    /// Width over height of the image, once known.
    pub content_aspect_ratio: Option<f64>,
}

/// Read-only view of the controller state for one render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSnapshot {
    /// What to render.
    pub render_mode: RenderMode,
    /// Initial and maximum scale.
    pub scale: ScaleConfig,
    /// Engine configuration.
    pub transform: TransformConfig,
    /// Last recorded viewport size.
    pub viewport: Option<Size>,
    /// Image size, if known.
    pub image_size: Option<PixelSize>,
}

/// The single state record owned by the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerState {
    props: ViewportProps,
    platform: Platform,
    mounted: bool,
    viewport: Option<Size>,
    reference_viewport: Option<Size>,
    resolved_size: Option<PixelSize>,
    size_error: Option<ViewportError>,
    initial_scale: Option<f64>,
    session: Session,
    resolver: DimensionResolver,
}

impl ControllerState {
    /// Creates the pre-mount state.
    #[must_use]
    pub fn new(props: ViewportProps, platform: Platform) -> Self {
        let initial_scale = props.options.explicit_initial_scale();
        Self {
            props,
            platform,
            mounted: false,
            viewport: None,
            reference_viewport: None,
            resolved_size: None,
            size_error: None,
            initial_scale,
            session: Session::new(),
            resolver: DimensionResolver::default(),
        }
    }

    /// Current props.
    #[must_use]
    pub fn props(&self) -> &ViewportProps {
        &self.props
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session
    }

    /// Last recorded viewport size.
    #[must_use]
    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    /// First usable viewport size measured after mount.
    #[must_use]
    pub fn reference_viewport(&self) -> Option<Size> {
        self.reference_viewport
    }

    /// Image size: the explicit hint if given, else the probed size.
    #[must_use]
    pub fn image_size(&self) -> Option<PixelSize> {
        self.props.options.explicit_pixel_size.or(self.resolved_size)
    }

    /// Why the image size is unavailable, if resolution gave up.
    #[must_use]
    pub fn size_error(&self) -> Option<&ViewportError> {
        self.size_error.as_ref()
    }

    /// Current initial scale, `None` while undetermined.
    #[must_use]
    pub fn initial_scale(&self) -> Option<f64> {
        self.initial_scale
    }

    /// Ticket of the outstanding dimension probe.
    #[must_use]
    pub fn outstanding_probe(&self) -> Option<ProbeTicket> {
        self.resolver.outstanding()
    }

    /// Returns `true` once load has completed.
    #[must_use]
    pub fn image_loaded(&self) -> bool {
        self.session.image_loaded()
    }

    /// Returns `true` if the probe failed and no size is known.
    fn probe_failed(&self) -> bool {
        self.image_size().is_none()
            && matches!(
                self.size_error,
                Some(ViewportError::DimensionProbeFailure { .. })
            )
    }

    /// What to render.
    ///
    /// The placeholder is used while a cover fit is requested and can still
    /// be computed. Once resolution has given up, the image is shown without
    /// cover fit.
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        let size_expected = self.image_size().is_some() || self.size_error.is_none();
        if self.props.options.wants_cover_fit() && self.initial_scale.is_none() && size_expected {
            RenderMode::Measuring
        } else {
            RenderMode::Interactive
        }
    }

    /// Initial and maximum scale.
    #[must_use]
    pub fn scale_config(&self) -> ScaleConfig {
        ScaleConfig::derive(
            self.viewport.filter(|v| is_measured(*v)),
            self.reference_viewport,
            self.image_size(),
            self.initial_scale,
        )
    }

    /// Engine configuration.
    #[must_use]
    pub fn transform_config(&self) -> TransformConfig {
        let options = &self.props.options;
        let scale = self.scale_config();
        TransformConfig {
            session: self.session.id,
            transform_enabled: options.enable_transform
                && self.session.image_loaded()
                && !self.probe_failed(),
            scale_enabled: options.enable_scale,
            translate_enabled: options.enable_translate,
            enable_resistance: true,
            enable_limits: true,
            max_scale: scale.max_scale,
            initial_scale: scale.initial_scale.unwrap_or(1.0),
            content_aspect_ratio: self.image_size().map(PixelSize::aspect_ratio),
        }
    }

    /// Everything a render pass needs, in one consistent copy.
    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            render_mode: self.render_mode(),
            scale: self.scale_config(),
            transform: self.transform_config(),
            viewport: self.viewport,
            image_size: self.image_size(),
        }
    }

    fn mount(&mut self, effects: &mut Effects) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.report_invalid_initial_scale(None, effects);
        self.begin_resolution(effects);
    }

    fn begin_resolution(&mut self, effects: &mut Effects) {
        self.resolver.supersede();
        self.resolved_size = None;
        self.size_error = None;
        let resolution = resolve(
            &self.props.source,
            self.props.options.explicit_pixel_size,
            self.platform.probe_available,
        );
        match resolution {
            Resolution::Ready(_) => {}
            Resolution::Probe(locator) => {
                let request = self.resolver.issue(self.session.id, locator);
                debug!(
                    session = %self.session.id,
                    locator = %request.locator,
                    "probing image dimensions"
                );
                effects.push(Effect::StartProbe(request));
            }
            Resolution::Unavailable(err) => {
                self.size_error = Some(err.clone());
                effects.push(Effect::Diagnostic(err));
            }
        }
    }

    fn apply_props(&mut self, props: ViewportProps, effects: &mut Effects) {
        let previous = core::mem::replace(&mut self.props, props);
        let previous_initial = previous.options.explicit_initial_scale();
        let initial = self.props.options.explicit_initial_scale();
        self.report_invalid_initial_scale(previous.options.initial_scale, effects);

        if same_source(&previous.source, &self.props.source) {
            if initial != previous_initial {
                // A dropped explicit scale falls back to cover fit or to the
                // engine default.
                self.initial_scale = initial;
            }
            let size_dropped = previous.options.explicit_pixel_size.is_some()
                && self.props.options.explicit_pixel_size.is_none();
            if self.mounted && size_dropped && self.resolved_size.is_none() {
                self.begin_resolution(effects);
            }
            return;
        }

        self.initial_scale = initial;
        // Before mount nothing is displayed yet, so the mount session stays.
        if !self.mounted {
            return;
        }
        let reset = self.props.options.automatic_cover_scale;
        self.session.restart(reset);
        debug!(session = %self.session.id, reset, "image source changed");
        self.begin_resolution(effects);
    }

    fn apply_load(&mut self, session: SessionId, load: LoadState) {
        if session != self.session.id {
            debug!(
                session = %self.session.id,
                stale = %session,
                "discarding load signal for a previous image"
            );
            return;
        }
        self.session.load = load;
    }

    fn report_invalid_initial_scale(&self, previous: Option<f64>, effects: &mut Effects) {
        let requested = self.props.options.initial_scale;
        let unchanged = previous.map(f64::to_bits) == requested.map(f64::to_bits);
        if let Some(scale) = requested {
            if !unchanged && self.props.options.explicit_initial_scale().is_none() {
                effects.push(Effect::Diagnostic(ViewportError::InvalidInitialScale(scale)));
            }
        }
    }

    fn apply_layout(&mut self, size: Size) {
        if self.viewport == Some(size) {
            return;
        }
        self.viewport = Some(size);
        if self.reference_viewport.is_none() && is_measured(size) {
            self.reference_viewport = Some(size);
        }
    }

    fn apply_probe(&mut self, ticket: ProbeTicket, outcome: ProbeOutcome, effects: &mut Effects) {
        match self.resolver.accept(ticket, outcome) {
            ProbeDelivery::Resolved(size) => {
                debug!(
                    session = %self.session.id,
                    width = size.width.get(),
                    height = size.height.get(),
                    "image dimensions resolved"
                );
                self.resolved_size = Some(size);
                self.size_error = None;
                effects.push(Effect::SizeResolved(size));
            }
            ProbeDelivery::Failed(err) => {
                self.size_error = Some(err.clone());
                effects.push(Effect::Diagnostic(err));
            }
            ProbeDelivery::Empty => {
                debug!(session = %self.session.id, "probe reported an empty size");
            }
            ProbeDelivery::Stale => {
                debug!(
                    session = %self.session.id,
                    stale = %ticket.session(),
                    "discarding superseded probe result"
                );
            }
        }
    }

    /// Brings derived scale state up to date. Running it twice in a row is a
    /// no-op the second time.
    fn settle(&mut self, effects: &mut Effects) {
        if self.initial_scale.is_none() && self.props.options.wants_cover_fit() {
            if let (Some(viewport), Some(image)) = (self.viewport, self.image_size()) {
                let ratio = self.platform.pixel_ratio;
                if let Some(scale) = compute_cover(viewport, image, |n| ratio.layout_to_pixels(n)) {
                    debug!(session = %self.session.id, scale, "cover scale computed");
                    self.initial_scale = Some(scale);
                }
            }
        }

        if self.session.pending_reset {
            if let Some(scale) = self.initial_scale {
                self.session.pending_reset = false;
                effects.push(Effect::Reset(ResetCommand::centered(scale)));
            }
        }
    }
}

/// Result of folding one event into the state.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// The next state.
    pub state: ControllerState,
    /// Side effects for the host, in order.
    pub effects: Effects,
}

/// Folds `event` into `state`.
///
/// Prop updates carry the next props; the previous ones are part of `state`,
/// so a prop diff is `reduce(state, Event::PropsChanged(next))`.
#[must_use]
pub fn reduce(state: &ControllerState, event: Event) -> Transition {
    let mut next = state.clone();
    let mut effects = Effects::new();
    match event {
        Event::Mount => next.mount(&mut effects),
        Event::PropsChanged(props) => next.apply_props(props, &mut effects),
        Event::Layout(size) => next.apply_layout(size),
        Event::LoadStart(session) => next.apply_load(session, LoadState::Loading),
        Event::LoadEnd(session) => next.apply_load(session, LoadState::Loaded),
        Event::ProbeFinished { ticket, outcome } => {
            next.apply_probe(ticket, outcome, &mut effects);
        }
    }
    next.settle(&mut effects);
    Transition {
        state: next,
        effects,
    }
}

/// Owner of the [`ControllerState`]; applies each transition atomically.
#[derive(Clone, Debug)]
pub struct TransformSessionController {
    state: ControllerState,
}

impl TransformSessionController {
    /// Creates an unmounted controller.
    #[must_use]
    pub fn new(props: ViewportProps, platform: Platform) -> Self {
        Self {
            state: ControllerState::new(props, platform),
        }
    }

    /// Handles one event and returns the effects to perform.
    pub fn handle(&mut self, event: Event) -> Effects {
        let Transition { state, effects } = reduce(&self.state, event);
        self.state = state;
        effects
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// See [`ControllerState::snapshot`].
    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        self.state.snapshot()
    }
}
