// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dimension resolution: obtaining an image's intrinsic pixel size.
//!
//! ## Usage
//!
//! 1) Call [`resolve`] for the current source. An explicit size is used as-is;
//!    a remote source asks for a probe; anything else is a diagnostic.
//! 2) For a probe, let [`DimensionResolver::issue`] mint a [`ProbeRequest`]
//!    and hand it to the platform's [`DimensionProbe`].
//! 3) When the probe calls back, pass its [`ProbeOutcome`] to
//!    [`DimensionResolver::accept`]. Results for superseded tickets are
//!    reported as [`ProbeDelivery::Stale`] and must not touch any state.
//!
//! ```
//! use understory_image_viewport::{
//!     DimensionResolver, ImageSource, ProbeDelivery, ProbeOutcome, Resolution, SessionId,
//!     resolve,
//! };
//!
//! let source = ImageSource::remote("https://example.com/a.jpg");
//! let Resolution::Probe(locator) = resolve(&source, None, true) else {
//!     unreachable!()
//! };
//!
//! let mut resolver = DimensionResolver::default();
//! let first = resolver.issue(SessionId::FIRST, locator.clone());
//! // A newer request supersedes the first one.
//! let second = resolver.issue(SessionId::FIRST.next(), locator);
//!
//! let late = resolver.accept(first.ticket, ProbeOutcome::Size { width: 10, height: 10 });
//! assert_eq!(late, ProbeDelivery::Stale);
//!
//! let fresh = resolver.accept(second.ticket, ProbeOutcome::Size { width: 10, height: 20 });
//! assert!(matches!(fresh, ProbeDelivery::Resolved(_)));
//! ```

use alloc::string::String;

use crate::error::ViewportError;
use crate::session::SessionId;
use crate::size::PixelSize;
use crate::source::ImageSource;

/// Identifies one probe request.
///
/// Tickets are unique per resolver; a delivery is only applied if its ticket
/// is still the outstanding one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProbeTicket {
    session: SessionId,
    serial: u64,
}

impl ProbeTicket {
    /// Session the probe was issued for.
    #[must_use]
    pub fn session(self) -> SessionId {
        self.session
    }

    /// Resolver-wide serial number of the request.
    #[must_use]
    pub fn serial(self) -> u64 {
        self.serial
    }
}

/// A request to measure the image behind `locator`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Ticket to return together with the outcome.
    pub ticket: ProbeTicket,
    /// Locator of the remote source.
    pub locator: String,
}

/// What a probe reported back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe measured the image. Either dimension may be zero if the
    /// platform could not tell.
    Size {
        /// Reported width in pixels.
        width: u32,
        /// Reported height in pixels.
        height: u32,
    },
    /// The probe failed.
    Failed(String),
}

/// Result of applying a probe outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeDelivery {
    /// The outstanding probe produced a usable size.
    Resolved(PixelSize),
    /// The outstanding probe failed.
    Failed(ViewportError),
    /// The outstanding probe reported a zero dimension; nothing changes.
    Empty,
    /// The ticket is not the outstanding one; the result is discarded.
    Stale,
}

/// How the size of a source can be obtained.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// The size is known now.
    Ready(PixelSize),
    /// The size must be probed for this locator.
    Probe(String),
    /// The size cannot be obtained; cover fit will be skipped.
    Unavailable(ViewportError),
}

/// Decides how to obtain the pixel size of `source`.
///
/// An `explicit` size always takes precedence and no probe is needed.
#[must_use]
pub fn resolve(
    source: &ImageSource,
    explicit: Option<PixelSize>,
    probe_available: bool,
) -> Resolution {
    if let Some(size) = explicit {
        return Resolution::Ready(size);
    }
    match source.locator() {
        Some(locator) if probe_available => Resolution::Probe(locator.into()),
        Some(_) => Resolution::Unavailable(ViewportError::ProbeUnavailable),
        None => Resolution::Unavailable(ViewportError::MisconfiguredSource),
    }
}

/// Bookkeeping for the single outstanding dimension probe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionResolver {
    next_serial: u64,
    outstanding: Option<ProbeRequest>,
}

impl DimensionResolver {
    /// Mints a request for `locator`, superseding any outstanding one.
    pub fn issue(&mut self, session: SessionId, locator: String) -> ProbeRequest {
        let ticket = ProbeTicket {
            session,
            serial: self.next_serial,
        };
        self.next_serial = self.next_serial.wrapping_add(1);
        let request = ProbeRequest { ticket, locator };
        self.outstanding = Some(request.clone());
        request
    }

    /// Forgets the outstanding probe so its result will be discarded.
    pub fn supersede(&mut self) {
        self.outstanding = None;
    }

    /// Ticket of the outstanding probe, if any.
    #[must_use]
    pub fn outstanding(&self) -> Option<ProbeTicket> {
        self.outstanding.as_ref().map(|r| r.ticket)
    }

    /// Applies a probe outcome.
    ///
    /// Only the outstanding ticket is honored. A resolved or failed delivery
    /// retires it; a zero-sized report leaves everything as it was.
    pub fn accept(&mut self, ticket: ProbeTicket, outcome: ProbeOutcome) -> ProbeDelivery {
        let Some(request) = self.outstanding.as_ref().filter(|r| r.ticket == ticket) else {
            return ProbeDelivery::Stale;
        };
        match outcome {
            ProbeOutcome::Size { width, height } => match PixelSize::new(width, height) {
                Some(size) => {
                    self.outstanding = None;
                    ProbeDelivery::Resolved(size)
                }
                None => ProbeDelivery::Empty,
            },
            ProbeOutcome::Failed(reason) => {
                let err = ViewportError::DimensionProbeFailure {
                    locator: request.locator.clone(),
                    reason,
                };
                self.outstanding = None;
                ProbeDelivery::Failed(err)
            }
        }
    }
}

/// A platform primitive that measures remote images without decoding them.
///
/// Probes are fire-and-forget: `probe` starts the work and returns. The host
/// later feeds the outcome back with the request's ticket. There is no
/// cancellation; superseded results are discarded on delivery.
pub trait DimensionProbe {
    /// Returns `false` if the platform has no way to probe image sizes.
    fn is_available(&self) -> bool {
        true
    }

    /// Starts measuring the image behind `request.locator`.
    fn probe(&mut self, request: ProbeRequest);
}

/// A platform without a dimension probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProbe;

impl DimensionProbe for NoProbe {
    fn is_available(&self) -> bool {
        false
    }

    fn probe(&mut self, _request: ProbeRequest) {}
}

#[cfg(test)]
mod tests {
    use super::{DimensionResolver, ProbeDelivery, ProbeOutcome, Resolution, resolve};
    use crate::error::ViewportError;
    use crate::session::SessionId;
    use crate::size::PixelSize;
    use crate::source::ImageSource;

    fn measured(width: u32, height: u32) -> ProbeOutcome {
        ProbeOutcome::Size { width, height }
    }

    #[test]
    fn explicit_size_takes_precedence() {
        let size = PixelSize::new(640, 480).unwrap();
        let remote = ImageSource::remote("a");
        assert_eq!(resolve(&remote, Some(size), true), Resolution::Ready(size));
        let embedded = ImageSource::embedded(1_u8);
        assert_eq!(resolve(&embedded, Some(size), false), Resolution::Ready(size));
    }

    #[test]
    fn remote_sources_are_probed() {
        let remote = ImageSource::remote("a");
        assert_eq!(resolve(&remote, None, true), Resolution::Probe("a".into()));
        assert_eq!(
            resolve(&remote, None, false),
            Resolution::Unavailable(ViewportError::ProbeUnavailable)
        );
    }

    #[test]
    fn embedded_sources_without_size_are_misconfigured() {
        let embedded = ImageSource::embedded(1_u8);
        assert_eq!(
            resolve(&embedded, None, true),
            Resolution::Unavailable(ViewportError::MisconfiguredSource)
        );
        assert_eq!(
            resolve(&ImageSource::remote(""), None, true),
            Resolution::Unavailable(ViewportError::MisconfiguredSource)
        );
    }

    #[test]
    fn success_retires_the_ticket() {
        let mut resolver = DimensionResolver::default();
        let request = resolver.issue(SessionId::FIRST, "a".into());
        assert_eq!(resolver.outstanding(), Some(request.ticket));

        let delivery = resolver.accept(request.ticket, measured(600, 600));
        assert_eq!(delivery, ProbeDelivery::Resolved(PixelSize::new(600, 600).unwrap()));
        assert_eq!(resolver.outstanding(), None);

        // A duplicate delivery is stale.
        let again = resolver.accept(request.ticket, measured(600, 600));
        assert_eq!(again, ProbeDelivery::Stale);
    }

    #[test]
    fn zero_dimensions_are_a_silent_no_op() {
        let mut resolver = DimensionResolver::default();
        let request = resolver.issue(SessionId::FIRST, "a".into());
        let before = resolver.clone();

        let delivery = resolver.accept(request.ticket, measured(0, 9));
        assert_eq!(delivery, ProbeDelivery::Empty);
        assert_eq!(resolver, before);
    }

    #[test]
    fn failure_names_the_locator() {
        let mut resolver = DimensionResolver::default();
        let request = resolver.issue(SessionId::FIRST, "https://x/a.png".into());
        let delivery = resolver.accept(request.ticket, ProbeOutcome::Failed("timeout".into()));
        assert_eq!(
            delivery,
            ProbeDelivery::Failed(ViewportError::DimensionProbeFailure {
                locator: "https://x/a.png".into(),
                reason: "timeout".into(),
            })
        );
        assert_eq!(resolver.outstanding(), None);
    }

    #[test]
    fn superseded_results_are_discarded() {
        let mut resolver = DimensionResolver::default();
        let a = resolver.issue(SessionId::FIRST, "a".into());
        let b = resolver.issue(SessionId::FIRST.next(), "b".into());
        assert_ne!(a.ticket, b.ticket);

        let failure = resolver.accept(a.ticket, ProbeOutcome::Failed("gone".into()));
        assert_eq!(failure, ProbeDelivery::Stale);
        assert_eq!(resolver.outstanding(), Some(b.ticket));

        resolver.supersede();
        let late = resolver.accept(b.ticket, measured(1, 1));
        assert_eq!(late, ProbeDelivery::Stale);
    }
}
