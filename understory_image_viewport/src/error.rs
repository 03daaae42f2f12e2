// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable diagnostics.
//!
//! Nothing in this crate is fatal. Each condition is reported to the host as an
//! [`Effect::Diagnostic`](crate::Effect::Diagnostic) instead of being returned
//! as an error, and the viewport carries on without the affected feature. A
//! failed probe also keeps gestures disabled; the other conditions only skip
//! cover fit or ignore a setting.

use alloc::string::String;

use thiserror::Error;

/// A recoverable problem encountered while coordinating the viewport.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ViewportError {
    /// The dimension probe rejected the request.
    ///
    /// The image size stays unresolved and the viewport remains
    /// non-interactive.
    #[error("dimension probe for `{locator}` failed: {reason}")]
    DimensionProbeFailure {
        /// Locator the probe was issued for.
        locator: String,
        /// Host-provided failure description.
        reason: String,
    },
    /// An embedded source was given without an explicit pixel size.
    ///
    /// Embedded references cannot be probed, so cover fit is skipped.
    #[error("embedded image sources need an explicit pixel size; cover fit is skipped")]
    MisconfiguredSource,
    /// A remote source needs probing but the platform has no probe.
    #[error("no dimension probe is available; provide an explicit pixel size")]
    ProbeUnavailable,
    /// The caller asked for an initial scale that is not positive and finite.
    #[error("initial scale {0} is not a positive finite number and is ignored")]
    InvalidInitialScale(f64),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::ViewportError;

    #[test]
    fn messages_name_the_locator() {
        let err = ViewportError::DimensionProbeFailure {
            locator: "https://example.com/a.jpg".into(),
            reason: "404".into(),
        };
        assert_eq!(
            err.to_string(),
            "dimension probe for `https://example.com/a.jpg` failed: 404"
        );
    }
}
