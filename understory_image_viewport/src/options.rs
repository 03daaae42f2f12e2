// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Caller-facing configuration.
//!
//! [`ViewportOptions`] holds the knobs a caller can set on the viewport.
//! Defaults enable all transforms, leave the initial scale to the engine and
//! do not compute a cover fit. With the `serde` feature the options can be
//! loaded from configuration; missing fields take their defaults.
//!
//! ```
//! use understory_image_viewport::{PixelSize, ViewportOptions};
//!
//! let options = ViewportOptions::default()
//!     .with_automatic_cover_scale(true)
//!     .with_explicit_pixel_size(PixelSize::new(4032, 3024));
//! assert!(options.wants_cover_fit());
//! assert!(options.enable_transform);
//! ```

use crate::size::PixelSize;
use crate::source::ImageSource;

/// Options recognized by the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ViewportOptions {
    /// Pixel dimensions supplied out-of-band. When set, no probe is issued.
    pub explicit_pixel_size: Option<PixelSize>,
    /// Master switch for pan/zoom gestures.
    pub enable_transform: bool,
    /// Allow pinch zoom.
    pub enable_scale: bool,
    /// Allow panning.
    pub enable_translate: bool,
    /// Fixed initial scale. Takes precedence over
    /// [`automatic_cover_scale`](Self::automatic_cover_scale).
    pub initial_scale: Option<f64>,
    /// Start at the scale that makes the image cover the viewport.
    pub automatic_cover_scale: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            explicit_pixel_size: None,
            enable_transform: true,
            enable_scale: true,
            enable_translate: true,
            initial_scale: None,
            automatic_cover_scale: false,
        }
    }
}

impl ViewportOptions {
    /// Sets the explicit pixel size.
    #[must_use]
    pub fn with_explicit_pixel_size(mut self, size: Option<PixelSize>) -> Self {
        self.explicit_pixel_size = size;
        self
    }

    /// Enables or disables all transform gestures.
    #[must_use]
    pub fn with_transform(mut self, enabled: bool) -> Self {
        self.enable_transform = enabled;
        self
    }

    /// Enables or disables zoom gestures.
    #[must_use]
    pub fn with_scale(mut self, enabled: bool) -> Self {
        self.enable_scale = enabled;
        self
    }

    /// Enables or disables pan gestures.
    #[must_use]
    pub fn with_translate(mut self, enabled: bool) -> Self {
        self.enable_translate = enabled;
        self
    }

    /// Sets a fixed initial scale.
    #[must_use]
    pub fn with_initial_scale(mut self, scale: Option<f64>) -> Self {
        self.initial_scale = scale;
        self
    }

    /// Requests an automatic cover-fit initial scale.
    #[must_use]
    pub fn with_automatic_cover_scale(mut self, enabled: bool) -> Self {
        self.automatic_cover_scale = enabled;
        self
    }

    /// The caller's initial scale, if it is usable (positive and finite).
    #[must_use]
    pub fn explicit_initial_scale(&self) -> Option<f64> {
        self.initial_scale.filter(|s| s.is_finite() && *s > 0.0)
    }

    /// Returns `true` if the initial scale should come from a cover fit.
    ///
    /// An explicit initial scale always wins over the automatic cover fit.
    #[must_use]
    pub fn wants_cover_fit(&self) -> bool {
        self.automatic_cover_scale && self.explicit_initial_scale().is_none()
    }
}

/// Everything the caller hands to the viewport on each update.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportProps {
    /// The image to show.
    pub source: ImageSource,
    /// Caller options.
    pub options: ViewportOptions,
}

impl ViewportProps {
    /// Creates props for `source` with default options.
    #[must_use]
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            options: ViewportOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ViewportOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::ViewportOptions;

    #[test]
    fn defaults_enable_transforms_only() {
        let options = ViewportOptions::default();
        assert!(options.enable_transform);
        assert!(options.enable_scale);
        assert!(options.enable_translate);
        assert_eq!(options.initial_scale, None);
        assert!(!options.automatic_cover_scale);
        assert!(!options.wants_cover_fit());
    }

    #[test]
    fn explicit_initial_scale_wins_over_cover() {
        let options = ViewportOptions::default()
            .with_automatic_cover_scale(true)
            .with_initial_scale(Some(2.0));
        assert!(!options.wants_cover_fit());
        assert_eq!(options.explicit_initial_scale(), Some(2.0));
    }

    #[test]
    fn unusable_initial_scales_are_ignored() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let options = ViewportOptions::default()
                .with_automatic_cover_scale(true)
                .with_initial_scale(Some(bad));
            assert_eq!(options.explicit_initial_scale(), None);
            assert!(options.wants_cover_fit());
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_load_from_partial_config() {
        let options: ViewportOptions = serde_json::from_str(
            r#"{
                "automatic_cover_scale": true,
                "enable_translate": false,
                "explicit_pixel_size": { "width": 600, "height": 400 }
            }"#,
        )
        .unwrap();
        assert!(options.automatic_cover_scale);
        assert!(!options.enable_translate);
        assert!(options.enable_scale);
        assert_eq!(options.explicit_pixel_size, crate::PixelSize::new(600, 400));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn zero_pixel_sizes_are_rejected_by_config() {
        let result = serde_json::from_str::<ViewportOptions>(
            r#"{ "explicit_pixel_size": { "width": 0, "height": 400 } }"#,
        );
        assert!(result.is_err());
    }
}
