// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cover-fit and zoom-ceiling math.
//!
//! The rendering layer draws the image at *contain* scale: the whole image fits
//! inside the viewport, preserving aspect ratio. [`compute_cover`] returns a
//! multiplier on top of that base rendering so the combined result *covers*
//! the viewport, cropping the non-constraining axis. The multiplier is always
//! `>= 1`.
//!
//! ```
//! use kurbo::Size;
//! use understory_image_viewport::{PixelSize, compute_cover};
//!
//! // A 200x400 portrait image in a square 100x100 viewport.
//! let image = PixelSize::new(200, 400).unwrap();
//! let scale = compute_cover(Size::new(100.0, 100.0), image, |n| n).unwrap();
//! assert_eq!(scale, 2.0);
//! ```

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Size;

use crate::size::{PixelSize, is_measured};

/// Extra ceiling granted above an initial scale that would otherwise be the
/// maximum, so the user can still zoom in and out from it.
pub const MAX_SCALE_HEADROOM: f64 = 2.0;

/// Ratio of device pixels to layout units.
///
/// Converting a layout length rounds to the nearest whole pixel, as the
/// platform does when it snaps layout to the pixel grid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelRatio(f64);

impl PixelRatio {
    /// One pixel per layout unit.
    pub const ONE: Self = Self(1.0);

    /// Creates a pixel ratio. Non-positive or non-finite ratios fall back to
    /// [`PixelRatio::ONE`].
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            Self(ratio)
        } else {
            Self::ONE
        }
    }

    /// Returns the raw ratio.
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Converts a layout length to whole device pixels.
    #[must_use]
    pub fn layout_to_pixels(self, layout: f64) -> f64 {
        (layout * self.0).round()
    }
}

impl Default for PixelRatio {
    fn default() -> Self {
        Self::ONE
    }
}

/// Computes the multiplier that turns a contain-fit image into a cover fit.
///
/// `viewport` is in layout units and is converted with `to_pixels` before the
/// comparison with the image's pixel dimensions.
///
/// Returns `None` when the inputs cannot produce a meaningful scale: a viewport
/// side that is zero or not finite, or a pixel conversion that is not strictly
/// positive. This function never guesses.
pub fn compute_cover(
    viewport: Size,
    image: PixelSize,
    to_pixels: impl Fn(f64) -> f64,
) -> Option<f64> {
    if !is_measured(viewport) {
        return None;
    }
    let view_w = to_pixels(viewport.width);
    let view_h = to_pixels(viewport.height);
    if !is_measured(Size::new(view_w, view_h)) {
        return None;
    }

    let image_w = f64::from(image.width.get());
    let image_h = f64::from(image.height.get());

    // Rule of three: the length of the image's long axis that would match the
    // viewport's aspect ratio, compared against the actual length.
    let scale = if image.is_portrait() {
        let proportional_h = view_h * image_w / view_w;
        if proportional_h > image_h {
            proportional_h / image_h
        } else {
            image_h / proportional_h
        }
    } else {
        let proportional_w = view_w * image_h / view_h;
        if proportional_w > image_w {
            proportional_w / image_w
        } else {
            image_w / proportional_w
        }
    };
    Some(scale)
}

/// Computes the zoom ceiling for `viewport` relative to `reference_viewport`.
///
/// This is `max(1, width / ref_width, height / ref_height)`. A viewport that
/// has not changed since the reference was measured yields exactly `1`, as
/// does any degenerate input.
#[must_use]
pub fn compute_max_scale(viewport: Size, reference_viewport: Size) -> f64 {
    if !is_measured(viewport) || !is_measured(reference_viewport) {
        return 1.0;
    }
    let sx = viewport.width / reference_viewport.width;
    let sy = viewport.height / reference_viewport.height;
    sx.max(sy).max(1.0)
}

/// Raises `ceiling` so that `initial_scale` is reachable.
///
/// An initial scale above the ceiling lifts the ceiling to
/// `initial_scale + MAX_SCALE_HEADROOM`; the initial scale itself is never
/// lowered. The result is always `>= 1`.
#[must_use]
pub fn reconcile_max_scale(ceiling: f64, initial_scale: Option<f64>) -> f64 {
    let ceiling = ceiling.max(1.0);
    match initial_scale {
        Some(initial) if initial > ceiling => initial + MAX_SCALE_HEADROOM,
        _ => ceiling,
    }
}

/// Initial and maximum scale handed to the transform engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleConfig {
    /// Scale the engine should start at, or `None` while still undetermined.
    pub initial_scale: Option<f64>,
    /// Zoom ceiling; always `>= 1` and `>= initial_scale`.
    pub max_scale: f64,
}

impl ScaleConfig {
    /// Derives the scale configuration from everything currently known.
    ///
    /// The ceiling is the larger of the resize ceiling
    /// ([`compute_max_scale`] of `viewport` against `reference_viewport`) and
    /// the native-resolution ceiling, which lets the user zoom until one image
    /// pixel covers one layout unit. It is then reconciled with
    /// `initial_scale`.
    #[must_use]
    pub fn derive(
        viewport: Option<Size>,
        reference_viewport: Option<Size>,
        image: Option<PixelSize>,
        initial_scale: Option<f64>,
    ) -> Self {
        let mut ceiling = 1.0_f64;
        if let Some(viewport) = viewport {
            if let Some(reference) = reference_viewport {
                ceiling = ceiling.max(compute_max_scale(viewport, reference));
            }
            if let Some(image) = image {
                ceiling = ceiling.max(compute_max_scale(image.to_size(), viewport));
            }
        }
        Self {
            initial_scale,
            max_scale: reconcile_max_scale(ceiling, initial_scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::{
        MAX_SCALE_HEADROOM, PixelRatio, ScaleConfig, compute_cover, compute_max_scale,
        reconcile_max_scale,
    };
    use crate::size::PixelSize;

    fn px(w: u32, h: u32) -> PixelSize {
        PixelSize::new(w, h).unwrap()
    }

    #[test]
    fn portrait_in_square_viewport() {
        // proportional height = 100 * 200 / 100 = 200 < 400, so 400 / 200.
        let scale = compute_cover(Size::new(100.0, 100.0), px(200, 400), |n| n);
        assert_eq!(scale, Some(2.0));
    }

    #[test]
    fn portrait_in_tall_viewport() {
        // Contain gives 100x200; covering 100x1000 needs 5x.
        let scale = compute_cover(Size::new(100.0, 1000.0), px(200, 400), |n| n).unwrap();
        assert!((scale - 5.0).abs() < 1e-12);
    }

    #[test]
    fn square_in_landscape_viewport() {
        // proportional width = 300 * 600 / 200 = 900 > 600, so 900 / 600.
        let scale = compute_cover(Size::new(300.0, 200.0), px(600, 600), |n| n).unwrap();
        assert!((scale - 1.5).abs() < 1e-12);
    }

    #[test]
    fn matching_aspect_ratio_needs_no_extra_zoom() {
        let scale = compute_cover(Size::new(160.0, 90.0), px(1920, 1080), |n| n).unwrap();
        assert!((scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cover_is_never_below_one() {
        let viewports = [(100.0, 100.0), (320.0, 480.0), (1024.0, 10.0), (3.0, 700.0)];
        let images = [(1, 1), (200, 400), (4000, 30), (640, 480)];
        for (vw, vh) in viewports {
            for (iw, ih) in images {
                let scale = compute_cover(Size::new(vw, vh), px(iw, ih), |n| n).unwrap();
                assert!(scale >= 1.0 - 1e-12, "{vw}x{vh} / {iw}x{ih} gave {scale}");
            }
        }
    }

    #[test]
    fn cover_is_idempotent() {
        let ratio = PixelRatio::new(3.0);
        let viewport = Size::new(411.0, 731.0);
        let image = px(3024, 4032);
        let first = compute_cover(viewport, image, |n| ratio.layout_to_pixels(n));
        let second = compute_cover(viewport, image, |n| ratio.layout_to_pixels(n));
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_viewports_are_undetermined() {
        let image = px(200, 400);
        assert_eq!(compute_cover(Size::ZERO, image, |n| n), None);
        assert_eq!(compute_cover(Size::new(100.0, 0.0), image, |n| n), None);
        assert_eq!(compute_cover(Size::new(0.0, 100.0), image, |n| n), None);
        // A conversion that collapses the viewport is also rejected.
        assert_eq!(compute_cover(Size::new(0.2, 0.2), image, |n| n.round()), None);
    }

    #[test]
    fn density_is_applied_to_both_axes() {
        let ratio = PixelRatio::new(2.0);
        let with_density =
            compute_cover(Size::new(300.0, 200.0), px(600, 600), |n| ratio.layout_to_pixels(n));
        let without = compute_cover(Size::new(300.0, 200.0), px(600, 600), |n| n);
        assert_eq!(with_density, without);
    }

    #[test]
    fn pixel_ratio_rounds_and_rejects_nonsense() {
        assert_eq!(PixelRatio::new(2.5).layout_to_pixels(3.0), 8.0);
        assert_eq!(PixelRatio::new(0.0), PixelRatio::ONE);
        assert_eq!(PixelRatio::new(f64::NAN), PixelRatio::ONE);
        assert_eq!(PixelRatio::default().get(), 1.0);
    }

    #[test]
    fn unchanged_viewport_has_unit_ceiling() {
        for v in [Size::new(1.0, 1.0), Size::new(300.0, 200.0), Size::new(0.5, 900.0)] {
            assert_eq!(compute_max_scale(v, v), 1.0);
        }
    }

    #[test]
    fn grown_viewport_raises_ceiling() {
        let reference = Size::new(300.0, 200.0);
        assert_eq!(compute_max_scale(Size::new(600.0, 200.0), reference), 2.0);
        assert_eq!(compute_max_scale(Size::new(300.0, 500.0), reference), 2.5);
        // Shrinking never drops the ceiling below one.
        assert_eq!(compute_max_scale(Size::new(100.0, 100.0), reference), 1.0);
        assert_eq!(compute_max_scale(Size::new(100.0, 100.0), Size::ZERO), 1.0);
    }

    #[test]
    fn reconcile_raises_ceiling_instead_of_clamping() {
        assert_eq!(reconcile_max_scale(3.0, Some(1.5)), 3.0);
        assert_eq!(reconcile_max_scale(1.0, Some(4.0)), 4.0 + MAX_SCALE_HEADROOM);
        assert_eq!(reconcile_max_scale(0.25, None), 1.0);
        assert_eq!(reconcile_max_scale(2.0, Some(2.0)), 2.0);
    }

    #[test]
    fn derived_config_combines_ceilings() {
        let viewport = Size::new(300.0, 200.0);
        let image = px(600, 600);

        let config = ScaleConfig::derive(Some(viewport), Some(viewport), Some(image), Some(1.5));
        // Native ceiling: max(600 / 300, 600 / 200) = 3.
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.initial_scale, Some(1.5));

        let unknown = ScaleConfig::derive(None, None, None, None);
        assert_eq!(unknown.max_scale, 1.0);
        assert_eq!(unknown.initial_scale, None);

        let deep = ScaleConfig::derive(Some(viewport), Some(viewport), Some(image), Some(10.0));
        assert_eq!(deep.max_scale, 10.0 + MAX_SCALE_HEADROOM);
    }
}
