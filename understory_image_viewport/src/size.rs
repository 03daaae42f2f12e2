// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::num::NonZeroU32;

use kurbo::Size;

/// Intrinsic pixel dimensions of an image.
///
/// Both dimensions are known and non-zero, or there is no `PixelSize` at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelSize {
    /// Width in pixels.
    pub width: NonZeroU32,
    /// Height in pixels.
    pub height: NonZeroU32,
}

impl PixelSize {
    /// Creates a pixel size, or `None` if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    /// Returns the dimensions as a floating-point [`Size`].
    #[must_use]
    pub fn to_size(self) -> Size {
        Size::new(f64::from(self.width.get()), f64::from(self.height.get()))
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width.get()) / f64::from(self.height.get())
    }

    /// Returns `true` if the image is taller than it is wide.
    #[must_use]
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

/// Returns `true` once a layout size is usable for scale math: both sides
/// strictly positive and finite.
#[must_use]
pub fn is_measured(size: Size) -> bool {
    size.is_finite() && size.width > 0.0 && size.height > 0.0
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::{PixelSize, is_measured};

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(PixelSize::new(0, 10).is_none());
        assert!(PixelSize::new(10, 0).is_none());
        assert!(PixelSize::new(10, 20).is_some());
    }

    #[test]
    fn orientation_and_ratio() {
        let portrait = PixelSize::new(200, 400).unwrap();
        assert!(portrait.is_portrait());
        assert!((portrait.aspect_ratio() - 0.5).abs() < 1e-12);

        let square = PixelSize::new(600, 600).unwrap();
        assert!(!square.is_portrait());
        assert_eq!(square.to_size(), Size::new(600.0, 600.0));
    }

    #[test]
    fn measured_requires_both_sides() {
        assert!(!is_measured(Size::ZERO));
        assert!(!is_measured(Size::new(100.0, 0.0)));
        assert!(!is_measured(Size::new(f64::NAN, 10.0)));
        assert!(is_measured(Size::new(300.0, 200.0)));
    }
}
