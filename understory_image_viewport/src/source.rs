// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image source identity.
//!
//! An [`ImageSource`] is either remote-style (identified by a locator string
//! such as a URI) or an embedded reference to an asset bundled with the host.
//! Identity, not content, decides whether two sources are the same image:
//!
//! - Two remote sources are the same iff their locators are equal.
//! - Two embedded sources are the same iff they are the same reference
//!   (clones of one [`EmbeddedRef`] share identity).
//! - Anything else is a different image.
//!
//! ```
//! use understory_image_viewport::{ImageSource, same_source};
//!
//! let a = ImageSource::remote("https://example.com/a.jpg");
//! let also_a = ImageSource::remote("https://example.com/a.jpg");
//! assert!(same_source(&a, &also_a));
//!
//! let logo = ImageSource::embedded("logo.png");
//! let other_logo = ImageSource::embedded("logo.png");
//! assert!(same_source(&logo, &logo.clone()));
//! assert!(!same_source(&logo, &other_logo));
//! ```

use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

/// Opaque handle to an embedded (bundled/local) image asset.
///
/// Equality is reference identity: clones compare equal, two handles created
/// from equal payloads do not.
#[derive(Clone)]
pub struct EmbeddedRef(Arc<dyn Any + Send + Sync>);

impl EmbeddedRef {
    /// Wraps a host-defined asset payload in a new identity.
    pub fn new<T: Any + Send + Sync>(asset: T) -> Self {
        Self(Arc::new(asset))
    }

    /// Returns the payload if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Returns `true` if both handles refer to the same asset.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EmbeddedRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EmbeddedRef {}

impl fmt::Debug for EmbeddedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EmbeddedRef")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Identity of the image shown in the viewport.
#[derive(Clone, Debug)]
pub enum ImageSource {
    /// A remote-style source with a stable locator (for example a URI or a
    /// file path). The locator keys dimension probes.
    Remote {
        /// Locator string; an empty locator counts as no locator.
        locator: String,
    },
    /// An embedded asset reference with no locator.
    Embedded(EmbeddedRef),
}

impl ImageSource {
    /// Creates a remote-style source.
    pub fn remote(locator: impl Into<String>) -> Self {
        Self::Remote {
            locator: locator.into(),
        }
    }

    /// Creates an embedded source with a fresh identity.
    pub fn embedded<T: Any + Send + Sync>(asset: T) -> Self {
        Self::Embedded(EmbeddedRef::new(asset))
    }

    /// Returns the locator of a remote source, if it has a non-empty one.
    #[must_use]
    pub fn locator(&self) -> Option<&str> {
        match self {
            Self::Remote { locator } if !locator.is_empty() => Some(locator),
            _ => None,
        }
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        same_source(self, other)
    }
}

/// Returns `true` if `a` and `b` identify the same image.
///
/// Remote sources compare by locator; embedded sources by reference. Remote
/// sources without a locator have no identity to compare and are never the
/// same as anything.
#[must_use]
pub fn same_source(a: &ImageSource, b: &ImageSource) -> bool {
    match (a, b) {
        (ImageSource::Remote { .. }, ImageSource::Remote { .. }) => {
            match (a.locator(), b.locator()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (ImageSource::Embedded(a), ImageSource::Embedded(b)) => a.ptr_eq(b),
        _ => false,
    }
}
