// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`DimensionProbe`] for images on the local filesystem.
//!
//! Only the image header is read. Probing is synchronous, but completions are
//! queued rather than delivered inline so hosts handle them the same way as
//! results from an asynchronous probe.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::resolve::{DimensionProbe, ProbeOutcome, ProbeRequest, ProbeTicket};

/// Reads image dimensions from files.
///
/// Locators are paths, optionally prefixed with `file://`. Relative paths are
/// resolved against the probe's root directory, if one is set.
#[derive(Clone, Debug, Default)]
pub struct FileDimensionProbe {
    root: Option<PathBuf>,
    completed: Vec<(ProbeTicket, ProbeOutcome)>,
}

impl FileDimensionProbe {
    /// Creates a probe that resolves relative paths against the working
    /// directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a probe that resolves relative paths against `root`.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            completed: Vec::new(),
        }
    }

    /// Takes all completions queued since the last call.
    pub fn take_completed(&mut self) -> Vec<(ProbeTicket, ProbeOutcome)> {
        core::mem::take(&mut self.completed)
    }

    fn path_for(&self, locator: &str) -> PathBuf {
        let path = Path::new(locator.strip_prefix("file://").unwrap_or(locator));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn measure(path: &Path) -> Result<(u32, u32), String> {
        image::image_dimensions(path).map_err(|err| err.to_string())
    }
}

impl DimensionProbe for FileDimensionProbe {
    fn probe(&mut self, request: ProbeRequest) {
        let path = self.path_for(&request.locator);
        let outcome = match Self::measure(&path) {
            Ok((width, height)) => ProbeOutcome::Size { width, height },
            Err(reason) => ProbeOutcome::Failed(reason),
        };
        debug!(path = %path.display(), ?outcome, "probed image file");
        self.completed.push((request.ticket, outcome));
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::FileDimensionProbe;
    use crate::controller::RenderMode;
    use crate::options::{ViewportOptions, ViewportProps};
    use crate::resolve::{DimensionProbe, DimensionResolver, ProbeOutcome};
    use crate::scale::PixelRatio;
    use crate::session::SessionId;
    use crate::source::ImageSource;
    use crate::viewport::ImageViewport;

    fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(dir.join(name)).unwrap();
    }

    #[test]
    fn reads_header_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "wide.png", 6, 4);

        let mut probe = FileDimensionProbe::with_root(dir.path());
        let mut resolver = DimensionResolver::default();
        let request = resolver.issue(SessionId::FIRST, "file://wide.png".into());
        let ticket = request.ticket;
        probe.probe(request);

        let completed = probe.take_completed();
        let expected = ProbeOutcome::Size {
            width: 6,
            height: 4,
        };
        assert_eq!(completed, [(ticket, expected)]);
        assert!(probe.take_completed().is_empty());
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut probe = FileDimensionProbe::with_root(dir.path());
        let mut resolver = DimensionResolver::default();
        probe.probe(resolver.issue(SessionId::FIRST, "absent.png".into()));

        let completed = probe.take_completed();
        assert_eq!(completed.len(), 1);
        assert!(matches!(completed[0].1, ProbeOutcome::Failed(_)));
    }

    #[test]
    fn drives_a_viewport() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "tall.png", 20, 40);

        let props = ViewportProps::new(ImageSource::remote("tall.png"))
            .with_options(ViewportOptions::default().with_automatic_cover_scale(true));
        let mut viewport = ImageViewport::new(
            props,
            PixelRatio::ONE,
            FileDimensionProbe::with_root(dir.path()),
            NullEngine,
            (),
        );
        viewport.mount();
        viewport.on_layout(Size::new(10.0, 10.0));
        for (ticket, outcome) in viewport.probe_mut().take_completed() {
            viewport.deliver_probe(ticket, outcome);
        }

        let snapshot = viewport.snapshot();
        assert_eq!(snapshot.render_mode, RenderMode::Interactive);
        assert_eq!(snapshot.scale.initial_scale, Some(2.0));
    }

    struct NullEngine;

    impl crate::viewport::TransformEngine for NullEngine {
        fn configure(&mut self, _config: &crate::controller::TransformConfig) {}

        fn reset_transform(&mut self, _command: crate::controller::ResetCommand) {}
    }
}
