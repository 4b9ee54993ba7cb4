//! Editing session: the working image and its one-step undo.
//!
//! A [`Session`] is the explicit owner of everything an interactive front
//! end needs between clicks. The front end translates its own events into
//! [`SessionEvent`]s and redraws [`Session::image`] afterwards.

use std::path::Path;

use image::{GrayImage, RgbImage};
use tracing::{info, warn};

use crate::config::RemovalConfig;
use crate::engine::{load_image, BlemishRemover, ClickOutcome, RemovalReport};
use crate::error::Result;
use crate::preprocess::{preprocess, Preprocessed};
use crate::types::Point;

/// Input accepted by [`Session::handle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Primary pointer button pressed at a point in image coordinates.
    PrimaryDown(Point),
    /// Any other pointer activity (moves, releases, other buttons).
    Pointer,
    /// Restore the image from before the last edit.
    Undo,
    /// End the session.
    Exit,
}

/// What [`Session::handle`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A blemish was removed.
    Edited(Box<RemovalReport>),
    /// The click found no blemish; the image is unchanged.
    NoBlemish,
    /// The event does not concern the pipeline.
    Ignored,
    /// The last edit was reverted.
    Undone,
    /// Undo was requested with no edit to revert.
    NothingToUndo,
    /// The front end should close.
    Exit,
}

/// The working image, the analysis substrate and a single undo snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    remover: BlemishRemover,
    working: RgbImage,
    snapshot: Option<RgbImage>,
    preview: RgbImage,
    analysis: GrayImage,
}

impl Session {
    /// Start a session on a decoded image.
    ///
    /// Smoothing runs here, once; later edits do not refresh it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) for
    /// degenerate settings.
    pub fn new(image: RgbImage, config: RemovalConfig) -> Result<Self> {
        let remover = BlemishRemover::new(config)?;
        let Preprocessed { preview, analysis } = preprocess(&image, remover.config());
        Ok(Self {
            remover,
            working: image,
            snapshot: None,
            preview,
            analysis,
        })
    }

    /// Decode `path` and start a session on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`](crate::Error::Image) if the file is missing or
    /// undecodable, or a configuration error.
    pub fn open(path: &Path, config: RemovalConfig) -> Result<Self> {
        let image = load_image(path)?;
        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "image loaded"
        );
        Self::new(image, config)
    }

    /// Run the pipeline for a click and commit the result.
    ///
    /// On an edit the previous image becomes the undo snapshot. When no
    /// blemish is found nothing changes, including the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointOutsideImage`](crate::Error::PointOutsideImage)
    /// for clicks outside the image.
    pub fn click(&mut self, point: Point) -> Result<ClickOutcome> {
        let outcome = self
            .remover
            .remove_at(&self.working, &self.analysis, point)?;
        match &outcome {
            ClickOutcome::Edited(removal) => {
                let previous = std::mem::replace(&mut self.working, removal.image.clone());
                self.snapshot = Some(previous);
                info!(
                    x = point.x,
                    y = point.y,
                    radius = removal.report.shape.circle.radius,
                    donor_cell = removal.report.patch.best.cell,
                    "blemish removed"
                );
            }
            ClickOutcome::NoBlemish => {
                warn!(x = point.x, y = point.y, "no blemish detected");
            }
        }
        Ok(outcome)
    }

    /// Revert the last edit. Returns `false` if there is nothing to revert.
    pub fn undo(&mut self) -> bool {
        match self.snapshot.take() {
            Some(previous) => {
                self.working = previous;
                info!("last edit undone");
                true
            }
            None => false,
        }
    }

    /// Dispatch an event from the front end.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Session::click`].
    pub fn handle(&mut self, event: SessionEvent) -> Result<EventOutcome> {
        Ok(match event {
            SessionEvent::PrimaryDown(point) => match self.click(point)? {
                ClickOutcome::Edited(removal) => EventOutcome::Edited(Box::new(removal.report)),
                ClickOutcome::NoBlemish => EventOutcome::NoBlemish,
            },
            SessionEvent::Pointer => EventOutcome::Ignored,
            SessionEvent::Undo => {
                if self.undo() {
                    EventOutcome::Undone
                } else {
                    EventOutcome::NothingToUndo
                }
            }
            SessionEvent::Exit => EventOutcome::Exit,
        })
    }

    /// The current working image.
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.working
    }

    /// The smoothed image, for helping the user spot blemishes.
    #[must_use]
    pub fn preview(&self) -> &RgbImage {
        &self.preview
    }

    /// The grayscale analysis image.
    #[must_use]
    pub fn analysis(&self) -> &GrayImage {
        &self.analysis
    }

    /// Whether [`Session::undo`] would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        self.remover.config()
    }

    /// Consume the session, returning the working image.
    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.working
    }
}
