//! Remove small blemishes from photographs with a single click.
//!
//! Each click runs a short pipeline on a padded copy of the image: a Scharr
//! gradient map of the box around the click is thresholded, the largest
//! outer boundary is fitted with its minimal enclosing circle, a grid of
//! neighbouring squares is searched for the one whose masked brightness best
//! matches the texture around the blemish, and that donor patch is
//! Poisson-blended over the blemish.
//!
//! # Quick Start
//!
//! ```no_run
//! use blemish_removal::{Point, RemovalConfig, Session};
//!
//! let mut session = Session::open("portrait.jpg".as_ref(), RemovalConfig::default())?;
//! let outcome = session.click(Point::new(212, 148))?;
//! if outcome.is_edited() {
//!     blemish_removal::save_image(session.image(), "portrait_cleaned.jpg".as_ref())?;
//! }
//! # Ok::<(), blemish_removal::Error>(())
//! ```
//!
//! # Stages
//!
//! Every stage is usable on its own: [`preprocess`], [`BorderedView`],
//! [`region::extract_box`], [`edges::edge_mask`], [`shape::locate_blemish`],
//! [`BlemishMasks`], [`search::search_patch`] and
//! [`blending::seamless_clone`]. [`BlemishRemover`] chains them for one
//! click and [`Session`] adds the working image and one-step undo.

#![deny(missing_docs)]

pub mod blending;
pub mod border;
pub mod config;
pub mod edges;
mod engine;
pub mod error;
pub mod mask;
pub mod preprocess;
pub mod region;
pub mod search;
mod session;
pub mod shape;
mod types;

pub use border::{BorderedView, PadTransform};
pub use config::{BorderMode, RemovalConfig};
pub use engine::{
    default_output_path, is_supported_image, load_image, save_image, BlemishRemover,
    ClickOutcome, Removal, RemovalReport,
};
pub use error::{Error, Result};
pub use mask::{BlemishMasks, Mask};
pub use preprocess::{preprocess, Preprocessed};
pub use session::{EventOutcome, Session, SessionEvent};
pub use types::{Circle, Point};
