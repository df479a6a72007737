#![forbid(unsafe_code)]

//! `folio-gallery` is the host-agnostic core of the portfolio gallery viewer.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes clicks, keys, image events
//!   and timer firings; the core never touches the DOM.
//! - **Deterministic**: no clock, no threads. Deferred steps are timers the
//!   host schedules and reports back.
//! - **Degrade, never fail**: malformed card data and failed images end in a
//!   visible but non-blocking state.
//!
//! The [`builder`] turns a clicked card into a [`Gallery`], and the
//! [`ModalController`] runs one modal session at a time over it. The
//! `folio-gallery-web` crate wires both to a real page.

pub mod anchor;
pub mod builder;
pub mod card;
pub mod config;
pub mod controller;
pub mod error;
pub mod item;
pub mod surface;
pub mod trace;

pub use anchor::{AnchorAction, classify_href};
pub use builder::{
    CardDefaults, GalleryOrigin, ResolvedGallery, build_gallery_for_card, derive_variant_paths,
    parse_image_list, resolve_gallery,
};
pub use card::{CardSnapshot, CardSource};
pub use config::{DomSelectors, GalleryConfig, GalleryText, ModalTiming};
pub use controller::{
    FocusPlan, FocusStep, HostCommand, IgnoredReason, ModalController, ModalDispatch, ModalInput,
    ModalInputKind, ModalKey, ModalLogEntry, ModalOutcome, ModalPhase, OpenerId, TimerId,
    TimerKind,
};
pub use error::ConfigError;
pub use item::{Gallery, ImageItem};
pub use surface::{ImageFlags, ModalFlags, ModalSurface, SurfaceSummary};
pub use trace::ModalTrace;
