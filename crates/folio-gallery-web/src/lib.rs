#![forbid(unsafe_code)]

//! WASM host for the folio gallery viewer.
//!
//! [`GalleryApp`] resolves the modal elements of a portfolio page, binds every
//! listener exactly once at mount, and drives a
//! [`folio_gallery::ModalController`]: DOM events become controller inputs,
//! and controller output (surface + host commands) becomes class, attribute,
//! focus and `setTimeout` calls.
//!
//! It also carries the page's small stateless helpers: footer year, the
//! `--nav-height` CSS variable, and smooth scrolling for in-page links.
//!
//! Only [`error`], [`listeners`] and [`timers`] compile off `wasm32`; they
//! hold the logic that is worth testing natively.

pub mod error;
pub mod listeners;
pub mod timers;

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::GalleryApp;

pub use error::MountError;
pub use listeners::{ListenerRegistry, ListenerSlot};
pub use timers::PendingTimers;
