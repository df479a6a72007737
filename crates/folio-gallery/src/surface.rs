#![forbid(unsafe_code)]

//! Declarative view state the host renders onto the modal DOM.

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Classes on the modal container.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModalFlags: u8 {
        /// `active`: the modal is visible.
        const ACTIVE = 0b0001;
        /// `portrait`: the loaded image is taller than wide.
        const PORTRAIT = 0b0010;
    }
}

bitflags! {
    /// Classes and busy state on the image slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImageFlags: u8 {
        /// `loading` class.
        const LOADING = 0b0001;
        /// `error` class.
        const ERROR = 0b0010;
        /// `aria-busy="true"`.
        const BUSY = 0b0100;
    }
}

impl ModalFlags {
    /// `(class name, flag)` pairs in render order.
    pub const CLASSES: [(&'static str, Self); 2] =
        [("active", Self::ACTIVE), ("portrait", Self::PORTRAIT)];
}

impl ImageFlags {
    /// `(class name, flag)` pairs in render order. `BUSY` is an attribute,
    /// not a class.
    pub const CLASSES: [(&'static str, Self); 2] =
        [("loading", Self::LOADING), ("error", Self::ERROR)];
}

/// Everything the host needs to paint the modal.
///
/// The host re-applies the whole surface after each dispatch; every field is
/// idempotent except `image_src`, which must only be assigned when
/// `image_request` changes, since re-assigning `src` restarts the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalSurface {
    pub modal: ModalFlags,
    pub image: ImageFlags,
    /// `aria-hidden` on the modal container.
    pub aria_hidden: bool,
    /// `overflow: hidden` on both the root element and the body.
    pub scroll_locked: bool,
    /// Last requested image. Kept across close so re-opening hits the cache.
    pub image_src: Option<String>,
    /// Incremented each time a new image load starts.
    pub image_request: u64,
    pub image_alt: String,
    pub title: String,
    pub desc: String,
}

impl ModalSurface {
    /// The initial, hidden surface.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            aria_hidden: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.modal.contains(ModalFlags::ACTIVE)
    }

    /// Modal classes that are currently on.
    pub fn modal_classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        ModalFlags::CLASSES
            .into_iter()
            .filter(|(_, flag)| self.modal.contains(*flag))
            .map(|(name, _)| name)
    }

    /// Image classes that are currently on.
    pub fn image_classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        ImageFlags::CLASSES
            .into_iter()
            .filter(|(_, flag)| self.image.contains(*flag))
            .map(|(name, _)| name)
    }
}

/// Compact, serializable view of a surface for traces and the JS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceSummary {
    pub visible: bool,
    pub portrait: bool,
    pub loading: bool,
    pub error: bool,
    pub busy: bool,
    pub scroll_locked: bool,
    pub image_src: Option<String>,
}

impl From<&ModalSurface> for SurfaceSummary {
    fn from(surface: &ModalSurface) -> Self {
        Self {
            visible: surface.is_visible(),
            portrait: surface.modal.contains(ModalFlags::PORTRAIT),
            loading: surface.image.contains(ImageFlags::LOADING),
            error: surface.image.contains(ImageFlags::ERROR),
            busy: surface.image.contains(ImageFlags::BUSY),
            scroll_locked: surface.scroll_locked,
            image_src: surface.image_src.clone(),
        }
    }
}
