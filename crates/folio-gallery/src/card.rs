#![forbid(unsafe_code)]

//! Read-only view of a project card.

use std::collections::BTreeMap;

/// Explicit image list, JSON array or comma-separated.
pub const ATTR_IMAGES: &str = "data-images";
/// Legacy alias of [`ATTR_IMAGES`].
pub const ATTR_IMAGES_LIST: &str = "data-images-list";
/// Base image path used to auto-generate a gallery.
pub const ATTR_IMAGE: &str = "data-image";
pub const ATTR_TITLE: &str = "data-title";
pub const ATTR_DESC: &str = "data-desc";

/// The parts of a card the gallery builder reads.
///
/// Implementations never mutate the underlying card.
pub trait CardSource {
    /// Raw attribute value, `None` when absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Text content of the card's `.meta` child, untrimmed.
    fn meta_text(&self) -> Option<String>;

    /// Resolved `src` of the card's nested thumbnail image.
    fn thumbnail_src(&self) -> Option<String>;
}

/// Owned card snapshot.
///
/// The web host copies a DOM card into one of these before building a
/// gallery; tests construct them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSnapshot {
    attributes: BTreeMap<String, String>,
    meta: Option<String>,
    thumbnail: Option<String>,
}

impl CardSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_meta(mut self, text: impl Into<String>) -> Self {
        self.meta = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, src: impl Into<String>) -> Self {
        self.thumbnail = Some(src.into());
        self
    }

    /// Copy every attribute the builder consults from another source.
    #[must_use]
    pub fn capture(source: &impl CardSource) -> Self {
        let attributes = [ATTR_IMAGES, ATTR_IMAGES_LIST, ATTR_IMAGE, ATTR_TITLE, ATTR_DESC]
            .into_iter()
            .filter_map(|name| source.attribute(name).map(|value| (name.to_owned(), value)))
            .collect();
        Self {
            attributes,
            meta: source.meta_text(),
            thumbnail: source.thumbnail_src(),
        }
    }
}

impl CardSource for CardSnapshot {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn meta_text(&self) -> Option<String> {
        self.meta.clone()
    }

    fn thumbnail_src(&self) -> Option<String> {
        self.thumbnail.clone()
    }
}

impl<T: CardSource + ?Sized> CardSource for &T {
    fn attribute(&self, name: &str) -> Option<String> {
        (**self).attribute(name)
    }

    fn meta_text(&self) -> Option<String> {
        (**self).meta_text()
    }

    fn thumbnail_src(&self) -> Option<String> {
        (**self).thumbnail_src()
    }
}
