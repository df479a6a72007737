#![forbid(unsafe_code)]

//! Image descriptors and the ordered gallery that owns them.

use serde::Serialize;

/// One image shown by the modal: a source plus the caption shared with it.
///
/// Items are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageItem {
    src: String,
    title: String,
    desc: String,
}

impl ImageItem {
    /// Build an item. An empty `src` is allowed here; [`Gallery`] drops it.
    #[must_use]
    pub fn new(src: impl Into<String>, title: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: title.into(),
            desc: desc.into(),
        }
    }

    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Whether this item may be admitted into a gallery.
    #[must_use]
    pub fn has_source(&self) -> bool {
        !self.src.is_empty()
    }
}

/// Ordered, finite image sequence for one modal session.
///
/// Every item in a `Gallery` has a non-empty `src`; construction filters out
/// the rest. A gallery is replaced wholesale, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Gallery {
    items: Vec<ImageItem>,
}

impl Gallery {
    /// An empty gallery.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a gallery, dropping items without a source.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = ImageItem>) -> Self {
        Self {
            items: items.into_iter().filter(ImageItem::has_source).collect(),
        }
    }

    /// Build a gallery from bare sources that all share one caption.
    #[must_use]
    pub fn from_sources<I, S>(sources: I, title: &str, desc: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            sources
                .into_iter()
                .map(|src| ImageItem::new(src, title, desc)),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageItem> + '_ {
        self.items.iter()
    }

    /// Source paths in gallery order.
    pub fn sources(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(ImageItem::src)
    }

    /// Clamp a requested start position into range. `None` for an empty gallery.
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        Some(index.min(last))
    }

    /// Wrap a signed position into range, so `-1` lands on the last item.
    /// `None` for an empty gallery.
    #[must_use]
    pub fn wrap_index(&self, index: i64) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len() as i64;
        Some(index.rem_euclid(len) as usize)
    }
}

impl<'a> IntoIterator for &'a Gallery {
    type Item = &'a ImageItem;
    type IntoIter = std::slice::Iter<'a, ImageItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<ImageItem> for Gallery {
    fn from_iter<T: IntoIterator<Item = ImageItem>>(iter: T) -> Self {
        Self::new(iter)
    }
}
