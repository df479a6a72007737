#![forbid(unsafe_code)]

//! Gallery assembly for a clicked card.
//!
//! Resolution order, first non-empty result wins:
//! 1. an explicit `data-images` list (JSON array or comma-separated);
//! 2. a four-image set generated from the card's base image by inserting
//!    `-2`, `-3`, `-4` before the extension;
//! 3. the base image alone.
//!
//! Nothing here fails. Malformed lists and missing attributes fall through to
//! the next step, and a card with no resolvable image yields an empty gallery.

use serde::Serialize;
use serde_json::Value;

use crate::card::{ATTR_DESC, ATTR_IMAGE, ATTR_IMAGES, ATTR_IMAGES_LIST, ATTR_TITLE, CardSource};
use crate::config::GalleryText;
use crate::item::Gallery;

/// Number of images in a generated set, including the base image.
pub const GENERATED_SET_SIZE: usize = 4;

/// Caption fallbacks applied when a card carries no title or description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDefaults {
    pub title: String,
    pub desc: String,
}

impl Default for CardDefaults {
    fn default() -> Self {
        let text = GalleryText::default();
        Self {
            title: text.default_title,
            desc: text.default_desc,
        }
    }
}

/// Which resolution step produced a gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryOrigin {
    Explicit,
    Generated,
    Single,
    Empty,
}

/// A gallery together with the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGallery {
    pub origin: GalleryOrigin,
    pub gallery: Gallery,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// `data-title`, else trimmed `.meta` text, else the default title.
#[must_use]
pub fn resolve_title(card: &impl CardSource, defaults: &CardDefaults) -> String {
    present(card.attribute(ATTR_TITLE))
        .or_else(|| present(card.meta_text().map(|text| text.trim().to_owned())))
        .unwrap_or_else(|| defaults.title.clone())
}

/// `data-desc`, else the default description.
#[must_use]
pub fn resolve_desc(card: &impl CardSource, defaults: &CardDefaults) -> String {
    present(card.attribute(ATTR_DESC)).unwrap_or_else(|| defaults.desc.clone())
}

/// Base image for generated and single-item galleries: trimmed `data-image`,
/// else the thumbnail's resolved source.
#[must_use]
pub fn base_source(card: &impl CardSource) -> Option<String> {
    present(card.attribute(ATTR_IMAGE).map(|v| v.trim().to_owned()))
        .or_else(|| present(card.thumbnail_src().map(|v| v.trim().to_owned())))
}

fn json_element(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Split an explicit image list into sources.
///
/// Text that starts with `[` must be a JSON array; if it is not, the list is
/// treated as empty so resolution moves on to the generated set. Anything else
/// is split on commas. Empty entries are dropped either way.
#[must_use]
pub fn parse_image_list(raw: &str) -> Vec<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Vec::new();
    }
    if value.starts_with('[') {
        return match serde_json::from_str::<Vec<Value>>(value) {
            Ok(elements) => elements
                .into_iter()
                .filter_map(json_element)
                .filter(|s| !s.is_empty())
                .collect(),
            Err(err) => {
                tracing::debug!(target: "folio.gallery", %err, "ignoring malformed image list");
                Vec::new()
            }
        };
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Derive the four-image set for a base path.
///
/// `images/p.jpg?v=1` becomes `images/p.jpg?v=1`, `images/p-2.jpg?v=1`,
/// `images/p-3.jpg?v=1`, `images/p-4.jpg?v=1`. A filename without a `.`
/// yields only the base path.
#[must_use]
pub fn derive_variant_paths(base: &str) -> Vec<String> {
    let url = base.trim();
    if url.is_empty() {
        return Vec::new();
    }
    let (main, suffix) = url.split_at(url.find(['?', '#']).unwrap_or(url.len()));
    let (dir, filename) = match main.rfind('/') {
        Some(slash) => main.split_at(slash + 1),
        None => ("", main),
    };
    let Some(dot) = filename.rfind('.') else {
        return vec![url.to_owned()];
    };
    let (name, ext) = (&filename[..dot], &filename[dot + 1..]);

    let mut paths = Vec::with_capacity(GENERATED_SET_SIZE);
    paths.push(url.to_owned());
    for n in 2..=GENERATED_SET_SIZE {
        paths.push(format!("{dir}{name}-{n}.{ext}{suffix}"));
    }
    paths
}

/// Resolve a card's gallery and report which step produced it.
#[must_use]
pub fn resolve_gallery(card: &impl CardSource, defaults: &CardDefaults) -> ResolvedGallery {
    let title = resolve_title(card, defaults);
    let desc = resolve_desc(card, defaults);

    let resolved = 'resolve: {
        let explicit = present(card.attribute(ATTR_IMAGES))
            .or_else(|| present(card.attribute(ATTR_IMAGES_LIST)));
        if let Some(raw) = explicit {
            let gallery = Gallery::from_sources(parse_image_list(&raw), &title, &desc);
            if !gallery.is_empty() {
                break 'resolve ResolvedGallery {
                    origin: GalleryOrigin::Explicit,
                    gallery,
                };
            }
        }

        let base = base_source(card);
        if let Some(base) = base.as_deref() {
            let gallery = Gallery::from_sources(derive_variant_paths(base), &title, &desc);
            if !gallery.is_empty() {
                break 'resolve ResolvedGallery {
                    origin: GalleryOrigin::Generated,
                    gallery,
                };
            }
        }

        let gallery = Gallery::from_sources(base, &title, &desc);
        let origin = if gallery.is_empty() {
            GalleryOrigin::Empty
        } else {
            GalleryOrigin::Single
        };
        ResolvedGallery { origin, gallery }
    };

    tracing::debug!(
        target: "folio.gallery",
        origin = ?resolved.origin,
        len = resolved.gallery.len(),
        "gallery resolved"
    );
    resolved
}

/// Build the gallery for a clicked card.
#[must_use]
pub fn build_gallery_for_card(card: &impl CardSource, defaults: &CardDefaults) -> Gallery {
    resolve_gallery(card, defaults).gallery
}

#[cfg(test)]
mod tests {
    use super::{
        CardDefaults, GalleryOrigin, build_gallery_for_card, derive_variant_paths,
        parse_image_list, resolve_gallery,
    };
    use crate::card::CardSnapshot;
    use pretty_assertions::assert_eq;

    fn sources(card: &CardSnapshot) -> Vec<String> {
        build_gallery_for_card(card, &CardDefaults::default())
            .sources()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn json_list_keeps_order_and_shares_caption() {
        let card = CardSnapshot::new()
            .with_attribute("data-images", r#"["c.jpg", "a.jpg", "b.jpg"]"#)
            .with_attribute("data-title", "Branding")
            .with_attribute("data-desc", "Logo work");
        let gallery = build_gallery_for_card(&card, &CardDefaults::default());
        assert_eq!(gallery.sources().collect::<Vec<_>>(), ["c.jpg", "a.jpg", "b.jpg"]);
        assert!(gallery
            .iter()
            .all(|item| item.title() == "Branding" && item.desc() == "Logo work"));
    }

    #[test]
    fn comma_list_trims_and_drops_empty_entries() {
        let card = CardSnapshot::new().with_attribute("data-images", "a.jpg, ,b.jpg");
        assert_eq!(sources(&card), ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn legacy_alias_is_read_when_primary_is_missing() {
        let card = CardSnapshot::new().with_attribute("data-images-list", "x.png,y.png");
        assert_eq!(sources(&card), ["x.png", "y.png"]);
    }

    #[test]
    fn malformed_json_falls_through_to_generated_set() {
        let card = CardSnapshot::new()
            .with_attribute("data-images", r#"["a.jpg", "#)
            .with_attribute("data-image", "img/base.jpg");
        let resolved = resolve_gallery(&card, &CardDefaults::default());
        assert_eq!(resolved.origin, GalleryOrigin::Generated);
        assert_eq!(resolved.gallery.len(), 4);
    }

    #[test]
    fn json_scalars_are_stringified_and_nulls_skipped() {
        assert_eq!(
            parse_image_list(r#"[" a.jpg ", 7, null, {"src":"x"}, ""]"#),
            ["a.jpg", "7"]
        );
    }

    #[test]
    fn data_image_generates_four_up_set() {
        let card = CardSnapshot::new().with_attribute("data-image", "images/Proj-thumb.jpg");
        assert_eq!(
            sources(&card),
            [
                "images/Proj-thumb.jpg",
                "images/Proj-thumb-2.jpg",
                "images/Proj-thumb-3.jpg",
                "images/Proj-thumb-4.jpg",
            ]
        );
    }

    #[test]
    fn variants_preserve_query_and_fragment() {
        assert_eq!(derive_variant_paths("img/a.png?v=2")[1], "img/a-2.png?v=2");
        assert_eq!(derive_variant_paths("a.b/c.webp#top")[3], "a.b/c-4.webp#top");
    }

    #[test]
    fn extensionless_base_yields_single_item() {
        let card = CardSnapshot::new().with_attribute("data-image", "img/noext");
        assert_eq!(sources(&card), ["img/noext"]);
        // A dot in the directory does not count as an extension.
        assert_eq!(derive_variant_paths("v1.2/noext"), ["v1.2/noext"]);
    }

    #[test]
    fn thumbnail_is_used_when_data_image_is_absent() {
        let card = CardSnapshot::new().with_thumbnail("https://site.test/t/p.jpg");
        assert_eq!(sources(&card)[2], "https://site.test/t/p-3.jpg");
    }

    #[test]
    fn card_without_any_source_yields_empty_gallery() {
        let card = CardSnapshot::new().with_attribute("data-images", "  ");
        let resolved = resolve_gallery(&card, &CardDefaults::default());
        assert_eq!(resolved.origin, GalleryOrigin::Empty);
        assert!(resolved.gallery.is_empty());
    }

    #[test]
    fn title_falls_back_to_meta_then_default() {
        let defaults = CardDefaults::default();
        let meta = CardSnapshot::new()
            .with_attribute("data-image", "a")
            .with_attribute("data-title", "")
            .with_meta("  Editorial \n");
        let gallery = build_gallery_for_card(&meta, &defaults);
        assert_eq!(gallery.get(0).map(|i| i.title()), Some("Editorial"));

        let bare = CardSnapshot::new().with_attribute("data-image", "a");
        let gallery = build_gallery_for_card(&bare, &defaults);
        let item = gallery.get(0).expect("single item");
        assert_eq!(item.title(), "Project");
        assert_eq!(item.desc(), defaults.desc);
    }
}
