#![forbid(unsafe_code)]

//! Click policy for in-page navigation links.

/// What the host should do with a link click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorAction {
    /// Prevent the default navigation and do nothing else.
    Suppress,
    /// Prevent the default navigation and smooth-scroll to the element
    /// matching this selector, if any.
    ScrollTo(String),
    /// Let the browser navigate.
    Follow,
}

/// Classify a link's `href` attribute.
///
/// Missing, empty and bare `#` hrefs are suppressed; `#id` hrefs scroll.
#[must_use]
pub fn classify_href(href: Option<&str>) -> AnchorAction {
    match href.unwrap_or_default() {
        "" | "#" => AnchorAction::Suppress,
        fragment if fragment.starts_with('#') => AnchorAction::ScrollTo(fragment.to_owned()),
        _ => AnchorAction::Follow,
    }
}

#[cfg(test)]
mod tests {
    use super::{AnchorAction, classify_href};

    #[test]
    fn empty_and_bare_hash_are_suppressed() {
        assert_eq!(classify_href(None), AnchorAction::Suppress);
        assert_eq!(classify_href(Some("")), AnchorAction::Suppress);
        assert_eq!(classify_href(Some("#")), AnchorAction::Suppress);
    }

    #[test]
    fn fragments_scroll_and_others_follow() {
        assert_eq!(
            classify_href(Some("#work")),
            AnchorAction::ScrollTo("#work".to_owned())
        );
        assert_eq!(classify_href(Some("/about")), AnchorAction::Follow);
        assert_eq!(classify_href(Some("mailto:hi@site.test")), AnchorAction::Follow);
    }
}
