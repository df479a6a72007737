#![forbid(unsafe_code)]

//! Stateless page helpers that run beside the modal.

use folio_gallery::{AnchorAction, classify_href};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

/// Write the current year into the footer slot, if present.
pub(crate) fn stamp_year(document: &Document, year_id: &str) {
    if year_id.is_empty() {
        return;
    }
    if let Some(node) = document.get_element_by_id(year_id) {
        let year = js_sys::Date::new_0().get_full_year();
        node.set_text_content(Some(&year.to_string()));
    }
}

/// Publish the nav bar height as `--nav-height` on the root element.
pub(crate) fn set_nav_height_var(document: &Document, nav_selector: &str) {
    let Some(nav) = document
        .query_selector(nav_selector)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let height = nav.offset_height().max(0);
    if let Err(err) = root
        .style()
        .set_property("--nav-height", &format!("{height}px"))
    {
        tracing::debug!(target: "folio.web", ?err, "nav height variable rejected");
    }
}

/// Apply the in-page link policy to one click.
pub(crate) fn handle_link_click(document: &Document, link: &Element, event: &Event) {
    match classify_href(link.get_attribute("href").as_deref()) {
        AnchorAction::Follow => {}
        AnchorAction::Suppress => event.prevent_default(),
        AnchorAction::ScrollTo(selector) => {
            event.prevent_default();
            // `#1st` and similar are not valid selectors; treat as no target.
            let Ok(Some(target)) = document.query_selector(&selector) else {
                return;
            };
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}
