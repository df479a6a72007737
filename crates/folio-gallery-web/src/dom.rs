#![forbid(unsafe_code)]

//! Modal element handles and surface rendering.

use std::cell::Cell;

use folio_gallery::{
    CardSource, DomSelectors, FocusPlan, FocusStep, ImageFlags, ModalFlags, ModalSurface,
};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, Node};

use crate::error::MountError;

/// Read-only [`CardSource`] over a live card element.
pub(crate) struct DomCard<'a>(pub(crate) &'a Element);

impl CardSource for DomCard<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn meta_text(&self) -> Option<String> {
        self.0
            .query_selector(".meta")
            .ok()
            .flatten()
            .and_then(|meta| meta.text_content())
    }

    fn thumbnail_src(&self) -> Option<String> {
        self.0
            .query_selector("img")
            .ok()
            .flatten()
            .and_then(|img| img.dyn_into::<HtmlImageElement>().ok())
            .map(|img| img.src())
    }
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    if selector.is_empty() {
        return None;
    }
    document.query_selector(selector).ok().flatten()
}

fn by_id(document: &Document, id: &str) -> Option<Element> {
    if id.is_empty() {
        return None;
    }
    document.get_element_by_id(id)
}

fn html(element: Element, name: &str) -> Result<HtmlElement, MountError> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| MountError::WrongElementType(name.to_owned(), "HTML element"))
}

/// Live handles to every element the modal touches.
pub(crate) struct ModalDom {
    pub(crate) document: Document,
    root: HtmlElement,
    body: HtmlElement,
    pub(crate) modal: HtmlElement,
    pub(crate) image: HtmlImageElement,
    title: Option<Element>,
    desc: Option<Element>,
    pub(crate) close: Option<HtmlElement>,
    pub(crate) prev: Option<Element>,
    pub(crate) next: Option<Element>,
    nav_selector: String,
    rendered_request: Cell<u64>,
}

impl ModalDom {
    pub(crate) fn resolve(
        document: Document,
        selectors: &DomSelectors,
    ) -> Result<Self, MountError> {
        let root = document
            .document_element()
            .ok_or(MountError::NoDocument)
            .and_then(|el| html(el, "html"))?;
        let body = document.body().ok_or(MountError::NoDocument)?;
        let modal = by_id(&document, &selectors.modal_id)
            .ok_or_else(|| MountError::MissingElement(selectors.modal_id.clone()))
            .and_then(|el| html(el, &selectors.modal_id))?;

        let image_el = by_id(&document, &selectors.image_id)
            .or_else(|| query(&document, &selectors.image_fallback))
            .ok_or_else(|| MountError::MissingElement(selectors.image_fallback.clone()))?;
        let image = image_el
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| MountError::WrongElementType(selectors.image_fallback.clone(), "<img>"))?;

        let close = match query(&document, &selectors.close) {
            Some(el) => Some(html(el, &selectors.close)?),
            None => None,
        };

        Ok(Self {
            title: by_id(&document, &selectors.title_id),
            desc: by_id(&document, &selectors.desc_id),
            prev: query(&document, &selectors.prev),
            next: query(&document, &selectors.next),
            close,
            nav_selector: format!("{} a", selectors.nav),
            rendered_request: Cell::new(0),
            document,
            root,
            body,
            modal,
            image,
        })
    }

    /// Paint `surface`. `src` is only re-assigned when a new load started.
    pub(crate) fn render(&self, surface: &ModalSurface) {
        let modal_classes = self.modal.class_list();
        for (name, flag) in ModalFlags::CLASSES {
            let _ = modal_classes.toggle_with_force(name, surface.modal.contains(flag));
        }
        let _ = self
            .modal
            .set_attribute("aria-hidden", if surface.aria_hidden { "true" } else { "false" });

        let overflow = if surface.scroll_locked { "hidden" } else { "" };
        for element in [&self.root, &self.body] {
            if let Err(err) = element.style().set_property("overflow", overflow) {
                tracing::debug!(target: "folio.web", ?err, "overflow style rejected");
            }
        }

        let image_classes = self.image.class_list();
        for (name, flag) in ImageFlags::CLASSES {
            let _ = image_classes.toggle_with_force(name, surface.image.contains(flag));
        }
        if surface.image.contains(ImageFlags::BUSY) {
            let _ = self.image.set_attribute("aria-busy", "true");
        } else {
            let _ = self.image.remove_attribute("aria-busy");
        }
        self.image.set_alt(&surface.image_alt);
        if surface.image_request != self.rendered_request.get() {
            if let Some(src) = surface.image_src.as_deref() {
                self.image.set_src(src);
            }
            self.rendered_request.set(surface.image_request);
        }

        if let Some(title) = &self.title {
            title.set_text_content(Some(&surface.title));
        }
        if let Some(desc) = &self.desc {
            desc.set_text_content(Some(&surface.desc));
        }
    }

    /// Natural image size, falling back to the rendered size per axis.
    pub(crate) fn image_size(&self) -> (u32, u32) {
        let width = match self.image.natural_width() {
            0 => self.image.width(),
            w => w,
        };
        let height = match self.image.natural_height() {
            0 => self.image.height(),
            h => h,
        };
        (width, height)
    }

    pub(crate) fn focus_close(&self) {
        if let Some(close) = &self.close {
            if let Err(err) = close.focus() {
                tracing::debug!(target: "folio.web", ?err, "close control refused focus");
            }
        }
    }

    fn active_inside_modal(&self) -> bool {
        let Some(active) = self.document.active_element() else {
            return false;
        };
        let node: &Node = active.as_ref();
        self.modal.contains(Some(node))
    }

    fn try_focus(&self, element: &HtmlElement) -> bool {
        if element.focus().is_err() {
            return false;
        }
        let target: &Element = element.as_ref();
        self.document.active_element().is_some_and(|active| active == *target)
    }

    fn try_focus_selector(&self, selector: &str) -> bool {
        query(&self.document, selector)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .is_some_and(|el| self.try_focus(&el))
    }

    /// Walk `plan` until one step takes effect. No-op unless focus is inside
    /// the modal.
    pub(crate) fn restore_focus(&self, plan: &FocusPlan, openers: &[Element]) {
        if !self.active_inside_modal() {
            return;
        }
        for step in plan.steps() {
            let done = match *step {
                FocusStep::Opener(id) => openers
                    .get(id.0 as usize)
                    .and_then(|el| el.dyn_ref::<HtmlElement>())
                    .is_some_and(|el| self.try_focus(el)),
                FocusStep::BlurActive => self
                    .document
                    .active_element()
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                    .is_some_and(|el| el.blur().is_ok()),
                FocusStep::NavLink => self.try_focus_selector(&self.nav_selector),
                FocusStep::AnyLink => self.try_focus_selector("a"),
                FocusStep::Body => self.body.focus().is_ok(),
            };
            if done {
                tracing::trace!(target: "folio.web", ?step, "focus restored");
                return;
            }
        }
    }
}
