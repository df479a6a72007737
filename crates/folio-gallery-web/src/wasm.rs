#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the gallery host.
//!
//! Listener closures hold a `Weak` reference to the shared [`Host`], so the
//! page keeps working exactly as long as the JS side keeps its
//! [`GalleryApp`] alive. Dropping (or `unmount`ing) the app detaches every
//! listener and clears every pending timeout.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_gallery::{
    CardDefaults, CardSnapshot, GalleryConfig, HostCommand, ModalController, ModalInput, ModalKey,
    OpenerId, SurfaceSummary, resolve_gallery,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, KeyboardEvent, Window};

use crate::console;
use crate::dom::{DomCard, ModalDom};
use crate::error::MountError;
use crate::listeners::{ListenerRegistry, ListenerSlot};
use crate::page;
use crate::timers::PendingTimers;

/// Installed DOM listener; detaches itself when dropped.
struct BoundListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl BoundListener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, MountError> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for BoundListener {
    fn drop(&mut self) {
        let callback: &js_sys::Function = self.closure.as_ref().unchecked_ref();
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, callback);
    }
}

fn js_error(value: JsValue) -> MountError {
    MountError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn to_js(err: MountError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Shared state reachable from every listener and timer callback.
struct Host {
    window: Window,
    dom: ModalDom,
    cards: Vec<Element>,
    defaults: CardDefaults,
    controller: RefCell<ModalController>,
    timeouts: RefCell<PendingTimers<Closure<dyn FnMut()>>>,
}

impl Host {
    /// Run one input through the controller, then paint and execute its output.
    ///
    /// The controller borrow ends before any DOM call, so a DOM side effect
    /// that re-enters a listener cannot hit a double borrow.
    fn dispatch(self: &Rc<Self>, input: ModalInput) {
        let (dispatch, surface) = {
            let mut controller = self.controller.borrow_mut();
            let dispatch = controller.dispatch(input);
            (dispatch, controller.surface().clone())
        };
        if !dispatch.accepted() {
            return;
        }
        self.dom.render(&surface);
        for command in dispatch.commands {
            self.run(command);
        }
    }

    fn run(self: &Rc<Self>, command: HostCommand) {
        match command {
            HostCommand::ScheduleTimer { timer, kind, delay } => {
                let weak: Weak<Self> = Rc::downgrade(self);
                let callback = Closure::<dyn FnMut()>::once(move || {
                    if let Some(host) = weak.upgrade() {
                        // Held until this call returns; the timeout cannot run again.
                        let spent = host.timeouts.borrow_mut().take_fired(timer);
                        host.dispatch(ModalInput::TimerFired(timer));
                        drop(spent);
                    }
                });
                let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
                let scheduled = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    millis,
                );
                match scheduled {
                    Ok(handle) => {
                        let replaced = self.timeouts.borrow_mut().insert(timer, handle, callback);
                        if let Some(stale) = replaced {
                            self.window.clear_timeout_with_handle(stale);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(target: "folio.web", ?kind, ?err, "setTimeout failed");
                    }
                }
            }
            HostCommand::CancelTimer { timer } => {
                let handle = self.timeouts.borrow_mut().cancel(timer);
                if let Some(handle) = handle {
                    self.window.clear_timeout_with_handle(handle);
                }
            }
            HostCommand::FocusCloseControl => self.dom.focus_close(),
            HostCommand::RestoreFocus(plan) => self.dom.restore_focus(&plan, &self.cards),
        }
    }

    fn open_card(self: &Rc<Self>, index: usize) -> bool {
        let Some(card) = self.cards.get(index) else {
            return false;
        };
        let snapshot = CardSnapshot::capture(&DomCard(card));
        let resolved = resolve_gallery(&snapshot, &self.defaults);
        tracing::info!(
            target: "folio.web",
            card = index,
            origin = ?resolved.origin,
            len = resolved.gallery.len(),
            "card clicked"
        );
        let opener = u32::try_from(index).ok().map(OpenerId);
        self.dispatch(ModalInput::Open {
            gallery: resolved.gallery,
            start_index: 0,
            opener,
        });
        self.controller.borrow().is_open()
    }

    fn cancel_all_timeouts(&self) {
        let handles = self.timeouts.borrow_mut().drain_handles();
        for handle in handles {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for Host {
    /// Pending callbacks die with the host, so their timeouts must not run.
    fn drop(&mut self) {
        self.cancel_all_timeouts();
    }
}

/// Gallery viewer mounted on the current page.
///
/// ```js
/// import init, { GalleryApp } from "./folio_gallery_web.js";
/// await init();
/// const gallery = new GalleryApp(JSON.stringify({ log_level: "debug" }));
/// ```
#[wasm_bindgen]
pub struct GalleryApp {
    host: Rc<Host>,
    listeners: ListenerRegistry<BoundListener>,
}

#[wasm_bindgen]
impl GalleryApp {
    /// Resolve page elements and bind every listener once.
    ///
    /// `config_json` is an optional, partial [`GalleryConfig`] object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GalleryApp, JsValue> {
        console::install_panic_hook();
        Self::mount(config_json.as_deref()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = openCard)]
    pub fn open_card(&self, index: u32) -> bool {
        self.host.open_card(index as usize)
    }

    pub fn next(&self) {
        self.host.dispatch(ModalInput::Next);
    }

    pub fn prev(&self) {
        self.host.dispatch(ModalInput::Prev);
    }

    pub fn close(&self) {
        self.host.dispatch(ModalInput::Close);
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.host.controller.borrow().is_open()
    }

    /// True from open until the deferred hide has run.
    #[wasm_bindgen(js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.host.controller.borrow().surface().is_visible()
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> u32 {
        self.host.controller.borrow().current_index() as u32
    }

    #[wasm_bindgen(js_name = galleryLength)]
    pub fn gallery_length(&self) -> u32 {
        self.host.controller.borrow().gallery().len() as u32
    }

    #[wasm_bindgen(js_name = listenerCount)]
    pub fn listener_count(&self) -> u32 {
        self.listeners.len() as u32
    }

    /// JSON snapshot of the rendered surface.
    #[wasm_bindgen(js_name = surfaceJson)]
    pub fn surface_json(&self) -> String {
        let summary = SurfaceSummary::from(self.host.controller.borrow().surface());
        serde_json::to_string(&summary).unwrap_or_default()
    }

    /// Drain the dispatch trace as JSONL, one entry per line.
    #[wasm_bindgen(js_name = drainTraceJsonl)]
    pub fn drain_trace_jsonl(&self) -> String {
        self.host.controller.borrow_mut().trace_mut().drain_jsonl()
    }

    /// Detach every listener and clear pending timeouts.
    pub fn unmount(&mut self) {
        self.listeners.clear();
        self.host.cancel_all_timeouts();
    }
}

impl GalleryApp {
    fn mount(config_json: Option<&str>) -> Result<Self, MountError> {
        let config = match config_json {
            Some(text) if !text.trim().is_empty() => GalleryConfig::from_json(text)?,
            _ => GalleryConfig::default(),
        };
        console::init_tracing(config.level()?);

        let window = web_sys::window().ok_or(MountError::NoDocument)?;
        let document = window.document().ok_or(MountError::NoDocument)?;
        let selectors = &config.selectors;
        let dom = ModalDom::resolve(document.clone(), selectors)?;

        let cards = collect(&document, &selectors.card)?;
        let links = collect(&document, &selectors.scroll_links)?;

        let host = Rc::new(Host {
            window: window.clone(),
            dom,
            cards,
            defaults: config.card_defaults(),
            controller: RefCell::new(ModalController::from_config(&config)),
            timeouts: RefCell::new(PendingTimers::new()),
        });
        let mut app = Self {
            host,
            listeners: ListenerRegistry::new(),
        };
        app.bind_modal()?;
        app.bind_page(&window, &document, links, &config)?;

        tracing::info!(
            target: "folio.web",
            cards = app.host.cards.len(),
            listeners = app.listeners.len(),
            "gallery mounted"
        );
        Ok(app)
    }

    fn bind(
        &mut self,
        slot: ListenerSlot,
        target: &EventTarget,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), MountError> {
        self.listeners
            .bind(slot, |event| BoundListener::attach(target, event, handler))
            .map(|_| ())
    }

    fn bind_modal(&mut self) -> Result<(), MountError> {
        for (index, card) in self.host.cards.clone().iter().enumerate() {
            let weak = Rc::downgrade(&self.host);
            self.bind(ListenerSlot::Card(index), card.as_ref(), move |_event| {
                if let Some(host) = weak.upgrade() {
                    host.open_card(index);
                }
            })?;
        }

        let dom = &self.host.dom;
        let buttons = [
            (
                ListenerSlot::CloseButton,
                dom.close.clone().map(Element::from),
                ModalInput::Close,
            ),
            (ListenerSlot::PrevButton, dom.prev.clone(), ModalInput::Prev),
            (ListenerSlot::NextButton, dom.next.clone(), ModalInput::Next),
        ];
        for (slot, element, input) in buttons {
            let Some(element) = element else { continue };
            let weak = Rc::downgrade(&self.host);
            self.bind(slot, element.as_ref(), move |event: Event| {
                // Keep the click from reaching the backdrop handler.
                event.stop_propagation();
                if let Some(host) = weak.upgrade() {
                    host.dispatch(input.clone());
                }
            })?;
        }

        let modal = self.host.dom.modal.clone();
        let weak = Rc::downgrade(&self.host);
        self.bind(ListenerSlot::Backdrop, modal.as_ref(), move |event: Event| {
            let Some(host) = weak.upgrade() else { return };
            let backdrop: &EventTarget = host.dom.modal.as_ref();
            let on_backdrop = event.target().as_ref() == Some(backdrop);
            host.dispatch(ModalInput::BackdropClick { on_backdrop });
        })?;

        let image = self.host.dom.image.clone();
        let weak = Rc::downgrade(&self.host);
        self.bind(ListenerSlot::ImageLoad, image.as_ref(), move |_event| {
            if let Some(host) = weak.upgrade() {
                let (width, height) = host.dom.image_size();
                host.dispatch(ModalInput::ImageLoaded { width, height });
            }
        })?;
        let weak = Rc::downgrade(&self.host);
        self.bind(ListenerSlot::ImageError, image.as_ref(), move |_event| {
            if let Some(host) = weak.upgrade() {
                host.dispatch(ModalInput::ImageFailed);
            }
        })?;

        let document = self.host.dom.document.clone();
        let weak = Rc::downgrade(&self.host);
        self.bind(ListenerSlot::Keyboard, document.as_ref(), move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let Some(host) = weak.upgrade() else { return };
            if !host.controller.borrow().is_open() {
                return;
            }
            host.dispatch(ModalInput::Key(ModalKey::from_dom_key(&key)));
        })?;
        Ok(())
    }

    fn bind_page(
        &mut self,
        window: &Window,
        document: &web_sys::Document,
        links: Vec<Element>,
        config: &GalleryConfig,
    ) -> Result<(), MountError> {
        page::stamp_year(document, &config.selectors.year_id);
        page::set_nav_height_var(document, &config.selectors.nav);

        for slot in [ListenerSlot::WindowLoad, ListenerSlot::WindowResize] {
            let document = document.clone();
            let nav = config.selectors.nav.clone();
            self.bind(slot, window.as_ref(), move |_event| {
                page::set_nav_height_var(&document, &nav);
            })?;
        }

        for (index, link) in links.into_iter().enumerate() {
            let document = document.clone();
            let target = link.clone();
            self.bind(ListenerSlot::ScrollLink(index), target.as_ref(), move |event: Event| {
                page::handle_link_click(&document, &link, &event);
            })?;
        }
        Ok(())
    }
}

fn collect(document: &web_sys::Document, selector: &str) -> Result<Vec<Element>, MountError> {
    if selector.trim().is_empty() {
        return Ok(Vec::new());
    }
    let nodes = document.query_selector_all(selector).map_err(js_error)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}
