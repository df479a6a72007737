#![forbid(unsafe_code)]

//! Listener bookkeeping for one mounted page.
//!
//! Every DOM listener the host installs lives in a [`ListenerRegistry`] slot.
//! A slot binds at most once, so repeated setup cannot stack duplicate
//! handlers, and dropping the registry drops every handle (which detaches the
//! listener on `wasm32`).

/// One listener position on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerSlot {
    /// Click on the n-th project card.
    Card(usize),
    CloseButton,
    PrevButton,
    NextButton,
    /// Click on the modal container; closes only when it is the target.
    Backdrop,
    ImageLoad,
    ImageError,
    /// Document-level `keydown`.
    Keyboard,
    /// Click on the n-th smooth-scroll link.
    ScrollLink(usize),
    WindowLoad,
    WindowResize,
}

impl ListenerSlot {
    /// DOM event name the slot listens for.
    #[must_use]
    pub const fn event(self) -> &'static str {
        match self {
            Self::Card(_)
            | Self::CloseButton
            | Self::PrevButton
            | Self::NextButton
            | Self::Backdrop
            | Self::ScrollLink(_) => "click",
            Self::ImageLoad | Self::WindowLoad => "load",
            Self::ImageError => "error",
            Self::Keyboard => "keydown",
            Self::WindowResize => "resize",
        }
    }
}

/// Slot-keyed listener handles.
#[derive(Debug)]
pub struct ListenerRegistry<H> {
    bound: Vec<(ListenerSlot, H)>,
}

impl<H> Default for ListenerRegistry<H> {
    fn default() -> Self {
        Self { bound: Vec::new() }
    }
}

impl<H> ListenerRegistry<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `slot` by calling `attach` with its event name.
    ///
    /// Returns `Ok(false)` without calling `attach` when the slot is already
    /// bound.
    pub fn bind<E>(
        &mut self,
        slot: ListenerSlot,
        attach: impl FnOnce(&'static str) -> Result<H, E>,
    ) -> Result<bool, E> {
        if self.is_bound(slot) {
            tracing::trace!(target: "folio.web", ?slot, "listener slot already bound");
            return Ok(false);
        }
        let handle = attach(slot.event())?;
        self.bound.push((slot, handle));
        Ok(true)
    }

    #[must_use]
    pub fn is_bound(&self, slot: ListenerSlot) -> bool {
        self.bound.iter().any(|(bound, _)| *bound == slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Drop every handle.
    pub fn clear(&mut self) {
        self.bound.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenerRegistry, ListenerSlot};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Handle(Rc<Cell<u32>>);

    impl Drop for Handle {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn slot_binds_once() {
        let mut registry = ListenerRegistry::<&'static str>::new();
        let first: Result<bool, ()> = registry.bind(ListenerSlot::CloseButton, Ok);
        assert_eq!(first, Ok(true));

        let mut attached_again = false;
        let second: Result<bool, ()> = registry.bind(ListenerSlot::CloseButton, |event| {
            attached_again = true;
            Ok(event)
        });
        assert_eq!(second, Ok(false));
        assert!(!attached_again);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn indexed_slots_are_distinct() {
        let mut registry = ListenerRegistry::<()>::new();
        for index in 0..3 {
            let bound: Result<bool, ()> = registry.bind(ListenerSlot::Card(index), |_| Ok(()));
            assert_eq!(bound, Ok(true));
        }
        assert!(registry.is_bound(ListenerSlot::Card(2)));
        assert!(!registry.is_bound(ListenerSlot::ScrollLink(2)));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn failed_attach_leaves_slot_free() {
        let mut registry = ListenerRegistry::<()>::new();
        let failed: Result<bool, &str> = registry.bind(ListenerSlot::Keyboard, |_| Err("denied"));
        assert_eq!(failed, Err("denied"));
        assert!(!registry.is_bound(ListenerSlot::Keyboard));
    }

    #[test]
    fn clear_drops_every_handle() {
        let dropped = Rc::new(Cell::new(0));
        let mut registry = ListenerRegistry::new();
        for slot in [ListenerSlot::ImageLoad, ListenerSlot::ImageError, ListenerSlot::Backdrop] {
            let handle = Handle(Rc::clone(&dropped));
            let bound: Result<bool, ()> = registry.bind(slot, move |_| Ok(handle));
            assert_eq!(bound, Ok(true));
        }
        registry.clear();
        assert_eq!(dropped.get(), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn event_names_match_dom() {
        assert_eq!(ListenerSlot::Card(0).event(), "click");
        assert_eq!(ListenerSlot::ImageError.event(), "error");
        assert_eq!(ListenerSlot::Keyboard.event(), "keydown");
        assert_eq!(ListenerSlot::WindowResize.event(), "resize");
    }
}
