#![forbid(unsafe_code)]

//! Pending `setTimeout` bookkeeping.
//!
//! Each scheduled [`TimerId`] owns its browser handle and the callback that
//! handle will invoke. The callback must outlive the timeout, and must be
//! released once the timeout can no longer run: on cancel, after it fires, or
//! on unmount.

use std::collections::HashMap;

use folio_gallery::TimerId;

/// Timers the host has handed to the browser and not yet settled.
#[derive(Debug)]
pub struct PendingTimers<C> {
    pending: HashMap<TimerId, (i32, C)>,
}

impl<C> Default for PendingTimers<C> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<C> PendingTimers<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `timer` under its browser `handle`.
    ///
    /// Returns the handle of an entry already stored under the same id so the
    /// caller can clear it. Its callback is dropped here.
    pub fn insert(&mut self, timer: TimerId, handle: i32, callback: C) -> Option<i32> {
        self.pending
            .insert(timer, (handle, callback))
            .map(|(previous, _)| previous)
    }

    /// Forget a cancelled timer, dropping its callback.
    ///
    /// Returns the handle to pass to `clearTimeout`.
    pub fn cancel(&mut self, timer: TimerId) -> Option<i32> {
        self.pending.remove(&timer).map(|(handle, _)| handle)
    }

    /// Remove a timer that is firing and hand back its callback.
    ///
    /// The caller keeps the callback alive until it has returned.
    pub fn take_fired(&mut self, timer: TimerId) -> Option<C> {
        self.pending.remove(&timer).map(|(_, callback)| callback)
    }

    /// Drop every callback and return the handles still armed.
    pub fn drain_handles(&mut self) -> Vec<i32> {
        self.pending.drain().map(|(_, (handle, _))| handle).collect()
    }

    #[must_use]
    pub fn contains(&self, timer: TimerId) -> bool {
        self.pending.contains_key(&timer)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::PendingTimers;
    use folio_gallery::{Gallery, HostCommand, ModalController, OpenerId, TimerId};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Callback(Rc<Cell<u32>>);

    impl Drop for Callback {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Apply one dispatch's timer commands the way the web host does.
    fn apply(
        timers: &mut PendingTimers<Callback>,
        commands: &[HostCommand],
        dropped: &Rc<Cell<u32>>,
        next_handle: &mut i32,
    ) -> Vec<i32> {
        let mut cleared = Vec::new();
        for command in commands {
            match command {
                HostCommand::ScheduleTimer { timer, .. } => {
                    *next_handle += 1;
                    timers.insert(*timer, *next_handle, Callback(Rc::clone(dropped)));
                }
                HostCommand::CancelTimer { timer } => cleared.extend(timers.cancel(*timer)),
                _ => {}
            }
        }
        cleared
    }

    fn gallery(n: usize) -> Gallery {
        Gallery::from_sources((0..n).map(|i| format!("img/{i}.jpg")), "Title", "Desc")
    }

    #[test]
    fn navigation_releases_the_replaced_load_guard() {
        let dropped = Rc::new(Cell::new(0));
        let mut timers = PendingTimers::new();
        let mut handle = 0;
        let mut modal = ModalController::default();

        let open = modal.open(gallery(3), 0, Some(OpenerId(0)));
        apply(&mut timers, &open.commands, &dropped, &mut handle);
        // Load guard and focus timer.
        assert_eq!(timers.len(), 2);

        for _ in 0..5 {
            let next = modal.next();
            let cleared = apply(&mut timers, &next.commands, &dropped, &mut handle);
            assert_eq!(cleared.len(), 1);
        }
        assert_eq!(dropped.get(), 5);
        assert_eq!(timers.len(), 2);
    }

    #[test]
    fn close_releases_guard_and_focus_callbacks() {
        let dropped = Rc::new(Cell::new(0));
        let mut timers = PendingTimers::new();
        let mut handle = 0;
        let mut modal = ModalController::default();

        let open = modal.open(gallery(2), 0, None);
        apply(&mut timers, &open.commands, &dropped, &mut handle);
        let close = modal.close();
        let cleared = apply(&mut timers, &close.commands, &dropped, &mut handle);

        assert_eq!(cleared, vec![1, 2]);
        assert_eq!(dropped.get(), 2);
        // Only the deferred hide is still armed.
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn fired_callback_is_handed_back_once() {
        let dropped = Rc::new(Cell::new(0));
        let mut timers = PendingTimers::new();
        let mut handle = 0;
        let mut modal = ModalController::default();
        let open = modal.open(gallery(1), 0, None);
        apply(&mut timers, &open.commands, &dropped, &mut handle);

        let guard = modal.load_guard().expect("guard armed");
        let callback = timers.take_fired(guard).expect("pending");
        assert!(!timers.contains(guard));
        assert_eq!(dropped.get(), 0);
        drop(callback);
        assert_eq!(dropped.get(), 1);
        assert!(timers.take_fired(guard).is_none());
        assert_eq!(timers.cancel(guard), None);
    }

    #[test]
    fn drain_releases_everything() {
        let dropped = Rc::new(Cell::new(0));
        let mut timers = PendingTimers::new();
        let mut handle = 0;
        let mut modal = ModalController::default();
        let open = modal.open(gallery(2), 0, None);
        apply(&mut timers, &open.commands, &dropped, &mut handle);

        let mut handles = timers.drain_handles();
        handles.sort_unstable();
        assert_eq!(handles, vec![1, 2]);
        assert_eq!(dropped.get(), 2);
        assert!(timers.is_empty());
    }

    #[test]
    fn reinsert_returns_previous_handle() {
        let dropped = Rc::new(Cell::new(0));
        let mut timers = PendingTimers::new();
        let mut modal = ModalController::default();
        let open = modal.open(gallery(1), 0, None);
        let timer: TimerId = modal.load_guard().expect("guard armed");
        assert!(!open.commands.is_empty());

        assert_eq!(timers.insert(timer, 7, Callback(Rc::clone(&dropped))), None);
        assert_eq!(timers.insert(timer, 8, Callback(Rc::clone(&dropped))), Some(7));
        assert_eq!(dropped.get(), 1);
    }
}
