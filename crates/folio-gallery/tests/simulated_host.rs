//! End-to-end modal sessions against a simulated host.
//!
//! The host keeps a virtual clock and a timer queue, applies focus commands to
//! a toy focus model, and fires due timers in deadline order. Assertions are on
//! eventual state after the clock advances, never on exact delays.

use core::time::Duration;
use std::collections::BTreeMap;

use folio_gallery::{
    CardDefaults, CardSnapshot, FocusStep, HostCommand, ImageFlags, ModalController, ModalPhase,
    OpenerId, TimerId, build_gallery_for_card,
};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Body,
    Card(u32),
    CloseControl,
}

struct SimHost {
    modal: ModalController,
    now: Duration,
    timers: BTreeMap<TimerId, Duration>,
    focus: Focus,
}

impl SimHost {
    fn new() -> Self {
        Self {
            modal: ModalController::default(),
            now: Duration::ZERO,
            timers: BTreeMap::new(),
            focus: Focus::Body,
        }
    }

    fn apply(&mut self, commands: Vec<HostCommand>) {
        for command in commands {
            match command {
                HostCommand::ScheduleTimer { timer, delay, .. } => {
                    self.timers.insert(timer, self.now + delay);
                }
                HostCommand::CancelTimer { timer } => {
                    self.timers.remove(&timer);
                }
                HostCommand::FocusCloseControl => self.focus = Focus::CloseControl,
                HostCommand::RestoreFocus(plan) => {
                    if self.focus != Focus::CloseControl {
                        continue;
                    }
                    self.focus = match plan.steps().first() {
                        Some(FocusStep::Opener(OpenerId(card))) => Focus::Card(*card),
                        _ => Focus::Body,
                    };
                }
            }
        }
    }

    fn click_card(&mut self, index: u32, card: &CardSnapshot) {
        self.focus = Focus::Card(index);
        let gallery = build_gallery_for_card(card, &CardDefaults::default());
        let dispatch = self.modal.open(gallery, 0, Some(OpenerId(index)));
        self.apply(dispatch.commands);
    }

    fn advance(&mut self, dt: Duration) {
        let until = self.now + dt;
        loop {
            let due = self
                .timers
                .iter()
                .filter(|(_, at)| **at <= until)
                .min_by_key(|(_, at)| **at)
                .map(|(timer, at)| (*timer, *at));
            let Some((timer, at)) = due else { break };
            self.timers.remove(&timer);
            self.now = at;
            let dispatch = self.modal.timer_fired(timer);
            self.apply(dispatch.commands);
        }
        self.now = until;
    }

    fn key(&mut self, key: &str) {
        let dispatch = self.modal.key_down(key);
        self.apply(dispatch.commands);
    }
}

fn generated_card() -> CardSnapshot {
    CardSnapshot::new()
        .with_attribute("data-image", "images/Proj-thumb.jpg")
        .with_attribute("data-title", "Proj")
}

#[test]
fn focus_moves_in_and_back_out() {
    let mut host = SimHost::new();
    host.click_card(2, &generated_card());
    host.advance(Duration::from_millis(50));
    assert_eq!(host.focus, Focus::CloseControl);

    host.key("Escape");
    host.advance(Duration::from_millis(50));
    assert_eq!(host.focus, Focus::Card(2));
    assert_eq!(host.modal.phase(), ModalPhase::Closed);
    assert!(!host.modal.surface().scroll_locked);
    assert!(host.timers.is_empty());
}

#[test]
fn stalled_image_times_out_and_navigation_still_works() {
    let mut host = SimHost::new();
    host.click_card(0, &generated_card());
    host.advance(Duration::from_secs(7));

    let surface = host.modal.surface();
    assert!(surface.image.contains(ImageFlags::ERROR));
    assert!(!surface.image.contains(ImageFlags::LOADING));
    assert_eq!(surface.image_alt, "Failed to load image");

    host.key("ArrowRight");
    assert_eq!(
        host.modal.surface().image_src.as_deref(),
        Some("images/Proj-thumb-2.jpg")
    );
    assert!(host.modal.surface().image.contains(ImageFlags::LOADING));

    host.key("Escape");
    host.advance(Duration::from_secs(10));
    assert_eq!(host.modal.phase(), ModalPhase::Closed);
    assert!(!host.modal.surface().image.contains(ImageFlags::ERROR));
}

#[test]
fn loaded_image_is_never_marked_failed_later() {
    let mut host = SimHost::new();
    host.click_card(0, &generated_card());
    host.advance(Duration::from_millis(300));
    let dispatch = host.modal.image_loaded(600, 800);
    host.apply(dispatch.commands);
    host.advance(Duration::from_secs(30));

    let surface = host.modal.surface();
    assert!(surface.image.is_empty());
    assert!(host.modal.is_open());
}

#[test]
fn second_card_click_replaces_gallery_while_open() {
    let mut host = SimHost::new();
    host.click_card(0, &generated_card());
    let explicit = CardSnapshot::new().with_attribute("data-images", r#"["a.jpg","b.jpg"]"#);
    host.click_card(1, &explicit);
    host.advance(Duration::from_secs(1));

    assert_eq!(host.modal.gallery().sources().collect::<Vec<_>>(), ["a.jpg", "b.jpg"]);
    // The first card's guard was superseded; only the latest one is pending.
    assert!(!host.modal.surface().image.contains(ImageFlags::ERROR));
    host.advance(Duration::from_secs(6));
    assert!(host.modal.surface().image.contains(ImageFlags::ERROR));
}
