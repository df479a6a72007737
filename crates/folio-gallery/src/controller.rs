#![forbid(unsafe_code)]

//! Deterministic modal state machine for the gallery viewer.
//!
//! The controller owns the session (gallery, index, opener, pending timers)
//! but never touches the DOM or a clock. Each [`ModalInput`] produces:
//! - an updated [`ModalSurface`] for the host to render, and
//! - ordered [`HostCommand`]s for side effects the surface cannot express
//!   (timers and focus moves).
//!
//! Deferred steps are never truly cancelled. A fired timer is honoured only if
//! it is still the controller's pending timer of its kind; anything else is a
//! stale firing and is ignored.

use core::time::Duration;

use serde::Serialize;

use crate::config::{GalleryConfig, GalleryText, ModalTiming};
use crate::item::{Gallery, ImageItem};
use crate::surface::{ImageFlags, ModalFlags, ModalSurface};
use crate::trace::ModalTrace;

/// Opaque handle for the element that had focus when the modal opened.
///
/// The host maps it back to an element; the controller only stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OpenerId(pub u32);

/// Identity of one scheduled deferred step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What a scheduled timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Synthesizes a load error for an image that never settled.
    LoadGuard,
    /// Moves focus to the close control once the modal is visible.
    FocusClose,
    /// Hides the modal and resets the session after focus was restored.
    FinishClose,
}

/// Keys the modal reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKey {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl ModalKey {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" => Self::Escape,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

/// One attempt in a focus-restoration fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStep {
    /// Focus the element that opened the modal.
    Opener(OpenerId),
    /// Blur whatever is focused inside the modal.
    BlurActive,
    /// Focus the first navigation link.
    NavLink,
    /// Focus the first link on the page.
    AnyLink,
    /// Focus the document body.
    Body,
}

/// Ordered focus fallbacks; the host stops at the first step that succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusPlan {
    steps: Vec<FocusStep>,
}

impl FocusPlan {
    /// Plan used when closing: opener first, then blur, then page fallbacks.
    #[must_use]
    pub fn restore(opener: Option<OpenerId>) -> Self {
        let mut steps = Vec::with_capacity(5);
        steps.extend(opener.map(FocusStep::Opener));
        steps.extend([
            FocusStep::BlurActive,
            FocusStep::NavLink,
            FocusStep::AnyLink,
            FocusStep::Body,
        ]);
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[FocusStep] {
        &self.steps
    }
}

/// Side effect the host must perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Call back with [`ModalInput::TimerFired`] after `delay`.
    ScheduleTimer {
        timer: TimerId,
        kind: TimerKind,
        delay: Duration,
    },
    /// Best-effort clear of a pending timer. Firing anyway is harmless.
    CancelTimer { timer: TimerId },
    /// Focus the modal's close control.
    FocusCloseControl,
    /// Restore focus away from the modal. Only applies when the active
    /// element is inside the modal.
    RestoreFocus(FocusPlan),
}

/// Modal lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalPhase {
    #[default]
    Closed,
    Open,
    /// `close()` ran; the hide step has not fired yet. Still visible, no
    /// longer interactive.
    Closing,
}

/// Input delivered to [`ModalController::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalInput {
    Open {
        gallery: Gallery,
        start_index: usize,
        opener: Option<OpenerId>,
    },
    ShowIndex(i64),
    Next,
    Prev,
    Close,
    Key(ModalKey),
    /// A click that reached the modal container. `on_backdrop` is true only
    /// when the container itself was the click target.
    BackdropClick { on_backdrop: bool },
    /// The image slot fired `load`, with its natural size.
    ImageLoaded { width: u32, height: u32 },
    /// The image slot fired `error`.
    ImageFailed,
    TimerFired(TimerId),
}

/// Input category recorded in the dispatch log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalInputKind {
    Open,
    ShowIndex,
    Next,
    Prev,
    Close,
    Key,
    BackdropClick,
    ImageLoaded,
    ImageFailed,
    TimerFired,
}

impl ModalInput {
    #[must_use]
    pub const fn kind(&self) -> ModalInputKind {
        match self {
            Self::Open { .. } => ModalInputKind::Open,
            Self::ShowIndex(_) => ModalInputKind::ShowIndex,
            Self::Next => ModalInputKind::Next,
            Self::Prev => ModalInputKind::Prev,
            Self::Close => ModalInputKind::Close,
            Self::Key(_) => ModalInputKind::Key,
            Self::BackdropClick { .. } => ModalInputKind::BackdropClick,
            Self::ImageLoaded { .. } => ModalInputKind::ImageLoaded,
            Self::ImageFailed => ModalInputKind::ImageFailed,
            Self::TimerFired(_) => ModalInputKind::TimerFired,
        }
    }
}

/// Why an input left the controller untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    EmptyGallery,
    AlreadyClosed,
    CloseInProgress,
    NotOpen,
    StaleTimer,
    NotBackdrop,
    UnboundKey,
}

/// Result category of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ModalOutcome {
    Applied,
    Ignored(IgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModalLogEntry {
    pub seq: u64,
    pub input: ModalInputKind,
    /// Phase after the input was handled.
    pub phase: ModalPhase,
    pub index: usize,
    pub len: usize,
    #[serde(flatten)]
    pub outcome: ModalOutcome,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalDispatch {
    pub commands: Vec<HostCommand>,
    pub log: ModalLogEntry,
}

impl ModalDispatch {
    #[must_use]
    pub const fn accepted(&self) -> bool {
        matches!(self.log.outcome, ModalOutcome::Applied)
    }

    #[must_use]
    pub const fn ignored_reason(&self) -> Option<IgnoredReason> {
        match self.log.outcome {
            ModalOutcome::Applied => None,
            ModalOutcome::Ignored(reason) => Some(reason),
        }
    }
}

type Step = Result<Vec<HostCommand>, IgnoredReason>;

/// The single modal session for a page.
#[derive(Debug, Clone)]
pub struct ModalController {
    timing: ModalTiming,
    default_alt: String,
    error_alt: String,
    phase: ModalPhase,
    gallery: Gallery,
    index: usize,
    opener: Option<OpenerId>,
    load_guard: Option<TimerId>,
    focus_timer: Option<TimerId>,
    hide_timer: Option<TimerId>,
    surface: ModalSurface,
    next_timer: u64,
    next_seq: u64,
    trace: ModalTrace,
}

impl Default for ModalController {
    fn default() -> Self {
        Self::new(ModalTiming::default(), &GalleryText::default())
    }
}

impl ModalController {
    /// Build a closed controller.
    #[must_use]
    pub fn new(timing: ModalTiming, text: &GalleryText) -> Self {
        Self {
            timing,
            default_alt: text.default_alt.clone(),
            error_alt: text.error_alt.clone(),
            phase: ModalPhase::Closed,
            gallery: Gallery::empty(),
            index: 0,
            opener: None,
            load_guard: None,
            focus_timer: None,
            hide_timer: None,
            surface: ModalSurface::hidden(),
            next_timer: 1,
            next_seq: 1,
            trace: ModalTrace::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(config.timing, &config.text)
    }

    #[must_use]
    pub const fn phase(&self) -> ModalPhase {
        self.phase
    }

    /// True only while navigation and keyboard input are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase == ModalPhase::Open
    }

    #[must_use]
    pub const fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&ImageItem> {
        self.gallery.get(self.index)
    }

    #[must_use]
    pub const fn opener(&self) -> Option<OpenerId> {
        self.opener
    }

    #[must_use]
    pub const fn surface(&self) -> &ModalSurface {
        &self.surface
    }

    /// Pending load guard, if an image is in flight.
    #[must_use]
    pub const fn load_guard(&self) -> Option<TimerId> {
        self.load_guard
    }

    #[must_use]
    pub const fn trace(&self) -> &ModalTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut ModalTrace {
        &mut self.trace
    }

    /// Open `gallery` at `start_index`, clamped. Empty galleries are ignored.
    pub fn open(
        &mut self,
        gallery: Gallery,
        start_index: usize,
        opener: Option<OpenerId>,
    ) -> ModalDispatch {
        self.dispatch(ModalInput::Open {
            gallery,
            start_index,
            opener,
        })
    }

    /// Show the item at `index`, wrapped into range.
    pub fn show_index(&mut self, index: i64) -> ModalDispatch {
        self.dispatch(ModalInput::ShowIndex(index))
    }

    pub fn next(&mut self) -> ModalDispatch {
        self.dispatch(ModalInput::Next)
    }

    pub fn prev(&mut self) -> ModalDispatch {
        self.dispatch(ModalInput::Prev)
    }

    pub fn close(&mut self) -> ModalDispatch {
        self.dispatch(ModalInput::Close)
    }

    /// Handle a DOM `keydown` with the given `key` value.
    pub fn key_down(&mut self, key: &str) -> ModalDispatch {
        self.dispatch(ModalInput::Key(ModalKey::from_dom_key(key)))
    }

    pub fn backdrop_click(&mut self, on_backdrop: bool) -> ModalDispatch {
        self.dispatch(ModalInput::BackdropClick { on_backdrop })
    }

    pub fn image_loaded(&mut self, width: u32, height: u32) -> ModalDispatch {
        self.dispatch(ModalInput::ImageLoaded { width, height })
    }

    pub fn image_failed(&mut self) -> ModalDispatch {
        self.dispatch(ModalInput::ImageFailed)
    }

    pub fn timer_fired(&mut self, timer: TimerId) -> ModalDispatch {
        self.dispatch(ModalInput::TimerFired(timer))
    }

    /// Apply one input.
    pub fn dispatch(&mut self, input: ModalInput) -> ModalDispatch {
        let kind = input.kind();
        let step = match input {
            ModalInput::Open {
                gallery,
                start_index,
                opener,
            } => self.open_step(gallery, start_index, opener),
            ModalInput::ShowIndex(index) => self.show_step(index),
            ModalInput::Next => self.show_step(self.index as i64 + 1),
            ModalInput::Prev => self.show_step(self.index as i64 - 1),
            ModalInput::Close => self.close_step(),
            ModalInput::Key(key) => self.key_step(key),
            ModalInput::BackdropClick { on_backdrop } => {
                if on_backdrop {
                    self.close_step()
                } else {
                    Err(IgnoredReason::NotBackdrop)
                }
            }
            ModalInput::ImageLoaded { width, height } => self.loaded_step(width, height),
            ModalInput::ImageFailed => self.failed_step(),
            ModalInput::TimerFired(timer) => self.timer_step(timer),
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let (commands, outcome) = match step {
            Ok(commands) => (commands, ModalOutcome::Applied),
            Err(reason) => (Vec::new(), ModalOutcome::Ignored(reason)),
        };
        let log = ModalLogEntry {
            seq,
            input: kind,
            phase: self.phase,
            index: self.index,
            len: self.gallery.len(),
            outcome,
        };

        match outcome {
            ModalOutcome::Applied => tracing::debug!(
                target: "folio.modal",
                seq,
                input = ?kind,
                phase = ?self.phase,
                index = self.index,
                len = self.gallery.len(),
                commands = commands.len(),
                "modal input applied"
            ),
            ModalOutcome::Ignored(reason) => tracing::debug!(
                target: "folio.modal",
                seq,
                input = ?kind,
                reason = ?reason,
                "modal input ignored"
            ),
        }

        self.trace.record(log);
        ModalDispatch { commands, log }
    }

    fn schedule(
        &mut self,
        kind: TimerKind,
        delay: Duration,
        commands: &mut Vec<HostCommand>,
    ) -> TimerId {
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        commands.push(HostCommand::ScheduleTimer { timer, kind, delay });
        timer
    }

    fn cancel(slot: &mut Option<TimerId>, commands: &mut Vec<HostCommand>) {
        if let Some(timer) = slot.take() {
            commands.push(HostCommand::CancelTimer { timer });
        }
    }

    /// Point the image slot at the current item and arm a fresh load guard.
    fn begin_load(&mut self, commands: &mut Vec<HostCommand>) {
        Self::cancel(&mut self.load_guard, commands);
        let Some(item) = self.gallery.get(self.index) else {
            return;
        };
        let alt = if item.title().is_empty() {
            self.default_alt.clone()
        } else {
            item.title().to_owned()
        };
        let (src, title, desc) = (
            item.src().to_owned(),
            item.title().to_owned(),
            item.desc().to_owned(),
        );

        self.surface.image.remove(ImageFlags::ERROR);
        self.surface.image.insert(ImageFlags::LOADING | ImageFlags::BUSY);
        self.surface.image_alt = alt;
        self.surface.image_src = Some(src);
        self.surface.image_request += 1;
        self.surface.title = title;
        self.surface.desc = desc;

        let guard = self.schedule(TimerKind::LoadGuard, self.timing.load_timeout(), commands);
        self.load_guard = Some(guard);
    }

    fn open_step(
        &mut self,
        gallery: Gallery,
        start_index: usize,
        opener: Option<OpenerId>,
    ) -> Step {
        let Some(index) = gallery.clamp_index(start_index) else {
            return Err(IgnoredReason::EmptyGallery);
        };
        let mut commands = Vec::new();
        // Re-opening during the close delay keeps the new session visible.
        Self::cancel(&mut self.hide_timer, &mut commands);
        Self::cancel(&mut self.focus_timer, &mut commands);

        self.gallery = gallery;
        self.index = index;
        if opener.is_some() {
            self.opener = opener;
        }
        self.begin_load(&mut commands);

        self.surface.modal.insert(ModalFlags::ACTIVE);
        self.surface.aria_hidden = false;
        self.surface.scroll_locked = true;
        self.phase = ModalPhase::Open;

        let focus = self.schedule(TimerKind::FocusClose, self.timing.focus_delay(), &mut commands);
        self.focus_timer = Some(focus);
        Ok(commands)
    }

    fn show_step(&mut self, index: i64) -> Step {
        let Some(index) = self.gallery.wrap_index(index) else {
            return Err(IgnoredReason::EmptyGallery);
        };
        if self.phase != ModalPhase::Open {
            return Err(IgnoredReason::NotOpen);
        }
        self.index = index;
        let mut commands = Vec::new();
        self.begin_load(&mut commands);
        Ok(commands)
    }

    fn close_step(&mut self) -> Step {
        match self.phase {
            ModalPhase::Closed => return Err(IgnoredReason::AlreadyClosed),
            ModalPhase::Closing => return Err(IgnoredReason::CloseInProgress),
            ModalPhase::Open => {}
        }
        let mut commands = vec![HostCommand::RestoreFocus(FocusPlan::restore(self.opener))];
        Self::cancel(&mut self.load_guard, &mut commands);
        Self::cancel(&mut self.focus_timer, &mut commands);
        let hide = self.schedule(TimerKind::FinishClose, self.timing.hide_delay(), &mut commands);
        self.hide_timer = Some(hide);
        self.phase = ModalPhase::Closing;
        Ok(commands)
    }

    /// Hide and reset to the canonical closed state. The image `src` stays.
    fn finish_close(&mut self) {
        self.surface.modal = ModalFlags::empty();
        self.surface.aria_hidden = true;
        self.surface.scroll_locked = false;
        self.surface.image.remove(ImageFlags::LOADING | ImageFlags::ERROR | ImageFlags::BUSY);
        self.surface.title.clear();
        self.surface.desc.clear();
        self.gallery = Gallery::empty();
        self.index = 0;
        self.opener = None;
        self.phase = ModalPhase::Closed;
    }

    fn key_step(&mut self, key: ModalKey) -> Step {
        if self.phase != ModalPhase::Open {
            return Err(IgnoredReason::NotOpen);
        }
        match key {
            ModalKey::Escape => self.close_step(),
            ModalKey::ArrowRight => self.show_step(self.index as i64 + 1),
            ModalKey::ArrowLeft => self.show_step(self.index as i64 - 1),
            ModalKey::Other => Err(IgnoredReason::UnboundKey),
        }
    }

    fn loaded_step(&mut self, width: u32, height: u32) -> Step {
        if self.phase != ModalPhase::Open {
            return Err(IgnoredReason::NotOpen);
        }
        let mut commands = Vec::new();
        Self::cancel(&mut self.load_guard, &mut commands);
        self.surface.modal.set(ModalFlags::PORTRAIT, height > width);
        self.surface.image.remove(ImageFlags::LOADING | ImageFlags::ERROR | ImageFlags::BUSY);
        Ok(commands)
    }

    fn failed_step(&mut self) -> Step {
        if self.phase != ModalPhase::Open {
            return Err(IgnoredReason::NotOpen);
        }
        let mut commands = Vec::new();
        Self::cancel(&mut self.load_guard, &mut commands);
        self.mark_failed();
        Ok(commands)
    }

    fn mark_failed(&mut self) {
        self.surface.image.remove(ImageFlags::LOADING | ImageFlags::BUSY);
        self.surface.image.insert(ImageFlags::ERROR);
        self.surface.image_alt = self.error_alt.clone();
        self.surface.modal.remove(ModalFlags::PORTRAIT);
    }

    fn timer_step(&mut self, timer: TimerId) -> Step {
        if self.load_guard == Some(timer) {
            self.load_guard = None;
            tracing::debug!(target: "folio.modal", timer = timer.get(), "image load timed out");
            self.mark_failed();
            return Ok(Vec::new());
        }
        if self.focus_timer == Some(timer) {
            self.focus_timer = None;
            return Ok(vec![HostCommand::FocusCloseControl]);
        }
        if self.hide_timer == Some(timer) {
            self.hide_timer = None;
            self.finish_close();
            return Ok(Vec::new());
        }
        Err(IgnoredReason::StaleTimer)
    }
}
