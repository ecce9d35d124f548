//! Open/closed flags for the application's dialogs.
//!
//! State changes go through [`reduce`], so every transition (including
//! [`ModalAction::CloseAll`]) is published to subscribers as one update.

use tokio::sync::watch;
use tracing::debug;

const MODAL_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalName {
    QuickSale,
    Product,
    Category,
    Supply,
    BarStats,
    Confirmation,
}

impl ModalName {
    pub const ALL: [ModalName; MODAL_COUNT] = [
        ModalName::QuickSale,
        ModalName::Product,
        ModalName::Category,
        ModalName::Supply,
        ModalName::BarStats,
        ModalName::Confirmation,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalState {
    open: [bool; MODAL_COUNT],
}

impl ModalState {
    pub fn is_open(&self, name: ModalName) -> bool {
        self.open[name.index()]
    }

    pub fn any_open(&self) -> bool {
        self.open.iter().any(|open| *open)
    }

    pub fn open_modals(&self) -> impl Iterator<Item = ModalName> + '_ {
        ModalName::ALL
            .into_iter()
            .filter(|name| self.is_open(*name))
    }

    fn with(mut self, name: ModalName, open: bool) -> Self {
        self.open[name.index()] = open;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Open(ModalName),
    Close(ModalName),
    CloseAll,
}

pub fn reduce(state: ModalState, action: ModalAction) -> ModalState {
    match action {
        ModalAction::Open(name) => state.with(name, true),
        ModalAction::Close(name) => state.with(name, false),
        ModalAction::CloseAll => ModalState::default(),
    }
}

/// Owns the modal flags for one UI scope and notifies subscribers on change.
pub struct ModalStore {
    state: watch::Sender<ModalState>,
}

impl Default for ModalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ModalState::default());
        Self { state }
    }

    /// Applies `action`; subscribers are woken only if a flag changed.
    pub fn dispatch(&self, action: ModalAction) {
        self.state.send_if_modified(|state| {
            let next = reduce(*state, action);
            if next == *state {
                return false;
            }
            debug!(?action, "modal state transition");
            *state = next;
            true
        });
    }

    pub fn open(&self, name: ModalName) {
        self.dispatch(ModalAction::Open(name));
    }

    pub fn close(&self, name: ModalName) {
        self.dispatch(ModalAction::Close(name));
    }

    pub fn close_all(&self) {
        self.dispatch(ModalAction::CloseAll);
    }

    pub fn snapshot(&self) -> ModalState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModalState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/modal_tests.rs"]
mod tests;
