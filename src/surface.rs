use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Page elements the panel writes to, addressed by stable identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Container holding the collaborator rows
    CollaboratorList,
    /// Element showing how many collaborators there are
    CollaboratorCount,
    /// Select listing the candidate users
    CandidateSelect,
    /// Submit button of the invite form
    InviteButton,
    /// The invite form itself
    InviteForm,
    /// Body of the confirmation modal
    ConfirmModal,
}

impl Slot {
    pub fn element_id(&self) -> &'static str {
        match self {
            Slot::CollaboratorList => "collaboratorsList",
            Slot::CollaboratorCount => "collaboratorsCount",
            Slot::CandidateSelect => "collaboratorSelect",
            Slot::InviteButton => "inviteSubmit",
            Slot::InviteForm => "addCollaboratorForm",
            Slot::ConfirmModal => "confirmModal",
        }
    }
}

/// Where rendered fragments go. Implementations bind slots to real
/// elements; every write replaces the slot's previous content entirely.
pub trait PanelSurface: Send + Sync {
    fn replace_html(&self, slot: Slot, html: String);
    fn set_text(&self, slot: Slot, text: String);
    fn set_disabled(&self, slot: Slot, disabled: bool);
    /// Return a form to its initial state
    fn reset(&self, slot: Slot);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotState {
    pub html: Option<String>,
    pub text: Option<String>,
    pub disabled: bool,
    pub resets: usize,
}

/// Surface that keeps every slot in memory. Used by the CLI to print the
/// fragments once an action completes, and by tests to inspect them.
#[derive(Debug, Default)]
pub struct MemorySurface {
    slots: Mutex<HashMap<Slot, SlotState>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Slot, SlotState>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self, slot: Slot) -> SlotState {
        self.lock().get(&slot).cloned().unwrap_or_default()
    }

    pub fn html(&self, slot: Slot) -> Option<String> {
        self.snapshot(slot).html
    }

    pub fn text(&self, slot: Slot) -> Option<String> {
        self.snapshot(slot).text
    }

    pub fn is_disabled(&self, slot: Slot) -> bool {
        self.snapshot(slot).disabled
    }

    pub fn resets(&self, slot: Slot) -> usize {
        self.snapshot(slot).resets
    }
}

impl PanelSurface for MemorySurface {
    fn replace_html(&self, slot: Slot, html: String) {
        self.lock().entry(slot).or_default().html = Some(html);
    }

    fn set_text(&self, slot: Slot, text: String) {
        self.lock().entry(slot).or_default().text = Some(text);
    }

    fn set_disabled(&self, slot: Slot, disabled: bool) {
        self.lock().entry(slot).or_default().disabled = disabled;
    }

    fn reset(&self, slot: Slot) {
        self.lock().entry(slot).or_default().resets += 1;
    }
}
