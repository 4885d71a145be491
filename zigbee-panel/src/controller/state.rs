use std::fmt;

use crate::errors::PanelError;
use crate::models::SystemSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Read-only device status
    ShowingStatus,
    /// Device switches being edited
    EditingStatus,
    /// Rule list with quick edits
    ListingRules,
    /// One rule being edited or composed
    EditingRule,
}

impl ViewState {
    /// Where a cancel from this view lands.
    pub fn cancel_target(self) -> Self {
        match self {
            ViewState::EditingStatus => ViewState::ShowingStatus,
            ViewState::EditingRule => ViewState::ListingRules,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loading {
    Initializing,
    Downloading,
    Saving,
}

impl fmt::Display for Loading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Loading::Initializing => write!(f, "Initializing..."),
            Loading::Downloading => write!(f, "Downloading rules..."),
            Loading::Saving => write!(f, "Saving changes..."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Ready,
    Loading(Loading),
    Failed(PanelError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub view: ViewState,
    pub activity: Activity,
    pub snapshot: Option<SystemSnapshot>,
    /// Selected rule, `None` while composing a new one
    pub active_rule: Option<usize>,
    pub first_load: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            view: ViewState::ShowingStatus,
            activity: Activity::Loading(Loading::Initializing),
            snapshot: None,
            active_rule: None,
            first_load: true,
        }
    }
}

impl PanelState {
    pub fn rule_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |snapshot| snapshot.rules.len())
    }
}

/// Keeps a selection inside `0..rule_count`, falling back to the first rule.
pub fn clamp_selection(selection: Option<usize>, rule_count: usize) -> Option<usize> {
    match selection {
        Some(index) if index < rule_count => Some(index),
        _ if rule_count > 0 => Some(0),
        _ => None,
    }
}
