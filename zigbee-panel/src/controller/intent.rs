use std::collections::BTreeMap;

use zigbee_api::models::{DeviceId, Rule};

use super::state::ViewState;

/// What a view asks the controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate(ViewState),
    /// Open the editor on a rule, `None` for a new one
    SelectRule(Option<usize>),
    SubmitDeviceState(BTreeMap<DeviceId, bool>),
    /// Replace the whole rule list
    SubmitRules(Vec<Rule>),
    /// Save the selected rule, `None` deletes it
    SubmitRule(Option<Rule>),
    Cancel,
}
