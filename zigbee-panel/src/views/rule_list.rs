use std::fmt;

use zigbee_api::models::Rule;

use crate::codec::DateTimeCodec;
use crate::controller::{Intent, ViewState};
use crate::models::SystemSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub index: usize,
    pub name: String,
    /// Local `HH:MM` of the next execution
    pub time: String,
    pub enabled: bool,
    pub can_move_up: bool,
}

/// Rule list with the reorder and enable quick edits.
///
/// Quick edits never touch the snapshot: they build a new list and hand it
/// back as a submit intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleListView {
    pub rows: Vec<RuleRow>,
    pub active_rule: Option<usize>,
    rules: Vec<Rule>,
}

impl RuleListView {
    pub fn new(snapshot: &SystemSnapshot, active_rule: Option<usize>, datetime: &DateTimeCodec) -> Self {
        let rows = snapshot
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| RuleRow {
                index,
                name: rule.name.clone(),
                time: datetime.to_local_time(rule.timestamp),
                enabled: rule.enabled,
                can_move_up: index > 0,
            })
            .collect();

        Self {
            rows,
            active_rule,
            rules: snapshot.rules.clone(),
        }
    }

    /// Swaps a rule with its predecessor; `None` for the first row or an unknown index.
    pub fn move_up(&self, index: usize) -> Option<Intent> {
        if index == 0 || index >= self.rules.len() {
            return None;
        }

        let mut rules = self.rules.clone();
        rules.swap(index - 1, index);
        Some(Intent::SubmitRules(rules))
    }

    pub fn toggle(&self, index: usize) -> Option<Intent> {
        let mut rules = self.rules.clone();
        let rule = rules.get_mut(index)?;
        rule.enabled = !rule.enabled;
        Some(Intent::SubmitRules(rules))
    }

    pub fn select(&self, index: usize) -> Intent {
        Intent::SelectRule(Some(index))
    }

    pub fn new_rule(&self) -> Intent {
        Intent::SelectRule(None)
    }

    pub fn status(&self) -> Intent {
        Intent::Navigate(ViewState::ShowingStatus)
    }
}

impl fmt::Display for RuleListView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "== Rules ==")?;
        if self.rows.is_empty() {
            writeln!(f, "  (no rules)")?;
        }
        for row in &self.rows {
            let marker = if self.active_rule == Some(row.index) { ">" } else { " " };
            writeln!(
                f,
                "{marker} {:>2}. {:<24} {}  [{}]",
                row.index,
                row.name,
                row.time,
                if row.enabled { "x" } else { " " }
            )?;
        }
        write!(f, "(rule <n> | new | up <n> | toggle <n> | status)")
    }
}
