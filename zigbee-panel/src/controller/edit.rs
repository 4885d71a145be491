use zigbee_api::models::Rule;

/// How a single-rule submission changes the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEdit {
    /// Nothing to send, e.g. deleting a rule that was never saved
    Unchanged,
    Appended { rules: Vec<Rule>, index: usize },
    Replaced { rules: Vec<Rule>, index: usize },
    Deleted { rules: Vec<Rule>, index: usize },
}

impl RuleEdit {
    pub fn rules(&self) -> Option<&[Rule]> {
        match self {
            RuleEdit::Unchanged => None,
            RuleEdit::Appended { rules, .. }
            | RuleEdit::Replaced { rules, .. }
            | RuleEdit::Deleted { rules, .. } => Some(rules),
        }
    }
}

/// Applies an edit of the selected rule to a copy of `rules`.
pub fn apply_rule_edit(rules: &[Rule], selected: Option<usize>, edit: Option<Rule>) -> RuleEdit {
    let selected = selected.filter(|index| *index < rules.len());

    match (selected, edit) {
        (None, None) => RuleEdit::Unchanged,
        (None, Some(rule)) => {
            let mut rules = rules.to_vec();
            rules.push(rule);
            RuleEdit::Appended {
                index: rules.len() - 1,
                rules,
            }
        }
        (Some(index), Some(rule)) => {
            let mut rules = rules.to_vec();
            rules[index] = rule;
            RuleEdit::Replaced { rules, index }
        }
        (Some(index), None) => {
            let mut rules = rules.to_vec();
            rules.remove(index);
            RuleEdit::Deleted { rules, index }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use zigbee_api::models::TargetMap;

    use super::*;

    fn create_rule(name: &str) -> Rule {
        Rule {
            name: name.to_string(),
            enabled: true,
            timestamp: datetime!(2023-09-12 21:30 UTC),
            repeat: 0,
            target: TargetMap::new(),
        }
    }

    #[test]
    fn test_append_new_rule() {
        let rules = vec![create_rule("A")];

        let edit = apply_rule_edit(&rules, None, Some(create_rule("B")));

        assert_eq!(
            edit,
            RuleEdit::Appended {
                rules: vec![create_rule("A"), create_rule("B")],
                index: 1
            }
        );
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_replace_in_place() {
        let rules = vec![create_rule("A"), create_rule("B")];

        let edit = apply_rule_edit(&rules, Some(1), Some(create_rule("C")));

        assert_eq!(edit.rules(), Some(&[create_rule("A"), create_rule("C")][..]));
    }

    #[test]
    fn test_delete_selected() {
        let rules = vec![create_rule("A"), create_rule("B"), create_rule("C")];

        let edit = apply_rule_edit(&rules, Some(1), None);

        assert_eq!(
            edit,
            RuleEdit::Deleted {
                rules: vec![create_rule("A"), create_rule("C")],
                index: 1
            }
        );
    }

    #[test]
    fn test_delete_unsaved_rule_sends_nothing() {
        let rules = vec![create_rule("A")];

        assert_eq!(apply_rule_edit(&rules, None, None), RuleEdit::Unchanged);
        assert_eq!(apply_rule_edit(&rules, Some(7), None), RuleEdit::Unchanged);
    }

    #[test]
    fn test_stale_selection_appends() {
        let rules = vec![create_rule("A")];

        let edit = apply_rule_edit(&rules, Some(3), Some(create_rule("B")));

        assert!(matches!(edit, RuleEdit::Appended { index: 1, .. }));
    }
}
