use std::fmt;

mod rule_edit;
mod rule_list;
mod status;
mod status_edit;

pub use rule_edit::{RuleEditView, TargetRow};
pub use rule_list::{RuleListView, RuleRow};
pub use status::{DeviceRow, StatusView};
pub use status_edit::StatusEditView;

/// What the panel shows for the current controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading(String),
    Error(String),
    LoginRequired { login_url: String },
    Status(StatusView),
    StatusEdit(StatusEditView),
    RuleList(RuleListView),
    RuleEdit(RuleEditView),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Screen::Loading(message) => write!(f, "{message}"),
            Screen::Error(message) => write!(f, "{message}"),
            Screen::LoginRequired { login_url } => write!(f, "Please log in: {login_url}"),
            Screen::Status(view) => view.fmt(f),
            Screen::StatusEdit(view) => view.fmt(f),
            Screen::RuleList(view) => view.fmt(f),
            Screen::RuleEdit(view) => view.fmt(f),
        }
    }
}
