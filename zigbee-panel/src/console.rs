use std::sync::Arc;

use crate::controller::{Intent, ViewController, ViewState};
use crate::errors::PanelError;
use crate::views::{RuleEditView, Screen, StatusEditView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Edit,
    Rules,
    Rule(usize),
    New,
    Up(usize),
    Toggle(usize),
    Switch(String, bool),
    Field(FieldEdit),
    Save,
    Delete,
    Cancel,
    Quit,
}

/// Change to one field of the rule being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Add(String),
    Remove(String),
    Target(String, bool),
    Name(String),
    Enable(bool),
    At(String),
    Repeat(String, String, String),
}

impl FieldEdit {
    fn apply(self, view: &RuleEditView) -> RuleEditView {
        match self {
            FieldEdit::Add(id) => view.with_device(&id),
            FieldEdit::Remove(id) => view.without_device(&id),
            FieldEdit::Target(id, on) => view.with_target_state(&id, on),
            FieldEdit::Name(name) => view.with_name(&name),
            FieldEdit::Enable(enabled) => view.with_enabled(enabled),
            FieldEdit::At(text) => view.with_timestamp(&text),
            FieldEdit::Repeat(days, hours, minutes) => view.with_repeat(&days, &hours, &minutes),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    Missing(&'static str),

    #[error("Expected on or off, got {0:?}")]
    Switch(String),

    #[error("Expected a rule number, got {0:?}")]
    Index(String),

    #[error("`{0}` is not available on this screen")]
    Unavailable(&'static str),

    #[error(transparent)]
    Panel(#[from] PanelError),
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match word {
            "" => return Ok(None),
            "status" => Command::Status,
            "edit" => Command::Edit,
            "rules" => Command::Rules,
            "rule" => Command::Rule(parse_index(args.next())?),
            "new" => Command::New,
            "up" => Command::Up(parse_index(args.next())?),
            "toggle" => Command::Toggle(parse_index(args.next())?),
            "switch" => {
                let id = args.next().ok_or(CommandError::Missing("device id"))?;
                Command::Switch(id.to_string(), parse_switch(args.next())?)
            }
            "add" => Command::Field(FieldEdit::Add(
                args.next().ok_or(CommandError::Missing("device id"))?.to_string(),
            )),
            "remove" => Command::Field(FieldEdit::Remove(
                args.next().ok_or(CommandError::Missing("device id"))?.to_string(),
            )),
            "target" => {
                let id = args.next().ok_or(CommandError::Missing("device id"))?;
                Command::Field(FieldEdit::Target(id.to_string(), parse_switch(args.next())?))
            }
            "name" => Command::Field(FieldEdit::Name(rest.to_string())),
            "enable" => Command::Field(FieldEdit::Enable(parse_switch(args.next())?)),
            "at" if rest.is_empty() => return Err(CommandError::Missing("local date and time")),
            "at" => Command::Field(FieldEdit::At(rest.to_string())),
            "repeat" => {
                let mut field = || args.next().unwrap_or_default().to_string();
                Command::Field(FieldEdit::Repeat(field(), field(), field()))
            }
            "save" => Command::Save,
            "delete" => Command::Delete,
            "cancel" => Command::Cancel,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_index(arg: Option<&str>) -> Result<usize, CommandError> {
    let arg = arg.ok_or(CommandError::Missing("rule number"))?;
    arg.parse().map_err(|_| CommandError::Index(arg.to_string()))
}

fn parse_switch(arg: Option<&str>) -> Result<bool, CommandError> {
    match arg.ok_or(CommandError::Missing("on or off"))? {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        other => Err(CommandError::Switch(other.to_string())),
    }
}

/// Form being edited locally, not yet submitted.
#[derive(Debug, Clone)]
enum Draft {
    Status(StatusEditView),
    Rule(RuleEditView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front-end over a [`ViewController`].
pub struct Console {
    controller: Arc<ViewController>,
    draft: Option<Draft>,
}

impl Console {
    pub fn new(controller: Arc<ViewController>) -> Self {
        Self {
            controller,
            draft: None,
        }
    }

    pub async fn start(&mut self) {
        if let Err(e) = self.controller.init().await {
            tracing::warn!("initial load failed: {}", e);
        }
        self.reset_draft().await;
    }

    /// Text of the current screen, including local unsaved edits.
    pub async fn render(&self) -> String {
        match &self.draft {
            Some(Draft::Status(view)) => view.to_string(),
            Some(Draft::Rule(view)) => view.to_string(),
            None => self.controller.screen().await.to_string(),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow, CommandError> {
        let intent = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Status => Intent::Navigate(ViewState::ShowingStatus),
            Command::Edit => Intent::Navigate(ViewState::EditingStatus),
            Command::Rules => Intent::Navigate(ViewState::ListingRules),
            Command::Rule(index) => Intent::SelectRule(Some(index)),
            Command::New => Intent::SelectRule(None),
            Command::Cancel => Intent::Cancel,
            Command::Up(index) => match self.controller.screen().await {
                Screen::RuleList(list) => list.move_up(index).ok_or(PanelError::InvalidSelection(index))?,
                _ => return Err(CommandError::Unavailable("up")),
            },
            Command::Toggle(index) => match self.controller.screen().await {
                Screen::RuleList(list) => list.toggle(index).ok_or(PanelError::InvalidSelection(index))?,
                _ => return Err(CommandError::Unavailable("toggle")),
            },
            Command::Switch(id, on) => {
                let view = self.status_draft("switch")?;
                self.draft = Some(Draft::Status(view.with_switch(&id, on)));
                return Ok(Flow::Continue);
            }
            Command::Save => match &self.draft {
                Some(Draft::Status(view)) => view.submit(),
                Some(Draft::Rule(view)) => view.submit(self.controller.codec())?,
                None => return Err(CommandError::Unavailable("save")),
            },
            Command::Delete => self.rule_draft("delete")?.delete(),
            Command::Field(edit) => {
                let view = edit.apply(self.rule_draft("rule edit")?);
                self.draft = Some(Draft::Rule(view));
                return Ok(Flow::Continue);
            }
        };

        let result = self.controller.dispatch(intent).await;
        if !matches!(result, Err(PanelError::Busy)) {
            self.reset_draft().await;
        }
        result?;

        Ok(Flow::Continue)
    }

    fn status_draft(&self, command: &'static str) -> Result<&StatusEditView, CommandError> {
        match &self.draft {
            Some(Draft::Status(view)) => Ok(view),
            _ => Err(CommandError::Unavailable(command)),
        }
    }

    fn rule_draft(&self, command: &'static str) -> Result<&RuleEditView, CommandError> {
        match &self.draft {
            Some(Draft::Rule(view)) => Ok(view),
            _ => Err(CommandError::Unavailable(command)),
        }
    }

    async fn reset_draft(&mut self) {
        self.draft = match self.controller.screen().await {
            Screen::StatusEdit(view) => Some(Draft::Status(view)),
            Screen::RuleEdit(view) => Some(Draft::Rule(view)),
            _ => None,
        };
    }
}
