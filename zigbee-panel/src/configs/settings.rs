use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use time::UtcOffset;
use time::macros::format_description;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Api {
    pub base_url: String,
    pub root: String,
    pub login_url: String,
    pub auth_cookie: Option<AuthCookie>,
}

impl Api {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.root.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Display {
    /// Fixed offset such as `+02:00`; the host timezone when unset
    pub utc_offset: Option<String>,
}

impl Display {
    pub fn offset(&self) -> Result<Option<UtcOffset>, ConfigError> {
        self.utc_offset
            .as_deref()
            .map(|raw| {
                UtcOffset::parse(
                    raw.trim(),
                    format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
                )
                .map_err(|e| ConfigError::Message(format!("invalid display.utc_offset {raw:?}: {e}")))
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub api: Api,
    #[serde(default)]
    pub display: Display,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("PANEL").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.display.offset()?;

        Ok(settings)
    }
}
