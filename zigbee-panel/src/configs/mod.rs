mod settings;

pub use settings::{Api, AuthCookie, Display, Logger, Settings};
