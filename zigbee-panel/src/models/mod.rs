pub mod snapshot;

pub use snapshot::{GatewayLink, SystemSnapshot};
