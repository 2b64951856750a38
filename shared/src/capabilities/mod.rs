//! Effects the core asks the shell to perform.
//!
//! We use Crux's built-in Render capability directly because it provides
//! all necessary functionality for triggering view updates.

mod http;

pub use self::http::{ApiBase, ConfigError, CITIES_PATH, DEFAULT_BASE_URL, JSON_CONTENT_TYPE};

pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::event::Event;

// Field types must name `Event` directly for the Effect derive.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
}
