//! HTTP side of the client: the bare request dispatcher and the session-aware façade.

mod dispatcher;
mod api;

pub use dispatcher::{Dispatcher, HttpMethod, NO_BODY};
pub use api::{ApiClient, LOGIN_PATH, REGISTER_PATH};
