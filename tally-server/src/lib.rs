//! HTTP surface of the Tally addon: configuration, routing, and the two
//! protocol endpoints over the tracking core.

pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::create_app;
pub use state::AppState;
