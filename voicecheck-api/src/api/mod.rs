//! HTTP API handlers for voicecheck-api

pub mod detect;
pub mod health;
pub mod root;

pub use detect::detect_routes;
pub use health::health_routes;
pub use root::root_routes;
