pub mod config;
pub mod github;
pub mod http;
pub mod mashup;
pub mod model;
pub mod twitter;
