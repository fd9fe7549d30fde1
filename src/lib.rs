pub mod config;
pub mod extractors;
pub mod logging;
pub mod progress;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
