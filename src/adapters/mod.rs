// Adapters layer: concrete implementations of the ports for the Earth Engine
// REST API and its OAuth endpoints.

pub mod auth;
pub mod dry_run;
pub mod earth_engine;
