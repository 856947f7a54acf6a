//! API endpoint handlers, one module per resource.

pub mod briefs;
pub mod clients;
pub mod documents;
pub mod health;
pub mod proxy;
pub mod settings;
