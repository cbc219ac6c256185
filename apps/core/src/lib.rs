pub mod action_executor;
pub mod config;
pub mod contract;
pub mod history;
pub mod live_search;
pub mod locator;
pub mod logging;
pub mod model;
pub mod query;
pub mod runtime;
pub mod store;
