// Library for the server, the batch tool and tests

pub mod analysis;
pub mod cache;
pub mod config;
pub mod infra_repo;
pub mod models;
pub mod pipeline;
pub mod poller;
pub mod report;
pub mod routes;
pub mod telemetry;
pub mod timeframe;
pub mod version;
