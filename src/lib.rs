pub mod api;
pub mod catalog;
pub mod compactor;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod limits;
pub mod model;
pub mod observability;
pub mod schedule;
pub mod wal;
