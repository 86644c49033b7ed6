pub mod calendar;
pub mod challenge_engine;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod period;
pub mod session;
pub mod storage;
pub mod task_store;

pub use session::Session;
