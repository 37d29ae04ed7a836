// Library for tests to access modules

pub mod archiver;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod snapshotter;
pub mod store;
