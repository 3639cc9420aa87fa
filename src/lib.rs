// Library for tests to access modules

pub mod config;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod rate;
pub mod routes;
pub mod units;
pub mod window;
