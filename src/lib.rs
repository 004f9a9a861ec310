pub mod cli;
pub mod config;
pub mod cycle;
pub mod extract;
pub mod logging;
pub mod model;
pub mod net;
pub mod report;
pub mod schedule;
pub mod serve;
pub mod store;
pub mod util;
