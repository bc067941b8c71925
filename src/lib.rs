// Library interface for the binary and for testing

pub mod cli;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod project;
pub mod utils;
