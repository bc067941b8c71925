pub mod crawl;
pub mod env;
pub mod init;
pub mod output_format;
pub mod output_types;
