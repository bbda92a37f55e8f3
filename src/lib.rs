pub mod config;
pub mod content_loader;
pub mod error;
pub mod export;
pub mod hot_reload;
pub mod markdown;
pub mod pages;
pub mod posts;
pub mod server;
pub mod site;
pub mod state;

#[cfg(test)]
mod test_support;
