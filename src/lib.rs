pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod seed;
pub mod sessions;
pub mod state;
pub mod store;
pub mod teachers;
pub mod users;

#[cfg(test)]
mod test_support;
