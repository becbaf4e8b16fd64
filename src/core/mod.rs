pub mod config;
pub mod error;
pub mod message;
pub mod session;
pub mod store;

#[cfg(test)]
mod tests;
