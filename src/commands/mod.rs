pub mod aws;
pub mod context;
pub mod ssh;
pub mod username;
