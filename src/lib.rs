pub mod common;
pub mod config;
pub mod discovery;
pub mod linode;
pub mod service;

pub use self::config::*;
