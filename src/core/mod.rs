//! Core request handling

pub mod config;
pub mod request;
