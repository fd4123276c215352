//! Core module containing the build pipeline and its configuration

pub mod builder;
pub mod config;
