//! Configuration module
//!
//! `client` holds the validated, immutable settings a client is built from;
//! `settings` is the TOML file the command-line front end reads.

pub mod client;
pub mod settings;
