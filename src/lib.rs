//! stockscan: technical-analysis stock scanner.
//!
//! Hexagonal architecture: indicator math, rule evaluation and preset scans
//! in [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`], and the command-line front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
