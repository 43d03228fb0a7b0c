//! Core domain types and logic.

pub mod ohlcv;
pub mod series_math;
pub mod indicator;
pub mod zigzag;
pub mod condition;
pub mod condition_parser;
pub mod rule_eval;
pub mod strategy;
pub mod universe;
pub mod scan;
pub mod preset;
pub mod config_validation;
pub mod error;
