//! Core domain types and logic.

pub mod price;
pub mod indicator;
pub mod signal;
pub mod portfolio;
pub mod backtest;
pub mod config;
pub mod engine;
pub mod error;
