//! Shared library surface for the safepath server and its tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod hazards;
pub mod planner;
pub mod providers;
pub mod state;
