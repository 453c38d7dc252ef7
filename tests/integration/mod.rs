//! Integration tests for the catalog strata engine

mod config_integration;
mod loading;
mod membership;
mod persistence;
mod resolution;
