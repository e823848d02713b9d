//! Integration tests for the dynamic metadata resolution cache.

mod common;

mod chaining;
mod persistence;
