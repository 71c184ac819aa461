//! Shared utilities for the everquest-rs CLI

pub mod table;
