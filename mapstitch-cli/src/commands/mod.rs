//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`build`] - Stitch one image
//! - [`cache`] - Tile cache management (clear, stats)
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`locate`] - Show the tile addressing for a point

pub mod build;
pub mod cache;
pub mod common;
pub mod config;
pub mod locate;
