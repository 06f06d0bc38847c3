//! sortvis: animated bubble sort and binary-search-tree sort
//!
//! Layers, innermost first:
//! - `domain`: datasets, blocks, the BST arena
//! - `application`: scheduler, animators, session controller
//! - `infrastructure`: render surfaces, tree layout, DI container
//! - `cli`: argument parsing and command handlers

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
