//! Bladerunner - compile Blade-style templates into plain PHP.
//!
//! The [`compiler`] module is the template-to-PHP core and has no
//! filesystem access. [`page`], [`build`] and [`watch`] turn a source tree
//! into an output tree of PHP files.

pub mod build;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod logger;
pub mod page;
pub mod utils;
pub mod watch;
