//! Utility modules shared by build and watch.

pub mod category;
pub mod fs;
