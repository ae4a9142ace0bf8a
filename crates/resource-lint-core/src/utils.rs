//! Utility modules for analyzer implementations.

pub mod lintignore;
