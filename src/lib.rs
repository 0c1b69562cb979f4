//! unity-build - Library for generating unity build aggregate files
//!
//! This library provides functionality to:
//! - Partition a target's C/C++ sources into ordered groups
//! - Render one `#include` aggregate file per group into a cache directory
//! - Forward the aggregates (plus any prebuilt inputs) to an artifact builder

pub mod build;
pub mod cli;
pub mod config;
pub mod logging;
