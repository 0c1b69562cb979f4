//! Unity build pipeline
//!
//! Turns a target's source list into a handful of aggregate translation
//! units and hands them to the artifact builder.
//!
//! # Overview
//!
//! The pipeline consists of:
//! - **Flattening**: Split a nested source list into compilable sources and
//!   passthrough inputs ([`source`])
//! - **Partitioning**: Slice the sources into ordered groups ([`partition`])
//! - **Rendering**: Write one `#include` aggregate per group ([`aggregate`])
//! - **Composition**: Call the base artifact builder once ([`unity`])
//!
//! # Example
//!
//! ```ignore
//! use unity_build::build::{CommandBuilder, UnityBuilder, SourceItem};
//! use unity_build::config::load_config;
//!
//! let config = load_config(None)?;
//! let builder = UnityBuilder::program(CommandBuilder::new(config.compiler.clone()), config.defaults());
//!
//! let (artifact, outcome) = builder.build(Path::new("bin/app"), sources, vec![], None)?;
//! println!("{}", outcome.summary());
//! ```

pub mod aggregate;
pub mod command;
pub mod partition;
pub mod result;
pub mod source;
pub mod unity;

pub use aggregate::*;
pub use command::*;
pub use partition::*;
pub use result::*;
pub use source::*;
pub use unity::*;
