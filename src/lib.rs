//! The library code for the `stepwise` recipe site generator. A recipe is a
//! TOML document whose `recipe` field lists its steps, one per line, with
//! indentation nesting a step under the one it belongs to. The build happens
//! in two phases:
//!
//! 1. Loading every recipe from disk ([`crate::recipe`]). Each `recipe` block
//!    is parsed into a forest of steps ([`crate::indent`], [`crate::step`])
//!    and references to other recipes (`*Stock*`) are extracted from the step
//!    text ([`crate::reference`]).
//! 2. Resolving references into "used in" backlinks ([`crate::resolve`]) and
//!    writing the pages ([`crate::write`]).
//!
//! The interesting part of the second phase is the step table
//! ([`crate::table`]): each leaf step gets a row, and each parent step is a
//! single cell spanning the rows of all of its leaves.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod indent;
pub mod index;
pub mod recipe;
pub mod reference;
pub mod resolve;
pub mod step;
pub mod table;
pub mod util;
pub mod value;
pub mod write;
