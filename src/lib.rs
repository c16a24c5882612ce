//! Memory layout of multi-planar pixel buffers and the lifecycle of the kernel buffer
//! objects that back them.

#![allow(clippy::len_zero, clippy::new_without_default)]

#[macro_use]
mod macros;
pub mod bo;
pub mod config;
pub mod driver;
pub mod drm;
pub mod dumb;
pub mod format;
pub mod layout;
pub mod refcount;
pub mod utils;
