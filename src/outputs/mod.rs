//! Output generation: the post text and the files it is saved to.
//!
//! # Submodules
//!
//! - [`render`]: turns ranked records into the post text
//! - [`store`]: writes one file per day and finds the latest one for publishing
//! - [`post_dir`]: writes one folder per tech blog article

pub mod post_dir;
pub mod render;
pub mod store;
