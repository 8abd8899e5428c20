//! Static file lookup.
//!
//! Request targets are resolved against a [`DocumentRoot`] that is
//! canonicalized once at startup. Resolution never writes to the filesystem
//! and never yields a path outside the root.

pub mod resolver;

pub use resolver::{DocumentRoot, ResolveFailure, ResolvedResource};
