//! Documentation build configuration bundle for docconf.
//!
//! This crate loads the bundle (link templates, library versions, product
//! version, toolchain range) and provides the operations the documentation
//! build performs against it: link resolution, version lookup, the
//! configuration step for placeholder versions, the toolchain gate, and
//! text rendering.

pub mod bundle;
pub mod configure;
pub mod libraries;
pub mod render;
pub mod toolchain;

pub use bundle::{ConfigBundle, ResolvedLink};
pub use configure::{ConfigureOutcome, configure, parse_assignment, parse_assignments};
pub use render::render;
pub use toolchain::{check_toolchain, detect_llvm_version, in_range, parse_llvm_version_output};
