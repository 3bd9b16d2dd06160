/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime abstraction layer for sass-bridge compile jobs.
 *
 * Everything a compile job reads from the outside world (entry files,
 * imported files, the working directory, SASS_PATH) goes through the
 * SystemRuntime trait.
 */

pub mod memory;
pub mod native;
pub mod path;
pub mod traits;

pub use memory::MemoryRuntime;
pub use native::NativeRuntime;
pub use traits::{PathKind, RuntimeError, RuntimeResult, SystemRuntime};
