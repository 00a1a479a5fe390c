// Copyright 2026 The weavescope authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # weavescope
//!
//! Joinpoint indexing and classification for aspect weaving over compiled
//! .NET modules.
//!
//! Given a closed set of loaded binary modules, `weavescope` builds a
//! structured, queryable index of every program location a weaving engine
//! might need to observe or modify: type and member declarations, method
//! bodies, and individual bytecode-level occurrences of calls, field
//! accesses, object construction and exception throws. The hard part is
//! reconstructing high-level semantics (is this call a property setter? an
//! event subscription? a delegate combine?) from a low-level stack-machine
//! instruction stream, by pattern-matching over instruction predecessors and
//! cross-referencing against already-collected declarations.
//!
//! ## What this crate does not do
//!
//! Loading modules from disk, parsing aspect descriptions, matching
//! pointcuts, and rewriting bytecode are collaborators outside this crate.
//! The loader materializes modules into the [`metadata`] model and method
//! bodies into the [`tree`] abstraction; the weaving engine consumes the
//! read-only [`joinpoint::JoinpointContainer`] and reports rewrites back
//! through the per-module changed flag. Bytecode is assumed well-formed, and
//! base-type matching is single-level only.
//!
//! ## Quick Start
//!
//! ```rust
//! use weavescope::prelude::*;
//!
//! let modules: Vec<ModuleRc> = Vec::new(); // supplied by the loader
//! let index = build_index(&modules)?;
//! println!("{} joinpoints", index.len());
//! # Ok::<(), weavescope::Error>(())
//! ```
//!
//! ## Indexing model
//!
//! The index is built once per weaving run, in two strictly ordered phases:
//! declarations for **all** modules first, then instruction occurrences — an
//! occurrence is only recorded when the declaration it references is already
//! indexed (closed-world policy). Entries are added monotonically and never
//! removed; after construction the container is read-only except for the
//! module-level changed flag.

mod error;

/// Shared fixture factories used by unit tests.
#[cfg(test)]
pub(crate) mod test;

pub mod joinpoint;
pub mod metadata;
pub mod prelude;
pub mod tree;

pub use error::{Error, Result};
