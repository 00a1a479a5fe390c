//! Joinpoint storage and the category-specific query surface.
//!
//! The container is an insertion-ordered set deduplicated by joinpoint
//! identity (full name, kind). It is populated by the single indexing
//! traversal and read-only afterwards, except for the per-module changed
//! flag which the weaving engine sets through
//! [`JoinpointContainer::mark_module_changed`].
//!
//! Every query takes a requested kind mask and a two-argument predicate over
//! `(resolved member, enclosing method)`. Masks are matched by subset:
//! an entry matches iff *all* requested bits are present in its kind.

use std::collections::{HashMap, HashSet};

use crate::{
    joinpoint::{
        entity::{Joinpoint, JoinpointKey, JoinpointRc, MemberTarget},
        JoinpointKind,
    },
    metadata::{AccessorSemantics, MethodRc, TypeRef},
    Error, Result,
};

/// Summary counters over an index, for diagnostics and reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinpointStats {
    /// Total number of entries.
    pub total: usize,
    /// Module-level entries.
    pub modules: usize,
    /// Entries carrying the declaration aspect.
    pub declarations: usize,
    /// Entries carrying the body aspect.
    pub bodies: usize,
    /// Instruction-level occurrence entries.
    pub instructions: usize,
}

/// Insertion-ordered, identity-deduplicated store of joinpoints.
#[derive(Default)]
pub struct JoinpointContainer {
    entries: Vec<JoinpointRc>,
    index: HashMap<JoinpointKey, usize>,
}

impl JoinpointContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a joinpoint.
    ///
    /// Idempotent: adding an entry whose (full name, kind) identity is
    /// already present is a no-op. Returns `true` if the entry was inserted.
    pub fn add(&mut self, joinpoint: JoinpointRc) -> bool {
        let key = joinpoint.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(joinpoint);
        true
    }

    /// Whether an entry with the given identity exists.
    #[must_use]
    pub fn contains(&self, full_name: &str, kind: JoinpointKind) -> bool {
        self.index.contains_key(&JoinpointKey {
            full_name: full_name.to_string(),
            kind,
        })
    }

    /// Look up an entry by identity.
    #[must_use]
    pub fn get(&self, full_name: &str, kind: JoinpointKind) -> Option<&JoinpointRc> {
        self.index
            .get(&JoinpointKey {
                full_name: full_name.to_string(),
                kind,
            })
            .map(|&i| &self.entries[i])
    }

    /// Whether a type declaration with the given full name is tracked, under
    /// any of the structural categories.
    #[must_use]
    pub fn is_tracked_type(&self, full_name: &str) -> bool {
        [
            JoinpointKind::CLASS,
            JoinpointKind::INTERFACE,
            JoinpointKind::ENUM,
            JoinpointKind::STRUCT,
            JoinpointKind::TYPE_DELEGATE,
        ]
        .into_iter()
        .any(|c| self.contains(full_name, c | JoinpointKind::DECLARATION))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &JoinpointRc> {
        self.entries.iter()
    }

    /// Mark the module owning `joinpoint` as changed.
    ///
    /// Looks up the indexed module-level entry whose module identity matches
    /// the joinpoint's owning module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModuleNotFound`] when no module with matching identity
    /// was indexed; that is an integration bug in the caller, since every
    /// joinpoint handed out by this container belongs to an indexed module.
    pub fn mark_module_changed(&self, joinpoint: &Joinpoint) -> Result<()> {
        let name = &joinpoint.owning_module().name;
        for entry in &self.entries {
            if let Some(module) = entry.as_module() {
                if module.module.name == *name {
                    module.mark_changed();
                    return Ok(());
                }
            }
        }
        Err(Error::ModuleNotFound {
            module: name.clone(),
        })
    }

    /// Identities of all modules owning at least one declaration- or
    /// instruction-level joinpoint, in insertion order.
    #[must_use]
    pub fn touched_modules(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for entry in &self.entries {
            if entry.as_module().is_some() {
                continue;
            }
            let name = &entry.owning_module().name;
            if seen.insert(name.clone()) {
                out.push(name.clone());
            }
        }
        out
    }

    /// Summary counters over the current entries.
    #[must_use]
    pub fn stats(&self) -> JoinpointStats {
        let mut stats = JoinpointStats {
            total: self.entries.len(),
            ..JoinpointStats::default()
        };
        for entry in &self.entries {
            if entry.as_module().is_some() {
                stats.modules += 1;
            }
            if entry.kind().contains(JoinpointKind::DECLARATION) {
                stats.declarations += 1;
            }
            if entry.kind().contains(JoinpointKind::BODY) {
                stats.bodies += 1;
            }
            if entry.enclosing_method().is_some() {
                stats.instructions += 1;
            }
        }
        stats
    }

    /// Type joinpoints matching `mask` and `predicate`.
    pub fn types<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(
            JoinpointKind::CLASS
                | JoinpointKind::INTERFACE
                | JoinpointKind::ENUM
                | JoinpointKind::STRUCT
                | JoinpointKind::TYPE_DELEGATE,
            mask,
            |_| true,
            predicate,
        )
    }

    /// Plain field joinpoints matching `mask` and `predicate`.
    pub fn fields<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(JoinpointKind::FIELD, mask, |_| true, predicate)
    }

    /// Method joinpoints matching `mask` and `predicate`.
    ///
    /// Constructors and property/event accessor methods are excluded; those
    /// are reachable only through their dedicated queries.
    pub fn methods<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(
            JoinpointKind::METHOD,
            mask,
            |target| match target {
                MemberTarget::Method(m) => {
                    !m.is_constructor()
                        && matches!(m.accessor_semantics(), Ok(AccessorSemantics::None))
                }
                _ => false,
            },
            predicate,
        )
    }

    /// Property joinpoints matching `mask` and `predicate`.
    pub fn properties<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(JoinpointKind::PROPERTY, mask, |_| true, predicate)
    }

    /// Event joinpoints matching `mask` and `predicate`.
    pub fn events<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(JoinpointKind::EVENT, mask, |_| true, predicate)
    }

    /// Delegate joinpoints (delegate types and delegate-typed fields) matching
    /// `mask` and `predicate`.
    pub fn delegates<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(
            JoinpointKind::TYPE_DELEGATE | JoinpointKind::FIELD_DELEGATE,
            mask,
            |_| true,
            predicate,
        )
    }

    /// Exception joinpoints matching `mask` and `predicate`.
    pub fn exceptions<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(JoinpointKind::EXCEPTION, mask, |_| true, predicate)
    }

    /// Constructor joinpoints matching `mask` and `predicate`.
    pub fn constructors<F>(&self, mask: JoinpointKind, predicate: F) -> Vec<JoinpointRc>
    where
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        self.query(JoinpointKind::CONSTRUCTOR, mask, |_| true, predicate)
    }

    /// All indexed type joinpoints whose *immediate* base type is one of the
    /// given type joinpoints.
    ///
    /// Deeper ancestor chains are deliberately not walked.
    #[must_use]
    pub fn inherited_types(&self, bases: &[JoinpointRc]) -> Vec<JoinpointRc> {
        let names: HashSet<String> = bases
            .iter()
            .filter_map(|jp| jp.as_type().map(|t| t.full_name()))
            .collect();
        self.entries
            .iter()
            .filter(|entry| {
                entry.as_type().is_some_and(|t| {
                    t.base
                        .as_ref()
                        .and_then(TypeRef::full_name)
                        .is_some_and(|base| names.contains(&base))
                })
            })
            .cloned()
            .collect()
    }

    fn query<E, F>(
        &self,
        categories: JoinpointKind,
        mask: JoinpointKind,
        extra: E,
        predicate: F,
    ) -> Vec<JoinpointRc>
    where
        E: Fn(&MemberTarget) -> bool,
        F: Fn(&MemberTarget, Option<&MethodRc>) -> bool,
    {
        let mut out = Vec::new();
        for entry in &self.entries {
            if !entry.kind().category().intersects(categories) {
                continue;
            }
            if !entry.kind().matches(mask) {
                continue;
            }
            let Some(target) = entry.target() else {
                continue;
            };
            if !extra(&target) {
                continue;
            }
            if predicate(&target, entry.enclosing_method()) {
                out.push(entry.clone());
            }
        }
        out
    }
}
