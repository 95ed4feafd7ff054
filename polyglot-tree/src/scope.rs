//  SCOPE.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 10:55:02
//  Last edited:
//    11 Jul 2025, 16:44:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines scopes: chains of tag-indexed symbol tables with parent
//!   fallback. The first four tags are fixed namespaces shared by all
//!   drivers; a driver that needs private namespaces (imported symbols,
//!   labels, what have you) requests extra tags past
//!   [`BASE_TAGS`] when it creates a scope.
//!
//!   Insertion is first-write-wins: colliding with an existing _local_
//!   binding never replaces it, and the caller gets the original back to
//!   diagnose the shadowing.
//

use std::collections::HashMap;

use strum::Display;

use crate::decl::DeclId;


/***** CONSTANTS *****/
/// The number of fixed, driver-independent tags at the front of every scope's table list.
///
/// Driver-defined extension tags start at this index.
pub const BASE_TAGS: usize = 4;





/***** AUXILLARY *****/
/// A handle to a [`Scope`] in a [`Tree`](crate::tree::Tree)'s scope arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ScopeId(pub(crate) u32);
impl ScopeId {
    /// Returns the handle as a plain index into the scope arena.
    #[inline]
    pub(crate) fn index(&self) -> usize { self.0 as usize }
}



/// The fixed namespace tags that every scope carries.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum ScopeTag {
    /// Globals, constants and other module-level values.
    Values,
    /// Type declarations.
    Types,
    /// Functions and procedures.
    Procs,
    /// Nested and imported modules.
    Modules,
}
impl From<ScopeTag> for usize {
    #[inline]
    fn from(value: ScopeTag) -> Self {
        match value {
            ScopeTag::Values => 0,
            ScopeTag::Types => 1,
            ScopeTag::Procs => 2,
            ScopeTag::Modules => 3,
        }
    }
}





/***** LIBRARY *****/
/// A single scope: one symbol table per tag, plus an optional parent to fall back to.
///
/// Scopes live in the owning [`Tree`](crate::tree::Tree)'s arena and refer to their parent by
/// handle; they never own it. Lookup with parent fallback therefore lives on the Tree
/// ([`Tree::scope_get`](crate::tree::Tree::scope_get)); the scope itself only knows its local
/// tables.
#[derive(Debug)]
pub struct Scope {
    /// The parent scope that lookups fall back to, if any.
    pub(crate) parent: Option<ScopeId>,
    /// The symbol tables, one per tag.
    pub(crate) tables: Vec<HashMap<String, DeclId>>,
    /// The log of successful insertions, in declaration order.
    ///
    /// Lookups go through `tables`; any walk over the scope's contents (forcing resolution,
    /// copying public bindings on import) goes through this log so that it is deterministic and
    /// follows declaration order.
    pub(crate) order:  Vec<(usize, String, DeclId)>,
}
impl Scope {
    /// Constructor for the Scope.
    ///
    /// # Arguments
    /// - `parent`: The scope that lookups fall back to on a local miss, if any.
    /// - `tags`: The total number of tags (and thus tables) this scope carries.
    ///
    /// # Returns
    /// A new Scope with `tags` empty tables.
    ///
    /// # Panics
    /// This function panics if `tags` is less than [`BASE_TAGS`], since that would make the scope
    /// unusable for driver-independent lookups.
    pub(crate) fn new(parent: Option<ScopeId>, tags: usize) -> Self {
        if tags < BASE_TAGS {
            panic!("Attempted to create a scope with {tags} tags; at least {BASE_TAGS} are required");
        }
        Self { parent, tables: (0..tags).map(|_| HashMap::new()).collect(), order: Vec::new() }
    }

    /// Looks a name up in this scope's local table only (no parent fallback).
    ///
    /// # Arguments
    /// - `tag`: The namespace tag to look in.
    /// - `name`: The name to look for.
    ///
    /// # Returns
    /// The bound declaration, or [`None`] if the local table for `tag` has no such binding (or
    /// this scope does not even carry `tag`).
    #[inline]
    pub fn local_get(&self, tag: usize, name: &str) -> Option<DeclId> { self.tables.get(tag).and_then(|table| table.get(name)).copied() }

    /// Binds a name in this scope's local table, first-write-wins.
    ///
    /// # Arguments
    /// - `tag`: The namespace tag to bind in.
    /// - `name`: The name to bind.
    /// - `decl`: The declaration to bind it to.
    ///
    /// # Returns
    /// [`None`] if the binding was created, or the _pre-existing_ declaration if the name was
    /// already bound locally. In the latter case the table is left untouched, so the caller can
    /// diagnose the shadowing and the original binding survives.
    ///
    /// # Panics
    /// This function panics if `tag` is out of range for this scope, since binding into a
    /// namespace the scope does not carry is a driver bug.
    pub fn local_set(&mut self, tag: usize, name: impl Into<String>, decl: DeclId) -> Option<DeclId> {
        let name: String = name.into();
        let n_tags: usize = self.tables.len();
        let table: &mut HashMap<String, DeclId> = match self.tables.get_mut(tag) {
            Some(table) => table,
            None => panic!("Attempted to bind {name:?} under tag {tag} in a scope with only {n_tags} tags"),
        };
        if let Some(existing) = table.get(&name) {
            return Some(*existing);
        }
        table.insert(name.clone(), decl);
        self.order.push((tag, name, decl));
        None
    }

    /// Returns the parent of this scope, if any.
    #[inline]
    pub fn parent(&self) -> Option<ScopeId> { self.parent }

    /// Returns the number of tags (tables) this scope carries.
    #[inline]
    pub fn tag_count(&self) -> usize { self.tables.len() }

    /// Returns an iterator over the local bindings for the given tag, in declaration order.
    ///
    /// # Arguments
    /// - `tag`: The namespace tag to iterate.
    ///
    /// # Returns
    /// An iterator over `(name, declaration)` pairs; empty if the scope does not carry `tag`.
    #[inline]
    pub fn local_iter(&self, tag: usize) -> impl Iterator<Item = (&str, DeclId)> {
        self.order.iter().filter(move |(t, _, _)| *t == tag).map(|(_, name, decl)| (name.as_str(), *decl))
    }

    /// Returns an iterator over _all_ local bindings in this scope, in declaration order.
    ///
    /// # Returns
    /// An iterator over `(tag, name, declaration)` triples.
    #[inline]
    pub fn declarations(&self) -> impl Iterator<Item = (usize, &str, DeclId)> {
        self.order.iter().map(|(tag, name, decl)| (*tag, name.as_str(), *decl))
    }
}
