//  LIB.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 09:20:15
//  Last edited:
//    11 Jul 2025, 16:44:09
//  Auto updated?
//    Yes
//
//  Description:
//!   The `polyglot-tree` crate implements the driver-agnostic semantic
//!   graph of the Polyglot framework: an arena of declaration nodes,
//!   tagged scopes with parent fallback, and the lazy resolution engine
//!   that tolerates forward references and mutual recursion while
//!   detecting genuine cycles.
//!
//!   Language drivers create _open_ declarations during their
//!   forward-declare pass (name visible, body unknown) and attach a
//!   resolution closure; the final pipeline stage forces every open
//!   declaration through the resolution guard, which re-enters those
//!   closures on demand.
//

// Declare the modules
pub mod builtins;
pub mod decl;
pub mod errors;
pub mod resolve;
pub mod scope;
pub mod tree;

// Pull the main types into the crate namespace
pub use builtins::Builtins;
pub use decl::{Attributes, DeclId, DeclKind, DeclTag, Declaration, DigitWidth, Linkage, Qualifiers, ResolveCtx, ResolveFn, ResolveInfo, Sign, Visibility};
pub use errors::TreeError;
pub use scope::{BASE_TAGS, Scope, ScopeId, ScopeTag};
pub use tree::Tree;
