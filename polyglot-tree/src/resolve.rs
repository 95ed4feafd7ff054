//  RESOLVE.rs
//    by Lut99
//
//  Created:
//    05 Mar 2025, 13:27:19
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements lazy resolution of open declarations, guarded by a call
//!   stack of in-progress resolutions (the "cookie").
//!
//!   Forcing a declaration is idempotent and safe to do redundantly from
//!   many call sites: a type referenced from ten places is computed
//!   once. A genuine cycle (a declaration that transitively needs itself
//!   before it is finished) is caught at the first repetition on the
//!   stack, reported, and replaced by an error node, so resolution
//!   always terminates in O(depth) without any timeout machinery.
//

use std::mem;

use log::trace;
use specifications::diagnostics::Severity;
use specifications::text::Location;

use crate::decl::{DeclId, DeclKind, Resolution, ResolveCtx, ResolveInfo};
use crate::tree::Tree;


/***** TESTS *****/





/***** AUXILLARY *****/
/// The call stack of in-progress resolutions.
///
/// One guard is shared by everything that resolves through the same [`Tree`]; a cycle is only
/// meaningful within the chain of resolutions triggered by one root declaration, and a
/// single-threaded pipeline only ever has one such chain at a time.
#[derive(Debug, Default)]
pub(crate) struct ResolveGuard {
    /// The declarations currently being resolved, outermost first.
    stack: Vec<DeclId>,
}
impl ResolveGuard {
    /// Constructor for an empty ResolveGuard.
    #[inline]
    pub fn new() -> Self { Self { stack: Vec::new() } }

    /// Checks whether the given declaration is already being resolved.
    ///
    /// Identity, not structure: two declarations are the same iff they are the same arena slot.
    #[inline]
    pub fn contains(&self, decl: DeclId) -> bool { self.stack.contains(&decl) }

    /// Returns the current resolution depth.
    #[inline]
    pub fn depth(&self) -> usize { self.stack.len() }
}





/***** LIBRARY *****/
impl Tree {
    /// Forces resolution of the given declaration.
    ///
    /// Closed declarations (and error nodes) are returned unchanged; open declarations get their
    /// resolution closure invoked, which may itself recursively resolve other declarations.
    ///
    /// # Arguments
    /// - `decl`: The declaration to force.
    ///
    /// # Returns
    /// The given handle itself in the normal case. If forcing `decl` turns out to need `decl`
    /// itself (a genuine cyclic dependency), a fatal diagnostic is reported and the handle of a
    /// freshly minted error node is returned instead; the original declaration is left open and
    /// must not be forced again within the same pass.
    pub fn resolve(&mut self, decl: DeclId) -> DeclId {
        // Poisoned and closed nodes short-circuit
        if matches!(self.get(decl).kind, DeclKind::Error { .. }) || !self.is_open(decl) {
            return decl;
        }

        // A repetition on the guard stack is a genuine cycle
        if self.guard.contains(decl) {
            let name: String = self.name_of(decl).into();
            let location: Location = self.get(decl).location.clone();
            let handle = self.reporter.report(Severity::Fatal, location.clone(), format!("Cyclic dependency while resolving '{name}'"));
            self.reporter.annotate_note(handle, format!("resolution of '{name}' requires '{name}' itself to already be resolved"));
            return self.error(location, format!("cyclic dependency on '{name}'"));
        }

        trace!("Resolving {} (depth {})", self.display(decl), self.guard.depth());

        // Take the resolver out, leaving the node marked in-progress so that a re-entrant
        // resolve of the same node reaches the cycle check above instead of seeing it closed
        let info: ResolveInfo = match mem::replace(&mut self.get_mut(decl).resolution, Resolution::InProgress) {
            Resolution::Open(info) => info,
            state => panic!("Declaration {} is {state:?} yet passed the closed- and cycle checks", self.display(decl)),
        };
        let ResolveInfo { scope, user, resolver } = info;
        self.guard.stack.push(decl);
        let result = resolver(self, ResolveCtx { decl, scope, user });
        self.guard.stack.pop();

        // The driver normally closes the node itself through `close_*`; if it has not, the
        // payload it left behind is taken as final
        if matches!(self.get(decl).resolution, Resolution::InProgress) {
            self.get_mut(decl).resolution = Resolution::Closed;
        }

        // A failed resolver poisons the node in place, so every handle that refers to it sees
        // the error
        if let Err(err) = result {
            let location: Location = self.get(decl).location.clone();
            self.reporter.report(Severity::Fatal, location, format!("Failed to resolve '{}': {err}", self.name_of(decl)));
            self.get_mut(decl).kind = DeclKind::Error { message: err.to_string() };
        }

        decl
    }

    /// Returns the number of declarations currently being resolved.
    ///
    /// Mostly useful for drivers that want to assert they are (not) inside a resolution.
    #[inline]
    pub fn resolve_depth(&self) -> usize { self.guard.depth() }
}
