//  TREE.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 11:31:47
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`Tree`]: the arena that owns every declaration node
//!   and every scope of one compilation session, together with the
//!   open/close constructors that drivers build their declarations
//!   through.
//!
//!   Ownership is deliberately flat: nodes and scopes refer to each
//!   other by handle only, and the Tree is the single owner of all of
//!   them. Dropping the Tree drops the whole graph at once, however
//!   cyclic it got.
//

use std::rc::Rc;

use specifications::diagnostics::{Reporter, Severity};
use specifications::text::Location;

use crate::decl::{Attributes, DeclId, DeclKind, DeclTag, Declaration, DigitWidth, Resolution, ResolveInfo, Sign};
use crate::resolve::ResolveGuard;
use crate::scope::{Scope, ScopeId};


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use specifications::diagnostics::Severity;
    use specifications::text::Location;

    use super::*;
    use crate::scope::{BASE_TAGS, ScopeTag};


    /// Shorthand for a Tree with a fresh reporter.
    fn tree() -> Tree { Tree::new(Rc::new(Reporter::new())) }

    #[test]
    fn test_scope_shadow_law() {
        let mut tree = tree();
        let scope: ScopeId = tree.new_scope(None, BASE_TAGS);
        let d1: DeclId = tree.type_bool(Location::builtin(), "d1");
        let d2: DeclId = tree.type_bool(Location::builtin(), "d2");

        assert_eq!(tree.scope_set(scope, ScopeTag::Types, "t", d1), None);
        assert_eq!(tree.scope_set(scope, ScopeTag::Types, "t", d2), Some(d1));
        assert_eq!(tree.scope_get(scope, ScopeTag::Types, "t"), Some(d1));
    }

    #[test]
    fn test_scope_parent_fallback() {
        let mut tree = tree();
        let parent: ScopeId = tree.new_scope(None, BASE_TAGS);
        let child: ScopeId = tree.new_scope(Some(parent), BASE_TAGS);
        let decl: DeclId = tree.type_str(Location::builtin(), "text");

        tree.scope_set(parent, ScopeTag::Types, "text", decl);
        assert_eq!(tree.scope_get(child, ScopeTag::Types, "text"), Some(decl));
        assert_eq!(tree.scope_get(child, ScopeTag::Types, "text"), tree.scope_get(parent, ScopeTag::Types, "text"));

        // A local binding takes precedence over the parent's
        let shadow: DeclId = tree.type_bool(Location::builtin(), "text");
        tree.scope_set(child, ScopeTag::Types, "text", shadow);
        assert_eq!(tree.scope_get(child, ScopeTag::Types, "text"), Some(shadow));
        assert_eq!(tree.scope_get(parent, ScopeTag::Types, "text"), Some(decl));
    }

    #[test]
    fn test_declare_reports_shadowing_and_keeps_the_original() {
        let reporter = Rc::new(Reporter::new());
        let mut tree = Tree::new(reporter.clone());
        let scope: ScopeId = tree.new_scope(None, BASE_TAGS);
        let d1: DeclId = tree.decl_global(Location::builtin(), "x", None);
        let d2: DeclId = tree.decl_global(Location::builtin(), "x", None);

        assert_eq!(tree.declare(scope, ScopeTag::Values, "x", d1), d1);
        assert!(reporter.is_empty());
        assert_eq!(tree.declare(scope, ScopeTag::Values, "x", d2), d1);
        assert_eq!(reporter.count(Severity::Fatal), 1);
        assert_eq!(tree.scope_get(scope, ScopeTag::Values, "x"), Some(d1));
    }

    #[test]
    fn test_closing_is_idempotent() {
        let mut tree = tree();
        let scope: ScopeId = tree.new_scope(None, BASE_TAGS);
        let int: DeclId = tree.type_digit(Location::builtin(), "int32", DigitWidth::W32, Sign::Signed);
        let open: DeclId = tree.open_global(Location::builtin(), "x", None, ResolveInfo::new(scope, (), |_, _| Ok(())));

        assert!(tree.get(open).is_open());
        tree.close_global(open, Some(int));
        assert!(!tree.get(open).is_open());

        // Closing again leaves the node untouched
        let other: DeclId = tree.type_bool(Location::builtin(), "bool");
        tree.close_global(open, Some(other));
        assert!(matches!(tree.get(open).kind, DeclKind::Global { ty: Some(t) } if t == int));
    }

    #[test]
    #[should_panic]
    fn test_close_kind_mismatch_panics() {
        let mut tree = tree();
        let scope: ScopeId = tree.new_scope(None, BASE_TAGS);
        let open: DeclId = tree.open_function(Location::builtin(), "f", None, ResolveInfo::new(scope, (), |_, _| Ok(())));
        tree.close_global(open, None);
    }
}





/***** HELPER FUNCTIONS *****/
/// Asserts that every declaration in the given list has the expected kind tag.
///
/// # Arguments
/// - `tree`: The [`Tree`] that owns the declarations.
/// - `decls`: The declarations to check.
/// - `expected`: The [`DeclTag`] they must all carry.
/// - `what`: What the list is, for the panic message.
///
/// # Panics
/// This function panics if any declaration has a different tag. A mismatch here is a driver bug,
/// not a user source error.
fn check_all(tree: &Tree, decls: &[DeclId], expected: DeclTag, what: &str) {
    for decl in decls {
        let tag: DeclTag = tree.get(*decl).tag();
        if tag != expected {
            panic!("Expected only {expected} declarations as {what}, got {}", tree.display(*decl));
        }
    }
}





/***** LIBRARY *****/
/// The arena that owns every declaration node and scope of one compilation session.
///
/// All cross-references in the semantic graph are [`DeclId`]/[`ScopeId`] handles into this
/// structure. The resolution guard (the "cookie") also lives here, so that
/// [`resolve`](Tree::resolve)-ing a declaration from anywhere shares one in-progress stack.
#[derive(Debug)]
pub struct Tree {
    /// The declaration arena.
    pub(crate) decls:    Vec<Declaration>,
    /// The scope arena.
    pub(crate) scopes:   Vec<Scope>,
    /// The in-progress stack that detects resolution cycles.
    pub(crate) guard:    ResolveGuard,
    /// The sink that user source errors are reported to.
    pub(crate) reporter: Rc<Reporter>,
}

// Constructors
impl Tree {
    /// Constructor for the Tree.
    ///
    /// # Arguments
    /// - `reporter`: The diagnostics sink ([`Reporter`]) that shadowing, cycles and other user
    ///   source errors are reported to.
    ///
    /// # Returns
    /// A new, empty Tree.
    #[inline]
    pub fn new(reporter: Rc<Reporter>) -> Self { Self { decls: Vec::new(), scopes: Vec::new(), guard: ResolveGuard::new(), reporter } }

    /// Allocates a new declaration in the arena.
    ///
    /// # Arguments
    /// - `decl`: The [`Declaration`] to allocate.
    ///
    /// # Returns
    /// The [`DeclId`] handle to the freshly allocated node.
    pub(crate) fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id: DeclId = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// Shorthand for allocating a closed declaration with default attributes.
    fn alloc_closed(&mut self, kind: DeclKind, location: Location, name: Option<String>) -> DeclId {
        self.alloc(Declaration { kind, location, name, attribs: Attributes::default(), resolution: Resolution::Closed })
    }
}

// Scopes
impl Tree {
    /// Creates a new scope in the arena.
    ///
    /// # Arguments
    /// - `parent`: The scope that lookups fall back to on a local miss, if any.
    /// - `tags`: The total number of namespace tags the scope carries; at least
    ///   [`BASE_TAGS`](crate::scope::BASE_TAGS).
    ///
    /// # Returns
    /// The [`ScopeId`] handle to the freshly created scope.
    ///
    /// # Panics
    /// This function panics if `tags` is less than [`BASE_TAGS`](crate::scope::BASE_TAGS).
    pub fn new_scope(&mut self, parent: Option<ScopeId>, tags: usize) -> ScopeId {
        let id: ScopeId = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(parent, tags));
        id
    }

    /// Returns the scope behind the given handle.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Tree.
    #[inline]
    pub fn scope(&self, scope: ScopeId) -> &Scope { &self.scopes[scope.index()] }

    /// Returns the scope behind the given handle, mutably.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Tree.
    #[inline]
    pub fn scope_mut(&mut self, scope: ScopeId) -> &mut Scope { &mut self.scopes[scope.index()] }

    /// Looks a name up in the given scope, falling back to its parent chain.
    ///
    /// # Arguments
    /// - `scope`: The scope to start looking in.
    /// - `tag`: The namespace tag to look in.
    /// - `name`: The name to look for.
    ///
    /// # Returns
    /// The first binding found walking from `scope` up the parent chain, or [`None`] when the
    /// chain is exhausted. Ancestors that do not carry `tag` simply miss.
    pub fn scope_get(&self, scope: ScopeId, tag: impl Into<usize>, name: &str) -> Option<DeclId> {
        let tag: usize = tag.into();
        let mut next: Option<ScopeId> = Some(scope);
        while let Some(current) = next {
            let scope: &Scope = self.scope(current);
            if let Some(decl) = scope.local_get(tag, name) {
                return Some(decl);
            }
            next = scope.parent();
        }
        None
    }

    /// Binds a name in the given scope's local table, first-write-wins.
    ///
    /// # Arguments
    /// - `scope`: The scope to bind in.
    /// - `tag`: The namespace tag to bind in.
    /// - `name`: The name to bind.
    /// - `decl`: The declaration to bind it to.
    ///
    /// # Returns
    /// [`None`] if the binding was created, or the pre-existing declaration if the name was
    /// already bound locally (in which case nothing is replaced).
    #[inline]
    pub fn scope_set(&mut self, scope: ScopeId, tag: impl Into<usize>, name: impl Into<String>, decl: DeclId) -> Option<DeclId> {
        self.scope_mut(scope).local_set(tag.into(), name, decl)
    }

    /// Binds a name in the given scope, reporting shadowing to the diagnostics sink.
    ///
    /// This is the variant drivers normally use: on a local collision, a fatal diagnostic is
    /// reported (with a note pointing at the previous declaration) and the original binding is
    /// retained.
    ///
    /// # Arguments
    /// - `scope`: The scope to bind in.
    /// - `tag`: The namespace tag to bind in.
    /// - `name`: The name to bind.
    /// - `decl`: The declaration to bind it to.
    ///
    /// # Returns
    /// The declaration that is bound under the name after this call: `decl` itself, or the
    /// original binding if the name was already taken.
    pub fn declare(&mut self, scope: ScopeId, tag: impl Into<usize>, name: impl Into<String>, decl: DeclId) -> DeclId {
        let name: String = name.into();
        match self.scope_set(scope, tag, name.clone(), decl) {
            None => decl,
            Some(existing) => {
                let location: Location = self.get(decl).location.clone();
                let handle = self.reporter.report(Severity::Fatal, location, format!("Name '{name}' was already declared (not overwriting)"));
                self.reporter.annotate_note(handle, format!("'{name}' previously declared at {}", self.get(existing).location));
                existing
            },
        }
    }
}

// Type constructors
impl Tree {
    /// Creates the builtin unit type (the type with exactly one value).
    #[inline]
    pub fn type_unit(&mut self, location: Location, name: impl Into<String>) -> DeclId {
        self.alloc_closed(DeclKind::Unit, location, Some(name.into()))
    }

    /// Creates the builtin never type (the type with no values).
    #[inline]
    pub fn type_never(&mut self, location: Location, name: impl Into<String>) -> DeclId {
        self.alloc_closed(DeclKind::Never, location, Some(name.into()))
    }

    /// Creates the builtin boolean type.
    #[inline]
    pub fn type_bool(&mut self, location: Location, name: impl Into<String>) -> DeclId {
        self.alloc_closed(DeclKind::Bool, location, Some(name.into()))
    }

    /// Creates the builtin string type.
    #[inline]
    pub fn type_str(&mut self, location: Location, name: impl Into<String>) -> DeclId {
        self.alloc_closed(DeclKind::Str, location, Some(name.into()))
    }

    /// Creates a builtin digit type of the given width and signedness.
    #[inline]
    pub fn type_digit(&mut self, location: Location, name: impl Into<String>, width: DigitWidth, sign: Sign) -> DeclId {
        self.alloc_closed(DeclKind::Digit { width, sign }, location, Some(name.into()))
    }

    /// Creates a pointer type to the given pointee.
    #[inline]
    pub fn type_pointer(&mut self, location: Location, pointee: DeclId) -> DeclId {
        self.alloc_closed(DeclKind::Pointer { pointee }, location, None)
    }

    /// Creates an array type over the given element type.
    ///
    /// # Arguments
    /// - `location`: Where the type was written.
    /// - `element`: The element type.
    /// - `length`: The number of elements, or [`None`] for an unbounded array.
    #[inline]
    pub fn type_array(&mut self, location: Location, element: DeclId, length: Option<u64>) -> DeclId {
        self.alloc_closed(DeclKind::Array { element, length }, location, None)
    }

    /// Creates a function signature type.
    ///
    /// # Arguments
    /// - `location`: Where the signature was written.
    /// - `params`: The parameter declarations ([`DeclTag::Param`] nodes, in order).
    /// - `result`: The result type, or [`None`] for unit.
    ///
    /// # Panics
    /// This function panics if any element of `params` is not a parameter declaration.
    pub fn type_signature(&mut self, location: Location, params: Vec<DeclId>, result: Option<DeclId>) -> DeclId {
        check_all(self, &params, DeclTag::Param, "signature parameters");
        self.alloc_closed(DeclKind::Signature { params, result }, location, None)
    }
}

// Closed declaration constructors
impl Tree {
    /// Creates a poisoned error node.
    ///
    /// Error nodes are always closed and are valid wherever a closed node of any kind is
    /// expected, so downstream consumers never need to null-check.
    ///
    /// # Arguments
    /// - `location`: Where the original problem lives.
    /// - `message`: What the problem was.
    ///
    /// # Returns
    /// The handle to the new error node.
    #[inline]
    pub fn error(&mut self, location: Location, message: impl Into<String>) -> DeclId {
        self.alloc_closed(DeclKind::Error { message: message.into() }, location, None)
    }

    /// Creates a (closed) type alias.
    #[inline]
    pub fn decl_type_alias(&mut self, location: Location, name: impl Into<String>, aliased: DeclId) -> DeclId {
        self.alloc_closed(DeclKind::TypeAlias { aliased: Some(aliased) }, location, Some(name.into()))
    }

    /// Creates a parameter declaration.
    #[inline]
    pub fn decl_param(&mut self, location: Location, name: impl Into<String>, ty: DeclId) -> DeclId {
        self.alloc_closed(DeclKind::Param { ty: Some(ty) }, location, Some(name.into()))
    }

    /// Creates a field declaration.
    #[inline]
    pub fn decl_field(&mut self, location: Location, name: impl Into<String>, ty: DeclId) -> DeclId {
        self.alloc_closed(DeclKind::Field { ty: Some(ty) }, location, Some(name.into()))
    }

    /// Creates a function-local declaration.
    #[inline]
    pub fn decl_local(&mut self, location: Location, name: impl Into<String>, ty: DeclId) -> DeclId {
        self.alloc_closed(DeclKind::Local { ty: Some(ty) }, location, Some(name.into()))
    }

    /// Creates a (closed) global value declaration.
    ///
    /// # Arguments
    /// - `location`: Where the global was declared.
    /// - `name`: The name of the global.
    /// - `ty`: The type of the global, if already known.
    #[inline]
    pub fn decl_global(&mut self, location: Location, name: impl Into<String>, ty: Option<DeclId>) -> DeclId {
        self.alloc_closed(DeclKind::Global { ty }, location, Some(name.into()))
    }

    /// Creates a (closed) function declaration.
    ///
    /// # Arguments
    /// - `location`: Where the function was declared.
    /// - `name`: The name of the function.
    /// - `signature`: The function's [`DeclTag::Signature`] type.
    /// - `params`: The parameter declarations, in order.
    /// - `locals`: The function's local declarations.
    ///
    /// # Panics
    /// This function panics if `signature` is not a signature type, or any of `params`/`locals`
    /// has the wrong kind.
    pub fn decl_function(&mut self, location: Location, name: impl Into<String>, signature: DeclId, params: Vec<DeclId>, locals: Vec<DeclId>) -> DeclId {
        check_all(self, &[signature], DeclTag::Signature, "a function signature");
        check_all(self, &params, DeclTag::Param, "function parameters");
        check_all(self, &locals, DeclTag::Local, "function locals");
        self.alloc_closed(DeclKind::Function { signature: Some(signature), params, locals }, location, Some(name.into()))
    }

    /// Creates a (closed) struct declaration.
    ///
    /// # Panics
    /// This function panics if any element of `fields` is not a field declaration.
    pub fn decl_struct(&mut self, location: Location, name: impl Into<String>, fields: Vec<DeclId>) -> DeclId {
        check_all(self, &fields, DeclTag::Field, "struct fields");
        self.alloc_closed(DeclKind::Struct { fields }, location, Some(name.into()))
    }

    /// Creates a (closed) union declaration.
    ///
    /// # Panics
    /// This function panics if any element of `fields` is not a field declaration.
    pub fn decl_union(&mut self, location: Location, name: impl Into<String>, fields: Vec<DeclId>) -> DeclId {
        check_all(self, &fields, DeclTag::Field, "union fields");
        self.alloc_closed(DeclKind::Union { fields }, location, Some(name.into()))
    }

    /// Creates a (closed) enum declaration.
    ///
    /// # Arguments
    /// - `location`: Where the enum was declared.
    /// - `name`: The name of the enum.
    /// - `underlying`: The underlying digit type of the enum.
    /// - `cases`: The enum's cases, as field declarations.
    ///
    /// # Panics
    /// This function panics if `underlying` is not a digit type or any case is not a field
    /// declaration.
    pub fn decl_enum(&mut self, location: Location, name: impl Into<String>, underlying: DeclId, cases: Vec<DeclId>) -> DeclId {
        check_all(self, &[underlying], DeclTag::Digit, "an enum's underlying type");
        check_all(self, &cases, DeclTag::Field, "enum cases");
        self.alloc_closed(DeclKind::Enum { underlying: Some(underlying), cases }, location, Some(name.into()))
    }

    /// Creates a module declaration together with its scope.
    ///
    /// # Arguments
    /// - `location`: Where the module comes from (typically the whole source file).
    /// - `name`: The name of the module.
    /// - `parent`: The scope the module's own scope chains to (typically the root scope with the
    ///   builtin types).
    /// - `tags`: The number of namespace tags the module's scope carries; drivers that need
    ///   private namespaces pass more than [`BASE_TAGS`](crate::scope::BASE_TAGS).
    ///
    /// # Returns
    /// The handle to the new module declaration; its scope is reachable through
    /// [`module_scope`](Tree::module_scope).
    pub fn module(&mut self, location: Location, name: impl Into<String>, parent: Option<ScopeId>, tags: usize) -> DeclId {
        let scope: ScopeId = self.new_scope(parent, tags);
        self.alloc_closed(DeclKind::Module { scope }, location, Some(name.into()))
    }

    /// Returns the scope owned by the given module declaration.
    ///
    /// # Panics
    /// This function panics if the declaration is not a module.
    pub fn module_scope(&self, module: DeclId) -> ScopeId {
        match &self.get(module).kind {
            DeclKind::Module { scope } => *scope,
            _ => panic!("Expected a module declaration, got {}", self.display(module)),
        }
    }
}

// Open declaration constructors & closing
impl Tree {
    /// Forward-declares a global value: visible by name, type and value unknown.
    ///
    /// # Arguments
    /// - `location`: Where the global was declared.
    /// - `name`: The name of the global.
    /// - `ty`: The type of the global, if the driver already knows it.
    /// - `resolve`: The deferred resolution that will finish the declaration.
    ///
    /// # Returns
    /// The handle to the new, open declaration.
    #[inline]
    pub fn open_global(&mut self, location: Location, name: impl Into<String>, ty: Option<DeclId>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration { kind: DeclKind::Global { ty }, location, name: Some(name.into()), attribs: Attributes::default(), resolution: Resolution::Open(resolve) })
    }

    /// Forward-declares a function: visible by name, signature and body unknown.
    ///
    /// # Arguments
    /// - `location`: Where the function was declared.
    /// - `name`: The name of the function.
    /// - `signature`: The signature, if the driver already knows it.
    /// - `resolve`: The deferred resolution that will finish the declaration.
    ///
    /// # Returns
    /// The handle to the new, open declaration.
    #[inline]
    pub fn open_function(&mut self, location: Location, name: impl Into<String>, signature: Option<DeclId>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration {
            kind: DeclKind::Function { signature, params: Vec::new(), locals: Vec::new() },
            location,
            name: Some(name.into()),
            attribs: Attributes::default(),
            resolution: Resolution::Open(resolve),
        })
    }

    /// Forward-declares a struct: visible by name, fields unknown.
    #[inline]
    pub fn open_struct(&mut self, location: Location, name: impl Into<String>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration {
            kind: DeclKind::Struct { fields: Vec::new() },
            location,
            name: Some(name.into()),
            attribs: Attributes::default(),
            resolution: Resolution::Open(resolve),
        })
    }

    /// Forward-declares a union: visible by name, fields unknown.
    #[inline]
    pub fn open_union(&mut self, location: Location, name: impl Into<String>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration {
            kind: DeclKind::Union { fields: Vec::new() },
            location,
            name: Some(name.into()),
            attribs: Attributes::default(),
            resolution: Resolution::Open(resolve),
        })
    }

    /// Forward-declares an enum: visible by name, underlying type and cases unknown.
    #[inline]
    pub fn open_enum(&mut self, location: Location, name: impl Into<String>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration {
            kind: DeclKind::Enum { underlying: None, cases: Vec::new() },
            location,
            name: Some(name.into()),
            attribs: Attributes::default(),
            resolution: Resolution::Open(resolve),
        })
    }

    /// Forward-declares a type alias: visible by name, aliased type unknown.
    #[inline]
    pub fn open_type_alias(&mut self, location: Location, name: impl Into<String>, resolve: ResolveInfo) -> DeclId {
        self.alloc(Declaration {
            kind: DeclKind::TypeAlias { aliased: None },
            location,
            name: Some(name.into()),
            attribs: Attributes::default(),
            resolution: Resolution::Open(resolve),
        })
    }

    /// Prepares the given declaration for closing.
    ///
    /// # Returns
    /// True if the caller should write the payload, false if the close is a no-op (error nodes
    /// and already-closed nodes).
    ///
    /// # Panics
    /// This function panics if the node is open but has a different kind than expected; closing a
    /// declaration as the wrong kind is a driver bug.
    fn close_prepare(&mut self, decl: DeclId, expected: DeclTag) -> bool {
        let node: &Declaration = self.get(decl);
        if matches!(node.kind, DeclKind::Error { .. }) || !node.is_open() {
            return false;
        }
        let tag: DeclTag = node.tag();
        if tag != expected {
            panic!("Attempted to close {} as a {expected}", self.display(decl));
        }
        self.decls[decl.index()].resolution = Resolution::Closed;
        true
    }

    /// Closes a forward-declared global with its resolved type.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not a global.
    pub fn close_global(&mut self, decl: DeclId, ty: Option<DeclId>) -> DeclId {
        if self.close_prepare(decl, DeclTag::Global) {
            self.decls[decl.index()].kind = DeclKind::Global { ty };
        }
        decl
    }

    /// Closes a forward-declared function with its resolved signature, parameters and locals.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not a function, if `signature` is not a
    /// signature type, or if any of `params`/`locals` has the wrong kind.
    pub fn close_function(&mut self, decl: DeclId, signature: DeclId, params: Vec<DeclId>, locals: Vec<DeclId>) -> DeclId {
        if self.close_prepare(decl, DeclTag::Function) {
            check_all(self, &[signature], DeclTag::Signature, "a function signature");
            check_all(self, &params, DeclTag::Param, "function parameters");
            check_all(self, &locals, DeclTag::Local, "function locals");
            self.decls[decl.index()].kind = DeclKind::Function { signature: Some(signature), params, locals };
        }
        decl
    }

    /// Closes a forward-declared struct with its resolved fields.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not a struct, or any field has the wrong
    /// kind.
    pub fn close_struct(&mut self, decl: DeclId, fields: Vec<DeclId>) -> DeclId {
        if self.close_prepare(decl, DeclTag::Struct) {
            check_all(self, &fields, DeclTag::Field, "struct fields");
            self.decls[decl.index()].kind = DeclKind::Struct { fields };
        }
        decl
    }

    /// Closes a forward-declared union with its resolved fields.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not a union, or any field has the wrong kind.
    pub fn close_union(&mut self, decl: DeclId, fields: Vec<DeclId>) -> DeclId {
        if self.close_prepare(decl, DeclTag::Union) {
            check_all(self, &fields, DeclTag::Field, "union fields");
            self.decls[decl.index()].kind = DeclKind::Union { fields };
        }
        decl
    }

    /// Closes a forward-declared enum with its resolved underlying type and cases.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not an enum, if `underlying` is not a digit
    /// type, or any case has the wrong kind.
    pub fn close_enum(&mut self, decl: DeclId, underlying: DeclId, cases: Vec<DeclId>) -> DeclId {
        if self.close_prepare(decl, DeclTag::Enum) {
            check_all(self, &[underlying], DeclTag::Digit, "an enum's underlying type");
            check_all(self, &cases, DeclTag::Field, "enum cases");
            self.decls[decl.index()].kind = DeclKind::Enum { underlying: Some(underlying), cases };
        }
        decl
    }

    /// Closes a forward-declared type alias with its resolved referent.
    ///
    /// Closing is idempotent: closing an already-closed (or poisoned) node is a no-op.
    ///
    /// # Returns
    /// The given handle, unchanged.
    ///
    /// # Panics
    /// This function panics if the node is open but not a type alias.
    pub fn close_type_alias(&mut self, decl: DeclId, aliased: DeclId) -> DeclId {
        if self.close_prepare(decl, DeclTag::TypeAlias) {
            self.decls[decl.index()].kind = DeclKind::TypeAlias { aliased: Some(aliased) };
        }
        decl
    }
}

// Accessors
impl Tree {
    /// Returns the declaration behind the given handle.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Tree.
    #[inline]
    pub fn get(&self, decl: DeclId) -> &Declaration { &self.decls[decl.index()] }

    /// Returns the declaration behind the given handle, mutably.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Tree.
    #[inline]
    pub fn get_mut(&mut self, decl: DeclId) -> &mut Declaration { &mut self.decls[decl.index()] }

    /// Returns a human-readable name for the given declaration (see
    /// [`Declaration::display_name`]).
    #[inline]
    pub fn name_of(&self, decl: DeclId) -> &str { self.get(decl).display_name() }

    /// Returns the kind tag of the given declaration.
    #[inline]
    pub fn tag_of(&self, decl: DeclId) -> DeclTag { self.get(decl).tag() }

    /// Checks whether the given declaration still carries a deferred resolution.
    #[inline]
    pub fn is_open(&self, decl: DeclId) -> bool { self.get(decl).is_open() }

    /// Replaces the attribute set of the given declaration.
    #[inline]
    pub fn set_attribs(&mut self, decl: DeclId, attribs: Attributes) { self.get_mut(decl).attribs = attribs; }

    /// Creates a closed shallow copy of the given declaration under a new name.
    ///
    /// This is what binds an imported module under its alias: the copy shares the original's
    /// payload (for a module, the same scope handle).
    ///
    /// # Arguments
    /// - `decl`: The declaration to alias.
    /// - `name`: The name of the copy.
    ///
    /// # Returns
    /// The handle to the copy.
    ///
    /// # Panics
    /// This function panics if the source declaration is still open; aliasing a declaration whose
    /// payload is not final would hand out a stale copy.
    pub fn alias(&mut self, decl: DeclId, name: impl Into<String>) -> DeclId {
        let node: &Declaration = self.get(decl);
        if node.is_open() {
            panic!("Attempted to alias {}, which is still open", self.display(decl));
        }
        let copy = Declaration { kind: node.kind.clone(), location: node.location.clone(), name: Some(name.into()), attribs: node.attribs, resolution: Resolution::Closed };
        self.alloc(copy)
    }

    /// Returns a one-line rendering of the given declaration for messages.
    ///
    /// # Returns
    /// Strings like `<function 'f'>`, `<module 'a.b'>` or `<error: "...">`.
    pub fn display(&self, decl: DeclId) -> String {
        let node: &Declaration = self.get(decl);
        match (&node.kind, &node.name) {
            (DeclKind::Error { message }, _) => format!("<error: {message:?}>"),
            (_, Some(name)) => format!("<{} '{}'>", node.tag(), name),
            (_, None) => format!("<{}>", node.tag()),
        }
    }

    /// Returns the number of declarations in the arena.
    #[inline]
    pub fn len(&self) -> usize { self.decls.len() }

    /// Checks whether the arena holds no declarations at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.decls.is_empty() }

    /// Returns the diagnostics sink this Tree reports to.
    #[inline]
    pub fn reporter(&self) -> &Reporter { &self.reporter }
}
