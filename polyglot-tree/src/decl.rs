//  DECL.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 09:41:33
//  Last edited:
//    11 Jul 2025, 16:44:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the declaration nodes that make up the semantic graph: the
//!   closed sum of kinds, the attribute set and the deferred-resolution
//!   payload that distinguishes _open_ from _closed_ nodes.
//!
//!   Nodes never own each other; they refer to one another through
//!   [`DeclId`] handles into the arena of the owning
//!   [`Tree`](crate::tree::Tree), which sidesteps reference-counting
//!   cycles for mutually recursive declarations entirely.
//

use std::any::Any;
use std::fmt::{Debug, Formatter, Result as FResult};

use specifications::text::Location;
use strum::{Display, EnumDiscriminants};

use crate::errors::TreeError;
use crate::scope::ScopeId;
use crate::tree::Tree;


/***** AUXILLARY *****/
/// A handle to a [`Declaration`] in a [`Tree`]'s arena.
///
/// Handles are cheap copies; the arena is the single owner of the node itself. A handle is only
/// meaningful for the Tree that produced it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DeclId(pub(crate) u32);
impl DeclId {
    /// Returns the handle as a plain index into the arena.
    #[inline]
    pub(crate) fn index(&self) -> usize { self.0 as usize }
}



/// The width of a builtin digit type, in bits.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum DigitWidth {
    #[strum(serialize = "8")]
    W8,
    #[strum(serialize = "16")]
    W16,
    #[strum(serialize = "32")]
    W32,
    #[strum(serialize = "64")]
    W64,
}

/// The signedness of a builtin digit type.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Sign {
    Signed,
    Unsigned,
}



/// How a declaration is visible to the linker.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Linkage {
    /// Defined here, visible to other objects.
    Exported,
    /// Defined elsewhere, only referenced here.
    Imported,
    /// Defined and only visible here.
    Internal,
}

/// How a declaration is visible to other modules.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    /// Copied into importing scopes when the module is imported.
    Public,
    /// Never leaves the defining module.
    Private,
}

/// The qualifiers a declaration may carry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Qualifiers {
    /// The declaration may not be written to after initialization.
    pub constant: bool,
    /// The declaration may be written to from outside the program's control flow.
    pub volatile: bool,
    /// Reads and writes of the declaration are indivisible.
    pub atomic:   bool,
}
impl Qualifiers {
    /// Constructor for an all-off Qualifiers.
    ///
    /// # Returns
    /// A new Qualifiers instance with every flag cleared.
    #[inline]
    pub const fn none() -> Self { Self { constant: false, volatile: false, atomic: false } }
}

/// The full attribute set of a declaration.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Attributes {
    /// How the declaration is visible to the linker.
    pub linkage:    Linkage,
    /// How the declaration is visible to other modules.
    pub visibility: Visibility,
    /// The qualifiers on the declaration.
    pub quals:      Qualifiers,
}
impl Default for Attributes {
    #[inline]
    fn default() -> Self { Self { linkage: Linkage::Internal, visibility: Visibility::Private, quals: Qualifiers::none() } }
}
impl Attributes {
    /// Constructor for the Attributes of an exported, publicly visible declaration.
    ///
    /// # Returns
    /// A new Attributes instance with [`Linkage::Exported`] and [`Visibility::Public`].
    #[inline]
    pub const fn exported() -> Self { Self { linkage: Linkage::Exported, visibility: Visibility::Public, quals: Qualifiers::none() } }
}





/***** LIBRARY *****/
/// Defines the kinds of declaration nodes, together with their resolved payloads.
///
/// An _open_ node already carries its final kind with a partial payload (e.g., a
/// [`Struct`](DeclKind::Struct) with no fields yet); closing it replaces the payload wholesale.
/// The derived [`DeclTag`] discriminants are what kind checks compare, so partial and final
/// payloads count as the same kind.
#[derive(Clone, Debug, EnumDiscriminants)]
#[strum_discriminants(name(DeclTag), derive(Display, Hash))]
pub enum DeclKind {
    /// A poisoned node. Always closed, and valid wherever a closed node of any kind is expected.
    Error { message: String },

    // Builtin types
    /// The type with exactly one value.
    Unit,
    /// The type with no values at all.
    Never,
    /// The boolean type.
    Bool,
    /// The string type.
    Str,
    /// A fixed-width integral type.
    Digit { width: DigitWidth, sign: Sign },

    // Derived types
    /// A transparent alias for another type.
    TypeAlias { aliased: Option<DeclId> },
    /// A pointer to another type.
    Pointer { pointee: DeclId },
    /// A fixed-length array of another type. A [`None`] length is an unbounded array.
    Array { element: DeclId, length: Option<u64> },
    /// A function signature: parameter types plus a result type ([`None`] = unit).
    Signature { params: Vec<DeclId>, result: Option<DeclId> },
    /// A record type with per-field storage.
    Struct { fields: Vec<DeclId> },
    /// A record type with overlapping field storage.
    Union { fields: Vec<DeclId> },
    /// An enumeration over an underlying digit type.
    Enum { underlying: Option<DeclId>, cases: Vec<DeclId> },

    // Value declarations
    /// A module-level value.
    Global { ty: Option<DeclId> },
    /// A function with its signature, parameters and locals.
    Function { signature: Option<DeclId>, params: Vec<DeclId>, locals: Vec<DeclId> },
    /// A function-local value.
    Local { ty: Option<DeclId> },
    /// A function parameter.
    Param { ty: Option<DeclId> },
    /// A field of a struct or union, or the case of an enum.
    Field { ty: Option<DeclId> },

    /// A module, owning the scope its declarations live in.
    Module { scope: ScopeId },
}



/// The context handed to a resolution closure when its declaration is forced.
pub struct ResolveCtx {
    /// The declaration being resolved.
    pub decl:  DeclId,
    /// The scope the declaration was forward-declared in.
    pub scope: ScopeId,
    /// The opaque context the driver attached at forward-declare time (typically its AST
    /// fragment).
    pub user:  Box<dyn Any>,
}

/// The signature of a resolution closure.
///
/// The closure receives the owning [`Tree`] and may recursively force other declarations through
/// [`Tree::resolve`](crate::tree::Tree::resolve); the resolution guard catches any cycle this
/// produces. Returning [`Err`] reports a fatal diagnostic and poisons the declaration in place.
pub type ResolveFn = Box<dyn FnOnce(&mut Tree, ResolveCtx) -> Result<(), TreeError>>;

/// The deferred-resolution payload of an open declaration.
pub struct ResolveInfo {
    /// The scope the declaration was forward-declared in.
    pub scope:    ScopeId,
    /// Opaque driver context, handed back verbatim when the closure runs.
    pub user:     Box<dyn Any>,
    /// The closure that finishes the declaration.
    pub resolver: ResolveFn,
}
impl ResolveInfo {
    /// Constructor for the ResolveInfo.
    ///
    /// # Arguments
    /// - `scope`: The scope the declaration is being forward-declared in.
    /// - `user`: Opaque driver context (typically the AST fragment to finish from).
    /// - `resolver`: The closure that finishes the declaration when it is forced.
    ///
    /// # Returns
    /// A new ResolveInfo carrying the given pieces.
    #[inline]
    pub fn new(
        scope: ScopeId,
        user: impl Any,
        resolver: impl FnOnce(&mut Tree, ResolveCtx) -> Result<(), TreeError> + 'static,
    ) -> Self {
        Self { scope, user: Box::new(user), resolver: Box::new(resolver) }
    }
}
impl Debug for ResolveInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        f.debug_struct("ResolveInfo").field("scope", &self.scope).field("user", &"<opaque>").field("resolver", &"<closure>").finish()
    }
}

/// The resolution state of a declaration.
///
/// Distinguishing [`InProgress`](Resolution::InProgress) from [`Closed`](Resolution::Closed)
/// matters: while a declaration's closure is executing, a re-entrant resolve of that declaration
/// must reach the guard's cycle check instead of short-circuiting as "already done".
#[derive(Debug, Default)]
pub(crate) enum Resolution {
    /// The payload is final.
    #[default]
    Closed,
    /// Forward-declared; the resolver has not run yet.
    Open(ResolveInfo),
    /// The resolver is currently executing (its closure has been taken out of the node).
    InProgress,
}



/// A single declaration node in the semantic graph.
#[derive(Debug)]
pub struct Declaration {
    /// What the node is, including its (possibly still partial) payload.
    pub kind:     DeclKind,
    /// Where in the sources the node was declared.
    pub location: Location,
    /// The display name, if the node has one.
    pub name:     Option<String>,
    /// Linkage, visibility and qualifiers.
    pub attribs:  Attributes,
    /// The resolution state of the node.
    pub(crate) resolution: Resolution,
}
impl Declaration {
    /// Returns the kind tag of this node, ignoring the payload.
    #[inline]
    pub fn tag(&self) -> DeclTag { DeclTag::from(&self.kind) }

    /// Checks whether this node is still open (i.e., its resolution has not completed).
    #[inline]
    pub fn is_open(&self) -> bool { !matches!(self.resolution, Resolution::Closed) }

    /// Returns a human-readable name for this node.
    ///
    /// # Returns
    /// The display name if the node has one; error nodes answer with their message; anything else
    /// answers `<anonymous>`.
    pub fn display_name(&self) -> &str {
        if let DeclKind::Error { message } = &self.kind {
            return message;
        }
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}
