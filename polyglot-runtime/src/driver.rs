//  DRIVER.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 10:44:37
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the contract between the runtime and a language driver:
//!   the descriptor that registers it with the mediator, and the trait
//!   with one callback per pipeline stage.
//!
//!   Only `parse` is mandatory. The other callbacks default to no-ops,
//!   which preserves the "some callbacks may be absent" behaviour of a
//!   function-pointer table without any null pointers: a driver that
//!   does all of its analysis in a single pass simply implements
//!   `compile` and leaves `forward`/`imports` alone.
//

use std::any::Any;
use std::rc::Rc;

use polyglot_tree::scope::{BASE_TAGS, ScopeId};
use polyglot_tree::tree::Tree;
use semver::Version;
use specifications::diagnostics::Reporter;
use specifications::path::ModulePath;

use crate::errors::DriverError;
use crate::session::Session;
use crate::source::Source;


/***** LIBRARY *****/
/// The descriptor a language driver registers itself with.
#[derive(Clone, Debug)]
pub struct DriverInfo {
    /// The unique id of the driver (e.g., `pascal`).
    pub id:         String,
    /// The human-readable name of the driver (e.g., `Pascal-ish`).
    pub name:       String,
    /// The version of the driver.
    pub version:    Version,
    /// The file extensions (without leading dots) that dispatch to this driver by default.
    pub extensions: Vec<String>,
    /// The number of namespace tags the scopes of this driver's compilation units carry.
    ///
    /// Defaults to [`BASE_TAGS`]; drivers that keep private namespaces (imported symbols kept
    /// apart, labels, ...) request more here and index the extra tables with their own constants.
    pub scope_tags: usize,
}
impl DriverInfo {
    /// Constructor for the DriverInfo.
    ///
    /// # Arguments
    /// - `id`: The unique id of the driver.
    /// - `name`: The human-readable name of the driver.
    /// - `version`: The [`Version`] of the driver.
    /// - `extensions`: The file extensions (without leading dots) that dispatch to this driver.
    ///
    /// # Returns
    /// A new DriverInfo with [`BASE_TAGS`] scope tags.
    #[inline]
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: Version, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { id: id.into(), name: name.into(), version, extensions: extensions.into_iter().map(Into::into).collect(), scope_tags: BASE_TAGS }
    }

    /// Changes the number of namespace tags for this driver's unit scopes.
    ///
    /// # Arguments
    /// - `tags`: The new number of tags. Must be at least [`BASE_TAGS`].
    ///
    /// # Returns
    /// The same DriverInfo, for chaining.
    #[inline]
    pub fn with_scope_tags(mut self, tags: usize) -> Self {
        self.scope_tags = tags;
        self
    }
}



/// The descriptor of a non-language plugin (e.g., a custom code generator).
///
/// Plugins only participate in registration and lookup; the pipeline itself never calls into
/// them.
#[derive(Clone, Debug)]
pub struct PluginInfo {
    /// The unique id of the plugin.
    pub id:      String,
    /// The human-readable name of the plugin.
    pub name:    String,
    /// The version of the plugin.
    pub version: Version,
}



/// What a driver's `parse` callback hands back to the session.
#[derive(Clone, Debug)]
pub struct Parsed {
    /// The driver's AST. Opaque to the runtime; it is stored on the compilation unit and handed
    /// back to the driver's later stage callbacks.
    pub ast:    Rc<dyn Any>,
    /// The module path the source declared for itself, if the language has such a construct.
    ///
    /// When [`None`], the unit is registered under the source's name.
    pub module: Option<ModulePath>,
}



/// The contract a language driver implements, one callback per pipeline stage.
///
/// All callbacks except [`parse`](LanguageDriver::parse) default to no-ops. A useful driver
/// implements `parse` plus at least one of the others.
pub trait LanguageDriver {
    /// Returns the descriptor of this driver.
    fn info(&self) -> &DriverInfo;

    /// One-time initialization, called exactly once per session during the init stage.
    ///
    /// The shared builtin types are already installed in the root scope at this point; drivers
    /// add their own runtime declarations here (e.g., an imported `print` routine).
    ///
    /// # Arguments
    /// - `tree`: The session's [`Tree`] to create declarations in.
    /// - `root`: The root scope that every compilation unit's scope chains to.
    #[allow(unused_variables)]
    fn create(&self, tree: &mut Tree, root: ScopeId) {}

    /// Parses one source into an opaque AST.
    ///
    /// # Arguments
    /// - `source`: The [`Source`] to parse.
    /// - `reporter`: The diagnostics sink to report syntax errors to.
    ///
    /// # Returns
    /// The parsed AST plus the module path the source declared, if any.
    ///
    /// # Errors
    /// This function errors if no AST could be produced at all. The session reports the error as
    /// a fatal diagnostic and skips the source; the rest of the batch continues.
    fn parse(&self, source: &Source, reporter: &Reporter) -> Result<Parsed, DriverError>;

    /// Forward-declares the top-level symbols of one compilation unit.
    ///
    /// The driver walks its AST and creates an _open_ declaration (with a resolution closure)
    /// for every top-level symbol, binding them in the unit's scope. No types or bodies are
    /// resolved here; that is what makes forward references and mutual recursion work.
    ///
    /// # Arguments
    /// - `session`: The running [`Session`].
    /// - `unit`: The canonical module path of the unit to forward-declare.
    ///
    /// # Errors
    /// This function may error if the unit cannot be processed at all; the session reports it
    /// and continues with the rest of the batch.
    #[allow(unused_variables)]
    fn forward(&self, session: &mut Session, unit: &str) -> Result<(), DriverError> { Ok(()) }

    /// Resolves the import directives of one compilation unit.
    ///
    /// The driver extracts the directives from its AST and typically calls
    /// [`Session::import`] for each of them.
    ///
    /// # Arguments
    /// - `session`: The running [`Session`].
    /// - `unit`: The canonical module path of the unit whose imports to resolve.
    ///
    /// # Errors
    /// This function may error if the unit cannot be processed at all; the session reports it
    /// and continues with the rest of the batch.
    #[allow(unused_variables)]
    fn imports(&self, session: &mut Session, unit: &str) -> Result<(), DriverError> { Ok(()) }

    /// Runs the driver's own compile pass over one unit, after the session has forced
    /// resolution of every declaration the unit owns.
    ///
    /// Typical uses are body lowering or whole-unit checks that need resolved siblings.
    ///
    /// # Arguments
    /// - `session`: The running [`Session`].
    /// - `unit`: The canonical module path of the unit to compile.
    ///
    /// # Errors
    /// This function may error if the unit cannot be processed at all; the session reports it
    /// and continues with the rest of the batch.
    #[allow(unused_variables)]
    fn compile(&self, session: &mut Session, unit: &str) -> Result<(), DriverError> { Ok(()) }
}
