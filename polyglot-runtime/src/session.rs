//  SESSION.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 13:12:29
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`Session`]: one end-to-end compilation run. The
//!   session owns the semantic [`Tree`] (and with it the arena, the
//!   resolution guard and the diagnostics handle), the map of
//!   compilation units keyed by canonical module path, and the fixed
//!   five-stage pipeline the host drives over them.
//!
//!   Stages are strictly sequential and global: a stage must complete
//!   for all units before the next stage begins for any unit, because
//!   forward-declaring one unit may be the prerequisite for resolving
//!   another unit's imports. Invoking a stage out of order is a host
//!   bug and panics; per-unit failures inside a stage are reported to
//!   the diagnostics sink and the batch continues.
//

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use log::debug;
use polyglot_tree::builtins::Builtins;
use polyglot_tree::decl::{DeclId, DeclKind, Visibility};
use polyglot_tree::scope::{BASE_TAGS, ScopeId, ScopeTag};
use polyglot_tree::tree::Tree;
use specifications::diagnostics::{Reporter, Severity};
use specifications::path::{Import, ModulePath};
use specifications::text::Location;
use strum::Display;

use crate::driver::{LanguageDriver, Parsed};
use crate::errors::ImportError;
use crate::mediator::Mediator;
use crate::source::Source;


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_empty_batch_runs_clean() {
        let mut session = Session::new(Arc::new(Mediator::new()), Rc::new(Reporter::new()));
        session.run(Vec::new());
        assert_eq!(session.stage(), Stage::Done);
        assert!(session.reporter().is_empty());
        assert!(session.unit_keys().is_empty());
    }

    #[test]
    fn test_init_installs_builtins_in_root() {
        let mut session = Session::new(Arc::new(Mediator::new()), Rc::new(Reporter::new()));
        session.init();

        let root: ScopeId = session.root_scope();
        let boolean: DeclId = session.builtins().boolean;
        assert_eq!(session.tree().scope_get(root, ScopeTag::Types, "bool"), Some(boolean));
    }

    #[test]
    fn test_unknown_extension_is_reported_not_fatal() {
        let mut session = Session::new(Arc::new(Mediator::new()), Rc::new(Reporter::new()));
        session.init();
        session.parse([Source::from_text("orphan", "xyz", "")]);
        assert_eq!(session.reporter().count(Severity::Fatal), 1);
        assert!(session.unit_keys().is_empty());

        // The rest of the pipeline still runs
        session.forward();
        session.imports();
        session.resolve();
        assert_eq!(session.stage(), Stage::Done);
    }

    #[test]
    #[should_panic]
    fn test_stage_out_of_order_panics() {
        let mut session = Session::new(Arc::new(Mediator::new()), Rc::new(Reporter::new()));
        session.forward();
    }

    #[test]
    #[should_panic]
    fn test_repeated_stage_panics() {
        let mut session = Session::new(Arc::new(Mediator::new()), Rc::new(Reporter::new()));
        session.init();
        session.init();
    }
}





/***** AUXILLARY *****/
/// The stages of the pipeline, in the order the host must invoke them.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    /// One-time driver initialization; installs the shared builtin types.
    Init,
    /// Dispatch every source to a driver by extension and parse it.
    Parse,
    /// Create open declarations for every unit's top-level symbols.
    Forward,
    /// Resolve every unit's import directives against the module map.
    Imports,
    /// Force resolution of every declaration, then run driver compile passes.
    Resolve,
    /// The pipeline has completed.
    Done,
}
impl Stage {
    /// Returns the stage that follows this one.
    fn next(self) -> Self {
        match self {
            Self::Init => Self::Parse,
            Self::Parse => Self::Forward,
            Self::Forward => Self::Imports,
            Self::Imports => Self::Resolve,
            Self::Resolve => Self::Done,
            Self::Done => Self::Done,
        }
    }
}



/// One parsed source file, bound to a module path, scope and root module declaration.
pub struct CompileUnit {
    /// The module path the unit is registered under.
    pub path:   ModulePath,
    /// The name of the source the unit was parsed from.
    pub source: String,
    /// The driver's AST. Opaque to the runtime.
    pub ast:    Rc<dyn Any>,
    /// The unit's root module declaration.
    pub module: DeclId,
    /// The unit's scope (the one owned by `module`), chained to the session's root scope.
    pub scope:  ScopeId,
    /// The driver that parsed the unit and handles its remaining stages.
    pub driver: Arc<dyn LanguageDriver>,
}





/***** LIBRARY *****/
/// One end-to-end compilation run.
///
/// The session owns every [`CompileUnit`] and the [`Tree`] they allocate into; dropping the
/// session tears the whole declaration graph down as one unit. No handle may outlive it.
pub struct Session {
    /// The registry to dispatch sources on.
    mediator: Arc<Mediator>,
    /// The sink that all user source errors go to.
    reporter: Rc<Reporter>,
    /// The semantic graph: declaration arena, scopes and the resolution guard.
    tree:     Tree,
    /// The root scope with the builtin types. [`None`] until the init stage has run.
    root:     Option<ScopeId>,
    /// The handles to the builtin types. [`None`] until the init stage has run.
    builtins: Option<Builtins>,
    /// The compilation units, keyed by canonical module path.
    ///
    /// A `BTreeMap` so that every whole-batch walk is deterministic.
    units:    BTreeMap<String, CompileUnit>,
    /// The next stage the host is expected to invoke.
    stage:    Stage,
}

// Constructors
impl Session {
    /// Constructor for the Session.
    ///
    /// # Arguments
    /// - `mediator`: The [`Mediator`] that sources are dispatched on. Registration should be
    ///   complete by now; the session only reads it.
    /// - `reporter`: The diagnostics sink for this run.
    ///
    /// # Returns
    /// A new Session, ready for [`init`](Session::init).
    #[inline]
    pub fn new(mediator: Arc<Mediator>, reporter: Rc<Reporter>) -> Self {
        let tree: Tree = Tree::new(reporter.clone());
        Self { mediator, reporter, tree, root: None, builtins: None, units: BTreeMap::new(), stage: Stage::Init }
    }

    /// Asserts that the given stage is the next expected one, then moves the cursor past it.
    ///
    /// # Panics
    /// This function panics if the host invokes the stages out of order. That is a contract
    /// violation, not a user source error.
    fn advance(&mut self, stage: Stage) {
        if self.stage != stage {
            panic!("Stage '{stage}' invoked out of order (the next expected stage is '{}')", self.stage);
        }
        self.stage = stage.next();
    }
}

// Stages
impl Session {
    /// Stage 1: runs every registered driver's one-time initializer.
    ///
    /// The shared builtin types are installed into the root scope first, so every driver (and
    /// later every compilation unit's scope chain) sees the same `bool`, `str`, digit family
    /// et al.
    ///
    /// # Panics
    /// This function panics if it is not the next expected stage.
    pub fn init(&mut self) {
        self.advance(Stage::Init);
        debug!("Stage 'init': installing builtins and running driver initializers");

        let (root, builtins): (ScopeId, Builtins) = Builtins::install(&mut self.tree);
        self.root = Some(root);
        self.builtins = Some(builtins);

        let drivers: Vec<Arc<dyn LanguageDriver>> = self.mediator.drivers().cloned().collect();
        for driver in drivers {
            debug!("Running one-time initializer of driver '{}'", driver.info().id);
            driver.create(&mut self.tree, root);
        }
    }

    /// Stage 2: parses the given sources and registers a compilation unit for each.
    ///
    /// Every source is dispatched to a driver by its extension. The unit is registered under the
    /// module path the source declared for itself, or under the source's name if it declared
    /// none. Sources with an unknown extension, sources the driver cannot parse and duplicate
    /// module paths are reported and skipped; the batch continues.
    ///
    /// # Arguments
    /// - `sources`: The batch of [`Source`]s to parse.
    ///
    /// # Panics
    /// This function panics if it is not the next expected stage.
    pub fn parse(&mut self, sources: impl IntoIterator<Item = Source>) {
        self.advance(Stage::Parse);
        for source in sources {
            // Dispatch on the extension
            let driver: Arc<dyn LanguageDriver> = match self.mediator.lookup_by_extension(&source.ext) {
                Some(driver) => driver,
                None => {
                    self.reporter.report(
                        Severity::Fatal,
                        Location::whole(source.name.clone()),
                        format!("No language driver registered for extension '{}' (skipping '{}')", source.ext, source.name),
                    );
                    continue;
                },
            };

            // Let the driver produce its AST
            debug!("Stage 'parse': source '{}' with driver '{}'", source.name, driver.info().id);
            let parsed: Parsed = match driver.parse(&source, &self.reporter) {
                Ok(parsed) => parsed,
                Err(err) => {
                    self.reporter.report(Severity::Fatal, Location::whole(source.name.clone()), format!("Failed to parse '{}': {err}", source.name));
                    continue;
                },
            };

            // Register the unit under its canonical module path
            let path: ModulePath = parsed.module.unwrap_or_else(|| ModulePath::single(source.name.clone()));
            let key: String = path.canonical();
            if let Some(existing) = self.units.get(&key) {
                let handle = self.reporter.report(
                    Severity::Fatal,
                    Location::whole(source.name.clone()),
                    format!("Module '{key}' is defined more than once (keeping the first definition)"),
                );
                self.reporter.annotate_note(handle, format!("'{key}' was first defined by source '{}'", existing.source));
                continue;
            }

            let module: DeclId = self.tree.module(Location::whole(source.name.clone()), path.last(), Some(self.root_scope()), driver.info().scope_tags);
            let scope: ScopeId = self.tree.module_scope(module);
            self.units.insert(key, CompileUnit { path, source: source.name, ast: parsed.ast, module, scope, driver });
        }
    }

    /// Stage 3: lets every unit's driver forward-declare its top-level symbols.
    ///
    /// After this stage, every top-level symbol of every unit is visible by name (as an open
    /// declaration), which is what allows the next stages to resolve cross-module references and
    /// mutual recursion.
    ///
    /// # Panics
    /// This function panics if it is not the next expected stage.
    pub fn forward(&mut self) {
        self.advance(Stage::Forward);
        for key in self.unit_keys() {
            debug!("Stage 'forward': unit '{key}'");
            let driver: Arc<dyn LanguageDriver> = self.units[&key].driver.clone();
            if let Err(err) = driver.forward(self, &key) {
                let source: String = self.units[&key].source.clone();
                self.reporter.report(Severity::Fatal, Location::whole(source), format!("Driver pass 'forward' failed for module '{key}': {err}"));
            }
        }
    }

    /// Stage 4: lets every unit's driver resolve its import directives.
    ///
    /// Drivers extract the directives from their ASTs and call [`import`](Session::import) for
    /// each; see there for the exact binding semantics.
    ///
    /// # Panics
    /// This function panics if it is not the next expected stage.
    pub fn imports(&mut self) {
        self.advance(Stage::Imports);
        for key in self.unit_keys() {
            debug!("Stage 'imports': unit '{key}'");
            let driver: Arc<dyn LanguageDriver> = self.units[&key].driver.clone();
            if let Err(err) = driver.imports(self, &key) {
                let source: String = self.units[&key].source.clone();
                self.reporter.report(Severity::Fatal, Location::whole(source), format!("Driver pass 'imports' failed for module '{key}': {err}"));
            }
        }
    }

    /// Stage 5: forces resolution of every declaration of every unit, then runs the drivers'
    /// compile passes.
    ///
    /// Declarations are forced in declaration order per unit; nested module scopes are walked
    /// recursively. Forcing is idempotent, so declarations that were already pulled in by an
    /// earlier unit (e.g. through an import) are not recomputed. Cycles are caught by the
    /// resolution guard and poison only the cyclic declaration.
    ///
    /// # Panics
    /// This function panics if it is not the next expected stage.
    pub fn resolve(&mut self) {
        self.advance(Stage::Resolve);
        let keys: Vec<String> = self.unit_keys();

        // First force everything, across all units
        let mut seen: HashSet<ScopeId> = HashSet::new();
        for key in &keys {
            debug!("Stage 'resolve': forcing declarations of unit '{key}'");
            let scope: ScopeId = self.units[key].scope;
            self.resolve_scope(scope, &mut seen);
        }

        // Then give the drivers their compile pass, with every sibling resolved
        for key in &keys {
            debug!("Stage 'resolve': driver compile pass for unit '{key}'");
            let driver: Arc<dyn LanguageDriver> = self.units[key].driver.clone();
            if let Err(err) = driver.compile(self, key) {
                let source: String = self.units[key].source.clone();
                self.reporter.report(Severity::Fatal, Location::whole(source), format!("Driver pass 'compile' failed for module '{key}': {err}"));
            }
        }
    }

    /// Convenience function that drives all five stages over the given sources.
    ///
    /// # Arguments
    /// - `sources`: The batch of [`Source`]s to compile.
    ///
    /// # Panics
    /// This function panics if any stage was already invoked on this session.
    pub fn run(&mut self, sources: impl IntoIterator<Item = Source>) {
        self.init();
        self.parse(sources);
        self.forward();
        self.imports();
        self.resolve();
    }

    /// Forces every declaration bound in the given scope, in declaration order, recursing into
    /// nested module scopes afterwards.
    ///
    /// The `seen` set keeps mutually-imported module aliases (which share scope handles across
    /// units) from recursing forever.
    fn resolve_scope(&mut self, scope: ScopeId, seen: &mut HashSet<ScopeId>) {
        if !seen.insert(scope) {
            return;
        }

        let entries: Vec<(usize, DeclId)> = self.tree.scope(scope).declarations().map(|(tag, _, decl)| (tag, decl)).collect();
        let mut children: Vec<ScopeId> = Vec::new();
        for (tag, decl) in entries {
            self.tree.resolve(decl);
            if tag == usize::from(ScopeTag::Modules) {
                if let DeclKind::Module { scope: child } = self.tree.get(decl).kind {
                    children.push(child);
                }
            }
        }
        for child in children {
            self.resolve_scope(child, seen);
        }
    }
}

// Imports
impl Session {
    /// Resolves one import directive for the given unit.
    ///
    /// On success, the imported unit's module declaration is bound in the importing scope under
    /// the directive's alias (tag [`ScopeTag::Modules`]), and every [`Visibility::Public`]
    /// binding in the imported scope's base tags is copied into the importing scope.
    /// Copy-collisions are skipped silently (first write wins); the alias binding remains the
    /// reliable, qualified route to the imported module.
    ///
    /// Rejected, each with a fatal diagnostic and a matching [`ImportError`]: importing the unit
    /// itself, importing a path that is not a module in this session, and reusing an alias that
    /// is already bound locally.
    ///
    /// # Arguments
    /// - `importer`: The canonical module path of the unit doing the importing.
    /// - `import`: The [`Import`] directive to resolve.
    ///
    /// # Errors
    /// This function errors as described above. The diagnostic has already been reported when
    /// the error is returned; all variants are recoverable.
    ///
    /// # Panics
    /// This function panics if `importer` is not a registered unit; drivers are expected to pass
    /// the key the session handed them.
    pub fn import(&mut self, importer: &str, import: &Import) -> Result<(), ImportError> {
        let unit: &CompileUnit = match self.units.get(importer) {
            Some(unit) => unit,
            None => panic!("Unknown compilation unit '{importer}' (drivers must pass the unit key they were given)"),
        };
        let importer_scope: ScopeId = unit.scope;
        let importer_source: String = unit.source.clone();
        let importer_key: String = unit.path.canonical();
        let key: String = import.path.canonical();

        // A module importing itself is never meaningful
        if key == importer_key {
            self.reporter.report(Severity::Fatal, Location::whole(importer_source), format!("Module '{importer_key}' cannot import itself"));
            return Err(ImportError::SelfImport { importer: importer_key });
        }

        // The imported path must be a unit of this session
        let (imported_module, imported_scope): (DeclId, ScopeId) = match self.units.get(&key) {
            Some(imported) => (imported.module, imported.scope),
            None => {
                self.reporter
                    .report(Severity::Fatal, Location::whole(importer_source), format!("Cannot import '{key}': no such module in this session"));
                return Err(ImportError::UnknownModule { path: key });
            },
        };

        // The alias must still be free locally
        let alias: String = import.effective_alias().into();
        if self.tree.scope(importer_scope).local_get(ScopeTag::Modules.into(), &alias).is_some() {
            self.reporter.report(
                Severity::Fatal,
                Location::whole(importer_source),
                format!("Import alias '{alias}' is already in use in module '{importer_key}' (keeping the first binding)"),
            );
            return Err(ImportError::AliasInUse { importer: importer_key, alias });
        }

        // Bind the module itself under the alias
        debug!("Module '{importer_key}' imports '{key}' as '{alias}'");
        let alias_decl: DeclId = self.tree.alias(imported_module, alias.clone());
        self.tree.scope_set(importer_scope, ScopeTag::Modules, alias, alias_decl);

        // Copy the public bindings over, first-write-wins
        let public: Vec<(usize, String, DeclId)> = self
            .tree
            .scope(imported_scope)
            .declarations()
            .filter(|(tag, _, decl)| {
                *tag < BASE_TAGS && *tag != usize::from(ScopeTag::Modules) && self.tree.get(*decl).attribs.visibility == Visibility::Public
            })
            .map(|(tag, name, decl)| (tag, name.into(), decl))
            .collect();
        for (tag, name, decl) in public {
            self.tree.scope_set(importer_scope, tag, name, decl);
        }

        Ok(())
    }
}

// Accessors
impl Session {
    /// Returns the semantic graph of this session.
    #[inline]
    pub fn tree(&self) -> &Tree { &self.tree }

    /// Returns the semantic graph of this session, mutably.
    #[inline]
    pub fn tree_mut(&mut self) -> &mut Tree { &mut self.tree }

    /// Returns the diagnostics sink of this session.
    #[inline]
    pub fn reporter(&self) -> &Reporter { &self.reporter }

    /// Returns the root scope with the builtin types.
    ///
    /// # Panics
    /// This function panics if the init stage has not run yet.
    #[inline]
    pub fn root_scope(&self) -> ScopeId {
        match self.root {
            Some(root) => root,
            None => panic!("The root scope does not exist before the 'init' stage has run"),
        }
    }

    /// Returns the handles to the builtin types.
    ///
    /// # Panics
    /// This function panics if the init stage has not run yet.
    #[inline]
    pub fn builtins(&self) -> &Builtins {
        match &self.builtins {
            Some(builtins) => builtins,
            None => panic!("The builtin types do not exist before the 'init' stage has run"),
        }
    }

    /// Returns the compilation unit registered under the given canonical module path.
    #[inline]
    pub fn unit(&self, unit: &str) -> Option<&CompileUnit> { self.units.get(unit) }

    /// Returns the canonical module paths of all registered units, in deterministic order.
    #[inline]
    pub fn unit_keys(&self) -> Vec<String> { self.units.keys().cloned().collect() }

    /// Returns a (cheap) clone of the opaque AST of the given unit.
    ///
    /// # Panics
    /// This function panics if no unit is registered under the given key; drivers are expected
    /// to pass the unit key they were given.
    #[inline]
    pub fn unit_ast(&self, unit: &str) -> Rc<dyn Any> {
        match self.units.get(unit) {
            Some(unit) => unit.ast.clone(),
            None => panic!("Unknown compilation unit '{unit}' (drivers must pass the unit key they were given)"),
        }
    }

    /// Returns an iterator over `(canonical path, root module declaration)` of every unit, in
    /// deterministic order.
    #[inline]
    pub fn modules(&self) -> impl Iterator<Item = (&str, DeclId)> { self.units.iter().map(|(key, unit)| (key.as_str(), unit.module)) }

    /// Returns the next stage the host is expected to invoke ([`Stage::Done`] when the pipeline
    /// has completed).
    #[inline]
    pub fn stage(&self) -> Stage { self.stage }
}
