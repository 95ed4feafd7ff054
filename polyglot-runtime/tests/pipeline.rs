//  PIPELINE.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 11:26:40
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   End-to-end tests for the five-stage pipeline, using a deliberately
//!   tiny test language: every line is either a `module`, `import`,
//!   `global` or `func` directive. Small as it is, it exercises the full
//!   driver contract (open declarations, resolution closures, import
//!   directives) without dragging a real grammar in.
//

use std::rc::Rc;
use std::sync::Arc;

use polyglot_runtime::driver::{DriverInfo, LanguageDriver, Parsed};
use polyglot_runtime::errors::DriverError;
use polyglot_runtime::mediator::Mediator;
use polyglot_runtime::session::Session;
use polyglot_runtime::source::Source;
use polyglot_tree::decl::{Attributes, DeclId, DeclKind, DeclTag, Linkage, Qualifiers, ResolveCtx, ResolveInfo, Visibility};
use polyglot_tree::errors::TreeError;
use polyglot_tree::scope::{ScopeId, ScopeTag};
use polyglot_tree::tree::Tree;
use semver::Version;
use specifications::diagnostics::{Diagnostic, Reporter, Severity};
use specifications::path::{Import, ModulePath};
use specifications::text::{Location, TextRange};


/***** CONSTANTS *****/
/// The extension the test language registers itself under.
const TOY_EXT: &str = "toy";





/***** TEST LANGUAGE *****/
/// The AST of the test language.
#[derive(Debug, Default)]
struct ToyAst {
    /// The import directives, in source order.
    imports: Vec<Import>,
    /// The globals, as `(name, initializer dependency)` pairs.
    globals: Vec<(String, Option<String>)>,
    /// The functions, as `(name, callees)` pairs.
    funcs:   Vec<(String, Vec<String>)>,
}

/// Finishes a forward-declared test-language global.
///
/// A global without a dependency gets the builtin `int32` type; a global with one forces the
/// dependency's resolution first and copies its type, refusing to close if the dependency could
/// not be resolved (i.e., the guard substituted an error node for it).
fn resolve_global(tree: &mut Tree, ctx: ResolveCtx) -> Result<(), TreeError> {
    let name: String = tree.name_of(ctx.decl).into();
    let dep: Option<String> = match ctx.user.downcast::<Option<String>>() {
        Ok(dep) => *dep,
        Err(_) => return Err(TreeError::ContextMismatch { name }),
    };

    match dep {
        None => {
            let int32: DeclId = match tree.scope_get(ctx.scope, ScopeTag::Types, "int32") {
                Some(int32) => int32,
                None => return Err(TreeError::UnknownIdentifier { name: "int32".into() }),
            };
            tree.close_global(ctx.decl, Some(int32));
            Ok(())
        },

        Some(dep) => {
            let decl: DeclId = match tree.scope_get(ctx.scope, ScopeTag::Values, &dep) {
                Some(decl) => decl,
                None => return Err(TreeError::UnknownIdentifier { name: dep }),
            };

            // Force the dependency; if the guard handed us a substitute, the dependency is
            // cyclic and this global cannot be computed
            let resolved: DeclId = tree.resolve(decl);
            if resolved != decl {
                return Err(TreeError::Custom { message: format!("the initializer of '{name}' needs '{dep}', which cannot be resolved") });
            }

            let ty: Option<DeclId> = match &tree.get(resolved).kind {
                DeclKind::Global { ty } => *ty,
                _ => None,
            };
            tree.close_global(ctx.decl, ty);
            Ok(())
        },
    }
}

/// Finishes a forward-declared test-language function.
///
/// Every callee must be visible by name, but it is deliberately _not_ forced: a reference
/// tolerates the referent still being open, which is exactly what makes mutual recursion work.
fn resolve_function(tree: &mut Tree, ctx: ResolveCtx) -> Result<(), TreeError> {
    let name: String = tree.name_of(ctx.decl).into();
    let callees: Vec<String> = match ctx.user.downcast::<Vec<String>>() {
        Ok(callees) => *callees,
        Err(_) => return Err(TreeError::ContextMismatch { name }),
    };

    for callee in callees {
        if tree.scope_get(ctx.scope, ScopeTag::Procs, &callee).is_none() {
            return Err(TreeError::UnknownIdentifier { name: callee });
        }
    }

    let location: Location = tree.get(ctx.decl).location.clone();
    let signature: DeclId = tree.type_signature(location, vec![], None);
    tree.close_function(ctx.decl, signature, vec![], vec![]);
    Ok(())
}



/// The test language driver.
struct ToyDriver {
    /// The descriptor of the driver.
    info: DriverInfo,
}
impl ToyDriver {
    /// Constructor for the ToyDriver, wrapped in the [`Arc`] the mediator wants.
    fn new() -> Arc<Self> { Arc::new(Self { info: DriverInfo::new("toy", "The Toy Language", Version::new(1, 0, 0), [TOY_EXT]) }) }
}
impl LanguageDriver for ToyDriver {
    fn info(&self) -> &DriverInfo { &self.info }

    fn create(&self, tree: &mut Tree, root: ScopeId) {
        // The language runtime provides a `print` routine to every module
        let signature: DeclId = tree.type_signature(Location::builtin(), vec![], None);
        let print: DeclId = tree.decl_function(Location::builtin(), "print", signature, vec![], vec![]);
        tree.set_attribs(print, Attributes { linkage: Linkage::Imported, visibility: Visibility::Public, quals: Qualifiers::none() });
        tree.declare(root, ScopeTag::Procs, "print", print);
    }

    fn parse(&self, source: &Source, reporter: &Reporter) -> Result<Parsed, DriverError> {
        let mut module: Option<ModulePath> = None;
        let mut ast = ToyAst::default();
        for (l, line) in source.text.lines().enumerate() {
            let line: &str = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                ["module", path] => match path.parse() {
                    Ok(path) => module = Some(path),
                    Err(err) => return Err(DriverError::ParseFailed { name: source.name.clone(), message: err.to_string() }),
                },

                ["import", path] | ["import", path, "as", _] => {
                    let alias: Option<&str> = if words.len() == 4 { Some(words[3]) } else { None };
                    match path.parse() {
                        Ok(path) => ast.imports.push(Import::new(path, alias)),
                        Err(err) => return Err(DriverError::ParseFailed { name: source.name.clone(), message: err.to_string() }),
                    }
                },

                ["global", name] => ast.globals.push((name.to_string(), None)),
                ["global", name, "=", dep] => ast.globals.push((name.to_string(), Some(dep.to_string()))),

                ["func", name] => ast.funcs.push((name.to_string(), Vec::new())),
                ["func", name, "calls", callees @ ..] => ast.funcs.push((name.to_string(), callees.iter().map(|c| c.to_string()).collect())),

                _ => {
                    reporter.report(
                        Severity::Warning,
                        Location::new(source.name.clone(), TextRange::new((l, 0), (l, line.len().saturating_sub(1)))),
                        format!("Ignoring unrecognized line {line:?}"),
                    );
                },
            }
        }
        Ok(Parsed { ast: Rc::new(ast), module })
    }

    fn forward(&self, session: &mut Session, unit: &str) -> Result<(), DriverError> {
        let ast: Rc<ToyAst> = match session.unit_ast(unit).downcast() {
            Ok(ast) => ast,
            Err(_) => return Err(DriverError::AstMismatch { unit: unit.into() }),
        };
        let scope: ScopeId = session.unit(unit).unwrap().scope;

        for (name, dep) in &ast.globals {
            let resolve = ResolveInfo::new(scope, dep.clone(), resolve_global);
            let decl: DeclId = session.tree_mut().open_global(Location::whole(unit.to_string()), name, None, resolve);
            session.tree_mut().set_attribs(decl, Attributes::exported());
            session.tree_mut().declare(scope, ScopeTag::Values, name.clone(), decl);
        }

        for (name, callees) in &ast.funcs {
            let resolve = ResolveInfo::new(scope, callees.clone(), resolve_function);
            let decl: DeclId = session.tree_mut().open_function(Location::whole(unit.to_string()), name, None, resolve);
            session.tree_mut().set_attribs(decl, Attributes::exported());
            session.tree_mut().declare(scope, ScopeTag::Procs, name.clone(), decl);
        }
        Ok(())
    }

    fn imports(&self, session: &mut Session, unit: &str) -> Result<(), DriverError> {
        let ast: Rc<ToyAst> = match session.unit_ast(unit).downcast() {
            Ok(ast) => ast,
            Err(_) => return Err(DriverError::AstMismatch { unit: unit.into() }),
        };
        for import in &ast.imports {
            // Failed imports have been reported by the session; nothing more for us to do
            let _ = session.import(unit, import);
        }
        Ok(())
    }
}





/***** HELPER FUNCTIONS *****/
/// Spins up a session with the test language registered and runs the full pipeline over the
/// given sources.
///
/// # Arguments
/// - `sources`: The `(name, text)` pairs to compile, all with the test language's extension.
///
/// # Returns
/// The completed session plus the reporter it reported into.
fn compile(sources: &[(&str, &str)]) -> (Session, Rc<Reporter>) {
    let mut mediator = Mediator::new();
    mediator.register_driver(ToyDriver::new());

    let reporter: Rc<Reporter> = Rc::new(Reporter::new());
    let mut session = Session::new(Arc::new(mediator), reporter.clone());
    session.run(sources.iter().map(|(name, text)| Source::from_text(*name, TOY_EXT, *text)));
    (session, reporter)
}

/// Looks up a declaration bound in the given unit's scope.
///
/// # Panics
/// Panics if the unit does not exist; returns [`None`] if the name is unbound.
fn lookup(session: &Session, unit: &str, tag: ScopeTag, name: &str) -> Option<DeclId> {
    let scope: ScopeId = session.unit(unit).unwrap_or_else(|| panic!("unit '{unit}' was not registered")).scope;
    session.tree().scope_get(scope, tag, name)
}





/***** LIBRARY *****/
/// Forward references and mutual recursion resolve with no errors, across modules and within
/// one.
#[test]
fn test_mutual_recursion_resolves_clean() {
    let (session, reporter) = compile(&[
        // `f` calls forward into module b, and `g`/`h` are mutually recursive over there
        ("a", "module a\nimport b\nfunc f calls g print"),
        ("b", "module b\nfunc g calls h\nfunc h calls g"),
    ]);

    for (unit, name) in [("a", "f"), ("b", "g"), ("b", "h")] {
        let decl: DeclId = lookup(&session, unit, ScopeTag::Procs, name).unwrap_or_else(|| panic!("'{name}' is unbound in unit '{unit}'"));
        assert_eq!(session.tree().tag_of(decl), DeclTag::Function, "'{name}' resolved to {}", session.tree().display(decl));
        assert!(!session.tree().is_open(decl), "'{name}' is still open after resolve-all");
    }
    assert!(!reporter.has_errors(), "unexpected diagnostics: {:#?}", reporter.diagnostics());
}

/// A genuine initializer cycle is reported exactly once and poisons exactly one of the two
/// globals; the other closes.
#[test]
fn test_global_initializer_cycle_is_poisoned() {
    let (session, reporter) = compile(&[("c", "module c\nglobal x = y\nglobal y = x")]);

    let cycles: Vec<Diagnostic> = reporter.diagnostics().into_iter().filter(|d| d.message.contains("Cyclic dependency")).collect();
    assert_eq!(cycles.len(), 1, "expected exactly one cycle diagnostic, got {cycles:#?}");

    let x: DeclId = lookup(&session, "c", ScopeTag::Values, "x").unwrap();
    let y: DeclId = lookup(&session, "c", ScopeTag::Values, "y").unwrap();
    let poisoned: usize = [x, y].into_iter().filter(|d| session.tree().tag_of(*d) == DeclTag::Error).count();
    assert_eq!(poisoned, 1, "expected exactly one of x/y to be poisoned (x: {}, y: {})", session.tree().display(x), session.tree().display(y));

    // Both are closed either way, and a second resolve pass is harmless
    assert!(!session.tree().is_open(x));
    assert!(!session.tree().is_open(y));
}

/// Imports copy public bindings into the importer and bind the module under its alias.
#[test]
fn test_import_binds_alias_and_copies_public_bindings() {
    let (session, reporter) = compile(&[("a", "module a\nimport b as bee\nglobal mine = theirs"), ("b", "module b\nglobal theirs")]);
    assert!(!reporter.has_errors(), "unexpected diagnostics: {:#?}", reporter.diagnostics());

    // The copied binding is the same declaration, not a copy of it
    let in_a: DeclId = lookup(&session, "a", ScopeTag::Values, "theirs").unwrap();
    let in_b: DeclId = lookup(&session, "b", ScopeTag::Values, "theirs").unwrap();
    assert_eq!(in_a, in_b);

    // The module itself is bound under the alias, sharing the imported unit's scope
    let alias: DeclId = lookup(&session, "a", ScopeTag::Modules, "bee").unwrap();
    match &session.tree().get(alias).kind {
        DeclKind::Module { scope } => assert_eq!(*scope, session.unit("b").unwrap().scope),
        kind => panic!("alias 'bee' is bound to {kind:?}"),
    }

    // And `mine` picked its type up through the import
    let mine: DeclId = lookup(&session, "a", ScopeTag::Values, "mine").unwrap();
    assert!(matches!(session.tree().get(mine).kind, DeclKind::Global { ty: Some(_) }));
}

/// Self-imports, unknown imports and alias collisions are each reported but never abort the
/// batch.
#[test]
fn test_bad_imports_are_recoverable() {
    let (session, reporter) = compile(&[
        ("a", "module a\nimport a\nimport ghost\nimport b\nimport c as b\nglobal ok"),
        ("b", "module b"),
        ("c", "module c"),
    ]);

    let diags: Vec<Diagnostic> = reporter.diagnostics();
    assert!(diags.iter().any(|d| d.message.contains("cannot import itself")), "missing self-import diagnostic: {diags:#?}");
    assert!(diags.iter().any(|d| d.message.contains("no such module")), "missing unknown-module diagnostic: {diags:#?}");
    assert!(diags.iter().any(|d| d.message.contains("already in use")), "missing alias-collision diagnostic: {diags:#?}");

    // The batch still completed: the valid import and the unit's own global are fine
    let alias: DeclId = lookup(&session, "a", ScopeTag::Modules, "b").unwrap();
    assert_eq!(session.tree().module_scope(alias), session.unit("b").unwrap().scope);
    let ok: DeclId = lookup(&session, "a", ScopeTag::Values, "ok").unwrap();
    assert!(!session.tree().is_open(ok));
}

/// A duplicate module path keeps the first unit and reports the second.
#[test]
fn test_duplicate_module_keeps_first() {
    let (session, reporter) = compile(&[("one", "module d\nglobal first"), ("two", "module d\nglobal second")]);

    assert_eq!(reporter.count(Severity::Fatal), 1);
    assert_eq!(session.unit("d").unwrap().source, "one");
    assert!(lookup(&session, "d", ScopeTag::Values, "first").is_some());
    assert!(lookup(&session, "d", ScopeTag::Values, "second").is_none());
}

/// An unknown identifier poisons the referencing declaration, but everything else still
/// compiles.
#[test]
fn test_unknown_reference_poisons_only_the_referrer() {
    let (session, reporter) = compile(&[("e", "module e\nglobal bad = ghost\nglobal good")]);

    let bad: DeclId = lookup(&session, "e", ScopeTag::Values, "bad").unwrap();
    let good: DeclId = lookup(&session, "e", ScopeTag::Values, "good").unwrap();
    assert_eq!(session.tree().tag_of(bad), DeclTag::Error);
    assert_eq!(session.tree().tag_of(good), DeclTag::Global);
    assert_eq!(reporter.count(Severity::Fatal), 1);
}

/// A module without an explicit declaration is registered under its source name.
#[test]
fn test_module_path_defaults_to_source_name() {
    let (session, reporter) = compile(&[("nameless", "global x")]);
    assert!(!reporter.has_errors());
    assert!(session.unit("nameless").is_some());
    assert!(lookup(&session, "nameless", ScopeTag::Values, "x").is_some());
}

/// The driver's one-time initializer ran and its runtime declarations are callable from every
/// module.
#[test]
fn test_driver_create_installs_runtime_declarations() {
    let (session, reporter) = compile(&[("m", "module m\nfunc main calls print")]);
    assert!(!reporter.has_errors(), "unexpected diagnostics: {:#?}", reporter.diagnostics());

    let main: DeclId = lookup(&session, "m", ScopeTag::Procs, "main").unwrap();
    assert!(!session.tree().is_open(main));
    let print: DeclId = lookup(&session, "m", ScopeTag::Procs, "print").unwrap();
    assert_eq!(session.tree().get(print).attribs.linkage, Linkage::Imported);
}
