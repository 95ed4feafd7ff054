//  ERRORS.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 10:01:48
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines errors originating from the `polyglot-runtime` crate.
//!
//!   As everywhere in the workspace, user source errors end up in the
//!   diagnostics sink and a poisoned value is substituted; the error
//!   types here exist for host-facing failures (I/O, registry misuse)
//!   and for drivers that want to react to a failed operation
//!   programmatically in addition to the diagnostic.
//

use std::path::PathBuf;

use thiserror::Error;


/***** LIBRARY *****/
/// Errors that relate to loading [`Source`](crate::source::Source)s.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file had no extension, so no driver can ever be dispatched for it.
    #[error("Source file {path:?} has no extension to dispatch a language driver on")]
    NoExtension { path: PathBuf },
    /// The file had no usable stem to derive a module name from.
    #[error("Source file {path:?} has no base name to derive a module name from")]
    NoStem { path: PathBuf },
    /// Failed to read the file itself.
    #[error("Failed to read source file {path:?}")]
    ReadError { path: PathBuf, source: std::io::Error },
}

/// Errors that a [`LanguageDriver`](crate::driver::LanguageDriver) callback may hand back to the
/// session.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The opaque AST stored for a unit was not what the driver expected.
    ///
    /// Almost always means two drivers got their units mixed up, i.e., a driver bug.
    #[error("The AST of compilation unit '{unit}' has the wrong type")]
    AstMismatch { unit: String },
    /// The driver failed to parse the source at all.
    ///
    /// Specific syntax errors should go to the diagnostics sink; this variant is for when there
    /// is no AST to hand back whatsoever.
    #[error("Failed to parse source {name:?}: {message}")]
    ParseFailed { name: String, message: String },
    /// Some driver-specific failure, already formatted.
    #[error("{message}")]
    Custom { message: String },
}

/// Errors that relate to registering things with the [`Mediator`](crate::mediator::Mediator).
#[derive(Debug, Error)]
pub enum MediatorError {
    /// An extension was registered for a driver id that is not known.
    #[error("Unknown language driver {id:?}")]
    UnknownDriver { id: String },
}

/// Errors that relate to resolving an import directive (see
/// [`Session::import`](crate::session::Session::import)).
///
/// Every variant is recoverable and has already been reported to the diagnostics sink by the time
/// the caller sees it; the value exists so drivers can react programmatically.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The alias the import would bind is already bound in the importing module.
    #[error("Import alias '{alias}' is already in use in module '{importer}'")]
    AliasInUse { importer: String, alias: String },
    /// A module tried to import itself.
    #[error("Module '{importer}' cannot import itself")]
    SelfImport { importer: String },
    /// The imported path is not a module known to this session.
    #[error("Cannot import '{path}': no such module in this session")]
    UnknownModule { path: String },
}
