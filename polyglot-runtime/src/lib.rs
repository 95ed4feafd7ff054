//  LIB.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 09:55:21
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   The `polyglot-runtime` crate implements the orchestration half of
//!   the Polyglot framework: the process-wide registry of language
//!   drivers (the mediator), the per-run session that owns every
//!   compilation unit, and the fixed five-stage pipeline
//!   (init, parse, forward-declare, resolve-imports, resolve-all) that
//!   the host drives over a batch of source files.
//!
//!   The runtime never inspects a driver's AST; it stores the opaque
//!   value and invokes the driver's stage callbacks with session
//!   handles.
//

// Declare the modules
pub mod driver;
pub mod errors;
pub mod mediator;
pub mod session;
pub mod source;

// Pull the main types into the crate namespace
pub use driver::{DriverInfo, LanguageDriver, Parsed, PluginInfo};
pub use errors::{DriverError, ImportError, MediatorError, SourceError};
pub use mediator::{DriverRegistration, ExtensionConflict, Mediator};
pub use session::{CompileUnit, Session, Stage};
pub use source::Source;
