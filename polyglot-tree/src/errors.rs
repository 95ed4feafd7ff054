//  ERRORS.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 09:26:50
//  Last edited:
//    11 Jul 2025, 16:44:09
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines errors originating from the `polyglot-tree` crate.
//!
//!   Note the division of labour: _user_ source errors (shadowing,
//!   unresolved names, cycles) go to the diagnostics sink and poison the
//!   offending node, they never travel as `Err`. The error type here is
//!   what resolution closures hand back when they cannot finish their
//!   job, and it is turned into a diagnostic plus a poisoned node at the
//!   `resolve` boundary.
//

use thiserror::Error;


/***** LIBRARY *****/
/// Defines the errors that a resolution closure may produce.
#[derive(Debug, Error)]
pub enum TreeError {
    /// An identifier could not be found in the closure's scope chain.
    #[error("Unknown identifier {name:?}")]
    UnknownIdentifier { name: String },
    /// The opaque user context attached to the open declaration was not what the closure expected.
    ///
    /// This is almost always a driver bug rather than a user source error.
    #[error("Resolution context for {name:?} has the wrong type")]
    ContextMismatch { name: String },
    /// Some driver-specific failure, already formatted.
    #[error("{message}")]
    Custom { message: String },
}
