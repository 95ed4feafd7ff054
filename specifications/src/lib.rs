//  LIB.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 10:12:44
//  Last edited:
//    18 Jun 2025, 14:02:31
//  Auto updated?
//    Yes
//
//  Description:
//!   The `specifications` crate defines the leaf types shared by every
//!   other crate in the Polyglot workspace: source text positions, the
//!   diagnostics sink, module paths and import directives.
//

// Declare the modules
pub mod diagnostics;
pub mod path;
pub mod text;

// Pull some of it into the crate namespace for convenience
pub use diagnostics::{Diagnostic, MessageHandle, Reporter, Severity};
pub use path::{Import, ModulePath};
// The version type for driver- and plugin descriptors
pub use semver::Version;
pub use text::{Location, TextPos, TextRange};
