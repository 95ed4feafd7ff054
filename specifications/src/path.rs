//  PATH.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 11:42:26
//  Last edited:
//    18 Jun 2025, 14:02:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines module paths (ordered identifier segments, e.g.
//!   `std.collections.map`) and the import directives that drivers
//!   produce out of their ASTs. Two paths denote the same module iff
//!   their canonical (dot-joined) keys are equal.
//

use std::fmt::{Display, Formatter, Result as FResult};
use std::str::FromStr;

use thiserror::Error;


/***** CONSTANTS *****/
/// The separator that joins path segments into the canonical module key.
pub const PATH_SEPARATOR: char = '.';





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_parse_and_canonical() {
        let path: ModulePath = "std.collections.map".parse().unwrap();
        assert_eq!(path.segments(), &["std".to_string(), "collections".to_string(), "map".to_string()]);
        assert_eq!(path.canonical(), "std.collections.map");
        assert_eq!(path.last(), "map");
    }

    #[test]
    fn test_rejects_degenerate_paths() {
        assert!(matches!(ModulePath::from_str(""), Err(ModulePathParseError::NoInput)));
        assert!(matches!(ModulePath::from_str("std..map"), Err(ModulePathParseError::EmptySegment { .. })));
        assert!(matches!(ModulePath::new(Vec::new()), Err(ModulePathParseError::NoInput)));
    }

    #[test]
    fn test_import_alias_defaults_to_last_segment() {
        let import = Import::new("std.collections.map".parse::<ModulePath>().unwrap(), None::<String>);
        assert_eq!(import.effective_alias(), "map");

        let aliased = Import::new("std.collections.map".parse::<ModulePath>().unwrap(), Some("m"));
        assert_eq!(aliased.effective_alias(), "m");
    }
}





/***** ERRORS *****/
/// Errors that relate to parsing [`ModulePath`]s.
#[derive(Debug, Error)]
pub enum ModulePathParseError {
    /// A segment in the input was empty (e.g., `std..map`).
    #[error("Empty segment in module path {raw:?}")]
    EmptySegment { raw: String },
    /// No input was given.
    #[error("No module path given")]
    NoInput,
}





/***** LIBRARY *****/
/// Defines a module path: an ordered, non-empty sequence of identifier segments.
///
/// The canonical string key for a path is its segments joined with [`PATH_SEPARATOR`]; the
/// session's module map is keyed on that string, making canonical-key equality the definition of
/// "same module".
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ModulePath {
    /// The segments of the path, in order. Never empty.
    segments: Vec<String>,
}
impl ModulePath {
    /// Constructor for the ModulePath.
    ///
    /// # Arguments
    /// - `segments`: The segments of the path, in order.
    ///
    /// # Returns
    /// A new ModulePath over the given segments.
    ///
    /// # Errors
    /// This function errors if the list is empty or any segment is the empty string.
    pub fn new(segments: Vec<String>) -> Result<Self, ModulePathParseError> {
        if segments.is_empty() {
            return Err(ModulePathParseError::NoInput);
        }
        if segments.iter().any(String::is_empty) {
            return Err(ModulePathParseError::EmptySegment { raw: segments.join(&PATH_SEPARATOR.to_string()) });
        }
        Ok(Self { segments })
    }

    /// Constructor for a ModulePath of a single segment.
    ///
    /// # Arguments
    /// - `segment`: The sole segment of the path.
    ///
    /// # Returns
    /// A new ModulePath with exactly the given segment.
    ///
    /// # Panics
    /// This function panics if the given segment is empty.
    #[inline]
    pub fn single(segment: impl Into<String>) -> Self {
        let segment: String = segment.into();
        if segment.is_empty() {
            panic!("Attempted to create a module path out of an empty segment");
        }
        Self { segments: vec![segment] }
    }

    /// Returns the canonical string key for this path.
    ///
    /// # Returns
    /// The segments joined with [`PATH_SEPARATOR`].
    #[inline]
    pub fn canonical(&self) -> String { self.segments.join(&PATH_SEPARATOR.to_string()) }

    /// Returns the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] { &self.segments }

    /// Returns the last segment of this path.
    ///
    /// This is what an import of the path binds to when no explicit alias is given.
    #[inline]
    pub fn last(&self) -> &str { self.segments.last().unwrap() }
}
impl Display for ModulePath {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.canonical()) }
}
impl FromStr for ModulePath {
    type Err = ModulePathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ModulePathParseError::NoInput);
        }
        Self::new(s.split(PATH_SEPARATOR).map(str::to_string).collect())
    }
}



/// Defines an import directive, as produced by a driver out of its AST.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Import {
    /// The path of the module to import.
    pub path:  ModulePath,
    /// The identifier to bind the imported module under, if the source gave one.
    pub alias: Option<String>,
}
impl Import {
    /// Constructor for the Import.
    ///
    /// # Arguments
    /// - `path`: The [`ModulePath`] of the module to import.
    /// - `alias`: The identifier to bind the module under, or [`None`] to default to the path's
    ///   last segment.
    ///
    /// # Returns
    /// A new Import for the given path.
    #[inline]
    pub fn new(path: ModulePath, alias: Option<impl Into<String>>) -> Self { Self { path, alias: alias.map(Into::into) } }

    /// Returns the identifier this import binds to.
    ///
    /// # Returns
    /// The explicit alias if one was given, or else the path's last segment.
    #[inline]
    pub fn effective_alias(&self) -> &str { self.alias.as_deref().unwrap_or_else(|| self.path.last()) }
}
impl Display for Import {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match &self.alias {
            Some(alias) => write!(f, "import {} as {}", self.path, alias),
            None => write!(f, "import {}", self.path),
        }
    }
}
