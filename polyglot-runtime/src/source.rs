//  SOURCE.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 10:20:12
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines a [`Source`]: one input text with the name and extension
//!   that the pipeline needs to register and dispatch it. Reading from
//!   disk happens here, before the parse stage runs; nothing later in
//!   the pipeline touches I/O.
//

use std::fs;
use std::path::Path;

use crate::errors::SourceError;


/***** LIBRARY *****/
/// One input source for the pipeline.
#[derive(Clone, Debug)]
pub struct Source {
    /// The name of the source. Used to derive the module path when the source text does not
    /// declare one, and as the source name in diagnostics.
    pub name: String,
    /// The extension the mediator dispatches a language driver on (without the leading dot).
    pub ext:  String,
    /// The source text itself.
    pub text: String,
}
impl Source {
    /// Constructor for a Source that reads the given file.
    ///
    /// # Arguments
    /// - `path`: The path of the file to read. Its stem becomes the source name, its extension
    ///   the dispatch extension.
    ///
    /// # Returns
    /// A new Source with the file's contents.
    ///
    /// # Errors
    /// This function errors if the file has no stem or extension, or if it could not be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path: &Path = path.as_ref();
        let name: String = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.into(),
            None => return Err(SourceError::NoStem { path: path.into() }),
        };
        let ext: String = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.into(),
            None => return Err(SourceError::NoExtension { path: path.into() }),
        };
        let text: String = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => return Err(SourceError::ReadError { path: path.into(), source }),
        };
        Ok(Self { name, ext, text })
    }

    /// Constructor for a Source over an in-memory text.
    ///
    /// # Arguments
    /// - `name`: The name of the source (used for module naming and diagnostics).
    /// - `ext`: The extension to dispatch a language driver on.
    /// - `text`: The source text itself.
    ///
    /// # Returns
    /// A new Source with the given contents.
    #[inline]
    pub fn from_text(name: impl Into<String>, ext: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), ext: ext.into(), text: text.into() }
    }
}
