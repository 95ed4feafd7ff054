//  TEXT.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 10:31:08
//  Last edited:
//    18 Jun 2025, 14:02:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines positions within source text (`TextPos`, `TextRange`) and
//!   the `Location` that ties a range to a named source. These are the
//!   currency of every diagnostic in the framework.
//

use std::fmt::{Display, Formatter, Result as FResult};


/***** CONSTANTS *****/
/// The name of the synthetic source that builtin declarations and registry-level diagnostics live in.
pub const BUILTIN_SOURCE: &str = "<builtin>";





/***** LIBRARY *****/
/// Defines a TextPos, which is a singular position within the source text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextPos {
    /// The line number of this position (i.e., the Y-coordinate). Stored as a zero-indexed number.
    pub line: usize,
    /// The column number of this position (i.e., the X-coordinate). Stored as a zero-indexed number.
    pub col:  usize,
}
impl TextPos {
    /// Constructor for the TextPos that takes a zero-indexed position.
    ///
    /// # Arguments
    /// - `line`: The line number for this position (zero-indexed).
    /// - `col`: The column number for this position (zero-indexed).
    ///
    /// # Returns
    /// A new TextPos instance that points to the given position.
    #[inline]
    pub const fn new0(line: usize, col: usize) -> Self { Self { line, col } }

    /// Constructor for the TextPos that takes a one-indexed position.
    ///
    /// # Arguments
    /// - `line`: The line number for this position (one-indexed).
    /// - `col`: The column number for this position (one-indexed).
    ///
    /// # Returns
    /// A new TextPos instance that points to the given position.
    #[inline]
    pub const fn new1(line: usize, col: usize) -> Self { Self { line: line - 1, col: col - 1 } }

    /// Returns the internal line as a one-indexed value.
    #[inline]
    pub const fn line1(&self) -> usize { self.line + 1 }

    /// Returns the internal column as a one-indexed value.
    #[inline]
    pub const fn col1(&self) -> usize { self.col + 1 }
}
impl Display for TextPos {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}:{}", self.line + 1, self.col + 1) }
}



/// Defines TextRange, which is a continuous range within the source text.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextRange {
    /// The start of the range, inclusive.
    pub start: TextPos,
    /// The end of the range, inclusive.
    pub end:   TextPos,
}
impl TextRange {
    /// Constructor for the TextRange.
    ///
    /// # Arguments
    /// - `start`: The start of the range, inclusive.
    /// - `end`: The end of the range, inclusive.
    ///
    /// # Returns
    /// A new TextRange that represents the range between the given positions.
    #[inline]
    pub fn new(start: impl Into<TextPos>, end: impl Into<TextPos>) -> Self { Self { start: start.into(), end: end.into() } }

    /// Constructor for the TextRange that spans a single position.
    ///
    /// # Arguments
    /// - `pos`: The position that the range starts _and_ ends on.
    ///
    /// # Returns
    /// A new TextRange that covers exactly the given position.
    #[inline]
    pub fn at(pos: impl Into<TextPos>) -> Self {
        let pos: TextPos = pos.into();
        Self { start: pos, end: pos }
    }
}
impl Display for TextRange {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}-{}", self.start, self.end) }
}
impl From<(usize, usize)> for TextPos {
    #[inline]
    fn from(value: (usize, usize)) -> Self { Self::new0(value.0, value.1) }
}



/// Defines a Location, which is a range within one named source text.
///
/// Declarations, diagnostics and compilation units all carry Locations; a `None` range means the
/// location refers to the source as a whole (e.g., a missing file) rather than a span within it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Some name that represents the source. Typically the filename for a file, or something like "<stdin>" for stdin.
    pub source: String,
    /// The range within that source, if any.
    pub range:  Option<TextRange>,
}
impl Location {
    /// Constructor for the Location.
    ///
    /// # Arguments
    /// - `source`: The name of the source text this location points into.
    /// - `range`: The range within that source.
    ///
    /// # Returns
    /// A new Location that points to the given range in the given source.
    #[inline]
    pub fn new(source: impl Into<String>, range: impl Into<TextRange>) -> Self { Self { source: source.into(), range: Some(range.into()) } }

    /// Constructor for a Location that points at a source as a whole.
    ///
    /// # Arguments
    /// - `source`: The name of the source text this location points at.
    ///
    /// # Returns
    /// A new Location without a range.
    #[inline]
    pub fn whole(source: impl Into<String>) -> Self { Self { source: source.into(), range: None } }

    /// Constructor for the Location of builtin declarations.
    ///
    /// # Returns
    /// A new Location that points at the synthetic [`BUILTIN_SOURCE`].
    #[inline]
    pub fn builtin() -> Self { Self { source: BUILTIN_SOURCE.into(), range: None } }
}
impl Display for Location {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        match &self.range {
            Some(range) => write!(f, "{}:{}", self.source, range.start),
            None => write!(f, "{}", self.source),
        }
    }
}
