//  DIAGNOSTICS.rs
//    by Lut99
//
//  Created:
//    03 Mar 2025, 11:04:51
//  Last edited:
//    02 Jul 2025, 09:48:17
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the diagnostics sink that every stage of the pipeline
//!   reports into. The sink only _collects_; rendering the collected
//!   diagnostics to a terminal is the business of whatever frontend is
//!   driving us.
//!
//!   Note that a [`Severity::Fatal`] diagnostic means "this value is
//!   unusable, continue the batch" - nothing in this workspace
//!   terminates the process over a reported diagnostic. Only the host
//!   decides, after inspecting the sink, whether the batch proceeds.
//

use std::cell::RefCell;
use std::fmt::{Display, Formatter, Result as FResult};

use log::{debug, warn};
use strum::Display;

use crate::text::Location;


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_annotations_land_on_the_right_handle() {
        let reporter = Reporter::new();

        let first: MessageHandle = reporter.report(Severity::Warning, Location::builtin(), "first");
        let second: MessageHandle = reporter.report(Severity::Fatal, Location::builtin(), "second");
        reporter.annotate_note(first, "a note on the first");
        reporter.annotate_underline(second, "an underline on the second");

        let diags: Vec<Diagnostic> = reporter.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].notes, vec!["a note on the first".to_string()]);
        assert!(diags[0].underlines.is_empty());
        assert_eq!(diags[1].underlines, vec!["an underline on the second".to_string()]);
    }

    #[test]
    fn test_severity_counting() {
        let reporter = Reporter::new();
        assert!(!reporter.has_errors());

        reporter.report(Severity::Note, Location::builtin(), "harmless");
        reporter.report(Severity::Warning, Location::builtin(), "suspicious");
        assert!(!reporter.has_errors());

        reporter.report(Severity::Fatal, Location::builtin(), "broken");
        assert!(reporter.has_errors());
        assert_eq!(reporter.count(Severity::Fatal), 1);
        assert_eq!(reporter.count(Severity::Warning), 1);
        assert_eq!(reporter.len(), 3);
    }
}





/***** LIBRARY *****/
/// Defines the severity levels that a [`Diagnostic`] may carry.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    /// An invariant of the framework itself was broken. Always a bug in a driver or the host.
    Internal,
    /// The diagnosed value is unusable. The batch continues with a poisoned substitute.
    Fatal,
    /// Something is suspicious but usable.
    Warning,
    /// Additional context for another diagnostic, or a plain informational message.
    Note,
}

/// A handle to a message previously reported to a [`Reporter`].
///
/// Callers may use it to attach notes or underlines to the message after the fact.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MessageHandle(usize);



/// A single reported diagnostic.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// How bad it is.
    pub severity:   Severity,
    /// Where in the batch's sources it happened.
    pub location:   Location,
    /// The message itself.
    pub message:    String,
    /// Free-form notes attached after the initial report.
    pub notes:      Vec<String>,
    /// Underline texts attached after the initial report.
    pub underlines: Vec<String>,
}
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}



/// The sink that collects [`Diagnostic`]s for one compilation batch.
///
/// The Reporter is interior-mutable so that it can be shared (behind an `Rc`) between the session,
/// the tree and every driver without threading `&mut` through the whole pipeline. The pipeline is
/// single-threaded by design, so a [`RefCell`] suffices.
#[derive(Debug, Default)]
pub struct Reporter {
    /// The diagnostics reported so far, in report order.
    events: RefCell<Vec<Diagnostic>>,
}
impl Reporter {
    /// Constructor for the Reporter that initializes it empty.
    ///
    /// # Returns
    /// A new Reporter instance with no diagnostics collected yet.
    #[inline]
    pub fn new() -> Self { Self { events: RefCell::new(Vec::new()) } }

    /// Reports a new diagnostic.
    ///
    /// # Arguments
    /// - `severity`: The [`Severity`] of the diagnostic.
    /// - `location`: The [`Location`] the diagnostic points at.
    /// - `message`: The message describing what went wrong.
    ///
    /// # Returns
    /// A [`MessageHandle`] that can be used to attach notes or underlines to this message.
    pub fn report(&self, severity: Severity, location: Location, message: impl Into<String>) -> MessageHandle {
        let message: String = message.into();
        match severity {
            Severity::Internal | Severity::Fatal => warn!("{location}: {severity}: {message}"),
            Severity::Warning | Severity::Note => debug!("{location}: {severity}: {message}"),
        }

        let mut events = self.events.borrow_mut();
        events.push(Diagnostic { severity, location, message, notes: Vec::new(), underlines: Vec::new() });
        MessageHandle(events.len() - 1)
    }

    /// Attaches a note to a previously reported message.
    ///
    /// # Arguments
    /// - `handle`: The [`MessageHandle`] of the message to annotate.
    /// - `text`: The note to attach.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Reporter.
    #[inline]
    pub fn annotate_note(&self, handle: MessageHandle, text: impl Into<String>) { self.events.borrow_mut()[handle.0].notes.push(text.into()); }

    /// Attaches an underline to a previously reported message.
    ///
    /// # Arguments
    /// - `handle`: The [`MessageHandle`] of the message to annotate.
    /// - `text`: The underline text to attach.
    ///
    /// # Panics
    /// This function panics if the handle did not come from this Reporter.
    #[inline]
    pub fn annotate_underline(&self, handle: MessageHandle, text: impl Into<String>) {
        self.events.borrow_mut()[handle.0].underlines.push(text.into());
    }

    /// Returns a snapshot of all diagnostics reported so far, in report order.
    ///
    /// # Returns
    /// A vector with a clone of every collected [`Diagnostic`].
    #[inline]
    pub fn diagnostics(&self) -> Vec<Diagnostic> { self.events.borrow().clone() }

    /// Counts the diagnostics of the given severity.
    ///
    /// # Arguments
    /// - `severity`: The [`Severity`] to count.
    ///
    /// # Returns
    /// The number of collected diagnostics with exactly that severity.
    #[inline]
    pub fn count(&self, severity: Severity) -> usize { self.events.borrow().iter().filter(|d| d.severity == severity).count() }

    /// Checks whether any unusable value has been diagnosed so far.
    ///
    /// # Returns
    /// True if any [`Severity::Internal`] or [`Severity::Fatal`] diagnostic was reported.
    #[inline]
    pub fn has_errors(&self) -> bool { self.events.borrow().iter().any(|d| matches!(d.severity, Severity::Internal | Severity::Fatal)) }

    /// Returns the total number of collected diagnostics.
    #[inline]
    pub fn len(&self) -> usize { self.events.borrow().len() }

    /// Checks whether no diagnostics have been collected at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.events.borrow().is_empty() }
}
