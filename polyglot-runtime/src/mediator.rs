//  MEDIATOR.rs
//    by Lut99
//
//  Created:
//    06 Mar 2025, 11:30:44
//  Last edited:
//    22 Jul 2025, 10:09:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`Mediator`]: the process-wide registry of language
//!   drivers and plugins. It maps file extensions and ids to drivers so
//!   that sessions can dispatch sources without knowing any driver
//!   specifics.
//!
//!   Registration is one-time and conflict-averse: an extension maps to
//!   at most one driver, and a colliding registration is rejected with
//!   the existing owner handed back to the caller. Nothing is ever
//!   silently overwritten.
//

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::driver::{LanguageDriver, PluginInfo};
use crate::errors::MediatorError;


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use semver::Version;
    use specifications::diagnostics::Reporter;

    use super::*;
    use crate::driver::{DriverInfo, Parsed};
    use crate::errors::DriverError;
    use crate::source::Source;


    /// A driver that does nothing but exist under an id and some extensions.
    struct NullDriver {
        info: DriverInfo,
    }
    impl NullDriver {
        fn new(id: &str, exts: &[&str]) -> Arc<Self> {
            Arc::new(Self { info: DriverInfo::new(id, format!("{id} (test)"), Version::new(0, 1, 0), exts.iter().copied()) })
        }
    }
    impl LanguageDriver for NullDriver {
        fn info(&self) -> &DriverInfo { &self.info }

        fn parse(&self, source: &Source, _reporter: &Reporter) -> Result<Parsed, DriverError> {
            Err(DriverError::ParseFailed { name: source.name.clone(), message: "the null driver cannot parse".into() })
        }
    }


    #[test]
    fn test_extension_exclusivity() {
        let mut mediator = Mediator::new();
        let x = NullDriver::new("x", &["src"]);
        let y = NullDriver::new("y", &["src", "ysrc"]);

        assert!(matches!(mediator.register_driver(x), DriverRegistration::Registered { skipped } if skipped.is_empty()));

        // `src` stays with x; `ysrc` still goes to y
        match mediator.register_driver(y) {
            DriverRegistration::Registered { skipped } => {
                assert_eq!(skipped.len(), 1);
                assert_eq!(skipped[0].extension, "src");
                assert_eq!(skipped[0].owner, "x");
            },
            DriverRegistration::Duplicate { .. } => panic!("y is not a duplicate of x"),
        }
        assert_eq!(mediator.lookup_by_extension("src").unwrap().info().id, "x");
        assert_eq!(mediator.lookup_by_extension("ysrc").unwrap().info().id, "y");
    }

    #[test]
    fn test_duplicate_id_returns_existing_owner() {
        let mut mediator = Mediator::new();
        mediator.register_driver(NullDriver::new("x", &["a"]));

        match mediator.register_driver(NullDriver::new("x", &["b"])) {
            DriverRegistration::Duplicate { existing } => assert_eq!(existing.info().id, "x"),
            DriverRegistration::Registered { .. } => panic!("second registration of id 'x' should be rejected"),
        }
        // The rejected driver's extensions were not registered either
        assert!(mediator.lookup_by_extension("b").is_none());
    }

    #[test]
    fn test_explicit_extension_registration() {
        let mut mediator = Mediator::new();
        mediator.register_driver(NullDriver::new("x", &["a"]));
        mediator.register_driver(NullDriver::new("y", &["b"]));

        // A fresh extension binds fine
        assert!(matches!(mediator.register_extension("extra", "y"), Ok(None)));
        assert_eq!(mediator.lookup_by_extension("extra").unwrap().info().id, "y");

        // A taken extension returns the current owner and stays put
        match mediator.register_extension("a", "y") {
            Ok(Some(existing)) => assert_eq!(existing.info().id, "x"),
            other => panic!("expected the existing owner, got {:?}", other.map(|o| o.map(|d| d.info().id.clone()))),
        }
        assert_eq!(mediator.lookup_by_extension("a").unwrap().info().id, "x");

        // An unknown driver id is a hard error
        assert!(matches!(mediator.register_extension("c", "nonsense"), Err(MediatorError::UnknownDriver { .. })));
    }
}





/***** AUXILLARY *****/
/// A default extension that was skipped during driver registration because another driver already
/// owns it.
#[derive(Clone, Debug)]
pub struct ExtensionConflict {
    /// The extension that was skipped.
    pub extension: String,
    /// The id of the driver that keeps owning it.
    pub owner:     String,
}

/// The result of registering a driver with the [`Mediator`].
pub enum DriverRegistration {
    /// The driver was registered. Any of its default extensions that were already owned by
    /// another driver were skipped (not overwritten) and are listed here.
    Registered { skipped: Vec<ExtensionConflict> },
    /// A driver with the same id already exists; the registry is unchanged and the existing
    /// driver is returned.
    Duplicate { existing: Arc<dyn LanguageDriver> },
}





/***** LIBRARY *****/
/// The process-wide registry of language drivers and plugins.
///
/// Created once, populated at startup, then shared immutably (behind an [`Arc`]) by every
/// session. There is no removal operation; the registry lives as long as the process does.
#[derive(Default)]
pub struct Mediator {
    /// The registered drivers, in registration order.
    drivers:    Vec<Arc<dyn LanguageDriver>>,
    /// Maps driver ids to indices in `drivers`.
    ids:        HashMap<String, usize>,
    /// Maps file extensions to indices in `drivers`.
    extensions: HashMap<String, usize>,
    /// The registered plugins, by id.
    plugins:    HashMap<String, PluginInfo>,
}
impl Mediator {
    /// Constructor for an empty Mediator.
    ///
    /// # Returns
    /// A new Mediator with no drivers or plugins registered.
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Registers a language driver together with all of its default extensions.
    ///
    /// # Arguments
    /// - `driver`: The driver to register.
    ///
    /// # Returns
    /// [`DriverRegistration::Registered`] with the list of skipped extensions on success, or
    /// [`DriverRegistration::Duplicate`] with the existing driver if the id is already taken (in
    /// which case nothing was registered at all).
    pub fn register_driver(&mut self, driver: Arc<dyn LanguageDriver>) -> DriverRegistration {
        let id: String = driver.info().id.clone();
        if let Some(index) = self.ids.get(&id) {
            return DriverRegistration::Duplicate { existing: self.drivers[*index].clone() };
        }

        let index: usize = self.drivers.len();
        let exts: Vec<String> = driver.info().extensions.clone();
        debug!("Registering language driver '{id}' ({} v{})", driver.info().name, driver.info().version);
        self.drivers.push(driver);
        self.ids.insert(id, index);

        // Claim the default extensions, skipping any that are already owned
        let mut skipped: Vec<ExtensionConflict> = Vec::new();
        for ext in exts {
            match self.extensions.get(&ext) {
                Some(owner) => {
                    let owner: String = self.drivers[*owner].info().id.clone();
                    debug!("Skipping extension '{ext}': already owned by driver '{owner}'");
                    skipped.push(ExtensionConflict { extension: ext, owner });
                },
                None => {
                    self.extensions.insert(ext, index);
                },
            }
        }
        DriverRegistration::Registered { skipped }
    }

    /// Registers one extra extension for an already-registered driver.
    ///
    /// # Arguments
    /// - `ext`: The extension (without leading dot) to register.
    /// - `id`: The id of the driver that should own it.
    ///
    /// # Returns
    /// [`None`] if the extension now maps to the driver, or the existing owner if the extension
    /// was already taken (in which case the mapping is unchanged).
    ///
    /// # Errors
    /// This function errors if no driver with the given id is registered.
    pub fn register_extension(&mut self, ext: impl Into<String>, id: &str) -> Result<Option<Arc<dyn LanguageDriver>>, MediatorError> {
        let ext: String = ext.into();
        let index: usize = match self.ids.get(id) {
            Some(index) => *index,
            None => return Err(MediatorError::UnknownDriver { id: id.into() }),
        };
        if let Some(owner) = self.extensions.get(&ext) {
            return Ok(Some(self.drivers[*owner].clone()));
        }
        self.extensions.insert(ext, index);
        Ok(None)
    }

    /// Registers a non-language plugin.
    ///
    /// # Arguments
    /// - `plugin`: The [`PluginInfo`] describing the plugin.
    ///
    /// # Returns
    /// [`None`] if the plugin was registered, or the existing plugin if the id was already taken
    /// (in which case the registry is unchanged).
    pub fn register_plugin(&mut self, plugin: PluginInfo) -> Option<PluginInfo> {
        if let Some(existing) = self.plugins.get(&plugin.id) {
            return Some(existing.clone());
        }
        debug!("Registering plugin '{}' ({} v{})", plugin.id, plugin.name, plugin.version);
        self.plugins.insert(plugin.id.clone(), plugin);
        None
    }

    /// Looks a driver up by its id.
    ///
    /// # Arguments
    /// - `id`: The driver id to look for.
    ///
    /// # Returns
    /// The driver, or [`None`] if no driver with that id is registered.
    #[inline]
    pub fn lookup_by_id(&self, id: &str) -> Option<Arc<dyn LanguageDriver>> { self.ids.get(id).map(|index| self.drivers[*index].clone()) }

    /// Looks a driver up by one of its extensions.
    ///
    /// # Arguments
    /// - `ext`: The extension (without leading dot) to look for.
    ///
    /// # Returns
    /// The driver owning that extension, or [`None`] if the extension is unclaimed.
    #[inline]
    pub fn lookup_by_extension(&self, ext: &str) -> Option<Arc<dyn LanguageDriver>> {
        self.extensions.get(ext).map(|index| self.drivers[*index].clone())
    }

    /// Looks a plugin up by its id.
    ///
    /// # Arguments
    /// - `id`: The plugin id to look for.
    ///
    /// # Returns
    /// The plugin's descriptor, or [`None`] if no plugin with that id is registered.
    #[inline]
    pub fn lookup_plugin(&self, id: &str) -> Option<&PluginInfo> { self.plugins.get(id) }

    /// Returns an iterator over all registered drivers, in registration order.
    #[inline]
    pub fn drivers(&self) -> impl Iterator<Item = &Arc<dyn LanguageDriver>> { self.drivers.iter() }
}
