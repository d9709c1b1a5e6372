//! Versioned catalog of decorator definitions.

use std::collections::BTreeMap;

use decorator_primitives::{Version, is_compatible};
use tracing::debug;

use crate::definition::DecoratorDefinition;
use crate::error::{RegistryError, RegistryResult};

/// Catalog mapping decorator name to every registered version.
///
/// The registry is populated at startup and queried read-only afterwards.
/// Share a populated registry across threads behind an `Arc`; runtime
/// extension requires exclusive access (`&mut self`).
#[derive(Debug, Default, Clone)]
pub struct Registry {
    definitions: BTreeMap<String, BTreeMap<Version, DecoratorDefinition>>,
    order: Vec<(String, Version)>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    ///
    /// Compatibility references to other decorators are not checked here;
    /// they are resolved when a request is composed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateDefinition`] if the same name and
    /// version is already present.
    pub fn register(&mut self, definition: DecoratorDefinition) -> RegistryResult<()> {
        let name = definition.name().to_string();
        let version = definition.version().clone();
        let versions = self.definitions.entry(name.clone()).or_default();
        if versions.contains_key(&version) {
            return Err(RegistryError::DuplicateDefinition { name, version });
        }

        debug!(decorator = %name, %version, category = definition.category(), "registered decorator");
        versions.insert(version.clone(), definition);
        self.order.push((name, version));
        Ok(())
    }

    /// Registers every definition, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RegistryError::DuplicateDefinition`].
    pub fn register_all<I>(&mut self, definitions: I) -> RegistryResult<()>
    where
        I: IntoIterator<Item = DecoratorDefinition>,
    {
        definitions
            .into_iter()
            .try_for_each(|definition| self.register(definition))
    }

    /// Removes one version, or every version when `version` is `None`.
    /// Returns the removed definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownDecorator`] when nothing matched.
    pub fn unregister(
        &mut self,
        name: &str,
        version: Option<&Version>,
    ) -> RegistryResult<Vec<DecoratorDefinition>> {
        let unknown = || RegistryError::UnknownDecorator {
            name: name.to_owned(),
        };
        let versions = self.definitions.get_mut(name).ok_or_else(unknown)?;

        let removed = match version {
            Some(version) => vec![versions.remove(version).ok_or_else(unknown)?],
            None => std::mem::take(versions).into_values().collect(),
        };
        if versions.is_empty() {
            self.definitions.remove(name);
        }

        self.order.retain(|(registered, registered_version)| {
            registered != name || removed.iter().all(|def| def.version() != registered_version)
        });
        debug!(decorator = name, removed = removed.len(), "unregistered decorator");
        Ok(removed)
    }

    /// Resolves a name and optional version constraint to a definition.
    ///
    /// Without a constraint the highest registered version is returned. With
    /// one, the highest version sharing the requested major whose
    /// `minor.patch` is at least the requested one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownDecorator`] when the name is absent and
    /// [`RegistryError::IncompatibleVersion`] when no version satisfies the
    /// constraint.
    pub fn lookup(&self, name: &str, version: Option<&Version>) -> RegistryResult<&DecoratorDefinition> {
        let versions = self
            .definitions
            .get(name)
            .ok_or_else(|| RegistryError::UnknownDecorator {
                name: name.to_owned(),
            })?;

        let found = match version {
            None => versions.values().next_back(),
            Some(requested) => versions
                .iter()
                .rev()
                .find(|(available, _)| is_compatible(available, requested))
                .map(|(_, definition)| definition),
        };

        found.ok_or_else(|| RegistryError::IncompatibleVersion {
            name: name.to_owned(),
            requested: version.cloned().unwrap_or_else(|| Version::new(0, 0, 0)),
            available: versions.keys().cloned().collect(),
        })
    }

    /// Returns the highest registered version of a decorator.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<&DecoratorDefinition> {
        self.definitions
            .get(name)
            .and_then(|versions| versions.values().next_back())
    }

    /// Returns true when any version of the decorator is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered versions of a decorator, ascending.
    #[must_use]
    pub fn versions(&self, name: &str) -> Vec<&Version> {
        self.definitions
            .get(name)
            .map(|versions| versions.keys().collect())
            .unwrap_or_default()
    }

    /// Registered decorator names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Every definition in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DecoratorDefinition> {
        self.order.iter().filter_map(|(name, version)| {
            self.definitions
                .get(name)
                .and_then(|versions| versions.get(version))
        })
    }

    /// Definitions in a category, in registration order.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&DecoratorDefinition> {
        self.iter()
            .filter(|definition| definition.category() == category)
            .collect()
    }

    /// Distinct categories in first-registration order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for definition in self.iter() {
            if !categories.contains(&definition.category()) {
                categories.push(definition.category());
            }
        }
        categories
    }

    /// Definitions that declare support for a model, in registration order.
    #[must_use]
    pub fn supporting_model(&self, model: &str) -> Vec<&DecoratorDefinition> {
        self.iter()
            .filter(|definition| definition.compatibility().supports_model(model))
            .collect()
    }

    /// Definitions whose standard range includes `version`, in registration
    /// order.
    #[must_use]
    pub fn supporting_standard(&self, version: &Version) -> Vec<&DecoratorDefinition> {
        self.iter()
            .filter(|definition| definition.compatibility().supports_standard(version))
            .collect()
    }

    /// Number of registered definitions across all versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
