//! Named suite registration.

use regex::Regex;
use thiserror::Error;

use blackbox_domain::TestSuite;

/// Errors raised while registering suites.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two suites share a name.
    #[error("suite '{0}' is already registered")]
    Duplicate(String),
}

/// Suites to run, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: Vec<TestSuite>,
}

impl SuiteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { suites: Vec::new() }
    }

    /// Registers a suite after those already present.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if a suite with the same name exists.
    pub fn register(&mut self, suite: TestSuite) -> Result<(), RegistryError> {
        if self.get(suite.name()).is_some() {
            return Err(RegistryError::Duplicate(suite.name().to_string()));
        }
        self.suites.push(suite);
        Ok(())
    }

    /// Registers a suite (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if a suite with the same name exists.
    pub fn with_suite(mut self, suite: TestSuite) -> Result<Self, RegistryError> {
        self.register(suite)?;
        Ok(self)
    }

    /// Looks a suite up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestSuite> {
        self.suites.iter().find(|s| s.name() == name)
    }

    /// Keeps only suites whose name matches `pattern`, preserving order.
    pub fn retain_matching(&mut self, pattern: &Regex) {
        self.suites.retain(|s| pattern.is_match(s.name()));
    }

    /// Suites in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.iter()
    }

    /// Total number of cases across all suites.
    #[must_use]
    pub fn total_cases(&self) -> usize {
        self.suites.iter().map(TestSuite::len).sum()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Get the number of suites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.len()
    }
}

impl<'a> IntoIterator for &'a SuiteRegistry {
    type Item = &'a TestSuite;
    type IntoIter = std::slice::Iter<'a, TestSuite>;

    fn into_iter(self) -> Self::IntoIter {
        self.suites.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use blackbox_domain::{HttpMethod, TestCase};
    use pretty_assertions::assert_eq;

    fn suite(name: &str, cases: usize) -> TestSuite {
        let case = TestCase::any_json(HttpMethod::Get, "/ob/status", "", 200);
        TestSuite::new(name, vec![case; cases])
    }

    fn names(registry: &SuiteRegistry) -> Vec<&str> {
        registry.iter().map(TestSuite::name).collect()
    }

    #[test]
    fn keeps_registration_order() {
        let registry = SuiteRegistry::new()
            .with_suite(suite("settings", 2))
            .and_then(|r| r.with_suite(suite("profile", 1)))
            .and_then(|r| r.with_suite(suite("avatar", 3)))
            .unwrap();

        assert_eq!(names(&registry), vec!["settings", "profile", "avatar"]);
        assert_eq!(registry.total_cases(), 6);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = SuiteRegistry::new();
        registry.register(suite("settings", 1)).unwrap();
        assert_eq!(
            registry.register(suite("settings", 4)),
            Err(RegistryError::Duplicate("settings".to_string()))
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("settings").map(TestSuite::len), Some(1));
    }

    #[test]
    fn filters_by_pattern() {
        let mut registry = SuiteRegistry::new()
            .with_suite(suite("settings/create", 1))
            .and_then(|r| r.with_suite(suite("profile", 1)))
            .and_then(|r| r.with_suite(suite("settings/malformed", 1)))
            .unwrap();

        registry.retain_matching(&Regex::new("^settings").unwrap());
        assert_eq!(names(&registry), vec!["settings/create", "settings/malformed"]);
    }
}
