//! Environment variable loading with a shared prefix
//!
//! Every setting is read as `<PREFIX>_<SUFFIX>`. Values that are missing or do
//! not parse fall back to the supplied default.

use std::env;
use std::str::FromStr;

/// Loader for environment variables sharing a common prefix
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a new environment loader with the given prefix
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}_{}", self.prefix, suffix)
    }

    /// Load a string value with default
    pub fn load_string(&self, suffix: &str, default: &str) -> String {
        env::var(self.key(suffix)).unwrap_or_else(|_| default.to_string())
    }

    /// Load a parsed value with default
    pub fn load_parsed<T>(&self, suffix: &str, default: T) -> T
    where
        T: FromStr,
    {
        self.load_optional(suffix).unwrap_or(default)
    }

    /// Load an optional value
    pub fn load_optional<T>(&self, suffix: &str) -> Option<T>
    where
        T: FromStr,
    {
        env::var(self.key(suffix))
            .ok()
            .and_then(|v| v.trim().parse().ok())
    }

    /// Load a comma separated list, trimming entries and dropping empty ones
    ///
    /// Returns `None` when the variable is unset so callers can keep their default.
    pub fn load_list(&self, suffix: &str) -> Option<Vec<String>> {
        env::var(self.key(suffix)).ok().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_string() {
        let loader = EnvLoader::new("TOOLHUB_ENVTEST");
        env::remove_var("TOOLHUB_ENVTEST_NAME");
        assert_eq!(loader.load_string("NAME", "default"), "default");

        env::set_var("TOOLHUB_ENVTEST_NAME", "value");
        assert_eq!(loader.load_string("NAME", "default"), "value");

        env::remove_var("TOOLHUB_ENVTEST_NAME");
    }

    #[test]
    #[serial]
    fn test_load_parsed_falls_back_on_garbage() {
        let loader = EnvLoader::new("TOOLHUB_ENVTEST");
        env::remove_var("TOOLHUB_ENVTEST_NUMBER");
        assert_eq!(loader.load_parsed::<usize>("NUMBER", 42), 42);

        env::set_var("TOOLHUB_ENVTEST_NUMBER", " 123 ");
        assert_eq!(loader.load_parsed::<usize>("NUMBER", 42), 123);

        env::set_var("TOOLHUB_ENVTEST_NUMBER", "invalid");
        assert_eq!(loader.load_parsed::<usize>("NUMBER", 42), 42);
        assert_eq!(loader.load_optional::<usize>("NUMBER"), None);

        env::remove_var("TOOLHUB_ENVTEST_NUMBER");
    }

    #[test]
    #[serial]
    fn test_load_list() {
        let loader = EnvLoader::new("TOOLHUB_ENVTEST");
        env::remove_var("TOOLHUB_ENVTEST_LIST");
        assert_eq!(loader.load_list("LIST"), None);

        env::set_var("TOOLHUB_ENVTEST_LIST", "a, b,,c ");
        assert_eq!(
            loader.load_list("LIST"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        env::set_var("TOOLHUB_ENVTEST_LIST", "");
        assert_eq!(loader.load_list("LIST"), Some(vec![]));

        env::remove_var("TOOLHUB_ENVTEST_LIST");
    }
}
