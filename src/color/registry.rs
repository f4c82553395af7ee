use std::collections::HashMap;

use crate::color::{CmySpace, ColorSpace, HslSpace, HsvSpace, IptSpace, RgbSpace, XyzSpace};

/// Name of the adapter used when a requested space is unknown
pub const DEFAULT_SPACE: &str = "rgb";

/// Registry of available color-space adapters
///
/// Adapters are registered by name and instantiated on request, so the strip
/// and the composer can each own their adapter.
pub struct ColorSpaceRegistry {
    spaces: HashMap<String, Box<dyn Fn() -> Box<dyn ColorSpace> + Send + Sync>>,
}

impl ColorSpaceRegistry {
    /// Create a new registry with all built-in color spaces
    pub fn new() -> Self {
        let mut registry = Self {
            spaces: HashMap::new(),
        };
        registry.register_builtin_spaces();
        registry
    }

    fn register_builtin_spaces(&mut self) {
        self.register("rgb", || Box::new(RgbSpace));
        self.register("hsl", || Box::new(HslSpace));
        self.register("hsv", || Box::new(HsvSpace));
        self.register("cmy", || Box::new(CmySpace));
        self.register("xyz", || Box::new(XyzSpace));
        self.register("ipt", || Box::new(IptSpace));
    }

    /// Register a custom color space
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn ColorSpace> + Send + Sync + 'static,
    {
        self.spaces.insert(name.to_string(), Box::new(factory));
    }

    /// Get a color space by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Box<dyn ColorSpace>> {
        let name = name.trim().to_lowercase();
        self.spaces.get(&name).map(|factory| factory())
    }

    /// Get a color space by name, falling back to plain RGB
    pub fn get_or_default(&self, name: &str) -> Box<dyn ColorSpace> {
        self.get(name).unwrap_or_else(|| Box::new(RgbSpace))
    }

    /// All available color space names, sorted
    pub fn available_spaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.spaces.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_space(&self, name: &str) -> bool {
        self.spaces.contains_key(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl Default for ColorSpaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_spaces_available() {
        let registry = ColorSpaceRegistry::new();

        assert!(registry.has_space("rgb"));
        assert!(registry.has_space("HSL"));
        assert!(registry.has_space("hsv"));
        assert!(registry.has_space("cmy"));
        assert!(registry.has_space("xyz"));
        assert!(registry.has_space("ipt"));
        assert_eq!(registry.len(), 6);
        assert_eq!(
            registry.available_spaces(),
            vec!["cmy", "hsl", "hsv", "ipt", "rgb", "xyz"]
        );
    }

    #[test]
    fn test_unknown_space_falls_back_to_rgb() {
        let registry = ColorSpaceRegistry::new();

        assert!(registry.get("lab").is_none());
        assert_eq!(registry.get_or_default("lab").name(), DEFAULT_SPACE);
        assert_eq!(registry.get_or_default(" Hsl ").name(), "hsl");
    }
}
