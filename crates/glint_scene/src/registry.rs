//! Construct materials by kind name from a property bag.
//!
//! Scene files name a material kind (`"matte"`, `"glass"`, ...) and give its
//! parameters as loosely typed properties. The registry maps each kind to a
//! factory that validates the properties and builds the [`Material`]. It is
//! an ordinary value: build one, register what you need, pass it along.

use crate::{SceneError, SceneResult};
use glint_renderer::{Color, Material, DEFAULT_GLASS_ETA, DEFAULT_MIRROR_ETA};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single material parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Float(f32),
    Color([f32; 3]),
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value.to_array())
    }
}

/// Named material parameters.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Builds a material from its properties.
pub type MaterialFactory = Box<dyn Fn(&Properties) -> SceneResult<Material> + Send + Sync>;

/// Typed access to a property bag on behalf of one material kind.
pub struct PropertyReader<'a> {
    kind: &'a str,
    properties: &'a Properties,
}

impl<'a> PropertyReader<'a> {
    pub fn new(kind: &'a str, properties: &'a Properties) -> Self {
        Self { kind, properties }
    }

    fn missing(&self, name: &str) -> SceneError {
        SceneError::MissingProperty {
            kind: self.kind.to_string(),
            property: name.to_string(),
        }
    }

    fn mistyped(&self, name: &str, expected: &'static str) -> SceneError {
        SceneError::PropertyType {
            kind: self.kind.to_string(),
            property: name.to_string(),
            expected,
        }
    }

    /// A color; a single float is accepted as a gray.
    pub fn color(&self, name: &str) -> SceneResult<Color> {
        match self.properties.get(name) {
            Some(PropertyValue::Color(c)) => Ok(Color::from_array(*c)),
            Some(PropertyValue::Float(f)) => Ok(Color::splat(*f)),
            None => Err(self.missing(name)),
        }
    }

    pub fn color_or(&self, name: &str, default: Color) -> SceneResult<Color> {
        match self.properties.get(name) {
            None => Ok(default),
            Some(_) => self.color(name),
        }
    }

    pub fn float(&self, name: &str) -> SceneResult<f32> {
        match self.properties.get(name) {
            Some(PropertyValue::Float(f)) => Ok(*f),
            Some(PropertyValue::Color(_)) => Err(self.mistyped(name, "float")),
            None => Err(self.missing(name)),
        }
    }

    pub fn float_or(&self, name: &str, default: f32) -> SceneResult<f32> {
        match self.properties.get(name) {
            None => Ok(default),
            Some(_) => self.float(name),
        }
    }
}

/// Explicitly populated table of material factories.
#[derive(Default)]
pub struct MaterialRegistry {
    factories: BTreeMap<String, MaterialFactory>,
}

impl MaterialRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in kinds: `matte`, `mirror`, `glass`,
    /// `light` and `default`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("matte", |props| {
            let props = PropertyReader::new("matte", props);
            Ok(Material::matte(props.color("albedo")?))
        });
        registry.register("mirror", |props| {
            let props = PropertyReader::new("mirror", props);
            Ok(Material::mirror(
                props.color("reflectance")?,
                props.float_or("eta", DEFAULT_MIRROR_ETA)?,
            ))
        });
        registry.register("glass", |props| {
            let props = PropertyReader::new("glass", props);
            Ok(Material::glass(
                props.color_or("reflectance", Color::ONE)?,
                props.color_or("transmittance", Color::ONE)?,
                props.float_or("eta", DEFAULT_GLASS_ETA)?,
            ))
        });
        registry.register("light", |props| {
            let props = PropertyReader::new("light", props);
            Ok(Material::light(props.color("radiosity")?))
        });
        registry.register("default", |_| Ok(Material::Default));

        registry
    }

    /// Add or replace the factory for `kind`.
    pub fn register<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(&Properties) -> SceneResult<Material> + Send + Sync + 'static,
    {
        if self.factories.insert(kind.to_string(), Box::new(factory)).is_some() {
            log::debug!("Replaced material factory {}", kind);
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// Build a material of `kind`.
    pub fn make(&self, kind: &str, properties: &Properties) -> SceneResult<Material> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| SceneError::UnknownMaterialKind(kind.to_string()))?;
        factory(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, PropertyValue)]) -> Properties {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = MaterialRegistry::with_builtins();
        let kinds: Vec<&str> = registry.kinds().collect();
        assert_eq!(kinds, ["default", "glass", "light", "matte", "mirror"]);
    }

    #[test]
    fn test_make_matte() {
        let registry = MaterialRegistry::with_builtins();
        let material = registry
            .make("matte", &props(&[("albedo", Color::new(0.8, 0.1, 0.1).into())]))
            .unwrap();
        assert_eq!(material, Material::matte(Color::new(0.8, 0.1, 0.1)));
    }

    #[test]
    fn test_defaults_fill_optional_properties() {
        let registry = MaterialRegistry::with_builtins();

        let glass = registry.make("glass", &Properties::new()).unwrap();
        assert_eq!(glass, Material::glass(Color::ONE, Color::ONE, DEFAULT_GLASS_ETA));

        let mirror = registry
            .make("mirror", &props(&[("reflectance", PropertyValue::Float(0.9))]))
            .unwrap();
        assert_eq!(mirror, Material::mirror(Color::splat(0.9), DEFAULT_MIRROR_ETA));
    }

    #[test]
    fn test_errors() {
        let registry = MaterialRegistry::with_builtins();

        assert!(matches!(
            registry.make("plastic", &Properties::new()),
            Err(SceneError::UnknownMaterialKind(kind)) if kind == "plastic"
        ));
        assert!(matches!(
            registry.make("light", &Properties::new()),
            Err(SceneError::MissingProperty { property, .. }) if property == "radiosity"
        ));
        assert!(matches!(
            registry.make("glass", &props(&[("eta", Color::ONE.into())])),
            Err(SceneError::PropertyType { expected: "float", .. })
        ));
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = MaterialRegistry::new();
        assert!(!registry.contains("chalk"));

        registry.register("chalk", |_| Ok(Material::matte(Color::splat(0.9))));
        assert!(registry.contains("chalk"));
        assert_eq!(
            registry.make("chalk", &Properties::new()).unwrap(),
            Material::matte(Color::splat(0.9))
        );
    }

    #[test]
    fn test_properties_from_json() {
        let parsed: Properties =
            serde_json::from_str(r#"{ "eta": 1.5, "albedo": [0.5, 0.25, 1.0] }"#).unwrap();
        assert_eq!(parsed["eta"], PropertyValue::Float(1.5));
        assert_eq!(parsed["albedo"], PropertyValue::Color([0.5, 0.25, 1.0]));
    }
}
