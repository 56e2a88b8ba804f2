//! In-memory project model
//!
//! The authored project is read-only to the toolchain, with two
//! exceptions owned by the exporter: stripping editor-only data before
//! serialization and rewriting resource paths while copying them into
//! a bundle. Everything here is plain serde data; behavior method
//! bodies are opaque text produced by the external event compiler.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{ZephyrError, ZephyrResult};

/// Declared type of a behavior property.
///
/// The `Unknown` catch-all keeps a malformed declared type from
/// failing deserialization: the literal encoder turns it into an
/// error-marker expression instead of aborting the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Text,
    Choice,
    Number,
    Boolean,
    #[serde(other)]
    Unknown,
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Text
    }
}

/// Declared, typed, defaulted field of a behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyDescriptor {
    /// Identifier-safe property name
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Default value, always stored as text
    pub value: String,
    /// Hidden properties are never user-editable and never read from
    /// instance data; they always take their literal default.
    pub hidden: bool,
}

impl PropertyDescriptor {
    pub fn new<N: Into<String>, V: Into<String>>(
        name: N,
        property_type: PropertyType,
        value: V,
    ) -> Self {
        Self {
            name: name.into(),
            property_type,
            value: value.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// An event-derived behavior method.
///
/// `code` is the compiled method body text produced by the external
/// event compiler; this crate never interprets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventMethod {
    pub name: String,
    pub code: String,
}

impl EventMethod {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, code: C) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// A named, reusable bundle of typed properties and event-derived
/// methods attachable to a game object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorDescriptor {
    pub name: String,
    pub full_name: String,
    pub properties: Vec<PropertyDescriptor>,
    pub methods: Vec<EventMethod>,
}

impl BehaviorDescriptor {
    /// Check the descriptor invariants: property names and method
    /// names must each be unique within the behavior.
    pub fn validate(&self) -> ZephyrResult<()> {
        if self.name.is_empty() {
            return Err(ZephyrError::project("behavior name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(ZephyrError::project_in_behavior(
                    format!("duplicate property name '{}'", property.name),
                    &self.name,
                ));
            }
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(ZephyrError::project_in_behavior(
                    format!("duplicate method name '{}'", method.name),
                    &self.name,
                ));
            }
        }

        Ok(())
    }
}

/// An extension groups the behaviors it declares under one namespace
/// segment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorExtension {
    pub name: String,
    pub behaviors: Vec<BehaviorDescriptor>,
}

/// One effect attached to a scene layer; the effect type selects a
/// renderer filter include at export time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerEffect {
    pub name: String,
    pub effect_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layer {
    pub name: String,
    pub effects: Vec<LayerEffect>,
}

/// A scene (layout) of the project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub name: String,
    pub layers: Vec<Layer>,
    /// Authored event tree, editor-only; stripped before export
    pub events: serde_json::Value,
}

/// A layout instantiated on top of a scene at runtime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalLayout {
    pub name: String,
    pub associated_scene: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub name: String,
    pub kind: String,
    pub file: String,
}

/// A non-generated source file referenced by the project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceFile {
    pub file_name: String,
    pub language: String,
}

/// Per-platform asset slots (icons, splash images), keyed by platform
/// then slot name, holding resource names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformAssets {
    #[serde(flatten)]
    slots: HashMap<String, HashMap<String, String>>,
}

impl PlatformAssets {
    /// Resource name registered for a platform slot, if any
    pub fn get(&self, platform: &str, name: &str) -> Option<&str> {
        self.slots
            .get(platform)
            .and_then(|platform_slots| platform_slots.get(name))
            .map(String::as_str)
    }

    pub fn set<P, N, R>(&mut self, platform: P, name: N, resource: R)
    where
        P: Into<String>,
        N: Into<String>,
        R: Into<String>,
    {
        self.slots
            .entry(platform.into())
            .or_default()
            .insert(name.into(), resource.into());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadingScreen {
    pub show_splash: bool,
}

impl Default for LoadingScreen {
    fn default() -> Self {
        Self { show_splash: true }
    }
}

/// A fully authored game project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    pub author: String,
    pub version: String,
    pub package_name: String,
    /// "portrait", "landscape" or "default"
    pub orientation: String,
    pub game_resolution_width: u32,
    pub game_resolution_height: u32,
    /// Path of the authored project file; resource paths are resolved
    /// relative to its directory
    pub project_file: String,
    pub first_scene: String,
    pub loading_screen: LoadingScreen,
    pub scenes: Vec<Scene>,
    pub external_layouts: Vec<ExternalLayout>,
    pub resources: Vec<Resource>,
    pub source_files: Vec<SourceFile>,
    pub platform_assets: PlatformAssets,
    pub extensions: Vec<BehaviorExtension>,
    /// Ads application identifier; when non-empty the mobile wrapper
    /// manifest gains the ads plugin block
    pub ads_app_id: String,
    /// Editor-only settings, stripped before export
    pub editor_settings: serde_json::Value,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            version: "1.0.0".to_string(),
            package_name: String::new(),
            orientation: "default".to_string(),
            game_resolution_width: 800,
            game_resolution_height: 600,
            project_file: String::new(),
            first_scene: String::new(),
            loading_screen: LoadingScreen::default(),
            scenes: Vec::new(),
            external_layouts: Vec::new(),
            resources: Vec::new(),
            source_files: Vec::new(),
            platform_assets: PlatformAssets::default(),
            extensions: Vec::new(),
            ads_app_id: String::new(),
            editor_settings: serde_json::Value::Null,
        }
    }
}

impl Project {
    /// Parse a project snapshot from its JSON form
    pub fn from_json(content: &str) -> ZephyrResult<Self> {
        let project: Project = serde_json::from_str(content)?;
        project.validate()?;
        Ok(project)
    }

    /// Check the model invariants that code generation relies on
    pub fn validate(&self) -> ZephyrResult<()> {
        if self.name.is_empty() {
            return Err(ZephyrError::project("project name cannot be empty"));
        }
        for extension in &self.extensions {
            for behavior in &extension.behaviors {
                behavior.validate()?;
            }
        }
        Ok(())
    }

    /// Look up a resource by name
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    /// Register a resource unless one with the same name exists.
    /// Existing resources win, which the legacy font migration relies
    /// on.
    pub fn add_resource_if_absent(&mut self, resource: Resource) {
        if self.resource(&resource.name).is_none() {
            self.resources.push(resource);
        }
    }

    /// Remove editor-only data before serializing for a runtime
    /// bundle. Run after code generation: the generators may still
    /// need the data being stripped.
    pub fn strip_for_export(&mut self) {
        for scene in &mut self.scenes {
            scene.events = serde_json::Value::Null;
        }
        self.editor_settings = serde_json::Value::Null;
    }
}
