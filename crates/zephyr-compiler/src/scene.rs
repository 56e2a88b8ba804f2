//! Per-scene code compilation seam
//!
//! The visual-event-tree compiler is an external collaborator: given a
//! scene it returns generated code text plus the additional include
//! identifiers that code needs. The exporter only concatenates and
//! forwards what it gets back.

use std::collections::HashMap;

use zephyr_core::{Diagnostic, Project, Scene, ZephyrResult};

use crate::behavior::BehaviorCodeGenerator;
use crate::template::substitute;

/// Output of compiling one scene
#[derive(Debug, Clone)]
pub struct CompiledScene {
    pub code: String,
    /// Additional includes the generated code depends on
    pub includes: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

pub trait SceneCompiler {
    /// Generate the complete code file for one scene.
    ///
    /// `for_runtime` distinguishes a final export from a preview
    /// compilation (previews keep hot-reload affordances).
    fn generate_scene_complete_code(
        &self,
        project: &Project,
        scene: &Scene,
        for_runtime: bool,
    ) -> ZephyrResult<CompiledScene>;
}

const SCENE_REGISTRATION_TEMPLATE: &str = r#"
zephyr.sceneCode = zephyr.sceneCode || {};
zephyr.sceneCode[SCENE_NAME_LITERAL] = function(runtimeScene) {
    return;
};
"#;

/// Scene compiler that synthesizes the project's behavior definitions
/// plus a registration stub for the scene itself.
///
/// Method implementation names are supplied per behavior by the
/// caller; this compiler never invents them.
#[derive(Debug, Default)]
pub struct BehaviorSceneCompiler {
    /// behavior name -> (declared method name -> implementation name)
    mangled_names: HashMap<String, HashMap<String, String>>,
}

impl BehaviorSceneCompiler {
    pub fn new(mangled_names: HashMap<String, HashMap<String, String>>) -> Self {
        Self { mangled_names }
    }

    fn code_namespace(extension_name: &str, behavior_name: &str) -> String {
        format!("zephyr.ext__{}__{}", extension_name, behavior_name)
    }
}

impl SceneCompiler for BehaviorSceneCompiler {
    fn generate_scene_complete_code(
        &self,
        project: &Project,
        scene: &Scene,
        _for_runtime: bool,
    ) -> ZephyrResult<CompiledScene> {
        let empty = HashMap::new();
        let mut code = String::new();
        let mut diagnostics = Vec::new();

        for extension in &project.extensions {
            for behavior in &extension.behaviors {
                behavior.validate()?;
                let mapping = self.mangled_names.get(&behavior.name).unwrap_or(&empty);
                let generated = BehaviorCodeGenerator::generate_runtime_behavior_complete_code(
                    &extension.name,
                    behavior,
                    &Self::code_namespace(&extension.name, &behavior.name),
                    mapping,
                );
                code += &generated.code;
                diagnostics.extend(generated.diagnostics);
            }
        }

        let name_literal = serde_json::to_string(&scene.name)?;
        code += &substitute(
            SCENE_REGISTRATION_TEMPLATE,
            &[("SCENE_NAME_LITERAL", name_literal.as_str())],
        );

        Ok(CompiledScene {
            code,
            includes: vec!["runtimebehavior.js".to_string()],
            diagnostics,
        })
    }
}
