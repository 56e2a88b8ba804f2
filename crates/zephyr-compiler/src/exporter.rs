//! Export assembly pipeline
//!
//! Sequences resource export, per-scene code generation, include
//! resolution, project data serialization and target file templating
//! into one deployable directory tree. Single-threaded and
//! synchronous: one export runs start to finish against its output
//! directory, and a failing step aborts immediately, leaving partial
//! output in place (re-running from scratch is the recovery path).

use std::collections::HashMap;

use log::warn;
use zephyr_core::{FileSystem, Project, Resource, ZephyrError, ZephyrResult};

use crate::includes::{IncludeList, RendererBackend};
use crate::options::{RuntimeGameOptions, ScriptFile};
use crate::scene::SceneCompiler;
use crate::targets::{target_files, TargetEnv};

/// One deployment target kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// Embedded web preview with the debugger bridge
    Preview,
    /// Mobile wrapper (manifest + bootstrap)
    Mobile,
    /// Desktop wrapper (bundle manifest + bootstrap)
    Desktop,
    /// Social platform wrapper (app manifest)
    Social,
}

impl ExportTarget {
    pub fn name(self) -> &'static str {
        match self {
            ExportTarget::Preview => "preview",
            ExportTarget::Mobile => "mobile",
            ExportTarget::Desktop => "desktop",
            ExportTarget::Social => "social",
        }
    }
}

/// Options for one export invocation
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub target: ExportTarget,
    pub export_path: String,
    pub renderer: RendererBackend,
    /// Scene to start on; the project's own first scene when `None`
    pub first_scene: Option<String>,
    /// External layout injected into the first scene at load
    pub external_layout: Option<String>,
    /// Caller-recorded content hashes for include files, consumed by
    /// the preview hot-reloader
    pub include_file_hashes: HashMap<String, u64>,
}

impl ExportOptions {
    pub fn new<P: Into<String>>(target: ExportTarget, export_path: P) -> Self {
        Self {
            target,
            export_path: export_path.into(),
            renderer: RendererBackend::WebGl,
            first_scene: None,
            external_layout: None,
            include_file_hashes: HashMap::new(),
        }
    }
}

/// One export invocation's accumulated state
struct ExportContext {
    project: Project,
    target: ExportTarget,
    renderer: RendererBackend,
    export_dir: String,
    includes: IncludeList,
}

/// Drives a whole-project export against an abstract file system.
///
/// Holds the runtime root (where engine include files and target
/// templates live) and the directory generated code files are written
/// to before being copied into the bundle.
pub struct Exporter<'a> {
    fs: &'a dyn FileSystem,
    runtime_root: String,
    code_output_dir: String,
    last_error: Option<String>,
}

impl<'a> Exporter<'a> {
    pub fn new<R, C>(fs: &'a dyn FileSystem, runtime_root: R, code_output_dir: C) -> Self
    where
        R: Into<String>,
        C: Into<String>,
    {
        Self {
            fs,
            runtime_root: runtime_root.into(),
            code_output_dir: code_output_dir.into(),
            last_error: None,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs
    }

    pub fn runtime_root(&self) -> &str {
        &self.runtime_root
    }

    /// Message of the step that failed the last export, if any.
    /// Cleared at the start of every export.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Export `project` as a deployable bundle for the chosen target.
    ///
    /// On failure the error is also recorded on the exporter
    /// ([`Self::last_error`]) and the partially populated output
    /// directory is left as is.
    pub fn export(
        &mut self,
        project: &Project,
        scene_compiler: &dyn SceneCompiler,
        options: &ExportOptions,
    ) -> ZephyrResult<()> {
        self.last_error = None;
        let result = self.run_export(project, scene_compiler, options);
        if let Err(error) = &result {
            let message = error.to_string();
            log::error!("export for {} failed: {}", options.target.name(), message);
            self.last_error = Some(message);
        }
        result
    }

    fn run_export(
        &self,
        project: &Project,
        scene_compiler: &dyn SceneCompiler,
        options: &ExportOptions,
    ) -> ZephyrResult<()> {
        let is_preview = options.target == ExportTarget::Preview;

        self.fs.mk_dir(&options.export_path).map_err(|error| {
            ZephyrError::export_for_target(
                format!("unable to create export directory {}: {}", options.export_path, error),
                options.target.name(),
            )
        })?;
        self.fs.clear_dir(&options.export_path)?;

        let mut context = ExportContext {
            project: project.clone(),
            target: options.target,
            renderer: options.renderer,
            export_dir: options.export_path.clone(),
            includes: IncludeList::new(),
        };

        // Always disable the splash for preview.
        if is_preview {
            context.project.loading_screen.show_splash = false;
        }

        // Export resources before generating code: generation relies
        // on the rewritten resource file names.
        self.export_resources(&mut context)?;
        self.add_legacy_font_resources(&mut context)?;

        context
            .includes
            .add_baseline(Some(context.renderer), is_preview);

        // Effects register themselves against the engine, so their
        // includes come after the engine libraries.
        add_effect_includes(&context.project, &mut context.includes);

        self.export_scene_code(&mut context, scene_compiler, !is_preview)?;
        self.export_external_source_files(&mut context)?;

        // Strip after code generation: the generators may still read
        // the data being stripped.
        context.project.strip_for_export();
        if let Some(first_scene) = &options.first_scene {
            context.project.first_scene = first_scene.clone();
        }

        // Drop assets of every backend the bundle does not ship,
        // before the script file list is recorded for hot reload.
        let stale_backends: Vec<RendererBackend> = RendererBackend::ALL
            .into_iter()
            .filter(|backend| *backend != context.renderer)
            .collect();
        context.includes.remove_backend_includes(&stale_backends);

        let script_files = context
            .includes
            .iter()
            .map(|include| ScriptFile {
                path: include.to_string(),
                hash: options
                    .include_file_hashes
                    .get(include)
                    .copied()
                    .unwrap_or(0),
            })
            .collect();
        let runtime_game_options =
            RuntimeGameOptions::new(is_preview, options.external_layout.clone(), script_files);

        let data_file = format!("{}/data.js", self.code_output_dir);
        self.export_project_data(&context.project, &data_file, &runtime_game_options)?;
        context.includes.insert(data_file);

        let final_includes = self.export_includes(&context)?;

        let env = TargetEnv {
            fs: self.fs,
            runtime_root: &self.runtime_root,
            export_dir: &context.export_dir,
            additional_spec: "zephyr.runtimeGameOptions",
        };
        target_files(context.target).complete(&env, &context.project, &final_includes)?;

        Ok(())
    }

    /// Copy every referenced resource into the bundle root, rewriting
    /// the recorded file to its bundle-relative name. A missing
    /// resource file is a warning: resolving resource content is not
    /// this pipeline's job.
    fn export_resources(&self, context: &mut ExportContext) -> ZephyrResult<()> {
        let project_dir = self.fs.dir_name_from(&context.project.project_file);
        for resource in &mut context.project.resources {
            if resource.file.is_empty() {
                continue;
            }
            let source = self.fs.make_absolute(&resource.file, &project_dir);
            let file_name = self.fs.file_name_from(&source);
            if !self.fs.file_exists(&source) {
                warn!("could not find resource file {}", source);
                continue;
            }
            self.fs
                .copy_file(&source, &format!("{}/{}", context.export_dir, file_name))?;
            resource.file = file_name;
        }
        Ok(())
    }

    /// Register a font resource for every .TTF file already copied
    /// into the bundle, named after its relative path. Projects
    /// authored before font resources existed declare fonts as bare
    /// file names; existing resource names win.
    fn add_legacy_font_resources(&self, context: &mut ExportContext) -> ZephyrResult<()> {
        let font_files = self.fs.read_dir(&context.export_dir, ".TTF")?;
        for font_file in font_files {
            context.project.add_resource_if_absent(Resource {
                name: font_file.clone(),
                kind: "font".to_string(),
                file: font_file,
            });
        }
        Ok(())
    }

    /// Run the external scene compiler for every scene, merging the
    /// includes it reports and recording each generated file as an
    /// additional include.
    fn export_scene_code(
        &self,
        context: &mut ExportContext,
        scene_compiler: &dyn SceneCompiler,
        for_runtime: bool,
    ) -> ZephyrResult<()> {
        self.fs.mk_dir(&self.code_output_dir)?;

        for (index, scene) in context.project.scenes.iter().enumerate() {
            let compiled = scene_compiler.generate_scene_complete_code(
                &context.project,
                scene,
                for_runtime,
            )?;
            for diagnostic in &compiled.diagnostics {
                warn!("scene '{}': {}", scene.name, diagnostic);
            }

            let file_name = format!("{}/code{}.js", self.code_output_dir, index);
            self.fs.write_file(&file_name, &compiled.code).map_err(|_| {
                ZephyrError::export(format!("unable to write {}", file_name))
            })?;

            context.includes.extend(compiled.includes);
            context.includes.insert(file_name);
        }

        Ok(())
    }

    /// Copy the project's own JavaScript source files next to the
    /// generated code, renamed deterministically by position index.
    fn export_external_source_files(&self, context: &mut ExportContext) -> ZephyrResult<()> {
        let project_dir = self.fs.dir_name_from(&context.project.project_file);
        for (index, source_file) in context.project.source_files.iter().enumerate() {
            if !source_file.language.eq_ignore_ascii_case("javascript") {
                continue;
            }

            let source = self.fs.make_absolute(&source_file.file_name, &project_dir);
            let out_file = format!("{}/ext-code{}.js", self.code_output_dir, index);
            if self.fs.copy_file(&source, &out_file).is_err() {
                warn!("could not copy external source file {}", source);
            }
            context.includes.insert(out_file);
        }
        Ok(())
    }

    /// Serialize the project snapshot and the runtime game options to
    /// one data file, assigned to the two well-known globals the
    /// bootstrap reads.
    fn export_project_data(
        &self,
        project: &Project,
        file_name: &str,
        runtime_game_options: &RuntimeGameOptions,
    ) -> ZephyrResult<()> {
        let dir_name = self.fs.dir_name_from(file_name);
        if !dir_name.is_empty() {
            self.fs.mk_dir(&dir_name)?;
        }

        let output = format!(
            "zephyr.projectData = {};\nzephyr.runtimeGameOptions = {};\n",
            serde_json::to_string(project)?,
            serde_json::to_string(runtime_game_options)?,
        );

        self.fs
            .write_file(file_name, &output)
            .map_err(|_| ZephyrError::export(format!("unable to write {}", file_name)))
    }

    /// Physically copy every resolved include into the bundle,
    /// returning the list rewritten relative to the bundle root.
    /// A missing include file is skipped with a warning: a bundle can
    /// legitimately proceed without optional includes.
    fn export_includes(&self, context: &ExportContext) -> ZephyrResult<Vec<String>> {
        let mut final_includes = Vec::with_capacity(context.includes.len());

        for include in context.includes.iter() {
            if self.fs.is_absolute(include) {
                // Generated code and data files land here: they were
                // written to the code output directory and only their
                // file name is meaningful inside the bundle.
                if self.fs.file_exists(include) {
                    let file_name = self.fs.file_name_from(include);
                    self.fs
                        .copy_file(include, &format!("{}/{}", context.export_dir, file_name))?;
                    final_includes.push(file_name);
                } else {
                    warn!("could not find include file {}", include);
                    final_includes.push(include.to_string());
                }
            } else {
                let source = format!("{}/{}", self.runtime_root, include);
                if self.fs.file_exists(&source) {
                    self.fs
                        .copy_file(&source, &format!("{}/{}", context.export_dir, include))?;
                } else {
                    warn!("could not find runtime include file {}", include);
                }
                final_includes.push(include.to_string());
            }
        }

        Ok(final_includes)
    }
}

/// Resolve the filter includes required by the scenes' layer effects.
/// Effect assets carry the renderer filter marker, so a later backend
/// strip removes them along with the rest of the backend set.
fn add_effect_includes(project: &Project, includes: &mut IncludeList) {
    for scene in &project.scenes {
        for layer in &scene.layers {
            for effect in &layer.effects {
                if effect.effect_type.is_empty() {
                    continue;
                }
                includes.insert(format!(
                    "webgl-filters/{}-filter.js",
                    effect.effect_type.to_ascii_lowercase()
                ));
            }
        }
    }
}
