//! End-to-end export pipeline tests against a scratch runtime tree

use std::collections::HashMap;

use tempfile::TempDir;
use zephyr_core::{
    BehaviorDescriptor, BehaviorExtension, DiskFileSystem, EventMethod, FileSystem, Project,
    PropertyDescriptor, PropertyType, Resource, Scene,
};

use crate::behavior::MISSING_METHOD_SENTINEL;
use crate::exporter::{ExportOptions, ExportTarget, Exporter};
use crate::scene::BehaviorSceneCompiler;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<style>/* ZEPHYR_CUSTOM_STYLE */</style>
<!-- ZEPHYR_CODE_FILES -->
</head>
<body>
<!-- ZEPHYR_CUSTOM_HTML -->
<script>zephyr.boot({}/*ZEPHYR_ADDITIONAL_SPEC*/);</script>
</body>
</html>
"#;

const MOBILE_CONFIG_TEMPLATE: &str = r#"<?xml version='1.0' encoding='utf-8'?>
<widget id="ZEPHYR_PACKAGENAME" version="ZEPHYR_PROJECTVERSION">
    <name>ZEPHYR_PROJECTNAME</name>
    <preference name="Orientation" value="ZEPHYR_ORIENTATION" />
    <!-- ZEPHYR_ICONS_ANDROID -->
    <!-- ZEPHYR_ICONS_IOS -->
    <!-- ZEPHYR_ADS_PLUGIN_AND_APPLICATION_ID -->
</widget>
"#;

struct Scratch {
    _dir: TempDir,
    root: String,
    fs: DiskFileSystem,
}

impl Scratch {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_string_lossy().replace('\\', "/");
        Self {
            _dir: dir,
            root,
            fs: DiskFileSystem::new(),
        }
    }

    fn runtime_root(&self) -> String {
        format!("{}/runtime", self.root)
    }

    fn export_dir(&self) -> String {
        format!("{}/export", self.root)
    }

    fn code_output_dir(&self) -> String {
        format!("{}/generated", self.root)
    }

    /// Lay out a minimal runtime tree: the bootstrap template plus a
    /// handful of engine include files.
    fn populate_runtime(&self) {
        let runtime = self.runtime_root();
        self.fs
            .write_file(&format!("{}/index.html", runtime), INDEX_TEMPLATE)
            .unwrap();
        for include in [
            "libs/hashtable.js",
            "zephyr.js",
            "runtimeobject.js",
            "runtimebehavior.js",
            "webgl-renderers/webgl-renderer.js",
        ] {
            self.fs
                .write_file(&format!("{}/{}", runtime, include), "// engine")
                .unwrap();
        }
    }

    fn populate_mobile_templates(&self) {
        let runtime = self.runtime_root();
        self.fs
            .write_file(&format!("{}/Mobile/config.xml", runtime), MOBILE_CONFIG_TEMPLATE)
            .unwrap();
        self.fs
            .write_file(
                &format!("{}/Mobile/package.json", runtime),
                "{\"name\": \"ZEPHYR_GAME_MANGLED_NAME\", \"displayName\": \"ZEPHYR_GAME_NAME\", \"version\": \"ZEPHYR_GAME_VERSION\", \"author\": \"ZEPHYR_GAME_AUTHOR\"}",
            )
            .unwrap();
    }
}

fn project_with_behavior() -> Project {
    Project {
        name: "Asteroid Run".to_string(),
        author: "Dev".to_string(),
        first_scene: "Main".to_string(),
        scenes: vec![Scene {
            name: "Main".to_string(),
            events: serde_json::json!([{ "type": "standard" }]),
            ..Default::default()
        }],
        extensions: vec![BehaviorExtension {
            name: "Movement".to_string(),
            behaviors: vec![BehaviorDescriptor {
                name: "Glide".to_string(),
                full_name: "Gliding movement".to_string(),
                properties: vec![PropertyDescriptor::new(
                    "speed",
                    PropertyType::Number,
                    "100",
                )],
                methods: vec![EventMethod::new("onDestroy", "    // cleanup")],
            }],
        }],
        ..Default::default()
    }
}

fn compiler_with_identity_mapping() -> BehaviorSceneCompiler {
    let mut mapping = HashMap::new();
    mapping.insert(
        "Glide".to_string(),
        [("onDestroy".to_string(), "onDestroy".to_string())]
            .into_iter()
            .collect(),
    );
    BehaviorSceneCompiler::new(mapping)
}

#[test]
fn preview_export_produces_a_complete_bundle() {
    let scratch = Scratch::new();
    scratch.populate_runtime();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Preview, scratch.export_dir());

    exporter
        .export(&project_with_behavior(), &compiler_with_identity_mapping(), &options)
        .unwrap();
    assert!(exporter.last_error().is_none());

    let export_dir = scratch.export_dir();

    // Project data and runtime options land in data.js, as the final
    // include.
    let data = scratch
        .fs
        .read_file(&format!("{}/data.js", export_dir))
        .unwrap();
    assert!(data.starts_with("zephyr.projectData = "));
    assert!(data.contains("zephyr.runtimeGameOptions = "));
    assert!(data.contains("\"isPreview\":true"));
    // The splash is disabled and editor data stripped for previews.
    assert!(data.contains("\"showSplash\":false"));
    assert!(!data.contains("\"standard\""));

    // Generated behavior code was copied into the bundle.
    let code = scratch
        .fs
        .read_file(&format!("{}/code0.js", export_dir))
        .unwrap();
    assert!(code.contains("zephyr.registerBehavior(\"Movement::Glide\""));
    assert!(code.contains(r#"Number("100") || 0"#));
    assert!(code.contains("onOwnerRemovedFromScene"));

    // The bootstrap page lists every surviving include, data.js last.
    let page = scratch
        .fs
        .read_file(&format!("{}/index.html", export_dir))
        .unwrap();
    let tag = |name: &str| format!("<script src=\"{}\" crossorigin=\"anonymous\"></script>", name);
    assert!(page.contains(&tag("zephyr.js")));
    assert!(page.contains(&tag("code0.js")));
    assert!(page.contains(&tag("data.js")));
    assert!(page.find(&tag("code0.js")).unwrap() < page.find(&tag("data.js")).unwrap());
    assert!(page.contains("zephyr.boot(zephyr.runtimeGameOptions);"));
    assert!(!page.contains("ZEPHYR_CODE_FILES"));

    // Runtime includes that exist were copied in.
    assert!(scratch
        .fs
        .file_exists(&format!("{}/runtimebehavior.js", export_dir)));
}

#[test]
fn export_succeeds_without_method_name_mapping() {
    let scratch = Scratch::new();
    scratch.populate_runtime();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Preview, scratch.export_dir());

    // No mapping at all: the method degrades to a sentinel call but
    // the export still completes.
    exporter
        .export(
            &project_with_behavior(),
            &BehaviorSceneCompiler::default(),
            &options,
        )
        .unwrap();

    let code = scratch
        .fs
        .read_file(&format!("{}/code0.js", scratch.export_dir()))
        .unwrap();
    assert!(code.contains(MISSING_METHOD_SENTINEL));
}

#[test]
fn resources_are_copied_and_rewritten_to_bundle_names() {
    let scratch = Scratch::new();
    scratch.populate_runtime();

    let project_file = format!("{}/project/game.json", scratch.root);
    scratch
        .fs
        .write_file(&format!("{}/project/assets/hero.png", scratch.root), "png")
        .unwrap();

    let mut project = project_with_behavior();
    project.project_file = project_file;
    project.resources.push(Resource {
        name: "hero".to_string(),
        kind: "image".to_string(),
        file: "assets/hero.png".to_string(),
    });

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Preview, scratch.export_dir());
    exporter
        .export(&project, &compiler_with_identity_mapping(), &options)
        .unwrap();

    assert!(scratch
        .fs
        .file_exists(&format!("{}/hero.png", scratch.export_dir())));
    let data = scratch
        .fs
        .read_file(&format!("{}/data.js", scratch.export_dir()))
        .unwrap();
    assert!(data.contains("\"file\":\"hero.png\""));
    assert!(!data.contains("assets/hero.png"));
}

#[test]
fn blocked_export_directory_fails_and_records_the_error() {
    let scratch = Scratch::new();
    scratch.populate_runtime();

    // A regular file where the export directory should go.
    scratch
        .fs
        .write_file(&scratch.export_dir(), "in the way")
        .unwrap();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Preview, scratch.export_dir());

    let result = exporter.export(
        &project_with_behavior(),
        &compiler_with_identity_mapping(),
        &options,
    );
    assert!(result.is_err());
    let message = exporter.last_error().unwrap();
    assert!(message.contains("unable to create export directory"));
}

#[test]
fn missing_bootstrap_template_fails_and_records_the_error() {
    let scratch = Scratch::new();
    // Runtime tree without index.html.
    scratch
        .fs
        .write_file(
            &format!("{}/zephyr.js", scratch.runtime_root()),
            "// engine",
        )
        .unwrap();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Preview, scratch.export_dir());

    let result = exporter.export(
        &project_with_behavior(),
        &compiler_with_identity_mapping(),
        &options,
    );
    assert!(result.is_err());
    let message = exporter.last_error().unwrap();
    assert!(message.contains("unable to read template file"));

    // A later export clears the recorded error.
    scratch
        .fs
        .write_file(
            &format!("{}/index.html", scratch.runtime_root()),
            INDEX_TEMPLATE,
        )
        .unwrap();
    exporter
        .export(
            &project_with_behavior(),
            &compiler_with_identity_mapping(),
            &options,
        )
        .unwrap();
    assert!(exporter.last_error().is_none());
}

#[test]
fn mobile_export_fills_the_wrapper_manifest() {
    let scratch = Scratch::new();
    scratch.populate_runtime();
    scratch.populate_mobile_templates();

    let mut project = project_with_behavior();
    project.package_name = "com.example.asteroidrun".to_string();
    project.version = "2.1.0".to_string();
    project.orientation = "landscape".to_string();
    project.ads_app_id = "ca-app-pub-42".to_string();
    project.platform_assets.set("ios", "icon-180", "icon180");
    project.platform_assets.set("android", "icon-48", "icon48");
    project.resources.push(Resource {
        name: "icon180".to_string(),
        kind: "image".to_string(),
        file: "icon180.png".to_string(),
    });
    project.resources.push(Resource {
        name: "icon48".to_string(),
        kind: "image".to_string(),
        file: "icon48.png".to_string(),
    });

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Mobile, scratch.export_dir());
    exporter
        .export(&project, &compiler_with_identity_mapping(), &options)
        .unwrap();

    let config = scratch
        .fs
        .read_file(&format!("{}/config.xml", scratch.export_dir()))
        .unwrap();
    assert!(config.contains("<widget id=\"com.example.asteroidrun\" version=\"2.1.0\">"));
    assert!(config.contains("<name>Asteroid Run</name>"));
    assert!(config.contains("value=\"landscape\""));
    assert!(config.contains("<icon src=\"www/icon48.png\" density=\"mdpi\" />"));
    assert!(config.contains("<icon src=\"www/icon180.png\" width=\"180\" height=\"180\" />"));
    // The ads plugin block only appears when an app id is set.
    assert!(config.contains("cordova-plugin-admob-free"));
    assert!(config.contains("value=\"ca-app-pub-42\""));

    let package = scratch
        .fs
        .read_file(&format!("{}/package.json", scratch.export_dir()))
        .unwrap();
    assert!(package.contains("\"name\": \"asteroid-run\""));
    assert!(package.contains("\"displayName\": \"Asteroid Run\""));
    assert!(package.contains("\"version\": \"2.1.0\""));
}

#[test]
fn mobile_manifest_omits_the_ads_plugin_without_an_app_id() {
    let scratch = Scratch::new();
    scratch.populate_runtime();
    scratch.populate_mobile_templates();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );
    let options = ExportOptions::new(ExportTarget::Mobile, scratch.export_dir());
    exporter
        .export(&project_with_behavior(), &compiler_with_identity_mapping(), &options)
        .unwrap();

    let config = scratch
        .fs
        .read_file(&format!("{}/config.xml", scratch.export_dir()))
        .unwrap();
    assert!(!config.contains("cordova-plugin-admob-free"));
}

#[test]
fn social_manifest_maps_the_orientation() {
    let scratch = Scratch::new();
    scratch.populate_runtime();
    scratch
        .fs
        .write_file(
            &format!("{}/Social/app-config.json", scratch.runtime_root()),
            "{\"orientation\": \"ZEPHYR_ORIENTATION\"}",
        )
        .unwrap();

    let mut exporter = Exporter::new(
        &scratch.fs,
        scratch.runtime_root(),
        scratch.code_output_dir(),
    );

    let mut project = project_with_behavior();
    project.orientation = "portrait".to_string();
    let options = ExportOptions::new(ExportTarget::Social, scratch.export_dir());
    exporter
        .export(&project, &compiler_with_identity_mapping(), &options)
        .unwrap();
    let manifest = scratch
        .fs
        .read_file(&format!("{}/app-config.json", scratch.export_dir()))
        .unwrap();
    assert!(manifest.contains("\"orientation\": \"PORTRAIT\""));

    // Every non-portrait orientation, "default" included, maps to
    // landscape.
    project.orientation = "default".to_string();
    let wide_dir = format!("{}/export-wide", scratch.root);
    let options = ExportOptions::new(ExportTarget::Social, wide_dir.clone());
    exporter
        .export(&project, &compiler_with_identity_mapping(), &options)
        .unwrap();
    let manifest = scratch
        .fs
        .read_file(&format!("{}/app-config.json", wide_dir))
        .unwrap();
    assert!(manifest.contains("\"orientation\": \"LANDSCAPE\""));
}

#[test]
fn desktop_export_fills_the_shell_manifests() {
    let scratch = Scratch::new();
    scratch.populate_runtime();
    let runtime = scratch.runtime_root();
    scratch
        .fs
        .write_file(
            &format!("{}/Desktop/package.json", runtime),
            "{\"name\": \"ZEPHYR_GAME_MANGLED_NAME\", \"productName\": \"ZEPHYR_GAME_NAME\", \"version\": \"ZEPHYR_GAME_VERSION\", \"author\": \"ZEPHYR_GAME_AUTHOR\"}",
        )
        .unwrap();
    scratch
        .fs
        .write_file(
            &format!("{}/Desktop/main.js", runtime),
            "createWindow(800 /*ZEPHYR_WINDOW_WIDTH*/, 600 /*ZEPHYR_WINDOW_HEIGHT*/, \"ZEPHYR_GAME_NAME\");",
        )
        .unwrap();

    let mut project = project_with_behavior();
    project.game_resolution_width = 1280;
    project.game_resolution_height = 720;

    let mut exporter = Exporter::new(&scratch.fs, runtime, scratch.code_output_dir());
    let options = ExportOptions::new(ExportTarget::Desktop, scratch.export_dir());
    exporter
        .export(&project, &compiler_with_identity_mapping(), &options)
        .unwrap();

    let package = scratch
        .fs
        .read_file(&format!("{}/package.json", scratch.export_dir()))
        .unwrap();
    assert!(package.contains("\"name\": \"asteroid-run\""));
    assert!(package.contains("\"productName\": \"Asteroid Run\""));

    let main = scratch
        .fs
        .read_file(&format!("{}/main.js", scratch.export_dir()))
        .unwrap();
    assert_eq!(main, "createWindow(1280, 720, \"Asteroid Run\");");

    // Desktop bundles ship without the debugger bridge or preview flag.
    let data = scratch
        .fs
        .read_file(&format!("{}/data.js", scratch.export_dir()))
        .unwrap();
    assert!(data.contains("\"isPreview\":false"));
    let page = scratch
        .fs
        .read_file(&format!("{}/index.html", scratch.export_dir()))
        .unwrap();
    assert!(!page.contains("debugger-client"));
}
