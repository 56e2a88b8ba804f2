//! Command-line interface for the Zephyr export toolchain

use std::collections::HashMap;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use zephyr_compiler::{
    BehaviorSceneCompiler, ExportOptions, ExportTarget, Exporter, RendererBackend,
};
use zephyr_core::{DiskFileSystem, FileSystem, Project, ZephyrError, ZephyrResult};

#[derive(Parser)]
#[command(name = "zephyr")]
#[command(about = "Export toolchain for Zephyr game projects")]
#[command(version)]
#[command(
    long_about = "Compiles behavior definitions to JavaScript and assembles deployable bundles for the preview, mobile, desktop and social targets"
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (suppress non-error output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a project as a deployable bundle
    Export {
        /// Path of the project JSON file
        #[arg(long)]
        project: String,
        /// Output directory for the bundle
        #[arg(long)]
        out: String,
        /// Deployment target
        #[arg(long, value_enum, default_value = "preview")]
        target: TargetKind,
        /// Rendering backend to ship
        #[arg(long, value_enum, default_value = "webgl")]
        renderer: RendererKind,
        /// Scene to start on (defaults to the project's first scene)
        #[arg(long)]
        scene: Option<String>,
        /// External layout injected into the first scene at load
        #[arg(long)]
        external_layout: Option<String>,
        /// Directory holding the engine runtime files and target templates
        #[arg(long, default_value = "runtime")]
        runtime_root: String,
        /// Directory generated code is written to before bundling
        #[arg(long, default_value = "zephyr-generated")]
        code_out: String,
    },
    /// Validate a project file without exporting
    Check {
        /// Path of the project JSON file
        #[arg(long)]
        project: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetKind {
    Preview,
    Mobile,
    Desktop,
    Social,
}

impl From<TargetKind> for ExportTarget {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Preview => ExportTarget::Preview,
            TargetKind::Mobile => ExportTarget::Mobile,
            TargetKind::Desktop => ExportTarget::Desktop,
            TargetKind::Social => ExportTarget::Social,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RendererKind {
    Webgl,
    Canvas,
}

impl From<RendererKind> for RendererBackend {
    fn from(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Webgl => RendererBackend::WebGl,
            RendererKind::Canvas => RendererBackend::Canvas,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Commands::Export {
            project,
            out,
            target,
            renderer,
            scene,
            external_layout,
            runtime_root,
            code_out,
        } => handle_export_command(
            project,
            out,
            target.into(),
            renderer.into(),
            scene,
            external_layout,
            runtime_root,
            code_out,
        )?,
        Commands::Check { project } => handle_check_command(project)?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();
}

#[allow(clippy::too_many_arguments)]
fn handle_export_command(
    project_path: String,
    out: String,
    target: ExportTarget,
    renderer: RendererBackend,
    scene: Option<String>,
    external_layout: Option<String>,
    runtime_root: String,
    code_out: String,
) -> ZephyrResult<()> {
    let fs = DiskFileSystem::new();
    let mut project = load_project(&fs, &project_path)?;
    project.project_file = project_path;

    // Generated code files are told apart from runtime includes by
    // being absolute paths.
    let cwd = std::env::current_dir()?.to_string_lossy().replace('\\', "/");
    let code_out = fs.make_absolute(&code_out, &cwd);

    info!(
        "exporting '{}' for {} to {}",
        project.name,
        target.name(),
        out
    );

    let scene_compiler = BehaviorSceneCompiler::new(identity_method_mapping(&project));

    let mut exporter = Exporter::new(&fs, runtime_root, code_out);
    let mut options = ExportOptions::new(target, out.clone());
    options.renderer = renderer;
    options.first_scene = scene;
    options.external_layout = external_layout;

    match exporter.export(&project, &scene_compiler, &options) {
        Ok(()) => {
            println!("Export completed: {}", out);
            Ok(())
        }
        Err(err) => {
            error!("export failed: {}", err);
            Err(err)
        }
    }
}

fn handle_check_command(project_path: String) -> ZephyrResult<()> {
    let fs = DiskFileSystem::new();
    let project = load_project(&fs, &project_path)?;

    let mut behavior_count = 0;
    for extension in &project.extensions {
        behavior_count += extension.behaviors.len();
    }

    println!(
        "Project '{}' is valid ({} scene(s), {} behavior(s))",
        project.name,
        project.scenes.len(),
        behavior_count
    );
    Ok(())
}

fn load_project(fs: &DiskFileSystem, path: &str) -> ZephyrResult<Project> {
    let content = fs
        .read_file(path)
        .map_err(|_| ZephyrError::project(format!("unable to read project file {}", path)))?;
    Project::from_json(&content)
}

/// Method implementation names normally come from the event compiler's
/// mangling pass. The standalone tool maps every declared method to
/// itself, which matches definitions authored directly in JavaScript.
fn identity_method_mapping(project: &Project) -> HashMap<String, HashMap<String, String>> {
    let mut mapping = HashMap::new();
    for extension in &project.extensions {
        for behavior in &extension.behaviors {
            let methods = behavior
                .methods
                .iter()
                .map(|method| (method.name.clone(), method.name.clone()))
                .collect();
            mapping.insert(behavior.name.clone(), methods);
        }
    }
    mapping
}
