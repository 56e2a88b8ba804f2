//! Per-target manifest and bootstrap templating
//!
//! Each deployment target fills a closed set of placeholder tokens in
//! static template files shipped with the runtime. Leftover tokens are
//! deliberately ignored so templates can gain optional tokens ahead of
//! the toolchain. The only failures are an unreadable template or an
//! unwritable output file.

use log::warn;
use zephyr_core::{FileSystem, Project, ZephyrError, ZephyrResult};

use crate::exporter::ExportTarget;
use crate::template::substitute;

/// Everything a templater needs from the surrounding export
pub struct TargetEnv<'a> {
    pub fs: &'a dyn FileSystem,
    pub runtime_root: &'a str,
    pub export_dir: &'a str,
    /// JavaScript expression injected as the bootstrap's additional
    /// options ("{}" when empty)
    pub additional_spec: &'a str,
}

/// Completing the manifest/bootstrap files for one target kind
pub trait TargetFiles {
    fn complete(
        &self,
        env: &TargetEnv<'_>,
        project: &Project,
        final_includes: &[String],
    ) -> ZephyrResult<()>;
}

/// Templater for a target kind
pub fn target_files(target: ExportTarget) -> &'static dyn TargetFiles {
    match target {
        ExportTarget::Preview => &PreviewBootstrap,
        ExportTarget::Mobile => &MobileShell,
        ExportTarget::Desktop => &DesktopShell,
        ExportTarget::Social => &SocialManifest,
    }
}

/// Browser preview: a single bootstrap page
pub struct PreviewBootstrap;

impl TargetFiles for PreviewBootstrap {
    fn complete(
        &self,
        env: &TargetEnv<'_>,
        _project: &Project,
        final_includes: &[String],
    ) -> ZephyrResult<()> {
        export_bootstrap_page(env, final_includes)
    }
}

/// Mobile wrapper: platform manifest, package manifest and bootstrap
pub struct MobileShell;

impl TargetFiles for MobileShell {
    fn complete(
        &self,
        env: &TargetEnv<'_>,
        project: &Project,
        final_includes: &[String],
    ) -> ZephyrResult<()> {
        let template = read_template(env, "Mobile/config.xml")?;
        let mut manifest = substitute(
            &template,
            &[
                ("ZEPHYR_PROJECTNAME", &xml_escape(&project.name)),
                ("ZEPHYR_PACKAGENAME", &xml_escape(&project.package_name)),
                ("ZEPHYR_ORIENTATION", &project.orientation),
                ("ZEPHYR_PROJECTVERSION", &project.version),
                ("<!-- ZEPHYR_ICONS_ANDROID -->", &android_icon_tags(project)),
                ("<!-- ZEPHYR_ICONS_IOS -->", &ios_icon_tags(project)),
            ],
        );

        // The ads plugin block only exists when the project opted in.
        if !project.ads_app_id.is_empty() {
            manifest = substitute(
                &manifest,
                &[(
                    "<!-- ZEPHYR_ADS_PLUGIN_AND_APPLICATION_ID -->",
                    &format!(
                        "<plugin name=\"cordova-plugin-admob-free\" spec=\"~0.21.0\">\n\
                         \t\t<variable name=\"ADS_APP_ID\" value=\"{}\" />\n\
                         \t</plugin>",
                        xml_escape(&project.ads_app_id)
                    ),
                )],
            );
        }

        write_output(env, "config.xml", &manifest, "mobile config.xml")?;

        let template = read_template(env, "Mobile/package.json")?;
        let package = substitute(
            &template,
            &[
                ("\"ZEPHYR_GAME_NAME\"", &json_string(&project.name)?),
                ("\"ZEPHYR_GAME_AUTHOR\"", &json_string(&project.author)?),
                ("\"ZEPHYR_GAME_VERSION\"", &json_string(&project.version)?),
                (
                    "\"ZEPHYR_GAME_MANGLED_NAME\"",
                    &json_string(&mangle_package_name(&project.name))?,
                ),
            ],
        );
        write_output(env, "package.json", &package, "mobile package.json")?;

        export_bootstrap_page(env, final_includes)
    }
}

/// Desktop wrapper: bundle manifest, bootstrap script, icon and page
pub struct DesktopShell;

impl TargetFiles for DesktopShell {
    fn complete(
        &self,
        env: &TargetEnv<'_>,
        project: &Project,
        final_includes: &[String],
    ) -> ZephyrResult<()> {
        let template = read_template(env, "Desktop/package.json")?;
        let package = substitute(
            &template,
            &[
                ("\"ZEPHYR_GAME_NAME\"", &json_string(&project.name)?),
                ("\"ZEPHYR_GAME_AUTHOR\"", &json_string(&project.author)?),
                ("\"ZEPHYR_GAME_VERSION\"", &json_string(&project.version)?),
                (
                    "\"ZEPHYR_GAME_MANGLED_NAME\"",
                    &json_string(&mangle_package_name(&project.name))?,
                ),
            ],
        );
        write_output(env, "package.json", &package, "desktop package.json")?;

        let template = read_template(env, "Desktop/main.js")?;
        let bootstrap = substitute(
            &template,
            &[
                (
                    "800 /*ZEPHYR_WINDOW_WIDTH*/",
                    &project.game_resolution_width.to_string(),
                ),
                (
                    "600 /*ZEPHYR_WINDOW_HEIGHT*/",
                    &project.game_resolution_height.to_string(),
                ),
                ("\"ZEPHYR_GAME_NAME\"", &json_string(&project.name)?),
            ],
        );
        write_output(env, "main.js", &bootstrap, "desktop main.js")?;

        // The window icon was copied into the bundle with the other
        // resources; absence is not fatal.
        if let Some(icon_file) = platform_asset_file(project, "desktop", "icon-512") {
            let source = format!("{}/{}", env.export_dir, icon_file);
            env.fs.mk_dir(&format!("{}/buildResources", env.export_dir))?;
            if env.fs.file_exists(&source) {
                env.fs.copy_file(
                    &source,
                    &format!("{}/buildResources/icon.png", env.export_dir),
                )?;
            }
        }

        export_bootstrap_page(env, final_includes)
    }
}

/// Social platform wrapper: app manifest and bootstrap page
pub struct SocialManifest;

impl TargetFiles for SocialManifest {
    fn complete(
        &self,
        env: &TargetEnv<'_>,
        project: &Project,
        final_includes: &[String],
    ) -> ZephyrResult<()> {
        let template = read_template(env, "Social/app-config.json")?;
        let manifest = substitute(
            &template,
            &[(
                "\"ZEPHYR_ORIENTATION\"",
                if project.orientation == "portrait" {
                    "\"PORTRAIT\""
                } else {
                    "\"LANDSCAPE\""
                },
            )],
        );
        write_output(env, "app-config.json", &manifest, "social app-config.json")?;

        export_bootstrap_page(env, final_includes)
    }
}

/// Fill the bootstrap page template and write it into the bundle
fn export_bootstrap_page(env: &TargetEnv<'_>, final_includes: &[String]) -> ZephyrResult<()> {
    let template = read_template(env, "index.html")?;
    let page = complete_index_file(env, &template, final_includes);
    write_output(env, "index.html", &page, "bootstrap page")
}

/// Fill the bootstrap page tokens: generated script tag block, custom
/// style/html placeholders and the additional options expression.
pub fn complete_index_file(
    env: &TargetEnv<'_>,
    template: &str,
    final_includes: &[String],
) -> String {
    let additional_spec = if env.additional_spec.is_empty() {
        "{}"
    } else {
        env.additional_spec
    };

    let mut script_tags = String::new();
    for include in final_includes {
        // Includes are bundle-relative after the copy phase; absolute
        // entries survive for file systems dealing with URLs.
        if !env.fs.is_absolute(include)
            && !env
                .fs
                .file_exists(&format!("{}/{}", env.export_dir, include))
        {
            warn!("could not find {}/{}", env.export_dir, include);
            continue;
        }
        script_tags += &format!(
            "\t<script src=\"{}\" crossorigin=\"anonymous\"></script>\n",
            include
        );
    }

    substitute(
        template,
        &[
            ("/* ZEPHYR_CUSTOM_STYLE */", ""),
            ("<!-- ZEPHYR_CUSTOM_HTML -->", ""),
            ("<!-- ZEPHYR_CODE_FILES -->", &script_tags),
            ("{}/*ZEPHYR_ADDITIONAL_SPEC*/", additional_spec),
        ],
    )
}

const ANDROID_ICON_SIZES: &[(&str, &str)] = &[
    ("36", "ldpi"),
    ("48", "mdpi"),
    ("72", "hdpi"),
    ("96", "xhdpi"),
    ("144", "xxhdpi"),
    ("192", "xxxhdpi"),
];

const IOS_ICON_SIZES: &[&str] = &[
    "180", "60", "120", "76", "152", "40", "80", "57", "114", "72", "144", "167", "29", "58",
    "50", "100",
];

fn platform_asset_file(project: &Project, platform: &str, slot: &str) -> Option<String> {
    let resource_name = project.platform_assets.get(platform, slot)?;
    let file = &project.resource(resource_name)?.file;
    if file.is_empty() {
        None
    } else {
        Some(file.clone())
    }
}

fn android_icon_tags(project: &Project) -> String {
    let mut tags = String::new();
    for (size, density) in ANDROID_ICON_SIZES {
        if let Some(file) =
            platform_asset_file(project, "android", &format!("icon-{}", size))
        {
            tags += &format!(
                "<icon src=\"www/{}\" density=\"{}\" />\n",
                file, density
            );
        }
    }
    tags
}

fn ios_icon_tags(project: &Project) -> String {
    let mut tags = String::new();
    for size in IOS_ICON_SIZES {
        if let Some(file) = platform_asset_file(project, "ios", &format!("icon-{}", size)) {
            tags += &format!(
                "<icon src=\"www/{}\" width=\"{}\" height=\"{}\" />\n",
                file, size, size
            );
        }
    }
    tags
}

fn read_template(env: &TargetEnv<'_>, relative_path: &str) -> ZephyrResult<String> {
    let path = format!("{}/{}", env.runtime_root, relative_path);
    env.fs
        .read_file(&path)
        .map_err(|_| ZephyrError::export(format!("unable to read template file {}", path)))
}

fn write_output(
    env: &TargetEnv<'_>,
    relative_path: &str,
    content: &str,
    description: &str,
) -> ZephyrResult<()> {
    let path = format!("{}/{}", env.export_dir, relative_path);
    env.fs
        .write_file(&path, content)
        .map_err(|_| ZephyrError::export(format!("unable to write {} file", description)))
}

fn json_string(value: &str) -> ZephyrResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Lowercase, dash-separated package-safe form of a project name
pub fn mangle_package_name(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
