//! Runtime include resolution
//!
//! An include identifier names one runtime dependency unit, as a path
//! relative to the runtime root (or an absolute path for generated
//! files). Insertion order is load order: an include needed by a later
//! stage must already be in the list, and re-inserting an existing
//! identifier is a no-op. Resolution is a pure function of the flags
//! passed and prior state; missing files are only detected later, at
//! copy time.

use serde::{Deserialize, Serialize};

/// Rendering backend whose asset set a bundle ships.
///
/// A bundle carries at most one backend's includes; mixing two
/// backends' assets in one context is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    WebGl,
    Canvas,
}

impl RendererBackend {
    pub const ALL: [RendererBackend; 2] = [RendererBackend::WebGl, RendererBackend::Canvas];

    /// Substring markers identifying this backend's assets
    fn markers(self) -> [&'static str; 2] {
        match self {
            RendererBackend::WebGl => ["webgl-renderer", "webgl-filter"],
            RendererBackend::Canvas => ["canvas-renderer", "canvas-shader"],
        }
    }
}

const ENGINE_CORE_INCLUDES: &[&str] = &[
    "libs/hashtable.js",
    "zephyr.js",
    "zephyr-splash-image.js",
    "libs/hshg.js",
    "libs/rbush.js",
    "inputmanager.js",
    "jsonmanager.js",
    "timemanager.js",
    "runtimeobject.js",
    "profiler.js",
    "runtimescene.js",
    "scenestack.js",
    "polygon.js",
    "force.js",
    "layer.js",
    "timer.js",
    "runtimegame.js",
    "variable.js",
    "variablescontainer.js",
    "oncetriggers.js",
    "runtimebehavior.js",
    "spriteruntimeobject.js",
];

const EVENT_TOOLING_INCLUDES: &[&str] = &[
    "events-tools/commontools.js",
    "events-tools/runtimescenetools.js",
    "events-tools/inputtools.js",
    "events-tools/objecttools.js",
    "events-tools/cameratools.js",
    "events-tools/soundtools.js",
    "events-tools/storagetools.js",
    "events-tools/stringtools.js",
    "events-tools/windowtools.js",
    "events-tools/networktools.js",
];

const DEBUGGER_BRIDGE_INCLUDES: &[&str] = &[
    "debugger-client/hot-reloader.js",
    "debugger-client/debugger-client.js",
];

const WEBGL_INCLUDES: &[&str] = &[
    "webgl-renderers/webgl-renderer.js",
    "webgl-renderers/webgl-filters-tools.js",
    "webgl-renderers/runtimegame-webgl-renderer.js",
    "webgl-renderers/runtimescene-webgl-renderer.js",
    "webgl-renderers/layer-webgl-renderer.js",
    "webgl-renderers/webgl-image-manager.js",
    "webgl-renderers/spriteruntimeobject-webgl-renderer.js",
    "webgl-renderers/loadingscreen-webgl-renderer.js",
    "howler-sound-manager/howler.min.js",
    "howler-sound-manager/howler-sound-manager.js",
    "fontfaceobserver-font-manager/fontfaceobserver.js",
    "fontfaceobserver-font-manager/fontfaceobserver-font-manager.js",
];

const CANVAS_INCLUDES: &[&str] = &[
    "canvas-renderers/canvas-renderer.js",
    "canvas-renderers/canvas-tools.js",
    "canvas-renderers/runtimegame-canvas-renderer.js",
    "canvas-renderers/runtimescene-canvas-renderer.js",
    "canvas-renderers/layer-canvas-renderer.js",
    "canvas-renderers/canvas-image-manager.js",
    "canvas-renderers/spriteruntimeobject-canvas-renderer.js",
    "canvas-renderers/loadingscreen-canvas-renderer.js",
    "canvas-sound-manager/canvas-sound-manager.js",
    "fontfaceobserver-font-manager/fontfaceobserver.js",
    "fontfaceobserver-font-manager/fontfaceobserver-font-manager.js",
];

/// Ordered-unique sequence of include identifiers
#[derive(Debug, Clone, Default)]
pub struct IncludeList {
    entries: Vec<String>,
}

impl IncludeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an identifier unless it is already present
    pub fn insert<S: Into<String>>(&mut self, include: S) {
        let include = include.into();
        if !self.entries.contains(&include) {
            self.entries.push(include);
        }
    }

    pub fn extend<I, S>(&mut self, includes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for include in includes {
            self.insert(include);
        }
    }

    pub fn contains(&self, include: &str) -> bool {
        self.entries.iter().any(|entry| entry == include)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Append the baseline dependency set, in canonical order: engine
    /// core, event tooling, then conditionally the debugger bridge and
    /// one renderer backend's asset set.
    pub fn add_baseline(&mut self, renderer: Option<RendererBackend>, debugger_bridge: bool) {
        self.extend(ENGINE_CORE_INCLUDES.iter().copied());
        self.extend(EVENT_TOOLING_INCLUDES.iter().copied());

        if debugger_bridge {
            self.extend(DEBUGGER_BRIDGE_INCLUDES.iter().copied());
        }

        match renderer {
            Some(RendererBackend::WebGl) => self.extend(WEBGL_INCLUDES.iter().copied()),
            Some(RendererBackend::Canvas) => self.extend(CANVAS_INCLUDES.iter().copied()),
            None => {}
        }
    }

    /// Strip every identifier belonging to one of the given backends,
    /// preserving the relative order of survivors. Used to
    /// de-contaminate a bundle of backend assets picked up before the
    /// final target was known.
    pub fn remove_backend_includes(&mut self, backends: &[RendererBackend]) {
        for backend in backends {
            let markers = backend.markers();
            self.entries
                .retain(|entry| !markers.iter().any(|marker| entry.contains(marker)));
        }
    }
}

impl<'a> IntoIterator for &'a IncludeList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
