//! Configuration Resolver
//!
//! Layers a named preset under the user's [`PluginOptions`], then validates
//! and clamps the result into an immutable [`EffectiveConfig`]. Nothing here
//! fails: bad values are replaced by safe ones and a warning is logged.

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::callbacks::{
    AttributeTransformer, CallbackError, CompleteHook, CustomAttributeProvider, TagPredicate,
    TransformHook,
};
use crate::context::ElementContext;
use crate::path_filter::{self, CompiledPattern};
use crate::stats::{self, FileTransformInfo, RunStatistics};

pub const DEFAULT_PREFIX: &str = "data-dev";
pub const MAX_DEPTH_CEILING: i64 = 50;

/// Built-in attribute keys in emission order.
pub const BUILTIN_ATTRIBUTES: [&str; 8] = [
    "id",
    "name",
    "path",
    "line",
    "file",
    "component",
    "metadata",
    "sourcemap",
];

lazy_static! {
    static ref PREFIX_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_:.-]*$").unwrap();

    /// react-three-fiber intrinsic elements; they render to a canvas, not the DOM.
    pub static ref DEFAULT_CUSTOM_EXCLUDES: Vec<&'static str> = vec![
        "mesh",
        "group",
        "scene",
        "primitive",
        "ambientLight",
        "pointLight",
        "directionalLight",
        "spotLight",
        "hemisphereLight",
        "perspectiveCamera",
        "orthographicCamera",
        "boxGeometry",
        "sphereGeometry",
        "planeGeometry",
        "cylinderGeometry",
        "bufferGeometry",
        "meshBasicMaterial",
        "meshStandardMaterial",
        "meshPhongMaterial",
        "meshLambertMaterial",
        "points",
        "line",
        "lineSegments",
        "instancedMesh",
        "sprite",
        "fog",
        "color",
    ];
}

// ═══════════════════════════════════════════════════════════════════════════════
// USER OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataEncoding {
    #[default]
    Json,
    Base64,
    None,
}

/// Options as supplied by the user. `None` means "not supplied".
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    pub enabled: Option<bool>,
    pub debug: Option<bool>,
    pub extensions: Option<Vec<String>>,
    pub attribute_prefix: Option<String>,
    pub exclude_elements: Option<Vec<String>>,
    pub custom_excludes: Option<Vec<String>>,
    pub include_props: Option<bool>,
    pub include_content: Option<bool>,
    pub include_attributes: Option<Vec<String>>,
    pub exclude_attributes: Option<Vec<String>>,
    pub include_paths: Option<Vec<String>>,
    pub exclude_paths: Option<Vec<String>>,
    pub metadata_encoding: Option<MetadataEncoding>,
    pub min_depth: Option<i64>,
    pub max_depth: Option<i64>,
    pub tag_only_roots: Option<bool>,
    pub export_stats: Option<String>,
    pub preset: Option<String>,
    pub include_source_map: Option<bool>,
    pub group_attributes: Option<bool>,
    pub root: Option<PathBuf>,

    #[serde(skip)]
    pub transformers: Option<HashMap<String, AttributeTransformer>>,
    #[serde(skip)]
    pub should_tag: Option<TagPredicate>,
    #[serde(skip)]
    pub custom_attributes: Option<CustomAttributeProvider>,
    #[serde(skip)]
    pub on_transform: Option<TransformHook>,
    #[serde(skip)]
    pub on_complete: Option<CompleteHook>,
}

impl PluginOptions {
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_transformer<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> Result<serde_json::Value, CallbackError> + Send + Sync + 'static,
    {
        self.transformers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), Arc::new(f));
        self
    }

    pub fn with_should_tag<F>(mut self, f: F) -> Self
    where
        F: Fn(&ElementContext) -> Result<bool, CallbackError> + Send + Sync + 'static,
    {
        self.should_tag = Some(Arc::new(f));
        self
    }

    pub fn with_custom_attributes<F>(mut self, f: F) -> Self
    where
        F: Fn(&ElementContext) -> Result<Vec<(String, serde_json::Value)>, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        self.custom_attributes = Some(Arc::new(f));
        self
    }

    pub fn with_on_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileTransformInfo) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.on_transform = Some(Arc::new(f));
        self
    }

    pub fn with_on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunStatistics) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(f));
        self
    }

    /// Values supplied here win; anything left `None` falls back to `base`.
    /// Transformer maps merge key by key.
    pub(crate) fn layered_over(self, base: PluginOptions) -> PluginOptions {
        let transformers = match (base.transformers, self.transformers) {
            (None, None) => None,
            (base_t, user_t) => {
                let mut merged = base_t.unwrap_or_default();
                merged.extend(user_t.unwrap_or_default());
                Some(merged)
            }
        };

        PluginOptions {
            enabled: self.enabled.or(base.enabled),
            debug: self.debug.or(base.debug),
            extensions: self.extensions.or(base.extensions),
            attribute_prefix: self.attribute_prefix.or(base.attribute_prefix),
            exclude_elements: self.exclude_elements.or(base.exclude_elements),
            custom_excludes: self.custom_excludes.or(base.custom_excludes),
            include_props: self.include_props.or(base.include_props),
            include_content: self.include_content.or(base.include_content),
            include_attributes: self.include_attributes.or(base.include_attributes),
            exclude_attributes: self.exclude_attributes.or(base.exclude_attributes),
            include_paths: self.include_paths.or(base.include_paths),
            exclude_paths: self.exclude_paths.or(base.exclude_paths),
            metadata_encoding: self.metadata_encoding.or(base.metadata_encoding),
            min_depth: self.min_depth.or(base.min_depth),
            max_depth: self.max_depth.or(base.max_depth),
            tag_only_roots: self.tag_only_roots.or(base.tag_only_roots),
            export_stats: self.export_stats.or(base.export_stats),
            preset: self.preset.or(base.preset),
            include_source_map: self.include_source_map.or(base.include_source_map),
            group_attributes: self.group_attributes.or(base.group_attributes),
            root: self.root.or(base.root),
            transformers,
            should_tag: self.should_tag.or(base.should_tag),
            custom_attributes: self.custom_attributes.or(base.custom_attributes),
            on_transform: self.on_transform.or(base.on_transform),
            on_complete: self.on_complete.or(base.on_complete),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRESETS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Minimal,
    Testing,
    Debugging,
    Production,
}

impl Preset {
    pub fn from_name(name: &str) -> Option<Preset> {
        match name {
            "minimal" => Some(Preset::Minimal),
            "testing" => Some(Preset::Testing),
            "debugging" => Some(Preset::Debugging),
            "production" => Some(Preset::Production),
            _ => None,
        }
    }

    pub fn options(self) -> PluginOptions {
        let list = |items: &[&str]| Some(items.iter().map(|s| s.to_string()).collect());
        match self {
            Preset::Minimal => PluginOptions {
                include_attributes: list(&["id"]),
                ..Default::default()
            },
            Preset::Testing => PluginOptions {
                include_attributes: list(&["id", "name", "component"]),
                include_props: Some(false),
                include_content: Some(false),
                ..Default::default()
            },
            Preset::Debugging => PluginOptions {
                include_props: Some(true),
                include_content: Some(true),
                include_source_map: Some(true),
                debug: Some(true),
                ..Default::default()
            },
            Preset::Production => PluginOptions {
                include_attributes: list(&["id", "line"]),
                exclude_paths: list(&["**/*.test.*", "**/*.spec.*", "**/*.stories.*"]),
                ..Default::default()
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EFFECTIVE CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct EffectiveConfig {
    pub enabled: bool,
    pub debug: bool,
    pub extensions: Vec<String>,
    pub prefix: String,
    pub exclude_elements: HashSet<String>,
    pub custom_excludes: HashSet<String>,
    pub include_props: bool,
    pub include_content: bool,
    pub include_attributes: Option<HashSet<String>>,
    pub exclude_attributes: Option<HashSet<String>>,
    pub include_paths: Vec<CompiledPattern>,
    pub exclude_paths: Vec<CompiledPattern>,
    pub transformers: HashMap<String, AttributeTransformer>,
    pub should_tag: Option<TagPredicate>,
    pub custom_attributes: Option<CustomAttributeProvider>,
    pub metadata_encoding: MetadataEncoding,
    /// 0 = unbounded.
    pub min_depth: usize,
    /// 0 = unbounded.
    pub max_depth: usize,
    pub tag_only_roots: bool,
    pub on_transform: Option<TransformHook>,
    pub on_complete: Option<CompleteHook>,
    pub export_stats: Option<PathBuf>,
    pub include_source_map: bool,
    pub group_attributes: bool,
    pub root: PathBuf,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        resolve(PluginOptions::default())
    }
}

impl EffectiveConfig {
    /// Allowlist wins outright when both lists are set.
    pub fn attribute_enabled(&self, key: &str) -> bool {
        if let Some(allow) = &self.include_attributes {
            return allow.contains(key);
        }
        if let Some(deny) = &self.exclude_attributes {
            return !deny.contains(key);
        }
        true
    }
}

pub fn resolve(options: PluginOptions) -> EffectiveConfig {
    let preset = options.preset.as_deref().and_then(|name| {
        let preset = Preset::from_name(name);
        if preset.is_none() {
            warn!(preset = name; "Unknown preset, continuing without one");
        }
        preset
    });

    let merged = match preset {
        Some(preset) => options.layered_over(preset.options()),
        None => options,
    };

    let (min_depth, max_depth) = clamp_depths(merged.min_depth, merged.max_depth);

    let root = merged
        .root
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let root = root.canonicalize().unwrap_or(root);

    let export_stats = merged
        .export_stats
        .and_then(|raw| match stats::resolve_export_path(&root, &raw) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(path = raw.as_str(); "Security: ignoring exportStats: {}", e);
                None
            }
        });

    let prefix = match merged.attribute_prefix {
        Some(prefix) if PREFIX_RE.is_match(&prefix) => prefix,
        Some(prefix) => {
            warn!(prefix = prefix.as_str(); "Invalid attribute prefix, using {}", DEFAULT_PREFIX);
            DEFAULT_PREFIX.to_string()
        }
        None => DEFAULT_PREFIX.to_string(),
    };

    for key in merged
        .include_attributes
        .iter()
        .chain(merged.exclude_attributes.iter())
        .flatten()
    {
        if !BUILTIN_ATTRIBUTES.contains(&key.as_str()) {
            warn!(attribute = key.as_str(); "Unknown attribute in include/excludeAttributes");
        }
    }

    let to_set = |items: Vec<String>| items.into_iter().collect::<HashSet<_>>();

    EffectiveConfig {
        enabled: merged.enabled.unwrap_or(true),
        debug: merged.debug.unwrap_or(false),
        extensions: merged
            .extensions
            .unwrap_or_else(|| vec![".jsx".to_string(), ".tsx".to_string()]),
        prefix,
        exclude_elements: to_set(
            merged
                .exclude_elements
                .unwrap_or_else(|| vec!["Fragment".to_string(), "React.Fragment".to_string()]),
        ),
        custom_excludes: to_set(merged.custom_excludes.unwrap_or_else(|| {
            DEFAULT_CUSTOM_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .collect()
        })),
        include_props: merged.include_props.unwrap_or(false),
        include_content: merged.include_content.unwrap_or(false),
        include_attributes: merged.include_attributes.map(to_set),
        exclude_attributes: merged.exclude_attributes.map(to_set),
        include_paths: path_filter::compile(&merged.include_paths.unwrap_or_default()),
        exclude_paths: path_filter::compile(&merged.exclude_paths.unwrap_or_default()),
        transformers: merged.transformers.unwrap_or_default(),
        should_tag: merged.should_tag,
        custom_attributes: merged.custom_attributes,
        metadata_encoding: merged.metadata_encoding.unwrap_or_default(),
        min_depth,
        max_depth,
        tag_only_roots: merged.tag_only_roots.unwrap_or(false),
        on_transform: merged.on_transform,
        on_complete: merged.on_complete,
        export_stats,
        include_source_map: merged.include_source_map.unwrap_or(false),
        group_attributes: merged.group_attributes.unwrap_or(false),
        root,
    }
}

/// Negative min resets to 0, max outside `[0, 50]` resets to 0, and an
/// inverted pair is swapped.
pub fn clamp_depths(min_depth: Option<i64>, max_depth: Option<i64>) -> (usize, usize) {
    let mut min = min_depth.unwrap_or(0);
    let mut max = max_depth.unwrap_or(0);

    if min < 0 {
        warn!(min_depth = min; "minDepth cannot be negative, using 0");
        min = 0;
    }
    if !(0..=MAX_DEPTH_CEILING).contains(&max) {
        warn!(max_depth = max; "maxDepth must be within 0..={}, using 0 (unbounded)", MAX_DEPTH_CEILING);
        max = 0;
    }
    if min > 0 && max > 0 && min > max {
        warn!(min_depth = min, max_depth = max; "minDepth is greater than maxDepth, swapping");
        std::mem::swap(&mut min, &mut max);
    }

    (min as usize, max as usize)
}
