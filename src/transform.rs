//! Driver
//!
//! [`DevTagger`] is one plugin instance: it owns the resolved configuration
//! and the run statistics, and is called once per module by the host's
//! transform hook and once at the end of the build.
//!
//! Per file: gate (enabled, extension, vendored, path filter) → parse → scan
//! imports → walk and tag → splice. Any error skips the file and bumps the
//! error counter; the build never fails because of this crate.

use log::{debug, error, info, log, warn, Level};
use serde::Serialize;
use std::path::Path;

use crate::attributes::AttributePipeline;
use crate::callbacks::invoke_guarded;
use crate::classify::ElementClassifier;
use crate::config::{self, EffectiveConfig, PluginOptions};
use crate::context::{ElementContext, FileInfo};
use crate::error::TaggerError;
use crate::imports::{scan_imports, ImportBindings};
use crate::insertion::find_insertion_point;
use crate::markup::{ByteSpan, ElementNode};
use crate::parse::parse_module;
use crate::path_filter;
use crate::splice::{SourceSplicer, SplicedSource};
use crate::stats::{self, FileTransformInfo, RunStatistics};
use crate::visitor::{walk_element, MarkupVisitor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Result of walking one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Name of every tagged element, in source order.
    pub tagged: Vec<String>,
    /// `None` when nothing was inserted.
    pub output: Option<SplicedSource>,
}

pub struct DevTagger {
    config: EffectiveConfig,
    stats: RunStatistics,
}

impl DevTagger {
    pub fn new(options: PluginOptions) -> Self {
        Self::from_config(config::resolve(options))
    }

    pub fn from_config(config: EffectiveConfig) -> Self {
        Self {
            config,
            stats: RunStatistics::default(),
        }
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// The host's per-module hook. `None` leaves the module untouched.
    pub fn transform(&mut self, code: &str, id: &str) -> Option<TransformOutput> {
        if !self.config.enabled {
            return None;
        }

        let path = normalize_id(id);
        if !self.has_supported_extension(&path) || is_vendored(&path) {
            return None;
        }

        let file = file_info(&self.config.root, &path);
        if !path_filter::should_process(
            &[file.relative_path.as_str(), path.as_str()],
            &self.config.include_paths,
            &self.config.exclude_paths,
        ) {
            self.trace(&format!("Skipping {} (path filter)", file.relative_path));
            return None;
        }

        self.stats.total_files += 1;

        match tag_file(&self.config, code, &path, &file) {
            Ok(outcome) => {
                self.stats.commit_file(&outcome.tagged);
                self.notify_transform(&file, &outcome.tagged);
                self.trace(&format!(
                    "Tagged {} elements in {}",
                    outcome.tagged.len(),
                    file.relative_path
                ));
                outcome.output.map(|spliced| TransformOutput {
                    code: spliced.code,
                    map: Some(spliced.map),
                })
            }
            Err(e) => {
                self.stats.errors += 1;
                error!(file = file.relative_path.as_str(); "Skipping file: {}", e);
                None
            }
        }
    }

    /// End of build: summary, completion hook, optional stats export.
    pub fn finish(&mut self) -> &RunStatistics {
        info!("[dev-tagger] {}", self.stats.summary());

        if let Some(hook) = &self.config.on_complete {
            let stats = &self.stats;
            if let Err(e) = invoke_guarded(|| hook(stats)) {
                warn!("onComplete failed: {}", e);
            }
        }

        if let Some(target) = &self.config.export_stats {
            stats::export_stats_logged(&self.stats, &self.config.root, target);
        }

        &self.stats
    }

    fn has_supported_extension(&self, path: &str) -> bool {
        self.config.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    fn notify_transform(&self, file: &FileInfo, tagged: &[String]) {
        let Some(hook) = &self.config.on_transform else {
            return;
        };

        let mut elements: Vec<String> = Vec::new();
        for name in tagged {
            if !elements.contains(name) {
                elements.push(name.clone());
            }
        }
        let info = FileTransformInfo {
            file_path: file.relative_path.clone(),
            element_count: tagged.len(),
            elements,
        };

        if let Err(e) = invoke_guarded(|| hook(&info)) {
            warn!(file = info.file_path.as_str(); "onTransform failed: {}", e);
        }
    }

    fn trace(&self, message: &str) {
        let level = if self.config.debug {
            Level::Info
        } else {
            Level::Debug
        };
        log!(level, "[dev-tagger] {}", message);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PER-FILE PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse, scan and tag one file. Nothing is committed anywhere; the caller
/// folds the outcome into its statistics.
pub fn tag_file(
    config: &EffectiveConfig,
    code: &str,
    file_path: &str,
    file: &FileInfo,
) -> Result<FileOutcome, TaggerError> {
    let module = parse_module(code, file_path)?;

    // Exclusions depend on the complete import picture.
    let imports = scan_imports(&module.imports);
    if !imports.is_empty() {
        debug!(
            file = file.relative_path.as_str();
            "Library imports: {:?} / namespaces {:?}", imports.named, imports.namespaces
        );
    }

    let mut pass = TaggingPass::new(config, &imports, file, code);
    pass.visit_module(&module);

    let TaggingPass {
        splicer, tagged, ..
    } = pass;
    let output = if splicer.is_empty() {
        None
    } else {
        Some(splicer.finish(&file.relative_path))
    };

    Ok(FileOutcome { tagged, output })
}

struct TaggingPass<'c> {
    config: &'c EffectiveConfig,
    classifier: ElementClassifier<'c>,
    pipeline: AttributePipeline<'c>,
    file: &'c FileInfo,
    source: &'c str,
    splicer: SourceSplicer<'c>,
    /// One entry per open element; its length is the current depth.
    depth_stack: Vec<ByteSpan>,
    tagged: Vec<String>,
}

impl<'c> TaggingPass<'c> {
    fn new(
        config: &'c EffectiveConfig,
        imports: &'c ImportBindings,
        file: &'c FileInfo,
        source: &'c str,
    ) -> Self {
        Self {
            config,
            classifier: ElementClassifier::new(config, imports),
            pipeline: AttributePipeline::new(config),
            file,
            source,
            splicer: SourceSplicer::new(source),
            depth_stack: Vec::new(),
            tagged: Vec::new(),
        }
    }

    fn tag_element(&mut self, element: &ElementNode) {
        let depth = self.depth_stack.len();
        if !self.classifier.is_eligible(&element.name, depth) {
            return;
        }

        let ctx = ElementContext::new(
            element,
            self.file,
            depth,
            self.config.include_props,
            self.config.include_content,
        );
        if !self.classifier.should_tag(&ctx) {
            return;
        }

        let attributes = self.pipeline.generate(&ctx);
        if attributes.is_empty() {
            return;
        }

        let at = find_insertion_point(self.source, element.opening_span, element.self_closing);
        self.splicer.insert_before(at, format!(" {}", attributes));
        self.tagged.push(ctx.element_name);
    }
}

impl MarkupVisitor for TaggingPass<'_> {
    fn visit_element(&mut self, element: &ElementNode) {
        self.depth_stack.push(element.opening_span);
        self.tag_element(element);
        walk_element(self, element);
        self.depth_stack.pop();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Drops a `?query` suffix and uses forward slashes.
fn normalize_id(id: &str) -> String {
    let path = id.split('?').next().unwrap_or(id);
    path.replace('\\', "/")
}

fn is_vendored(path: &str) -> bool {
    path.starts_with("node_modules/") || path.contains("/node_modules/")
}

pub fn file_info(root: &Path, path: &str) -> FileInfo {
    let as_path = Path::new(path);
    let relative = if as_path.is_absolute() {
        as_path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string())
    } else {
        path.strip_prefix("./").unwrap_or(path).to_string()
    };

    let file_name = as_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| relative.clone());

    FileInfo {
        relative_path: relative,
        file_name,
    }
}
