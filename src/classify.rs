//! Element Classifier
//!
//! Static checks (exclude lists, library imports), then depth bounds, then the
//! user predicate. The predicate is fail-open: if it errors the element is
//! still tagged.

use log::warn;

use crate::callbacks::invoke_guarded;
use crate::config::EffectiveConfig;
use crate::context::ElementContext;
use crate::imports::ImportBindings;
use crate::markup::TagName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    ExcludeList,
    CustomExclude,
    LibraryImport,
    LibraryNamespace,
    RootOnly,
    BelowMinDepth,
    AboveMaxDepth,
}

pub struct ElementClassifier<'c> {
    config: &'c EffectiveConfig,
    imports: &'c ImportBindings,
}

impl<'c> ElementClassifier<'c> {
    pub fn new(config: &'c EffectiveConfig, imports: &'c ImportBindings) -> Self {
        Self { config, imports }
    }

    pub fn is_eligible(&self, name: &TagName, depth: usize) -> bool {
        self.exclusion(name, depth).is_none()
    }

    /// First reason `name` at `depth` must not be tagged, if any.
    pub fn exclusion(&self, name: &TagName, depth: usize) -> Option<Exclusion> {
        let full = name.to_string();

        if self.config.exclude_elements.contains(&full) {
            return Some(Exclusion::ExcludeList);
        }
        if self.config.custom_excludes.contains(&full) {
            return Some(Exclusion::CustomExclude);
        }
        if self.imports.named.contains(&full) {
            return Some(Exclusion::LibraryImport);
        }
        if matches!(name, TagName::Member(_))
            && self.imports.namespaces.contains(name.root_segment())
        {
            return Some(Exclusion::LibraryNamespace);
        }

        self.depth_exclusion(depth)
    }

    fn depth_exclusion(&self, depth: usize) -> Option<Exclusion> {
        if self.config.tag_only_roots {
            return (depth != 1).then_some(Exclusion::RootOnly);
        }
        if self.config.min_depth > 0 && depth < self.config.min_depth {
            return Some(Exclusion::BelowMinDepth);
        }
        if self.config.max_depth > 0 && depth > self.config.max_depth {
            return Some(Exclusion::AboveMaxDepth);
        }
        None
    }

    /// Runs the user predicate; without one every element passes.
    pub fn should_tag(&self, ctx: &ElementContext) -> bool {
        let Some(predicate) = &self.config.should_tag else {
            return true;
        };

        match invoke_guarded(|| predicate(ctx)) {
            Ok(keep) => keep,
            Err(e) => {
                warn!(
                    element = ctx.element_name.as_str(),
                    file = ctx.file_path.as_str(),
                    line = ctx.line;
                    "shouldTag failed, tagging anyway: {}", e
                );
                true
            }
        }
    }
}
