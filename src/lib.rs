//! # JSX Dev Tagger
//!
//! Source-to-source transform for JSX/TSX modules, called from a bundler's
//! per-file transform hook. Every eligible markup element gets a set of
//! `data-*` attributes describing where it came from:
//!
//! ```text
//! <button className="btn">            // src/Button.tsx, line 3
//! <button className="btn" data-dev-id="src/Button.tsx:3:4" data-dev-name="button" ...>
//! ```
//!
//! ## Pipeline
//!
//! 1. **Gate**: disabled plugin, wrong extension, `node_modules`, include/exclude globs.
//! 2. **Parse**: oxc with JSX + TypeScript, lowered into the closed [`markup`] IR.
//! 3. **Scan imports**: names imported from 3D libraries are never tagged.
//! 4. **Walk**: depth is the length of the open-element stack, nothing else.
//! 5. **Classify**: exclude lists, library imports, depth bounds, user predicate.
//! 6. **Generate**: built-in values, transformers, metadata, custom attributes, escaping.
//! 7. **Splice**: insert before the tag's own closing `>` / `/>`, emit a source map.
//!
//! ## Failure policy
//!
//! Nothing here aborts a build. Bad options are clamped, bad globs are
//! dropped, failing user hooks fall back to a per-hook default, and a file
//! that cannot be parsed passes through unmodified.

pub mod attributes;
pub mod callbacks;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod imports;
pub mod insertion;
pub mod markup;
pub mod parse;
pub mod path_filter;
pub mod splice;
pub mod stats;
pub mod transform;
pub mod visitor;

#[cfg(feature = "napi")]
mod napi_bridge;

#[cfg(test)]
mod classify_tests;
#[cfg(test)]
mod parse_tests;

pub use callbacks::CallbackError;
pub use config::{EffectiveConfig, MetadataEncoding, PluginOptions, Preset};
pub use context::ElementContext;
pub use error::TaggerError;
pub use stats::{FileTransformInfo, RunStatistics};
pub use transform::{DevTagger, TransformOutput};

#[cfg(feature = "napi")]
pub use napi_bridge::{dev_tagger_bridge, NativeDevTagger, NativeTransformResult};
