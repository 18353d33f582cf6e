//! Node.js binding for bundler plugins.
//!
//! Options arrive as the camelCase JSON object a JS plugin wrapper would pass
//! through. Hooks are only available from the Rust API.

use napi_derive::napi;

use crate::config::PluginOptions;
use crate::transform::DevTagger;

#[napi(object)]
pub struct NativeTransformResult {
    pub code: String,
    pub map: Option<String>,
}

#[napi(js_name = "DevTagger")]
pub struct NativeDevTagger {
    inner: DevTagger,
}

#[napi]
impl NativeDevTagger {
    #[napi(constructor)]
    pub fn new(options_json: Option<String>) -> napi::Result<Self> {
        let options: PluginOptions = match options_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| napi::Error::from_reason(format!("invalid options: {}", e)))?,
            None => PluginOptions::default(),
        };
        Ok(Self {
            inner: DevTagger::new(options),
        })
    }

    #[napi]
    pub fn transform(&mut self, code: String, id: String) -> Option<NativeTransformResult> {
        self.inner
            .transform(&code, &id)
            .map(|out| NativeTransformResult {
                code: out.code,
                map: out.map,
            })
    }

    /// Returns the run statistics as JSON.
    #[napi]
    pub fn finish(&mut self) -> napi::Result<String> {
        serde_json::to_string(self.inner.finish())
            .map_err(|e| napi::Error::from_reason(e.to_string()))
    }
}

#[napi]
pub fn dev_tagger_bridge() -> String {
    "Dev Tagger Native Bridge Connected".to_string()
}
