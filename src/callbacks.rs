//! User hooks and the guarded call site they all go through.
//!
//! Every hook may fail, either by returning `Err` or by panicking. Each call
//! site picks its own fallback; this module only normalizes the failure.

use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

use crate::context::ElementContext;
use crate::stats::{FileTransformInfo, RunStatistics};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        CallbackError(message.to_string())
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        CallbackError(message)
    }
}

/// Decides whether an otherwise eligible element gets tagged.
pub type TagPredicate = Arc<dyn Fn(&ElementContext) -> Result<bool, CallbackError> + Send + Sync>;

/// Rewrites one attribute value. Only string results are accepted.
pub type AttributeTransformer = Arc<dyn Fn(&str) -> Result<Value, CallbackError> + Send + Sync>;

/// Supplies extra `prefix-<key>` attributes for an element, in order.
pub type CustomAttributeProvider =
    Arc<dyn Fn(&ElementContext) -> Result<Vec<(String, Value)>, CallbackError> + Send + Sync>;

pub type TransformHook = Arc<dyn Fn(&FileTransformInfo) -> Result<(), CallbackError> + Send + Sync>;

pub type CompleteHook = Arc<dyn Fn(&RunStatistics) -> Result<(), CallbackError> + Send + Sync>;

/// Run a user hook, folding a panic into a [`CallbackError`].
pub fn invoke_guarded<T>(hook: impl FnOnce() -> Result<T, CallbackError>) -> Result<T, CallbackError> {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result,
        Err(payload) => Err(CallbackError(format!(
            "callback panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
