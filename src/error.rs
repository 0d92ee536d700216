// Error type shared by the simulation core and the browser host

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum FieldError {
    /// A configuration value is out of range; rejected before anything is built.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// The DOM or JS environment refused an operation.
    #[error("host error: {0}")]
    Host(String),
}

impl FieldError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FieldError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    // JsValue errors carry no structure, keep whatever the engine printed
    pub fn from_js(context: &str, value: JsValue) -> Self {
        let detail = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        FieldError::Host(format!("{}: {}", context, detail))
    }
}

impl From<FieldError> for JsValue {
    fn from(err: FieldError) -> JsValue {
        js_sys::Error::new(&err.to_string()).into()
    }
}

pub type Result<T> = std::result::Result<T, FieldError>;
