//! WASM bindings for tabset
//!
//! This module provides JavaScript-accessible functions for rendering table markup.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::{render_document, OutputFormat, RenderOptions};

/// Render result with additional metadata
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered output
    pub output: String,
    /// Whether rendering was successful
    pub success: bool,
    /// Error message if rendering failed
    pub error: Option<String>,
    /// Warnings during rendering
    pub warnings: Vec<String>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Render a markup document
///
/// `format` is `latex` or `odt`; `options` is a (possibly partial)
/// `RenderOptions` object, invalid or missing options fall back to the defaults.
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "renderTables")]
pub fn render_tables_wasm(markup: &str, format: &str, options: JsValue) -> JsValue {
    let options: RenderOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();

    let result = match format
        .parse::<OutputFormat>()
        .and_then(|format| render_document(markup, format, options))
    {
        Ok(rendered) => RenderResult {
            output: rendered.output,
            success: true,
            error: None,
            warnings: rendered.warnings.iter().map(|w| w.to_string()).collect(),
        },
        Err(e) => RenderResult {
            output: String::new(),
            success: false,
            error: Some(e.to_string()),
            warnings: vec![],
        },
    };

    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
