//! WASM bindings for invoice payment classification.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use cobro_core::invoice::rules;
use cobro_core::{
    ClassificationEngine, CobroConfig, DocumentExtractor, RawRecord, RecordSet, StatusClassifier,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than JS Maps
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn config_from_js(config: JsValue) -> Result<CobroConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(CobroConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Classify an array of flat row objects.
///
/// `config` is an optional partial configuration object with the same shape
/// as the CLI config file. Returns the partitions as arrays of row objects.
#[wasm_bindgen]
pub fn classify_records(records: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let config = config_from_js(config)?;
    let records: Vec<RawRecord> = serde_wasm_bindgen::from_value(records)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let result = ClassificationEngine::from_config(&config)
        .classify(&RecordSet::from_records(records))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    to_js(&result)
}

/// Extract an invoice from the text of each page of a document.
#[wasm_bindgen]
pub fn extract_invoice(pages: js_sys::Array) -> Result<JsValue, JsValue> {
    let pages: Vec<String> = pages
        .iter()
        .map(|page| page.as_string().unwrap_or_default())
        .collect();

    to_js(&DocumentExtractor::new().extract(&pages))
}

/// Extract an invoice from the full text of a document.
#[wasm_bindgen]
pub fn extract_invoice_from_text(text: &str) -> Result<JsValue, JsValue> {
    to_js(&DocumentExtractor::new().extract_text(text))
}

/// Parse an amount written with European or US separators.
#[wasm_bindgen]
pub fn parse_amount(amount: &str) -> Option<f64> {
    rules::parse_amount_str(amount).and_then(|d| d.to_f64())
}

/// Classify a free-text status: "Paid", "Unpaid" or "Undetermined".
#[wasm_bindgen]
pub fn classify_status(status: &str) -> String {
    StatusClassifier::default().classify(status).to_string()
}
