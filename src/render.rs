//! Receipt-page fragment rendering.
//!
//! Templates are registered with an `.html` name so tera auto-escapes every
//! interpolated value. Widget parameters travel as one JSON document inside a
//! `data-checkout` attribute; the bootstrap script reads it back with
//! `JSON.parse`, so no value is ever spliced into script source.

use tera::{Context, Tera};

use crate::error::Result;
use crate::handoff::WidgetParams;

const RECEIPT_TEMPLATE: &str = "receipt.html";

pub struct Renderer {
    tera: Tera,
    widget_script_url: String,
}

/// Page-level values that are not part of the widget configuration.
#[derive(Debug, Clone)]
pub struct ReceiptContext<'a> {
    /// Where the checkout form posts the payment token
    pub complete_url: &'a str,
}

impl Renderer {
    pub fn new(widget_script_url: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(RECEIPT_TEMPLATE, include_str!("../templates/receipt.html"))?;
        Ok(Self {
            tera,
            widget_script_url: widget_script_url.to_string(),
        })
    }

    pub fn receipt(&self, params: &WidgetParams, page: &ReceiptContext<'_>) -> Result<String> {
        let mut context = Context::new();
        context.insert("checkout_json", &serde_json::to_string(params)?);
        context.insert("complete_url", page.complete_url);
        context.insert("description", &params.description);
        context.insert("widget_script_url", &self.widget_script_url);
        Ok(self.tera.render(RECEIPT_TEMPLATE, &context)?)
    }
}
