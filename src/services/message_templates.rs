use std::sync::Arc;

use handlebars::Handlebars;
use serde_json::json;

use crate::error::AlertError;
use crate::models::{Notification, PriceUpdateEvent};

pub type Hbs = Arc<Handlebars<'static>>;

const TITLE: &str = "alert/title";
const BODY: &str = "alert/body";
const FALLBACK_TITLE: &str = "alert/fallback_title";
const FALLBACK_BODY: &str = "alert/fallback_body";

pub const DEFAULT_TITLE: &str = "Crypto Price Alert";
pub const DEFAULT_BODY: &str = "{{name}} price changed to USD {{value}}.";

/// Renders the push title/body for a price update.
#[derive(Clone)]
pub struct MessageTemplates {
    hbs: Hbs,
}

impl MessageTemplates {
    pub fn new(title_tpl: &str, body_tpl: &str) -> Result<Self, AlertError> {
        let mut hb = Handlebars::new();
        // plain text, not HTML
        hb.register_escape_fn(handlebars::no_escape);

        hb.register_template_string(TITLE, title_tpl)
            .map_err(|e| AlertError::validation(format!("title template: {e}")))?;
        hb.register_template_string(BODY, body_tpl)
            .map_err(|e| AlertError::validation(format!("body template: {e}")))?;
        hb.register_template_string(FALLBACK_TITLE, DEFAULT_TITLE)
            .map_err(|e| AlertError::validation(format!("default title template: {e}")))?;
        hb.register_template_string(FALLBACK_BODY, DEFAULT_BODY)
            .map_err(|e| AlertError::validation(format!("default body template: {e}")))?;

        Ok(Self { hbs: Arc::new(hb) })
    }

    pub fn render(&self, event: &PriceUpdateEvent) -> Notification {
        let ctx = json!({
            "name": event.display_name(),
            "quantity_id": event.quantity_id,
            "value": format!("{:.2}", event.new_value),
            "previous_value": event.previous_value.map(|v| format!("{v:.2}")),
        });

        // a broken custom template falls back to the built-in text
        let render = |tpl: &str, fallback: &str| match self.hbs.render(tpl, &ctx) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(template = tpl, error = %e, "alert template failed to render");
                self.hbs.render(fallback, &ctx).unwrap_or_else(|_| {
                    format!("{} price changed to USD {:.2}.", event.display_name(), event.new_value)
                })
            }
        };

        Notification {
            title: render(TITLE, FALLBACK_TITLE),
            body: render(BODY, FALLBACK_BODY),
        }
    }
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_BODY).expect("default alert templates")
    }
}
