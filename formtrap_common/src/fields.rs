//! Rendering of the honeypot marker fields
//!
//! A form host drops [`HoneypotFields::to_html`] inside its `<form>` element.
//! The text input must come back empty; the hidden input carries the render
//! time in whole seconds.

use crate::clock::Clock;
use crate::config::HoneypotConfig;
use serde::Serialize;

/// Keeps the trap input out of sight and out of the tab order
const HIDDEN_WRAPPER_STYLE: &str =
    "position:absolute;left:-10000px;top:auto;width:1px;height:1px;overflow:hidden;";

/// Template context for the marker fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoneypotFields {
    pub enabled: bool,
    pub name_field: String,
    pub time_field: String,
    /// Render time as Unix seconds
    pub time: String,
}

impl HoneypotFields {
    pub fn new(enabled: bool, config: &HoneypotConfig, clock: &dyn Clock) -> Self {
        Self {
            enabled,
            name_field: config.name_field().to_string(),
            time_field: config.time_field().to_string(),
            time: clock.now_unix_secs().to_string(),
        }
    }

    /// HTML for the two inputs, or an empty string when disabled
    pub fn to_html(&self) -> String {
        if !self.enabled {
            return String::new();
        }

        let name = escape_html(&self.name_field);
        let time_field = escape_html(&self.time_field);
        let time = escape_html(&self.time);

        format!(
            concat!(
                "<div style=\"{style}\" aria-hidden=\"true\">",
                "<label for=\"{name}\">Leave this field empty</label>",
                "<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"\" tabindex=\"-1\" autocomplete=\"off\">",
                "</div>",
                "<input type=\"hidden\" id=\"{time_field}\" name=\"{time_field}\" value=\"{time}\">"
            ),
            style = HIDDEN_WRAPPER_STYLE,
            name = name,
            time_field = time_field,
            time = time,
        )
    }
}

/// Escape text for use in HTML content or a quoted attribute
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
