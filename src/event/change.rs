//! Outbound change notifications.
//!
//! A [`ChangeEvent`] is what the parent document observes: a
//! `<dash-cased-property>-changed` name with a `{ "value": .. }` detail.

use serde::Serialize;
use serde_json::Value;

/// Convert a camelCase property name to its dash-cased attribute form.
///
/// A dash is inserted between a lowercase ASCII letter and a following
/// uppercase ASCII letter, then everything is lowercased. Runs of capitals
/// stay together: `disableDefaultUI` becomes `disable-default-ui`.
pub fn camel_to_dash(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            out.push('-');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.push(ch.to_ascii_lowercase());
    }
    out
}

/// Payload of a change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeDetail {
    pub value: Value,
}

/// A `<property>-changed` notification for the parent document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Full event name, e.g. `zoom-changed`.
    pub name: String,
    /// The camelCase property the event is about, e.g. `zoom`.
    pub property: String,
    pub detail: ChangeDetail,
}

impl ChangeEvent {
    /// Build the notification for `property` carrying `value`.
    pub fn new(property: &str, value: Value) -> Self {
        Self {
            name: format!("{}-changed", camel_to_dash(property)),
            property: property.to_owned(),
            detail: ChangeDetail { value },
        }
    }

    /// The carried value.
    pub fn value(&self) -> &Value {
        &self.detail.value
    }
}

// ===========================================================================
// Tests
// ===========================================================================
