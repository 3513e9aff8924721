//! Permission snapshot: the authorization view handed to the UI.
//!
//! The backend returns permissions in one of two loosely-typed shapes:
//!
//! ```json
//! {"allModules": true}
//! {"modules": [{"module": "invoices", "permissions": {"view": true, "delete": false}}]}
//! ```
//!
//! [`PermissionPayload`] classifies the raw JSON once, at the boundary, and
//! [`PermissionSnapshot`] is the only thing the rest of the app ever sees.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known action names.
pub mod action {
    pub const CREATE: &str = "create";
    pub const VIEW: &str = "view";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
}

// ── Raw payload ─────────────────────────────────────────────────────

/// One entry of the `modules` list, as sent by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleEntry {
    pub module: String,
    /// Action → flag. Only JSON `true` grants; any other shape grants nothing.
    #[serde(default)]
    pub permissions: Value,
}

impl ModuleEntry {
    fn grant(&self) -> PermissionGrant {
        match &self.permissions {
            Value::Object(flags) => flags
                .iter()
                .filter(|(_, allowed)| **allowed == Value::Bool(true))
                .map(|(name, _)| name.clone())
                .collect(),
            _ => PermissionGrant::default(),
        }
    }
}

/// Raw permission payload, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum PermissionPayload {
    /// `allModules: true`: the user is an administrator.
    AllModules,
    /// Per-module grants. Entries without a string `module` are dropped.
    ModuleList(Vec<ModuleEntry>),
    /// Absent, not an object, or `modules` of the wrong type.
    Malformed,
}

impl PermissionPayload {
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(payload)) = value else {
            return PermissionPayload::Malformed;
        };

        if payload.get("allModules") == Some(&Value::Bool(true)) {
            return PermissionPayload::AllModules;
        }

        match payload.get("modules") {
            None | Some(Value::Null) => PermissionPayload::ModuleList(Vec::new()),
            Some(Value::Array(entries)) => PermissionPayload::ModuleList(
                entries
                    .iter()
                    .filter_map(|entry| ModuleEntry::deserialize(entry).ok())
                    .collect(),
            ),
            Some(_) => PermissionPayload::Malformed,
        }
    }
}

// ── PermissionGrant ─────────────────────────────────────────────────

/// Actions permitted within one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionGrant {
    actions: BTreeSet<String>,
}

impl PermissionGrant {
    pub fn allows(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionGrant {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ── PermissionSnapshot ──────────────────────────────────────────────

/// Immutable authorization view.
///
/// Administrators carry no module map; every query answers `true`.
/// The [`Default`] snapshot denies everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSnapshot {
    is_admin: bool,
    modules: BTreeMap<String, PermissionGrant>,
}

impl PermissionSnapshot {
    /// Everything allowed.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            modules: BTreeMap::new(),
        }
    }

    /// Everything denied. Used when no usable payload exists.
    pub fn denied() -> Self {
        Self::default()
    }

    /// Build a snapshot from the raw JSON payload. Never panics.
    pub fn build(payload: Option<&Value>) -> Self {
        Self::from_payload(PermissionPayload::from_value(payload))
    }

    pub fn from_payload(payload: PermissionPayload) -> Self {
        match payload {
            PermissionPayload::AllModules => Self::admin(),
            PermissionPayload::Malformed => Self::denied(),
            PermissionPayload::ModuleList(entries) => {
                // Later entries for the same module replace earlier ones.
                let modules = entries
                    .iter()
                    .map(|entry| (entry.module.clone(), entry.grant()))
                    .collect();
                Self {
                    is_admin: false,
                    modules,
                }
            }
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn modules(&self) -> &BTreeMap<String, PermissionGrant> {
        &self.modules
    }

    pub fn grant(&self, module: &str) -> Option<&PermissionGrant> {
        self.modules.get(module)
    }

    pub fn has_permission(&self, module: &str, action: &str) -> bool {
        self.is_admin || self.grant(module).is_some_and(|g| g.allows(action))
    }
}
