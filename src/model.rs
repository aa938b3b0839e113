//! Wire-shaped resource records exchanged with the ConfOps API.
//!
//! Field names follow the API's camelCase JSON convention. Server-assigned
//! identifiers are `Option` because fixture data carries only semantic keys;
//! identifiers appear on a record only after a create or a composite-key lookup
//! resolved them.

use serde::{Deserialize, Serialize};

/// Response envelope returned by every session call: the decoded body plus the
/// HTTP status it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
    /// Decoded response body.
    pub body: T,
    /// HTTP status code of the response.
    pub status: u16,
}

impl<T> Reply<T> {
    /// Wrap a body with its status.
    pub fn new(body: T, status: u16) -> Self {
        Self { body, status }
    }
}

/// A CDN fixture record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cdn {
    /// Unique CDN name.
    pub name: String,
    /// Base DNS domain served by the CDN.
    pub domain_name: String,
}

/// A type fixture record. Types classify other resources (profiles among them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeResource {
    /// Unique type name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// A parameter fixture record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name, unique together with `config_file`.
    pub name: String,
    /// Configuration file the parameter applies to.
    pub config_file: String,
    /// Parameter value.
    #[serde(default)]
    pub value: String,
}

/// A profile fixture record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique profile name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Name of the CDN this profile belongs to.
    pub cdn: String,
    /// Name of the type classifying this profile.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// One profile-parameter association.
///
/// The pair (`profile_id`, `parameter_id`) is the composite key and is unique
/// across all live associations. Creation is performed by name; the server
/// resolves names to identifiers, so a record's identifiers are unknown until a
/// lookup resolved them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileParameter {
    /// Server-assigned profile identifier, present only after creation/lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<u64>,
    /// Server-assigned parameter identifier, present only after creation/lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_id: Option<u64>,
    /// Profile name, supplied by fixture data.
    pub profile: String,
    /// Parameter name, supplied by fixture data.
    pub parameter: String,
}

impl ProfileParameter {
    /// Build an association from semantic keys only, the shape fixture data has
    /// before the server assigned identifiers.
    pub fn by_names(profile: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            profile_id: None,
            parameter_id: None,
            profile: profile.into(),
            parameter: parameter.into(),
        }
    }

    /// The composite key, with unresolved identifiers reading as zero.
    pub fn composite_key(&self) -> (u64, u64) {
        (
            self.profile_id.unwrap_or_default(),
            self.parameter_id.unwrap_or_default(),
        )
    }
}
