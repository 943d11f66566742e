//! # Resource Provider Records
//!
//! Passive records describing a resource provider manifest: the provider,
//! its resource types, and their location, zone, and API profile mappings.
//! The alias engine reads `aliases` and `property_schema`; everything else
//! is carried through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alias::Alias;

/// A resource provider namespace and its resource types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Provider resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Provider namespace, e.g. `Microsoft.Storage`.
    pub namespace: String,
    /// Subscription registration state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_state: Option<String>,
    /// Registration policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_policy: Option<String>,
    /// Resource types declared by the provider.
    #[serde(default)]
    pub resource_types: Vec<ResourceType>,
    /// Authorization consent state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_authorization_consent_state: Option<String>,
}

impl Provider {
    /// Fully qualified name of one of this provider's resource types.
    pub fn qualified_name(&self, resource_type: &ResourceType) -> String {
        format!("{}/{}", self.namespace, resource_type.resource_type)
    }

    /// Find a resource type by its unqualified name.
    pub fn resource_type(&self, name: &str) -> Option<&ResourceType> {
        self.resource_types.iter().find(|rt| rt.resource_type == name)
    }
}

/// One resource type declared by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
    /// Unqualified resource type name, e.g. `storageAccounts`.
    pub resource_type: String,
    /// Supported locations.
    #[serde(default)]
    pub locations: Vec<String>,
    /// Location mappings to extended locations.
    #[serde(default)]
    pub location_mappings: Vec<LocationMapping>,
    /// Alias definitions.
    #[serde(default)]
    pub aliases: Vec<Alias>,
    /// Supported API versions.
    #[serde(default)]
    pub api_versions: Vec<String>,
    /// Default API version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_api_version: Option<String>,
    /// Availability zone mappings.
    #[serde(default)]
    pub zone_mappings: Vec<ZoneMapping>,
    /// API profiles.
    #[serde(default)]
    pub api_profiles: Vec<ApiProfile>,
    /// Capability flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<String>,
    /// Free-form properties bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    /// JSON Schema of the resource body, used to check declared alias paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_schema: Option<Value>,
}

/// Availability zones of one location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMapping {
    /// Location name.
    pub location: String,
    /// Zone identifiers.
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Mapping from a location to its extended locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMapping {
    /// Location name.
    pub location: String,
    /// Mapping type, e.g. `EdgeZone`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Extended location names.
    #[serde(default)]
    pub extended_locations: Vec<String>,
}

/// API profile binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProfile {
    /// Profile version.
    pub profile_version: String,
    /// API version bound to the profile.
    pub api_version: String,
}
