//! Composite-key query construction for the profile-parameter endpoint.

/// Canonical query shape understood by the profile-parameter read endpoint.
pub const QUERY_PARAM_FORMAT: &str = "?profileId=<id>&parameterId=<id>";

/// Build the canonical lookup query for a composite key.
///
/// Total for all integer inputs; a fixture record that never had its
/// identifiers resolved queries with zeros.
pub fn profile_parameter_query(profile_id: u64, parameter_id: u64) -> String {
    format!("?profileId={profile_id}&parameterId={parameter_id}")
}
