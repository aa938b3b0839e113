//! Fixture data driving the lifecycle suite.
//!
//! A [`FixtureSet`] is loaded from a JSON file and passed explicitly into the
//! orchestrator; there is no ambient, process-wide test-data structure. The
//! association records carry only semantic keys (profile and parameter names);
//! server identifiers are resolved at run time.

use crate::error::HarnessResult;
use crate::model::{Cdn, Parameter, Profile, ProfileParameter, TypeResource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Ordered sequences of seed records for every resource the suite touches.
///
/// Order matters: the create phases walk each sequence front to back, and the
/// association phases use the *first* profile and *first* parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSet {
    /// CDN seed records.
    #[serde(default)]
    pub cdns: Vec<Cdn>,
    /// Type seed records.
    #[serde(default)]
    pub types: Vec<TypeResource>,
    /// Parameter seed records.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Profile seed records.
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Profile-parameter association records, names only.
    #[serde(default)]
    pub profile_parameters: Vec<ProfileParameter>,
}

impl FixtureSet {
    /// Load a fixture set from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> HarnessResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check that the sequences the phases index into are populated.
    ///
    /// The create-association phase takes the first profile and the first
    /// parameter, so those two sequences must be non-empty. Duplicate composite
    /// keys among `profile_parameters` are not checked; behavior for such
    /// fixtures is undefined.
    pub fn validate(&self) -> Result<(), String> {
        if self.profiles.is_empty() {
            return Err("fixture set has no profiles; create-association needs at least one".into());
        }
        if self.parameters.is_empty() {
            return Err(
                "fixture set has no parameters; create-association needs at least one".into(),
            );
        }
        Ok(())
    }
}
