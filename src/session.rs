//! The session trait: the seam between the harness and the real API.
//!
//! Everything the lifecycle suite does goes through [`ConfOpsSession`]. The HTTP
//! transport, authentication, retry-free request plumbing, and wire encoding all
//! live behind this trait; the harness consumes only the CRUD contract. The
//! bundled [`crate::mock::InMemorySession`] implements it for tests and self-test
//! runs.
//!
//! Every call returns a [`Reply`] carrying the decoded body together with the
//! HTTP status of the response, or a [`crate::error::SessionError`].

use crate::error::SessionResult;
use crate::model::{Cdn, Parameter, Profile, ProfileParameter, Reply, TypeResource};
use async_trait::async_trait;

/// Async CRUD contract against the ConfOps API.
///
/// Implementations must be shareable across tasks: the concurrent delete phase
/// issues calls from many tokio tasks against one session instance.
#[async_trait]
pub trait ConfOpsSession: Send + Sync {
    // -- dependency fixtures ---------------------------------------------------

    /// Create a CDN.
    async fn create_cdn(&self, cdn: &Cdn) -> SessionResult<Reply<Cdn>>;

    /// Delete a CDN by name.
    async fn delete_cdn(&self, name: &str) -> SessionResult<Reply<()>>;

    /// Create a type.
    async fn create_type(&self, ty: &TypeResource) -> SessionResult<Reply<TypeResource>>;

    /// Delete a type by name.
    async fn delete_type(&self, name: &str) -> SessionResult<Reply<()>>;

    /// Create a parameter.
    async fn create_parameter(&self, parameter: &Parameter) -> SessionResult<Reply<Parameter>>;

    /// Delete a parameter by name.
    async fn delete_parameter(&self, name: &str) -> SessionResult<Reply<()>>;

    /// Create a profile.
    async fn create_profile(&self, profile: &Profile) -> SessionResult<Reply<Profile>>;

    /// Delete a profile by name.
    async fn delete_profile(&self, name: &str) -> SessionResult<Reply<()>>;

    // -- profile-parameter associations ----------------------------------------

    /// Create an association identified by profile name and parameter name.
    /// The server resolves the names to internal identifiers.
    async fn create_profile_parameter(
        &self,
        assoc: &ProfileParameter,
    ) -> SessionResult<Reply<ProfileParameter>>;

    /// Read associations matching a composite-key query string of the exact
    /// literal shape `?profileId=<int>&parameterId=<int>`. Returns zero or more
    /// matches; uniqueness makes more than one unexpected but the contract
    /// allows it.
    async fn profile_parameters_by_query(
        &self,
        query: &str,
    ) -> SessionResult<Reply<Vec<ProfileParameter>>>;

    /// Delete the association with the given server-assigned identifiers.
    /// Deleting a non-existent pair is an error at this level, which is why
    /// callers check existence first.
    async fn delete_profile_parameter(
        &self,
        profile_id: u64,
        parameter_id: u64,
    ) -> SessionResult<Reply<()>>;
}
