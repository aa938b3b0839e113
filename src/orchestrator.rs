//! Lifecycle orchestration for profile-parameter associations.
//!
//! The [`LifecycleSuite`] drives a fixed pipeline of phases: create the dependency
//! fixtures (CDNs, types, parameters, profiles), create an association, verify it
//! reads back, delete every association (sequentially or with a concurrent fan-out),
//! then tear the dependencies down in reverse order. A failing phase never aborts the
//! run; every failure goes into the shared [`FailureReport`] so one run surfaces as
//! many defects as possible.
//!
//! Deletion uses a lookup-then-mutate pattern: fixture records carry only names, and
//! deletion needs server-assigned identifiers, so each item is first re-read by its
//! composite key and the delete is issued with the identifiers the *server* returned.

use crate::fixtures::FixtureSet;
use crate::model::ProfileParameter;
use crate::query::profile_parameter_query;
use crate::report::{Failure, FailureReport};
use crate::session::ConfOpsSession;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// How the delete-associations phase executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// One item at a time, strictly in fixture order.
    Sequential,
    /// One tokio task per item, joined through a barrier.
    Concurrent,
}

/// Sequences the full association lifecycle against one session.
///
/// The session and fixture set are passed in explicitly; the suite holds no
/// ambient or global state.
pub struct LifecycleSuite {
    session: Arc<dyn ConfOpsSession>,
    fixtures: FixtureSet,
    report: FailureReport,
}

impl LifecycleSuite {
    /// Build a suite from an explicit session and fixture set.
    pub fn new(session: Arc<dyn ConfOpsSession>, fixtures: FixtureSet) -> Self {
        Self {
            session,
            fixtures,
            report: FailureReport::new(),
        }
    }

    /// The failure report this suite records into.
    pub fn report(&self) -> &FailureReport {
        &self.report
    }

    /// Run the full phase order with the chosen delete variant and return the
    /// populated report. Always runs to completion.
    pub async fn run(&self, mode: DeleteMode) -> FailureReport {
        info!(?mode, "starting profile-parameter lifecycle run");

        self.create_cdns().await;
        self.create_types().await;
        self.create_parameters().await;
        self.create_profiles().await;

        self.create_association().await;
        self.verify_associations().await;
        match mode {
            DeleteMode::Sequential => self.delete_associations().await,
            DeleteMode::Concurrent => self.delete_associations_concurrent().await,
        }

        self.delete_parameters().await;
        self.delete_profiles().await;
        self.delete_types().await;
        self.delete_cdns().await;

        info!(failures = self.report.len(), "lifecycle run finished");
        self.report.clone()
    }

    // -- dependency fixture phases ---------------------------------------------

    async fn create_cdns(&self) {
        for cdn in &self.fixtures.cdns {
            if let Err(err) = self.session.create_cdn(cdn).await {
                self.report
                    .record(Failure::dependency("create cdn", cdn.name.as_str(), err.to_string()));
            }
        }
    }

    async fn create_types(&self) {
        for ty in &self.fixtures.types {
            if let Err(err) = self.session.create_type(ty).await {
                self.report
                    .record(Failure::dependency("create type", ty.name.as_str(), err.to_string()));
            }
        }
    }

    async fn create_parameters(&self) {
        for parameter in &self.fixtures.parameters {
            if let Err(err) = self.session.create_parameter(parameter).await {
                self.report.record(Failure::dependency(
                    "create parameter",
                    parameter.name.as_str(),
                    err.to_string(),
                ));
            }
        }
    }

    async fn create_profiles(&self) {
        for profile in &self.fixtures.profiles {
            if let Err(err) = self.session.create_profile(profile).await {
                self.report.record(Failure::dependency(
                    "create profile",
                    profile.name.as_str(),
                    err.to_string(),
                ));
            }
        }
    }

    async fn delete_parameters(&self) {
        for parameter in &self.fixtures.parameters {
            if let Err(err) = self.session.delete_parameter(&parameter.name).await {
                self.report.record(Failure::client_call(
                    "delete parameter",
                    parameter.name.as_str(),
                    err.to_string(),
                ));
            }
        }
    }

    async fn delete_profiles(&self) {
        for profile in &self.fixtures.profiles {
            if let Err(err) = self.session.delete_profile(&profile.name).await {
                self.report.record(Failure::client_call(
                    "delete profile",
                    profile.name.as_str(),
                    err.to_string(),
                ));
            }
        }
    }

    async fn delete_types(&self) {
        for ty in &self.fixtures.types {
            if let Err(err) = self.session.delete_type(&ty.name).await {
                self.report
                    .record(Failure::client_call("delete type", ty.name.as_str(), err.to_string()));
            }
        }
    }

    async fn delete_cdns(&self) {
        for cdn in &self.fixtures.cdns {
            if let Err(err) = self.session.delete_cdn(&cdn.name).await {
                self.report
                    .record(Failure::client_call("delete cdn", cdn.name.as_str(), err.to_string()));
            }
        }
    }

    // -- association phases ----------------------------------------------------

    /// Create one association from the first profile and first parameter in the
    /// fixture set, keyed by their names. A create error is recorded non-fatally
    /// and never retried.
    pub async fn create_association(&self) {
        let (Some(profile), Some(parameter)) = (
            self.fixtures.profiles.first(),
            self.fixtures.parameters.first(),
        ) else {
            self.report.record(Failure::dependency(
                "create profile_parameter",
                "-",
                "fixture set supplies no profile or no parameter",
            ));
            return;
        };

        let assoc = ProfileParameter::by_names(profile.name.as_str(), parameter.name.as_str());
        match self.session.create_profile_parameter(&assoc).await {
            // The create response is logged and otherwise discarded; later phases
            // re-resolve identifiers through a fresh composite-key read.
            Ok(reply) => debug!(status = reply.status, response = ?reply.body, "created association"),
            Err(err) => self.report.record(Failure::client_call(
                "create profile_parameter",
                format!("{}/{}", assoc.profile, assoc.parameter),
                err.to_string(),
            )),
        }
    }

    /// Read every association in the fixture set by its composite key. Client
    /// errors are recorded per item; the phase never short-circuits.
    pub async fn verify_associations(&self) {
        for assoc in &self.fixtures.profile_parameters {
            let (profile_id, parameter_id) = assoc.composite_key();
            let query = profile_parameter_query(profile_id, parameter_id);
            if let Err(err) = self.session.profile_parameters_by_query(&query).await {
                self.report.record(Failure::client_call(
                    "read profile_parameters",
                    format!("{}/{}", assoc.profile, assoc.parameter),
                    err.to_string(),
                ));
            }
        }
    }

    /// Delete-and-verify every association, strictly in fixture order. Each
    /// item's calls complete before the next item starts.
    pub async fn delete_associations(&self) {
        for assoc in &self.fixtures.profile_parameters {
            delete_and_verify(self.session.as_ref(), &self.report, assoc).await;
        }
    }

    /// Delete-and-verify every association with one task per item.
    ///
    /// Fan-out is unbounded and there is no timeout: a stalled call stalls its
    /// own task and the barrier, never a sibling. The drain below is the
    /// barrier; this method does not return until every task has finished,
    /// successfully or with its failures recorded. Completion order between
    /// items is unspecified.
    pub async fn delete_associations_concurrent(&self) {
        let mut tasks: JoinSet<()> = JoinSet::new();
        for assoc in self.fixtures.profile_parameters.iter().cloned() {
            let session = Arc::clone(&self.session);
            let report = self.report.clone();
            tasks.spawn(async move {
                delete_and_verify(session.as_ref(), &report, &assoc).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                self.report.record(Failure::client_call(
                    "join deletion task",
                    "-",
                    err.to_string(),
                ));
            }
        }
    }
}

/// The five-step delete-and-verify procedure for a single association.
///
/// 1. Build the composite-key query from the record's identifiers.
/// 2. Read current state; on error, record and abort this item (no delete
///    against unknown state).
/// 3. Zero matches: nothing to delete, skip silently.
/// 4. Delete using the identifiers of the first *returned* record, the
///    server-authoritative ones, since fixture records may lack them.
/// 5. Re-read the same query; any remaining match is a verification failure.
async fn delete_and_verify(
    session: &dyn ConfOpsSession,
    report: &FailureReport,
    assoc: &ProfileParameter,
) {
    let (profile_id, parameter_id) = assoc.composite_key();
    let query = profile_parameter_query(profile_id, parameter_id);
    let target = format!("{}/{}", assoc.profile, assoc.parameter);

    let current = match session.profile_parameters_by_query(&query).await {
        Ok(reply) => reply.body,
        Err(err) => {
            report.record(Failure::client_call(
                "read profile_parameters",
                target,
                err.to_string(),
            ));
            return;
        }
    };

    let Some(live) = current.first() else {
        // Already gone, nothing to delete.
        return;
    };

    let (live_profile_id, live_parameter_id) = live.composite_key();
    if let Err(err) = session
        .delete_profile_parameter(live_profile_id, live_parameter_id)
        .await
    {
        report.record(Failure::client_call(
            "delete profile_parameter",
            format!("({live_profile_id}, {live_parameter_id})"),
            err.to_string(),
        ));
    }

    match session.profile_parameters_by_query(&query).await {
        Err(err) => report.record(Failure::client_call(
            "re-read profile_parameters",
            target,
            err.to_string(),
        )),
        Ok(reply) if !reply.body.is_empty() => report.record(Failure::verification(
            "verify deletion",
            format!("({live_profile_id}, {live_parameter_id})"),
            format!(
                "expected {} to be deleted, {} match(es) remain",
                target,
                reply.body.len()
            ),
        )),
        Ok(_) => {}
    }
}
