//! Profile-Parameter Lifecycle Integration Tests
//!
//! These tests drive the orchestrator against the bundled in-memory session
//! rather than a live deployment.
//!
//! Tests verify:
//! - Create/read/delete round trips through the composite-key query
//! - Idempotent-skip and delete-completeness semantics
//! - Failure recording (dependency, client-call, verification kinds)
//! - Concurrent delete fan-out: equivalence with sequential, barrier timing
//!
//! # Test Categories
//!
//! 1. **Lifecycle** - full phase order with fixture data
//! 2. **Delete-and-Verify** - the per-item five-step procedure
//! 3. **Failure Isolation** - errors are recorded, siblings continue
//! 4. **Concurrency** - fan-out equivalence and the join barrier

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs
)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use confops_harness::error::FailureKind;
use confops_harness::fixtures::FixtureSet;
use confops_harness::mock::{InMemorySession, MockSessionConfig};
use confops_harness::model::{Cdn, Parameter, Profile, ProfileParameter, TypeResource};
use confops_harness::orchestrator::{DeleteMode, LifecycleSuite};
use confops_harness::query::profile_parameter_query;
use confops_harness::session::ConfOpsSession;

fn profile_record(name: &str) -> Profile {
    Profile {
        name: name.to_string(),
        description: String::new(),
        cdn: "cdn1".to_string(),
        type_name: "EDGE_PROFILE".to_string(),
    }
}

fn parameter_record(name: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        config_file: "records.config".to_string(),
        value: String::new(),
    }
}

/// Fixture set in the shape real fixture files have: association records carry
/// names only, never server identifiers.
fn fixture_set() -> FixtureSet {
    FixtureSet {
        cdns: vec![Cdn {
            name: "cdn1".to_string(),
            domain_name: "cdn1.example.net".to_string(),
        }],
        types: vec![TypeResource {
            name: "EDGE_PROFILE".to_string(),
            description: "edge profiles".to_string(),
        }],
        parameters: vec![parameter_record("PARAM1")],
        profiles: vec![profile_record("P1")],
        profile_parameters: vec![ProfileParameter::by_names("P1", "PARAM1")],
    }
}

/// Create profile + parameter + their association directly on the session.
async fn seed_association(session: &InMemorySession, profile: &str, parameter: &str) {
    session.create_profile(&profile_record(profile)).await.unwrap();
    session
        .create_parameter(&parameter_record(parameter))
        .await
        .unwrap();
    session
        .create_profile_parameter(&ProfileParameter::by_names(profile, parameter))
        .await
        .unwrap();
}

/// An association record with the identifiers the server assigned, the shape a
/// record has after a successful lookup resolved it.
async fn resolved_association(
    session: &InMemorySession,
    profile: &str,
    parameter: &str,
) -> ProfileParameter {
    ProfileParameter {
        profile_id: session.profile_id_of(profile).await,
        parameter_id: session.parameter_id_of(parameter).await,
        profile: profile.to_string(),
        parameter: parameter.to_string(),
    }
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// Test: the full phase order passes on clean fixture data, and association
/// records without resolved identifiers never trigger a delete (the read of
/// key (0, 0) returns nothing, which is a silent skip, not an error).
#[tokio::test]
async fn test_full_lifecycle_with_unresolved_keys_passes_and_skips_delete() {
    let session = Arc::new(InMemorySession::new());
    let suite = LifecycleSuite::new(session.clone(), fixture_set());

    let report = suite.run(DeleteMode::Sequential).await;

    assert!(report.passed(), "failures: {:?}", report.failures());
    assert_eq!(session.counters().create_profile_parameter(), 1);
    assert_eq!(
        session.counters().delete_profile_parameter(),
        0,
        "unresolved fixture keys must not produce delete calls"
    );
    // The created association survives the run; only resolved keys get deleted.
    assert_eq!(session.live_associations().await.len(), 1);
}

/// Test: round trip: after creating (P1, PARAM1), a composite-key read using
/// the server-assigned identifiers returns exactly one match.
#[tokio::test]
async fn test_round_trip() {
    let session = Arc::new(InMemorySession::new());
    session.create_profile(&profile_record("P1")).await.unwrap();
    session
        .create_parameter(&parameter_record("PARAM1"))
        .await
        .unwrap();

    let fixtures = FixtureSet {
        parameters: vec![parameter_record("PARAM1")],
        profiles: vec![profile_record("P1")],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.create_association().await;
    assert!(suite.report().passed());

    let profile_id = session.profile_id_of("P1").await.unwrap();
    let parameter_id = session.parameter_id_of("PARAM1").await.unwrap();
    let query = profile_parameter_query(profile_id, parameter_id);

    let matches = session.profile_parameters_by_query(&query).await.unwrap().body;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].profile, "P1");
    assert_eq!(matches[0].parameter, "PARAM1");
    assert_eq!(matches[0].profile_id, Some(profile_id));
    assert_eq!(matches[0].parameter_id, Some(parameter_id));
}

// =============================================================================
// Delete-and-Verify Tests
// =============================================================================

/// Test: delete completeness: after the delete phase, the composite-key read
/// returns zero matches.
#[tokio::test]
async fn test_delete_completeness() {
    let session = Arc::new(InMemorySession::new());
    seed_association(&session, "P1", "PARAM1").await;

    let fixtures = FixtureSet {
        profile_parameters: vec![resolved_association(&session, "P1", "PARAM1").await],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    assert!(suite.report().passed(), "failures: {:?}", suite.report().failures());
    assert_eq!(session.counters().delete_profile_parameter(), 1);
    assert!(session.live_associations().await.is_empty());
}

/// Test: idempotent-skip: a key that already reads back empty issues no
/// delete call and records no failure.
#[tokio::test]
async fn test_idempotent_skip() {
    let session = Arc::new(InMemorySession::new());

    let gone = ProfileParameter {
        profile_id: Some(42),
        parameter_id: Some(43),
        profile: "P1".to_string(),
        parameter: "PARAM1".to_string(),
    };
    let fixtures = FixtureSet {
        profile_parameters: vec![gone],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    assert!(suite.report().passed());
    assert_eq!(session.counters().delete_profile_parameter(), 0);
}

/// Test: the delete targets the identifiers the *server* returned from the
/// pre-delete read, not whatever the fixture record carried.
#[tokio::test]
async fn test_delete_uses_server_reported_identifiers() {
    let session = Arc::new(InMemorySession::new());
    seed_association(&session, "P1", "PARAM1").await;
    let resolved = resolved_association(&session, "P1", "PARAM1").await;

    // Same composite key, stale names; the lookup result drives the delete.
    let stale = ProfileParameter {
        profile: "renamed-profile".to_string(),
        parameter: "renamed-parameter".to_string(),
        ..resolved
    };
    let fixtures = FixtureSet {
        profile_parameters: vec![stale],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    assert!(suite.report().passed(), "failures: {:?}", suite.report().failures());
    assert!(session.live_associations().await.is_empty());
}

// =============================================================================
// Failure Isolation Tests
// =============================================================================

/// Test: a failing dependency phase is recorded and every later phase still
/// runs (best-effort diagnostics).
#[tokio::test]
async fn test_dependency_failure_recorded_and_run_continues() {
    let session = Arc::new(InMemorySession::with_config(MockSessionConfig {
        fail_cdn_creates: true,
        ..MockSessionConfig::default()
    }));
    let suite = LifecycleSuite::new(session.clone(), fixture_set());

    let report = suite.run(DeleteMode::Sequential).await;

    assert!(!report.passed());
    assert!(report
        .failures()
        .iter()
        .any(|f| f.kind == FailureKind::DependencyCreation));
    // Later phases still ran.
    assert_eq!(session.counters().create_profile(), 1);
    assert_eq!(session.counters().create_profile_parameter(), 1);
    // The CDN create failure is the only defect on this run: the cdn teardown
    // failure it causes is also recorded, everything else passes.
    assert!(report
        .failures()
        .iter()
        .all(|f| f.operation.contains("cdn")));
}

/// Test: a delete that reports success but leaves the record readable is a
/// verification failure, the higher-signal kind.
#[tokio::test]
async fn test_undead_delete_is_a_verification_failure() {
    let session = Arc::new(InMemorySession::with_config(MockSessionConfig {
        deletes_leave_record: true,
        ..MockSessionConfig::default()
    }));
    seed_association(&session, "P1", "PARAM1").await;

    let fixtures = FixtureSet {
        profile_parameters: vec![resolved_association(&session, "P1", "PARAM1").await],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    let failures = suite.report().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Verification);
}

/// Test: a failing pre-delete read aborts the item before any delete call.
#[tokio::test]
async fn test_read_error_aborts_item_before_delete() {
    let session = Arc::new(InMemorySession::with_config(MockSessionConfig {
        fail_association_reads: true,
        ..MockSessionConfig::default()
    }));
    seed_association(&session, "P1", "PARAM1").await;

    let fixtures = FixtureSet {
        profile_parameters: vec![resolved_association(&session, "P1", "PARAM1").await],
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    let failures = suite.report().failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::ClientCall);
    assert_eq!(
        session.counters().delete_profile_parameter(),
        0,
        "no delete may be attempted against unknown state"
    );
    // The association is untouched.
    assert_eq!(session.live_associations().await.len(), 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// Test: concurrent equivalence: N items with pairwise distinct composite
/// keys end in the same final state as the sequential procedure.
#[tokio::test]
async fn test_concurrent_delete_equivalence() {
    let session = Arc::new(InMemorySession::new());
    let mut associations = Vec::new();
    for i in 0..5 {
        let profile = format!("P{i}");
        let parameter = format!("PARAM{i}");
        seed_association(&session, &profile, &parameter).await;
        associations.push(resolved_association(&session, &profile, &parameter).await);
    }
    assert_eq!(session.live_associations().await.len(), 5);

    let fixtures = FixtureSet {
        profile_parameters: associations,
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations_concurrent().await;

    assert!(suite.report().passed(), "failures: {:?}", suite.report().failures());
    assert!(session.live_associations().await.is_empty());
    assert_eq!(session.counters().delete_profile_parameter(), 5);
}

/// Test: barrier completeness: delaying one task's read delays the overall
/// return by at least that amount; siblings still complete.
#[tokio::test]
async fn test_barrier_waits_for_slowest_task() {
    let stall = Duration::from_millis(150);

    let session = Arc::new(InMemorySession::new());
    let mut associations = Vec::new();
    for i in 0..3 {
        let profile = format!("P{i}");
        let parameter = format!("PARAM{i}");
        seed_association(&session, &profile, &parameter).await;
        associations.push(resolved_association(&session, &profile, &parameter).await);
    }
    session.stall_association_read(associations[1].composite_key(), stall);

    let fixtures = FixtureSet {
        profile_parameters: associations,
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);

    let start = Instant::now();
    suite.delete_associations_concurrent().await;
    let elapsed = start.elapsed();

    assert!(
        elapsed >= stall,
        "barrier returned after {elapsed:?}, before the stalled task could finish"
    );
    assert!(suite.report().passed(), "failures: {:?}", suite.report().failures());
    assert!(session.live_associations().await.is_empty());
}

/// Test: sequential delete keeps strict fixture order: with a uniform
/// per-call delay, every item's calls complete before the next item starts,
/// which the monotone call counters make observable.
#[tokio::test]
async fn test_sequential_delete_processes_items_in_order() {
    let session = Arc::new(InMemorySession::with_config(MockSessionConfig {
        communication_delay_ms: 1,
        ..MockSessionConfig::default()
    }));
    let mut associations = Vec::new();
    for i in 0..3 {
        let profile = format!("P{i}");
        let parameter = format!("PARAM{i}");
        seed_association(&session, &profile, &parameter).await;
        associations.push(resolved_association(&session, &profile, &parameter).await);
    }

    let fixtures = FixtureSet {
        profile_parameters: associations,
        ..FixtureSet::default()
    };
    let suite = LifecycleSuite::new(session.clone(), fixtures);
    suite.delete_associations().await;

    assert!(suite.report().passed());
    // Three items, each: read + delete + re-read.
    assert_eq!(session.counters().read_profile_parameters(), 6);
    assert_eq!(session.counters().delete_profile_parameter(), 3);
    assert!(session.live_associations().await.is_empty());
}
