//! In-memory session for testing without a live ConfOps deployment.
//!
//! [`InMemorySession`] implements the full [`ConfOpsSession`] contract against
//! process-local state: names resolve to deterministically assigned identifiers,
//! the composite-key uniqueness rule is enforced, and deleting a non-existent
//! pair errors the way the real endpoint does. All waiting uses
//! `tokio::time::sleep`, never a blocking sleep.
//!
//! The mock is configurable the way real runs misbehave: a uniform communication
//! delay, injected call failures, and "undead" deletes that report success while
//! leaving the record readable. Per-key read stalls support barrier-timing tests.

use crate::error::{SessionError, SessionResult};
use crate::model::{Cdn, Parameter, Profile, ProfileParameter, Reply, TypeResource};
use crate::session::ConfOpsSession;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

// =============================================================================
// Configuration
// =============================================================================

/// Behavior knobs for the in-memory session.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSessionConfig {
    /// Uniform delay applied to every call, simulating network latency.
    pub communication_delay_ms: u64,
    /// Every CDN create fails with HTTP 500.
    pub fail_cdn_creates: bool,
    /// Every association read fails with HTTP 500.
    pub fail_association_reads: bool,
    /// Association deletes report success but leave the record readable.
    pub deletes_leave_record: bool,
}

/// Per-operation call counts, for asserting what the orchestrator actually issued.
#[derive(Debug, Default)]
pub struct CallCounters {
    create_profile_parameter: AtomicUsize,
    read_profile_parameters: AtomicUsize,
    delete_profile_parameter: AtomicUsize,
    create_profile: AtomicUsize,
}

impl CallCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Association create calls issued so far.
    pub fn create_profile_parameter(&self) -> usize {
        self.create_profile_parameter.load(Ordering::SeqCst)
    }

    /// Association composite-key reads issued so far.
    pub fn read_profile_parameters(&self) -> usize {
        self.read_profile_parameters.load(Ordering::SeqCst)
    }

    /// Association delete calls issued so far.
    pub fn delete_profile_parameter(&self) -> usize {
        self.delete_profile_parameter.load(Ordering::SeqCst)
    }

    /// Profile fixture create calls issued so far.
    pub fn create_profile(&self) -> usize {
        self.create_profile.load(Ordering::SeqCst)
    }
}

// =============================================================================
// InMemorySession
// =============================================================================

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    cdns: HashSet<String>,
    types: HashSet<String>,
    parameters: HashMap<String, u64>,
    profiles: HashMap<String, u64>,
    /// Composite key -> (profile name, parameter name).
    associations: HashMap<(u64, u64), (String, String)>,
}

impl State {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of the [`ConfOpsSession`] contract.
#[derive(Debug, Default)]
pub struct InMemorySession {
    config: MockSessionConfig,
    state: Mutex<State>,
    stalls: StdMutex<HashMap<(u64, u64), Duration>>,
    counters: CallCounters,
}

impl InMemorySession {
    /// Create a session with default behavior: no delay, no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with the given behavior knobs.
    pub fn with_config(config: MockSessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Per-operation call counts.
    pub fn counters(&self) -> &CallCounters {
        &self.counters
    }

    /// Stall the next and all further reads of `key` by an extra `delay`.
    pub fn stall_association_read(&self, key: (u64, u64), delay: Duration) {
        self.stall_map().insert(key, delay);
    }

    /// Snapshot of the live composite keys.
    pub async fn live_associations(&self) -> Vec<(u64, u64)> {
        let state = self.state.lock().await;
        let mut keys: Vec<_> = state.associations.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Identifier assigned to a profile name, if it was created.
    pub async fn profile_id_of(&self, name: &str) -> Option<u64> {
        self.state.lock().await.profiles.get(name).copied()
    }

    /// Identifier assigned to a parameter name, if it was created.
    pub async fn parameter_id_of(&self, name: &str) -> Option<u64> {
        self.state.lock().await.parameters.get(name).copied()
    }

    async fn communication_delay(&self) {
        if self.config.communication_delay_ms > 0 {
            sleep(Duration::from_millis(self.config.communication_delay_ms)).await;
        }
    }

    fn stall_map(&self) -> std::sync::MutexGuard<'_, HashMap<(u64, u64), Duration>> {
        self.stalls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_composite_query(query: &str) -> SessionResult<(u64, u64)> {
    let raw = query
        .strip_prefix('?')
        .ok_or_else(|| SessionError::http(400, format!("malformed query: {query}")))?;

    let mut profile_id = None;
    let mut parameter_id = None;
    for pair in raw.split('&') {
        match pair.split_once('=') {
            Some(("profileId", value)) => profile_id = value.parse().ok(),
            Some(("parameterId", value)) => parameter_id = value.parse().ok(),
            _ => {}
        }
    }

    match (profile_id, parameter_id) {
        (Some(profile_id), Some(parameter_id)) => Ok((profile_id, parameter_id)),
        _ => Err(SessionError::http(400, format!("malformed query: {query}"))),
    }
}

#[async_trait]
impl ConfOpsSession for InMemorySession {
    async fn create_cdn(&self, cdn: &Cdn) -> SessionResult<Reply<Cdn>> {
        self.communication_delay().await;
        if self.config.fail_cdn_creates {
            return Err(SessionError::http(500, "injected cdn create failure"));
        }
        let mut state = self.state.lock().await;
        if !state.cdns.insert(cdn.name.clone()) {
            return Err(SessionError::http(400, format!("cdn {} already exists", cdn.name)));
        }
        Ok(Reply::new(cdn.clone(), 200))
    }

    async fn delete_cdn(&self, name: &str) -> SessionResult<Reply<()>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if !state.cdns.remove(name) {
            return Err(SessionError::http(404, format!("no such cdn {name}")));
        }
        Ok(Reply::new((), 200))
    }

    async fn create_type(&self, ty: &TypeResource) -> SessionResult<Reply<TypeResource>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if !state.types.insert(ty.name.clone()) {
            return Err(SessionError::http(400, format!("type {} already exists", ty.name)));
        }
        Ok(Reply::new(ty.clone(), 200))
    }

    async fn delete_type(&self, name: &str) -> SessionResult<Reply<()>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if !state.types.remove(name) {
            return Err(SessionError::http(404, format!("no such type {name}")));
        }
        Ok(Reply::new((), 200))
    }

    async fn create_parameter(&self, parameter: &Parameter) -> SessionResult<Reply<Parameter>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if state.parameters.contains_key(&parameter.name) {
            return Err(SessionError::http(
                400,
                format!("parameter {} already exists", parameter.name),
            ));
        }
        let id = state.alloc_id();
        state.parameters.insert(parameter.name.clone(), id);
        Ok(Reply::new(parameter.clone(), 200))
    }

    async fn delete_parameter(&self, name: &str) -> SessionResult<Reply<()>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if state.parameters.remove(name).is_none() {
            return Err(SessionError::http(404, format!("no such parameter {name}")));
        }
        Ok(Reply::new((), 200))
    }

    async fn create_profile(&self, profile: &Profile) -> SessionResult<Reply<Profile>> {
        self.communication_delay().await;
        CallCounters::bump(&self.counters.create_profile);
        let mut state = self.state.lock().await;
        if state.profiles.contains_key(&profile.name) {
            return Err(SessionError::http(
                400,
                format!("profile {} already exists", profile.name),
            ));
        }
        let id = state.alloc_id();
        state.profiles.insert(profile.name.clone(), id);
        Ok(Reply::new(profile.clone(), 200))
    }

    async fn delete_profile(&self, name: &str) -> SessionResult<Reply<()>> {
        self.communication_delay().await;
        let mut state = self.state.lock().await;
        if state.profiles.remove(name).is_none() {
            return Err(SessionError::http(404, format!("no such profile {name}")));
        }
        Ok(Reply::new((), 200))
    }

    async fn create_profile_parameter(
        &self,
        assoc: &ProfileParameter,
    ) -> SessionResult<Reply<ProfileParameter>> {
        self.communication_delay().await;
        CallCounters::bump(&self.counters.create_profile_parameter);
        let mut state = self.state.lock().await;

        let profile_id = *state
            .profiles
            .get(&assoc.profile)
            .ok_or_else(|| SessionError::http(404, format!("no such profile {}", assoc.profile)))?;
        let parameter_id = *state.parameters.get(&assoc.parameter).ok_or_else(|| {
            SessionError::http(404, format!("no such parameter {}", assoc.parameter))
        })?;

        let key = (profile_id, parameter_id);
        if state.associations.contains_key(&key) {
            return Err(SessionError::http(
                400,
                format!("profile parameter ({profile_id}, {parameter_id}) already exists"),
            ));
        }
        state
            .associations
            .insert(key, (assoc.profile.clone(), assoc.parameter.clone()));

        let view = ProfileParameter {
            profile_id: Some(profile_id),
            parameter_id: Some(parameter_id),
            profile: assoc.profile.clone(),
            parameter: assoc.parameter.clone(),
        };
        Ok(Reply::new(view, 200))
    }

    async fn profile_parameters_by_query(
        &self,
        query: &str,
    ) -> SessionResult<Reply<Vec<ProfileParameter>>> {
        self.communication_delay().await;
        CallCounters::bump(&self.counters.read_profile_parameters);
        if self.config.fail_association_reads {
            return Err(SessionError::http(500, "injected association read failure"));
        }

        let key = parse_composite_query(query)?;
        let stall = self.stall_map().get(&key).copied();
        if let Some(delay) = stall {
            sleep(delay).await;
        }

        let state = self.state.lock().await;
        let matches = state
            .associations
            .get(&key)
            .map(|(profile, parameter)| ProfileParameter {
                profile_id: Some(key.0),
                parameter_id: Some(key.1),
                profile: profile.clone(),
                parameter: parameter.clone(),
            })
            .into_iter()
            .collect();
        Ok(Reply::new(matches, 200))
    }

    async fn delete_profile_parameter(
        &self,
        profile_id: u64,
        parameter_id: u64,
    ) -> SessionResult<Reply<()>> {
        self.communication_delay().await;
        CallCounters::bump(&self.counters.delete_profile_parameter);
        let mut state = self.state.lock().await;

        let key = (profile_id, parameter_id);
        if !state.associations.contains_key(&key) {
            return Err(SessionError::http(
                404,
                format!("no such profile parameter ({profile_id}, {parameter_id})"),
            ));
        }
        if !self.config.deletes_leave_record {
            state.associations.remove(&key);
        }
        Ok(Reply::new((), 200))
    }
}
