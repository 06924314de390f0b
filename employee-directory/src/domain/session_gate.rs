//! Authentication gate in front of the directory feature.
//!
//! The gate reads the session provider's reactive snapshot and decides once
//! per mount whether the feature may run. Only an admitted gate can mount a
//! [`Dashboard`]; a denied gate asks the host shell for the sign-in screen.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use super::Identity;
use super::dashboard::Dashboard;
use super::ports::{EmployeeStore, NavigationIntent, Navigator, SessionProvider, SessionSnapshot};

/// Outcome of evaluating a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "identity", rename_all = "snake_case")]
pub enum AdmissionDecision {
    /// The provider is still resolving; nothing mounts.
    Pending,
    /// Nobody is signed in; the feature must not mount.
    Denied,
    /// The identity may use the feature.
    Admitted(Identity),
}

impl AdmissionDecision {
    /// Decide from a snapshot without side effects.
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        if snapshot.loading {
            return Self::Pending;
        }
        match &snapshot.identity {
            Some(identity) => Self::Admitted(identity.clone()),
            None => Self::Denied,
        }
    }

    /// Whether the decision is final.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Session gate bound to one provider subscription.
///
/// `Pending -> Denied | Admitted` is the only transition. Once resolved the
/// decision is fixed for the lifetime of the gate; a session change requires
/// a fresh mount.
pub struct SessionGate<P: ?Sized, N> {
    provider: Arc<P>,
    navigator: N,
    receiver: watch::Receiver<SessionSnapshot>,
    decision: Mutex<Option<AdmissionDecision>>,
}

impl<P: ?Sized, N> fmt::Debug for SessionGate<P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("decision", &*self.decision_slot())
            .finish_non_exhaustive()
    }
}

impl<P: ?Sized, N> SessionGate<P, N> {
    fn decision_slot(&self) -> MutexGuard<'_, Option<AdmissionDecision>> {
        self.decision
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P, N> SessionGate<P, N>
where
    P: SessionProvider + ?Sized,
    N: Navigator,
{
    /// Subscribe to `provider` and start in the pending state.
    #[must_use]
    pub fn mount(provider: Arc<P>, navigator: N) -> Self {
        let receiver = provider.subscribe();
        Self {
            provider,
            navigator,
            receiver,
            decision: Mutex::new(None),
        }
    }

    /// Decide from the current snapshot without waiting.
    ///
    /// The first resolved decision is stored. A denial emits the sign-in
    /// intent exactly once, on the call that resolves it.
    #[must_use]
    pub fn evaluate(&self) -> AdmissionDecision {
        let snapshot = self.receiver.borrow().clone();
        self.settle(&snapshot)
    }

    /// Wait until the provider stops loading, then decide.
    ///
    /// If the provider goes away while still loading the gate stays pending.
    pub async fn resolve(&self) -> AdmissionDecision {
        if let Some(decision) = self.decision_slot().clone() {
            return decision;
        }
        let mut receiver = self.receiver.clone();
        let snapshot = match receiver.wait_for(|snapshot| !snapshot.loading).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => {
                debug!("session provider closed before resolving");
                return AdmissionDecision::Pending;
            }
        };
        self.settle(&snapshot)
    }

    fn settle(&self, snapshot: &SessionSnapshot) -> AdmissionDecision {
        let mut slot = self.decision_slot();
        if let Some(decision) = slot.as_ref() {
            return decision.clone();
        }
        let decision = AdmissionDecision::from_snapshot(snapshot);
        if !decision.is_resolved() {
            return decision;
        }
        *slot = Some(decision.clone());
        drop(slot);

        debug!(?decision, "session gate resolved");
        if decision == AdmissionDecision::Denied {
            self.navigator.navigate(NavigationIntent::SignIn);
        }
        decision
    }

    /// Mount the dashboard when the gate has admitted an identity.
    ///
    /// The dashboard's initial load runs once, here. A failed load leaves the
    /// dashboard mounted with [`LoadStatus::Failed`](super::LoadStatus::Failed);
    /// calling `load_all` again is the manual retry.
    pub async fn admit<S>(&self, store: Arc<S>) -> Option<Dashboard<S>>
    where
        S: EmployeeStore + ?Sized,
    {
        let AdmissionDecision::Admitted(identity) = self.evaluate() else {
            return None;
        };
        let dashboard = Dashboard::new(identity, store);
        if let Err(error) = dashboard.load_all().await {
            debug!(%error, "dashboard mounted after a failed initial load");
        }
        Some(dashboard)
    }

    /// End the session and ask for the sign-in screen.
    ///
    /// Form and directory state are left to their owners.
    pub async fn log_out(&self) {
        self.provider.end_session().await;
        debug!("session ended");
        self.navigator.navigate(NavigationIntent::SignIn);
    }

    /// Drop the provider subscription.
    pub fn teardown(self) {
        debug!(decision = ?self.decision_slot().as_ref(), "session gate torn down");
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::LoadStatus;
    use crate::domain::ports::{
        EmployeeStoreError, FixtureEmployeeStore, FixtureSessionProvider, MockNavigator,
        MockSessionProvider, RecordingNavigator,
    };
    use crate::test_support::records::stored;
    use crate::test_support::store::ScriptedEmployeeStore;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn identity() -> Identity {
        FixtureSessionProvider::fixture_identity()
    }

    fn mount_gate(
        provider: FixtureSessionProvider,
    ) -> (
        SessionGate<FixtureSessionProvider, Arc<RecordingNavigator>>,
        Arc<FixtureSessionProvider>,
        Arc<RecordingNavigator>,
    ) {
        let provider = Arc::new(provider);
        let navigator = Arc::new(RecordingNavigator::default());
        let gate = SessionGate::mount(Arc::clone(&provider), Arc::clone(&navigator));
        (gate, provider, navigator)
    }

    #[rstest]
    #[case(SessionSnapshot::loading(), AdmissionDecision::Pending)]
    #[case(SessionSnapshot::signed_out(), AdmissionDecision::Denied)]
    #[case(
        SessionSnapshot::signed_in(identity()),
        AdmissionDecision::Admitted(identity())
    )]
    fn decision_follows_snapshot(
        #[case] snapshot: SessionSnapshot,
        #[case] expected: AdmissionDecision,
    ) {
        assert_eq!(AdmissionDecision::from_snapshot(&snapshot), expected);
    }

    #[rstest]
    fn loading_identity_is_still_pending() {
        let snapshot = SessionSnapshot {
            identity: Some(identity()),
            loading: true,
        };
        assert_eq!(
            AdmissionDecision::from_snapshot(&snapshot),
            AdmissionDecision::Pending
        );
    }

    #[rstest]
    #[tokio::test]
    async fn pending_gate_has_no_side_effects() {
        let (gate, _provider, navigator) = mount_gate(FixtureSessionProvider::loading());
        let store = Arc::new(ScriptedEmployeeStore::default());
        assert_eq!(gate.evaluate(), AdmissionDecision::Pending);
        assert!(gate.admit(Arc::clone(&store)).await.is_none());
        assert_eq!(store.list_calls(), 0);
        assert!(navigator.intents().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn denial_navigates_to_sign_in_once() {
        let (gate, _provider, navigator) = mount_gate(FixtureSessionProvider::signed_out());
        assert_eq!(gate.evaluate(), AdmissionDecision::Denied);
        assert_eq!(gate.evaluate(), AdmissionDecision::Denied);
        assert!(
            gate.admit(Arc::new(FixtureEmployeeStore::default()))
                .await
                .is_none()
        );
        assert_eq!(navigator.intents(), [NavigationIntent::SignIn]);
    }

    #[rstest]
    fn resolved_decision_ignores_later_snapshots() {
        let (gate, provider, navigator) = mount_gate(FixtureSessionProvider::signed_in(identity()));
        assert_eq!(gate.evaluate(), AdmissionDecision::Admitted(identity()));

        provider.resolve(None);

        assert_eq!(gate.evaluate(), AdmissionDecision::Admitted(identity()));
        assert!(navigator.intents().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_waits_for_the_provider() {
        let (gate, provider, _navigator) = mount_gate(FixtureSessionProvider::loading());
        let resolver = async {
            tokio::task::yield_now().await;
            provider.resolve(Some(identity()));
        };

        let (decision, ()) = tokio::join!(gate.resolve(), resolver);

        assert_eq!(decision, AdmissionDecision::Admitted(identity()));
        let dashboard = gate
            .admit(Arc::new(FixtureEmployeeStore::default()))
            .await
            .expect("admitted gate mounts the dashboard");
        assert_eq!(dashboard.identity(), &identity());
        assert_eq!(dashboard.directory().load_status(), LoadStatus::Loaded);
    }

    #[rstest]
    #[tokio::test]
    async fn admission_runs_the_initial_load_once() {
        let (gate, _provider, _navigator) =
            mount_gate(FixtureSessionProvider::signed_in(identity()));
        let store = Arc::new(ScriptedEmployeeStore::default());
        store.push_list(Ok(vec![stored("a", "Ada"), stored("b", "Brian")]));

        let dashboard = gate
            .admit(Arc::clone(&store))
            .await
            .expect("admitted gate mounts the dashboard");

        assert_eq!(store.list_calls(), 1);
        assert_eq!(dashboard.directory().records().len(), 2);
        assert_eq!(dashboard.directory().load_status(), LoadStatus::Loaded);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_initial_load_still_mounts_the_dashboard() {
        let (gate, _provider, _navigator) =
            mount_gate(FixtureSessionProvider::signed_in(identity()));
        let store = Arc::new(ScriptedEmployeeStore::default());
        store.push_list(Err(EmployeeStoreError::unavailable("offline")));

        let dashboard = gate
            .admit(Arc::clone(&store))
            .await
            .expect("admission does not depend on the load");

        assert!(matches!(
            dashboard.directory().load_status(),
            LoadStatus::Failed(_)
        ));
        assert!(dashboard.directory().records().is_empty());
        assert_eq!(store.list_calls(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn log_out_ends_session_then_navigates() {
        let mut sequence = Sequence::new();
        let mut provider = MockSessionProvider::new();
        let (_sender, receiver) = watch::channel(SessionSnapshot::signed_in(identity()));
        provider.expect_subscribe().return_once(move || receiver);
        provider
            .expect_end_session()
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .with(eq(NavigationIntent::SignIn))
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());
        let gate = SessionGate::mount(Arc::new(provider), navigator);

        gate.log_out().await;

        gate.teardown();
    }

    #[rstest]
    #[tokio::test]
    async fn log_out_clears_the_fixture_session() {
        let (gate, provider, navigator) = mount_gate(FixtureSessionProvider::signed_in(identity()));
        assert!(gate.evaluate().is_resolved());

        gate.log_out().await;

        assert_eq!(provider.current(), SessionSnapshot::signed_out());
        assert_eq!(navigator.intents(), [NavigationIntent::SignIn]);
    }
}
