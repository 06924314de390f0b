//! Behaviour tests for the session gate and the sign-in form.
//!
//! Scenarios run against the watch-channel fixture provider and record the
//! navigation intents the gate and form emit.

use std::cell::RefCell;
use std::sync::Arc;

use employee_directory::domain::ports::{
    FixtureEmployeeStore, FixtureSessionProvider, NavigationIntent, RecordingNavigator,
    SessionProvider,
};
use employee_directory::domain::{AdmissionDecision, SessionGate, SignInField, SignInForm};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

type Gate = SessionGate<FixtureSessionProvider, Arc<RecordingNavigator>>;

struct GateWorld {
    runtime: Runtime,
    navigator: Arc<RecordingNavigator>,
    provider: RefCell<Option<Arc<FixtureSessionProvider>>>,
    gate: RefCell<Option<Gate>>,
    decision: RefCell<Option<AdmissionDecision>>,
    auth_error: RefCell<Option<String>>,
}

impl GateWorld {
    fn new() -> Self {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime should build");
        Self {
            runtime,
            navigator: Arc::new(RecordingNavigator::default()),
            provider: RefCell::new(None),
            gate: RefCell::new(None),
            decision: RefCell::new(None),
            auth_error: RefCell::new(None),
        }
    }

    fn set_provider(&self, provider: FixtureSessionProvider) {
        *self.provider.borrow_mut() = Some(Arc::new(provider));
    }

    fn provider(&self) -> Arc<FixtureSessionProvider> {
        Arc::clone(
            self.provider
                .borrow()
                .as_ref()
                .expect("provider should be configured"),
        )
    }

    fn with_gate<T>(&self, f: impl FnOnce(&Gate) -> T) -> T {
        if self.gate.borrow().is_none() {
            let gate = SessionGate::mount(self.provider(), Arc::clone(&self.navigator));
            *self.gate.borrow_mut() = Some(gate);
        }
        let gate = self.gate.borrow();
        f(gate.as_ref().expect("gate should be mounted"))
    }

    fn intents(&self) -> Vec<NavigationIntent> {
        self.navigator.intents()
    }
}

#[fixture]
fn world() -> GateWorld {
    GateWorld::new()
}

#[given("a session that is still resolving")]
fn a_session_that_is_still_resolving(world: &GateWorld) {
    world.set_provider(FixtureSessionProvider::loading());
}

#[given("nobody is signed in")]
fn nobody_is_signed_in(world: &GateWorld) {
    world.set_provider(FixtureSessionProvider::signed_out());
}

#[given("the fixture account is signed in")]
fn the_fixture_account_is_signed_in(world: &GateWorld) {
    world.set_provider(FixtureSessionProvider::signed_in(
        FixtureSessionProvider::fixture_identity(),
    ));
}

#[when("the gate is mounted")]
fn the_gate_is_mounted(world: &GateWorld) {
    let decision = world.with_gate(Gate::evaluate);
    *world.decision.borrow_mut() = Some(decision);
}

#[when("the session resolves with the fixture account")]
fn the_session_resolves_with_the_fixture_account(world: &GateWorld) {
    world.with_gate(|_| {});
    world
        .provider()
        .resolve(Some(FixtureSessionProvider::fixture_identity()));
}

#[when("the gate resolves")]
fn the_gate_resolves(world: &GateWorld) {
    let decision = world.with_gate(|gate| world.runtime.block_on(gate.resolve()));
    *world.decision.borrow_mut() = Some(decision);
}

#[when("the user signs in as {email} with password {password}")]
fn the_user_signs_in(world: &GateWorld, email: String, password: String) {
    let form = SignInForm::new(world.provider(), Arc::clone(&world.navigator));
    form.set_field(SignInField::Email, email);
    form.set_field(SignInField::Password, password);
    // Refused credentials surface through `auth_error`.
    let _submitted = world.runtime.block_on(form.submit());
    *world.auth_error.borrow_mut() = form.auth_error();
}

#[when("the user logs out")]
fn the_user_logs_out(world: &GateWorld) {
    world.with_gate(|gate| world.runtime.block_on(gate.log_out()));
}

#[then("the gate is pending")]
fn the_gate_is_pending(world: &GateWorld) {
    assert_eq!(
        world.decision.borrow().as_ref(),
        Some(&AdmissionDecision::Pending)
    );
}

#[then("entry is denied")]
fn entry_is_denied(world: &GateWorld) {
    assert_eq!(
        world.decision.borrow().as_ref(),
        Some(&AdmissionDecision::Denied)
    );
    let store = Arc::new(FixtureEmployeeStore::default());
    let admitted = world.with_gate(|gate| world.runtime.block_on(gate.admit(store)));
    assert!(admitted.is_none());
}

#[then("the dashboard is shown for {email}")]
fn the_dashboard_is_shown_for(world: &GateWorld, email: String) {
    let store = Arc::new(FixtureEmployeeStore::default());
    let dashboard = world
        .with_gate(|gate| {
            world.runtime.block_on(async {
                gate.resolve().await;
                gate.admit(store).await
            })
        })
        .expect("dashboard should be admitted");
    assert_eq!(dashboard.identity().email(), email);
}

#[then("no navigation was requested")]
fn no_navigation_was_requested(world: &GateWorld) {
    assert!(world.intents().is_empty());
}

#[then("the sign-in screen was requested once")]
fn the_sign_in_screen_was_requested_once(world: &GateWorld) {
    let sign_in_requests = world
        .intents()
        .into_iter()
        .filter(|intent| *intent == NavigationIntent::SignIn)
        .count();
    assert_eq!(sign_in_requests, 1);
}

#[then("the dashboard screen was requested")]
fn the_dashboard_screen_was_requested(world: &GateWorld) {
    assert_eq!(world.intents(), [NavigationIntent::Dashboard]);
}

#[then("the sign-in error reads {message}")]
fn the_sign_in_error_reads(world: &GateWorld, message: String) {
    assert_eq!(world.auth_error.borrow().as_deref(), Some(message.as_str()));
}

#[then("the session has ended")]
fn the_session_has_ended(world: &GateWorld) {
    let snapshot = world.provider().current();
    assert!(snapshot.identity.is_none());
    assert!(!snapshot.loading);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "The gate waits while the session is resolving"
)]
fn gate_waits_while_resolving(world: GateWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "A signed-out visitor is sent to sign in"
)]
fn signed_out_visitor_is_sent_to_sign_in(world: GateWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "A session that resolves later admits the account"
)]
fn late_session_admits_the_account(world: GateWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "Refused credentials show the provider message"
)]
fn refused_credentials_show_provider_message(world: GateWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "Accepted credentials open the dashboard"
)]
fn accepted_credentials_open_the_dashboard(world: GateWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_gate.feature",
    name = "Logging out returns to sign in"
)]
fn logging_out_returns_to_sign_in(world: GateWorld) {
    drop(world);
}
