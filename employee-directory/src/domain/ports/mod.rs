//! Driven ports for the directory core and their fixture implementations.

mod macros;
pub(crate) use macros::define_port_error;

mod employee_store;
mod navigator;
mod session_provider;

#[cfg(test)]
pub use employee_store::MockEmployeeStore;
pub use employee_store::{
    DEFAULT_EMPLOYEE_COLLECTION, EmployeeStore, EmployeeStoreError, FixtureEmployeeStore,
};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::{NavigationIntent, Navigator, RecordingNavigator, TracingNavigator};
#[cfg(test)]
pub use session_provider::{MockAuthenticator, MockSessionProvider};
pub use session_provider::{
    Authenticator, FIXTURE_EMAIL, FIXTURE_PASSWORD, FixtureSessionProvider, SessionError,
    SessionProvider, SessionSnapshot,
};
