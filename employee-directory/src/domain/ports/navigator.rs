//! Navigation side-effect port.
//!
//! The core never renders screens. It emits [`NavigationIntent`]s and leaves
//! routing to whichever shell hosts it.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

/// Screens the core may ask the host shell to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationIntent {
    /// The sign-in screen.
    SignIn,
    /// The sign-up screen.
    SignUp,
    /// The authenticated dashboard.
    Dashboard,
}

/// Port receiving navigation intents.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Ask the host shell to show `intent`.
    fn navigate(&self, intent: NavigationIntent);
}

/// Navigator that records intents for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    intents: Mutex<Vec<NavigationIntent>>,
}

impl RecordingNavigator {
    /// Intents received so far, oldest first.
    #[must_use]
    pub fn intents(&self) -> Vec<NavigationIntent> {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, intent: NavigationIntent) {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(intent);
    }
}

/// Navigator for headless hosts: logs each intent and does nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, intent: NavigationIntent) {
        info!(?intent, "navigation requested");
    }
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn navigate(&self, intent: NavigationIntent) {
        (**self).navigate(intent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::default();
        navigator.navigate(NavigationIntent::SignIn);
        navigator.navigate(NavigationIntent::Dashboard);
        assert_eq!(
            navigator.intents(),
            [NavigationIntent::SignIn, NavigationIntent::Dashboard]
        );
    }

    #[rstest]
    #[case(NavigationIntent::SignIn, "sign_in")]
    #[case(NavigationIntent::SignUp, "sign_up")]
    #[case(NavigationIntent::Dashboard, "dashboard")]
    fn intents_serialise_snake_case(#[case] intent: NavigationIntent, #[case] expected: &str) {
        let value = serde_json::to_value(intent).expect("serialise intent");
        assert_eq!(value, serde_json::Value::String(expected.to_owned()));
    }
}
