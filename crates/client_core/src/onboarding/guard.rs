use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{BarRecord, Session};
use tracing::info;

pub const ONBOARDING_ROUTE: &str = "/onboarding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OnboardingGuardResult {
    pub should_redirect: bool,
    pub bar_setup_complete: bool,
    pub onboarding_complete: bool,
}

pub fn evaluate(
    session: Option<&Session>,
    bar: Option<&BarRecord>,
    onboarding_complete: bool,
) -> OnboardingGuardResult {
    let bar_setup_complete = bar.is_some_and(|bar| bar.is_setup_complete);
    OnboardingGuardResult {
        should_redirect: session.is_some()
            && bar.is_some()
            && !bar_setup_complete
            && !onboarding_complete,
        bar_setup_complete,
        onboarding_complete,
    }
}

/// Replace-style navigation; the guarded page must not stay in history.
pub trait Navigator {
    fn replace(&self, path: &str);
}

impl<F: Fn(&str)> Navigator for F {
    fn replace(&self, path: &str) {
        self(path)
    }
}

/// Fires the onboarding redirect on the false→true edge of `should_redirect`.
pub struct OnboardingGuard<N: Navigator> {
    navigator: N,
    was_redirecting: bool,
}

impl<N: Navigator> OnboardingGuard<N> {
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            was_redirecting: false,
        }
    }

    pub fn observe(
        &mut self,
        session: Option<&Session>,
        bar: Option<&BarRecord>,
        onboarding_complete: bool,
    ) -> OnboardingGuardResult {
        let result = evaluate(session, bar, onboarding_complete);
        if result.should_redirect && !self.was_redirecting {
            info!(
                bar_id = ?bar.map(|bar| bar.id),
                "bar setup incomplete; redirecting to onboarding"
            );
            self.navigator.replace(ONBOARDING_ROUTE);
        }
        self.was_redirecting = result.should_redirect;
        result
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }
}

pub fn can_create_sale(bar: Option<&BarRecord>) -> bool {
    bar.is_some_and(|bar| bar.is_setup_complete)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagerAccessPolicy {
    pub can_access: bool,
    pub requires_setup_complete: bool,
}

/// Managers keep full access while the owner finishes setup.
pub fn manager_access_policy() -> ManagerAccessPolicy {
    ManagerAccessPolicy {
        can_access: true,
        requires_setup_complete: false,
    }
}

pub fn banner_visible(
    bar: Option<&BarRecord>,
    dismissed: bool,
    deferred_until: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let deferral_elapsed = deferred_until.map_or(true, |until| now >= until);
    bar.is_some_and(|bar| !bar.is_setup_complete) && !dismissed && deferral_elapsed
}
