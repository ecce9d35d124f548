//! Onboarding redirect guard and the role-based onboarding walkthrough.

mod flow;
mod guard;

pub use flow::{step_sequence, OnboardingProgress, OnboardingStep};
pub use guard::{
    banner_visible, can_create_sale, evaluate, manager_access_policy, ManagerAccessPolicy,
    Navigator, OnboardingGuard, OnboardingGuardResult, ONBOARDING_ROUTE,
};

#[cfg(test)]
#[path = "../tests/onboarding_tests.rs"]
mod tests;
