use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::domain::{BarId, UserId, UserRole};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    RoleDetected,

    OwnerBarDetails,
    OwnerAddManagers,
    OwnerSetupStaff,
    OwnerAddProducts,
    OwnerStockInit,
    OwnerClosingHour,
    OwnerReview,

    ManagerRoleConfirm,
    ManagerCheckStaff,
    ManagerTour,

    BartenderIntro,
    BartenderDemo,
    BartenderTestSale,

    Complete,
}

/// Steps for `role`, always opening with the shared intro and ending on `Complete`.
pub fn step_sequence(role: Option<UserRole>) -> Vec<OnboardingStep> {
    use OnboardingStep::*;

    let role_steps: &[OnboardingStep] = match role {
        Some(UserRole::Owner) => &[
            OwnerBarDetails,
            OwnerAddManagers,
            OwnerSetupStaff,
            OwnerAddProducts,
            OwnerStockInit,
            OwnerClosingHour,
            OwnerReview,
        ],
        Some(UserRole::Manager) => &[ManagerRoleConfirm, ManagerCheckStaff, ManagerTour],
        Some(UserRole::Bartender) => &[BartenderIntro, BartenderDemo, BartenderTestSale],
        None => &[],
    };

    let mut sequence = vec![Welcome, RoleDetected];
    sequence.extend_from_slice(role_steps);
    sequence.push(Complete);
    sequence
}

/// A step outside the role's sequence restarts it from the first step.
fn next_step(current: OnboardingStep, role: Option<UserRole>) -> OnboardingStep {
    let sequence = step_sequence(role);
    match sequence.iter().position(|step| *step == current) {
        Some(index) => sequence
            .get(index + 1)
            .copied()
            .unwrap_or(OnboardingStep::Complete),
        None => sequence[0],
    }
}

fn previous_step(current: OnboardingStep, role: Option<UserRole>) -> OnboardingStep {
    let sequence = step_sequence(role);
    match sequence.iter().position(|step| *step == current) {
        Some(index) if index > 0 => sequence[index - 1],
        _ => sequence[0],
    }
}

/// Progress of one member through onboarding; serializable so the host can persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingProgress {
    pub is_active: bool,
    pub user_id: Option<UserId>,
    pub bar_id: Option<BarId>,
    pub role: Option<UserRole>,
    pub current_step: OnboardingStep,
    pub completed_steps: Vec<OnboardingStep>,
    #[serde(default)]
    pub step_data: BTreeMap<OnboardingStep, serde_json::Value>,
    pub is_complete: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Default for OnboardingProgress {
    fn default() -> Self {
        Self {
            is_active: false,
            user_id: None,
            bar_id: None,
            role: None,
            current_step: OnboardingStep::Welcome,
            completed_steps: Vec::new(),
            step_data: BTreeMap::new(),
            is_complete: false,
            started_at: None,
            last_updated_at: None,
        }
    }
}

impl OnboardingProgress {
    /// An unknown role falls back to the bartender path.
    pub fn initialize(&mut self, user_id: UserId, bar_id: BarId, role: Option<UserRole>) {
        let role = role.or(Some(UserRole::Bartender));
        let now = Utc::now();
        *self = Self {
            is_active: true,
            user_id: Some(user_id),
            bar_id: Some(bar_id),
            role,
            started_at: Some(now),
            last_updated_at: Some(now),
            ..Self::default()
        };
        debug!(%user_id, %bar_id, ?role, "onboarding started");
    }

    pub fn steps(&self) -> Vec<OnboardingStep> {
        step_sequence(self.role)
    }

    pub fn go_to_step(&mut self, step: OnboardingStep) {
        self.current_step = step;
        self.touch();
    }

    pub fn next_step(&mut self) {
        let next = next_step(self.current_step, self.role);
        self.current_step = next;
        self.is_complete = next == OnboardingStep::Complete;
        self.touch();
    }

    pub fn previous_step(&mut self) {
        self.current_step = previous_step(self.current_step, self.role);
        self.touch();
    }

    pub fn skip_step(&mut self) {
        self.next_step();
    }

    pub fn skip_tour(&mut self) {
        self.complete_onboarding();
    }

    pub fn complete_step(&mut self, step: OnboardingStep, data: Option<serde_json::Value>) {
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
        if let Some(data) = data {
            self.step_data.insert(step, data);
        }
        self.touch();
    }

    pub fn update_step_data(&mut self, step: OnboardingStep, data: serde_json::Value) {
        self.step_data.insert(step, data);
        self.touch();
    }

    pub fn complete_onboarding(&mut self) {
        self.is_complete = true;
        self.current_step = OnboardingStep::Complete;
        self.touch();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction of the role's steps already behind the current one.
    pub fn progress_ratio(&self) -> f32 {
        let sequence = self.steps();
        let last = sequence.len().saturating_sub(1).max(1);
        let index = sequence
            .iter()
            .position(|step| *step == self.current_step)
            .unwrap_or(0);
        index as f32 / last as f32
    }

    fn touch(&mut self) {
        self.last_updated_at = Some(Utc::now());
    }
}
