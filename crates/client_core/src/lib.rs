//! Client-side coordination for the bar POS front end: dialog state,
//! onboarding routing, and lazily loaded UI modules.

pub mod animation;
pub mod modal;
pub mod module_loader;
pub mod onboarding;

pub use animation::{animation_library, AnimationLibrary, AnimationPreset, Easing};
pub use modal::{reduce, ModalAction, ModalName, ModalState, ModalStore};
pub use module_loader::{LazyModule, ModuleHandle, ModuleLoadError, ModuleSource};
pub use onboarding::{
    evaluate as evaluate_onboarding, Navigator, OnboardingGuard, OnboardingGuardResult,
    OnboardingProgress, OnboardingStep,
};
