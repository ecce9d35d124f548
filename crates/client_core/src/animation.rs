//! Animation preset catalogue, loaded lazily through the shared module cache.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use async_trait::async_trait;
use serde::Deserialize;

use crate::module_loader::{LazyModule, ModuleLoadError, ModuleSource};

const BUNDLED_PRESETS: &str = include_str!("../assets/animation_presets.json");
const MODULE_NAME: &str = "animations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Spring,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Keyframe {
    pub offset: f32,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub translate_y: Option<f32>,
    #[serde(default)]
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationPreset {
    pub name: String,
    pub duration_ms: u32,
    pub easing: Easing,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    version: String,
    presets: Vec<AnimationPreset>,
}

#[derive(Debug)]
pub struct AnimationLibrary {
    version: String,
    presets: HashMap<String, AnimationPreset>,
}

impl AnimationLibrary {
    pub fn from_json(raw: &str) -> Result<Self, ModuleLoadError> {
        let file: PresetFile = serde_json::from_str(raw)
            .map_err(|err| ModuleLoadError::new(MODULE_NAME, err.to_string()))?;

        let mut presets = HashMap::with_capacity(file.presets.len());
        for preset in file.presets {
            if preset.keyframes.is_empty() {
                return Err(ModuleLoadError::new(
                    MODULE_NAME,
                    format!("preset '{}' has no keyframes", preset.name),
                ));
            }
            if preset
                .keyframes
                .iter()
                .any(|frame| !(0.0..=1.0).contains(&frame.offset))
            {
                return Err(ModuleLoadError::new(
                    MODULE_NAME,
                    format!("preset '{}' has a keyframe offset outside 0..=1", preset.name),
                ));
            }
            presets.insert(preset.name.clone(), preset);
        }

        Ok(Self {
            version: file.version,
            presets,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn preset(&self, name: &str) -> Option<&AnimationPreset> {
        self.presets.get(name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Parses the presets compiled into the binary off the async executor.
pub struct BundledAnimations;

#[async_trait]
impl ModuleSource<AnimationLibrary> for BundledAnimations {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    async fn load(&self) -> Result<AnimationLibrary, ModuleLoadError> {
        tokio::task::spawn_blocking(|| AnimationLibrary::from_json(BUNDLED_PRESETS))
            .await
            .map_err(|err| ModuleLoadError::new(MODULE_NAME, err.to_string()))?
    }
}

static ANIMATION_LIBRARY: LazyLock<LazyModule<AnimationLibrary>> =
    LazyLock::new(|| LazyModule::new(Arc::new(BundledAnimations)));

pub fn animation_library() -> &'static LazyModule<AnimationLibrary> {
    &ANIMATION_LIBRARY
}

#[cfg(test)]
#[path = "tests/animation_tests.rs"]
mod tests;
