//! Process-wide, de-duplicated loading of heavyweight client modules.
//!
//! A [`LazyModule`] starts at most one load at a time; concurrent callers join
//! the same in-flight future and all observe the same result. A failed load is
//! kept as the terminal result until [`LazyModule::reset`] is called. There is
//! no timeout: a load that never settles keeps `is_loading` set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load module '{module}': {reason}")]
pub struct ModuleLoadError {
    pub module: String,
    pub reason: String,
}

impl ModuleLoadError {
    pub fn new(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait ModuleSource<T>: Send + Sync {
    fn name(&self) -> &str;
    async fn load(&self) -> Result<T, ModuleLoadError>;
}

/// What a consumer sees at one instant.
#[derive(Debug)]
pub struct ModuleHandle<T> {
    pub module: Option<Arc<T>>,
    pub error: Option<ModuleLoadError>,
    pub is_loading: bool,
}

impl<T> Clone for ModuleHandle<T> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}

type PendingLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, ModuleLoadError>>>;

enum Slot<T> {
    Empty,
    Loading(PendingLoad<T>),
    Ready(Arc<T>),
}

pub struct LazyModule<T> {
    source: Arc<dyn ModuleSource<T>>,
    slot: Mutex<Slot<T>>,
}

impl<T: Send + Sync + 'static> LazyModule<T> {
    pub fn new(source: Arc<dyn ModuleSource<T>>) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::Empty),
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    /// Returns the module, loading it first if nobody has yet.
    pub async fn load(&self) -> Result<Arc<T>, ModuleLoadError> {
        let pending = {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Ready(module) => return Ok(module.clone()),
                Slot::Loading(pending) => pending.clone(),
                Slot::Empty => self.start_load(&mut slot),
            }
        };

        let result = pending.clone().await;
        if let Ok(module) = &result {
            let mut slot = self.lock_slot();
            if matches!(&*slot, Slot::Loading(current) if current.ptr_eq(&pending)) {
                *slot = Slot::Ready(module.clone());
            }
        }
        result
    }

    /// Snapshot for UI consumers. Kicks off the load on first use and, when a
    /// tokio runtime is available, drives it in the background.
    pub fn handle(&self) -> ModuleHandle<T> {
        let mut slot = self.lock_slot();
        if matches!(&*slot, Slot::Empty) {
            let pending = self.start_load(&mut slot);
            drive_in_background(self.name(), pending);
        }

        let settled = match &*slot {
            Slot::Loading(pending) => pending
                .peek()
                .and_then(|result| result.as_ref().ok().cloned()),
            _ => None,
        };
        if let Some(module) = settled {
            *slot = Slot::Ready(module);
        }

        match &*slot {
            Slot::Empty => ModuleHandle {
                module: None,
                error: None,
                is_loading: false,
            },
            Slot::Ready(module) => ModuleHandle {
                module: Some(module.clone()),
                error: None,
                is_loading: false,
            },
            Slot::Loading(pending) => match pending.peek() {
                Some(Err(error)) => ModuleHandle {
                    module: None,
                    error: Some(error.clone()),
                    is_loading: false,
                },
                _ => ModuleHandle {
                    module: None,
                    error: None,
                    is_loading: true,
                },
            },
        }
    }

    pub fn is_cached(&self) -> bool {
        match &*self.lock_slot() {
            Slot::Ready(_) => true,
            Slot::Loading(pending) => matches!(pending.peek(), Some(Ok(_))),
            Slot::Empty => false,
        }
    }

    /// Forgets the cached module and any in-flight or failed load.
    pub fn reset(&self) {
        *self.lock_slot() = Slot::Empty;
        info!(module = self.name(), "module cache reset");
    }

    fn start_load(&self, slot: &mut Slot<T>) -> PendingLoad<T> {
        let source = Arc::clone(&self.source);
        let pending = async move {
            let name = source.name().to_string();
            debug!(module = %name, "loading module");
            match source.load().await {
                Ok(module) => {
                    info!(module = %name, "module loaded");
                    Ok(Arc::new(module))
                }
                Err(error) => {
                    warn!(module = %name, %error, "module load failed");
                    Err(error)
                }
            }
        }
        .boxed()
        .shared();

        *slot = Slot::Loading(pending.clone());
        pending
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn drive_in_background<T: Send + Sync + 'static>(name: &str, pending: PendingLoad<T>) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                let _ = pending.await;
            });
        }
        Err(_) => debug!(module = name, "no runtime; load runs on first await"),
    }
}

#[cfg(test)]
#[path = "tests/module_loader_tests.rs"]
mod tests;
