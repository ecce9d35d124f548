use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

struct GatedSource {
    loads: AtomicUsize,
    fail: AtomicBool,
    gate: Option<Arc<Notify>>,
}

impl GatedSource {
    fn immediate() -> Arc<Self> {
        Arc::new(Self {
            loads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gate: None,
        })
    }

    fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            loads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gate: Some(gate),
        })
    }

    fn failing() -> Arc<Self> {
        let source = Self::immediate();
        source.fail.store(true, Ordering::SeqCst);
        source
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleSource<String> for GatedSource {
    fn name(&self) -> &str {
        "test-module"
    }

    async fn load(&self) -> Result<String, ModuleLoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModuleLoadError::new("test-module", "chunk missing"));
        }
        Ok("animations".to_string())
    }
}

#[tokio::test]
async fn concurrent_callers_share_one_load() {
    let gate = Arc::new(Notify::new());
    let source = GatedSource::gated(gate.clone());
    let module = LazyModule::new(source.clone() as Arc<dyn ModuleSource<String>>);

    let (first, second, ()) = tokio::join!(module.load(), module.load(), async {
        tokio::task::yield_now().await;
        gate.notify_one();
    });

    let first = first.expect("first load");
    let second = second.expect("second load");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.loads(), 1);
}

#[tokio::test]
async fn cached_module_is_returned_without_reloading() {
    let source = GatedSource::immediate();
    let module = LazyModule::new(source.clone() as Arc<dyn ModuleSource<String>>);

    let first = module.load().await.expect("load");
    let second = module.load().await.expect("cached");

    assert!(Arc::ptr_eq(&first, &second));
    assert!(module.is_cached());
    assert_eq!(source.loads(), 1);

    let handle = module.handle();
    assert!(!handle.is_loading);
    assert!(handle.error.is_none());
    assert_eq!(handle.module.as_deref().map(String::as_str), Some("animations"));
}

#[tokio::test]
async fn handle_reports_loading_until_settled() {
    let gate = Arc::new(Notify::new());
    let source = GatedSource::gated(gate.clone());
    let module = LazyModule::new(source.clone() as Arc<dyn ModuleSource<String>>);

    let handle = module.handle();
    assert!(handle.is_loading);
    assert!(handle.module.is_none());
    assert!(module.handle().is_loading);

    gate.notify_one();
    let loaded = module.load().await.expect("load");

    let handle = module.handle();
    assert!(!handle.is_loading);
    assert!(Arc::ptr_eq(handle.module.as_ref().expect("module"), &loaded));
    assert_eq!(source.loads(), 1);
}

#[tokio::test]
async fn failed_load_is_terminal_for_every_caller() {
    let source = GatedSource::failing();
    let module = LazyModule::new(source.clone() as Arc<dyn ModuleSource<String>>);

    let (first, second) = tokio::join!(module.load(), module.load());
    let first = first.expect_err("first");
    assert_eq!(second.expect_err("second"), first);

    source.fail.store(false, Ordering::SeqCst);
    assert_eq!(module.load().await.expect_err("still failed"), first);
    assert_eq!(source.loads(), 1);

    let handle = module.handle();
    assert!(!handle.is_loading);
    assert!(handle.module.is_none());
    assert_eq!(handle.error, Some(first));
    assert!(!module.is_cached());
}

#[tokio::test]
async fn reset_allows_a_fresh_load() {
    let source = GatedSource::failing();
    let module = LazyModule::new(source.clone() as Arc<dyn ModuleSource<String>>);
    assert!(module.load().await.is_err());

    source.fail.store(false, Ordering::SeqCst);
    module.reset();

    let handle = module.handle();
    assert!(handle.error.is_none());
    assert_eq!(*module.load().await.expect("reloaded"), "animations");
    assert_eq!(source.loads(), 2);
}
