use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::AssetId;
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::loader::{AssetLoader, LoadError};
use crate::target::RenderTarget;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TargetCall {
    Displayed(AssetId, u32),
    Blend(f32),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingTarget {
    pub calls: Vec<TargetCall>,
}

impl RecordingTarget {
    pub fn displayed(&self) -> Vec<AssetId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                TargetCall::Displayed(a, _) => Some(a.clone()),
                TargetCall::Blend(_) => None,
            })
            .collect()
    }

    pub fn last_blend(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            TargetCall::Blend(t) => Some(*t),
            TargetCall::Displayed(..) => None,
        })
    }
}

impl RenderTarget for RecordingTarget {
    type Handle = u32;

    fn set_displayed_asset(&mut self, asset: &AssetId, handle: u32) {
        self.calls.push(TargetCall::Displayed(asset.clone(), handle));
    }

    fn set_blend_factor(&mut self, t: f32) {
        self.calls.push(TargetCall::Blend(t));
    }
}

type Responder = oneshot::Sender<Result<u32, LoadError>>;

/// Loader whose completions are released by the test, in any order.
#[derive(Debug, Clone, Default)]
pub(crate) struct GatedLoader {
    inner: Rc<RefCell<GatedInner>>,
}

#[derive(Debug, Default)]
struct GatedInner {
    issued: Vec<AssetId>,
    waiting: BTreeMap<AssetId, Vec<Responder>>,
}

impl GatedLoader {
    pub fn issued(&self) -> Vec<AssetId> {
        self.inner.borrow().issued.clone()
    }

    /// Resolve the oldest outstanding load of `asset`.
    pub fn resolve(&self, asset: &str, result: Result<u32, LoadError>) {
        let mut inner = self.inner.borrow_mut();
        let queue = inner
            .waiting
            .get_mut(&AssetId::new(asset))
            .expect("no outstanding load for asset");
        let tx = queue.remove(0);
        let _ = tx.send(result);
    }

    /// Drop the oldest outstanding responder for `asset` without answering.
    pub fn abandon(&self, asset: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(queue) = inner.waiting.get_mut(&AssetId::new(asset)) {
            if !queue.is_empty() {
                drop(queue.remove(0));
            }
        }
    }
}

impl AssetLoader for GatedLoader {
    type Handle = u32;

    fn load(&self, asset: &AssetId) -> LocalBoxFuture<'static, Result<u32, LoadError>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut inner = self.inner.borrow_mut();
            inner.issued.push(asset.clone());
            inner.waiting.entry(asset.clone()).or_default().push(tx);
        }
        let asset = asset.clone();
        async move {
            rx.await
                .unwrap_or(Err(LoadError::Unavailable { asset }))
        }
        .boxed_local()
    }
}
