// Copyright (C) 2024-present The Pced Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Utils to handle [crate::server::PcepServer] lifecycle

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::Notify;

/// Specialized version of [tokio::sync::Notify] that notifies listeners only
/// once. Useful for shutdown signals, where we need to make sure that we
/// don't notify multiple times.
#[derive(Debug, Default)]
pub(crate) struct NotifyOnce {
    triggered: AtomicBool,
    notify: Notify,
}

impl NotifyOnce {
    pub(crate) fn notify_waiters(&self) {
        if !self.triggered.fetch_or(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub(crate) fn is_notified(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub(crate) async fn notified(&self) {
        if !self.triggered.load(Ordering::SeqCst) {
            self.notify.notified().await;
        }
    }
}

/// Handle to send signals to or read atomic values from the
/// [crate::server::PcepServer] after it's spawned into its own task.
///
/// Every accepted PCC connection holds a watcher; the handle knows how many
/// sessions are live and when the last one ended after a shutdown request.
#[derive(Clone, Debug, Default)]
pub struct PcepServerHandle {
    inner: Arc<PcepServerHandleInner>,
}

#[derive(Debug, Default)]
struct PcepServerHandleInner {
    connection_count: AtomicUsize,
    listening: NotifyOnce,
    shutdown: NotifyOnce,
    connection_end: NotifyOnce,
}

impl PcepServerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connection_count.load(Ordering::SeqCst)
    }

    pub(crate) fn notify_listening(&self) {
        self.inner.listening.notify_waiters();
    }

    /// Resolves once the server has bound its listening socket.
    pub async fn listening(&self) {
        self.inner.listening.notified().await;
    }

    pub fn shutdown(&self) {
        self.inner.shutdown.notify_waiters();
    }

    pub(crate) async fn wait_shutdown(&self) {
        self.inner.shutdown.notified().await;
    }

    pub(crate) fn watcher(&self) -> PcepServerHandleWatcher {
        PcepServerHandleWatcher::new(self.clone())
    }

    /// Wait until all watched connections have ended.
    pub(crate) async fn wait_connections_end(&self) {
        if self.inner.connection_count.load(Ordering::SeqCst) == 0 {
            return;
        }
        self.inner.connection_end.notified().await;
    }
}

pub(crate) struct PcepServerHandleWatcher {
    handle: PcepServerHandle,
}

impl PcepServerHandleWatcher {
    fn new(handle: PcepServerHandle) -> Self {
        handle.inner.connection_count.fetch_add(1, Ordering::SeqCst);
        Self { handle }
    }

    pub(crate) async fn wait_shutdown(&self) {
        self.handle.wait_shutdown().await;
    }
}

impl Drop for PcepServerHandleWatcher {
    fn drop(&mut self) {
        let count = self
            .handle
            .inner
            .connection_count
            .fetch_sub(1, Ordering::SeqCst)
            - 1;
        if count == 0 && self.handle.inner.shutdown.is_notified() {
            self.handle.inner.connection_end.notify_waiters();
        }
    }
}
