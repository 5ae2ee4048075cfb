//! ConnectivityMonitor - offline → online の遷移を検出
//!
//! ポーリングはしない。ホスト側の接続シグナル（`report`）と、
//! ストレージ接続完了時の合成イベント（`announce_storage_ready`）だけで動く。
//!
//! # 購読
//! SyncEngine は起動時に `subscribe()` で登録する。
//! 購読前に発火したイベントは届かないので、購読 → announce の順に呼ぶこと。

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::{Connectivity, ConnectivityEvent};

const EVENT_CAPACITY: usize = 16;

pub struct ConnectivityMonitor {
    online: AtomicBool,
    storage_announced: AtomicBool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            online: AtomicBool::new(initial.is_online()),
            storage_announced: AtomicBool::new(false),
            events,
        }
    }

    pub fn current(&self) -> Connectivity {
        if self.is_online() {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Register for transition events.
    pub fn subscribe(&self) -> ConnectivitySubscription {
        ConnectivitySubscription {
            rx: self.events.subscribe(),
        }
    }

    /// Feed a platform connectivity signal.
    ///
    /// Emits `Restored` only for a genuine offline → online transition.
    /// Repeated `Online` signals are ignored.
    pub fn report(&self, signal: Connectivity) -> Option<ConnectivityEvent> {
        let was_online = self.online.swap(signal.is_online(), Ordering::SeqCst);
        debug!(?signal, was_online, "connectivity signal");
        if was_online || !signal.is_online() {
            return None;
        }
        self.emit(ConnectivityEvent::Restored)
    }

    /// Synthetic trigger once the local store is connected.
    ///
    /// Fires at most once per monitor, and only while online: if the app
    /// starts offline, the next `Restored` covers the stale records instead.
    pub fn announce_storage_ready(&self) -> Option<ConnectivityEvent> {
        if self.storage_announced.swap(true, Ordering::SeqCst) || !self.is_online() {
            return None;
        }
        self.emit(ConnectivityEvent::StorageReady)
    }

    fn emit(&self, event: ConnectivityEvent) -> Option<ConnectivityEvent> {
        // 購読者がいなければ send は Err を返すが、イベント自体は発生している
        if self.events.send(event).is_err() {
            debug!(?event, "no subscribers for connectivity event");
        }
        Some(event)
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Online)
    }
}

pub struct ConnectivitySubscription {
    rx: broadcast::Receiver<ConnectivityEvent>,
}

impl ConnectivitySubscription {
    /// Next transition event, or `None` once the monitor is dropped.
    pub async fn recv(&mut self) -> Option<ConnectivityEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            // 取りこぼしても「復帰した」ことに変わりはないので 1 回にまとめる
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "connectivity events coalesced");
                self.skip_buffered();
                Some(ConnectivityEvent::Restored)
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// An event that is already buffered, without waiting.
    pub fn try_recv(&mut self) -> Option<ConnectivityEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "connectivity events coalesced");
                self.skip_buffered();
                Some(ConnectivityEvent::Restored)
            }
            Err(_) => None,
        }
    }

    // 溢れた後に残っているイベントも同じ 1 回の flush で足りる
    fn skip_buffered(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}
