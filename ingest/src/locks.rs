/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per participation so that results for the same
/// participation are correlated one after another.
#[derive(Debug, Clone, Default)]
pub struct ParticipationLocks {
    locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ParticipationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, participation: Uuid) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(self.locks.entry(participation).or_default().value());
        mutex.lock_owned().await
    }

    /// Drops mutexes nobody holds or waits for.
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
