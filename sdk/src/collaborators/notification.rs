// Copyright 2018-2021 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::{Arc, Mutex};

use crate::error::InternalError;

/// Schedules review tasks for users. Delivery is best-effort.
pub trait NotificationScheduler: Send + Sync {
    fn schedule(&self, assignee_id: &str, summary: &str, note: &str) -> Result<(), InternalError>;
}

/// Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotificationScheduler;

impl NotificationScheduler for NoopNotificationScheduler {
    fn schedule(&self, assignee_id: &str, summary: &str, _note: &str) -> Result<(), InternalError> {
        debug!("Discarding notification for {}: {}", assignee_id, summary);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledNotification {
    pub assignee_id: String,
    pub summary: String,
    pub note: String,
}

/// Records scheduled notifications so that they can be inspected.
#[derive(Clone, Default)]
pub struct MemoryNotificationScheduler {
    scheduled: Arc<Mutex<Vec<ScheduledNotification>>>,
}

impl MemoryNotificationScheduler {
    pub fn new() -> Self {
        MemoryNotificationScheduler::default()
    }

    pub fn scheduled(&self) -> Result<Vec<ScheduledNotification>, InternalError> {
        self.scheduled
            .lock()
            .map(|scheduled| scheduled.clone())
            .map_err(|_| {
                InternalError::with_message(
                    "Cannot access notifications: mutex lock poisoned".to_string(),
                )
            })
    }
}

impl NotificationScheduler for MemoryNotificationScheduler {
    fn schedule(&self, assignee_id: &str, summary: &str, note: &str) -> Result<(), InternalError> {
        let mut scheduled = self.scheduled.lock().map_err(|_| {
            InternalError::with_message(
                "Cannot access notifications: mutex lock poisoned".to_string(),
            )
        })?;

        scheduled.push(ScheduledNotification {
            assignee_id: assignee_id.to_string(),
            summary: summary.to_string(),
            note: note.to_string(),
        });

        Ok(())
    }
}
