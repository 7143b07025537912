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

use chrono::{DateTime, Utc};

use crate::error::InternalError;

/// A write-only log of human-readable events about documents.
pub trait AuditLog: Send + Sync {
    /// Posts `message` on the document identified by `document_id`.
    fn post(&self, document_id: &str, message: &str) -> Result<(), InternalError>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditEvent {
    pub document_id: String,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

/// Keeps posted events in memory and echoes them to the `log` facade.
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        MemoryAuditLog::default()
    }

    /// Returns every event posted on `document_id`, oldest first.
    pub fn events_for(&self, document_id: &str) -> Result<Vec<AuditEvent>, InternalError> {
        let events = self.events.lock().map_err(|_| {
            InternalError::with_message("Cannot access audit events: mutex lock poisoned".into())
        })?;

        Ok(events
            .iter()
            .filter(|event| event.document_id == document_id)
            .cloned()
            .collect())
    }
}

impl AuditLog for MemoryAuditLog {
    fn post(&self, document_id: &str, message: &str) -> Result<(), InternalError> {
        let mut events = self.events.lock().map_err(|_| {
            InternalError::with_message("Cannot access audit events: mutex lock poisoned".into())
        })?;

        info!("[{}] {}", document_id, message);
        events.push(AuditEvent {
            document_id: document_id.to_string(),
            message: message.to_string(),
            posted_at: Utc::now(),
        });

        Ok(())
    }
}
