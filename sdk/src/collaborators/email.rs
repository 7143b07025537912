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

/// Sends documents to vendors by email.
pub trait EmailDispatcher: Send + Sync {
    /// Sends the document `document_ref` rendered with `template_ref` to `contact`.
    fn send(&self, contact: &str, template_ref: &str, document_ref: &str)
        -> Result<(), InternalError>;
}

/// Accepts every email without sending anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEmailDispatcher;

impl EmailDispatcher for NoopEmailDispatcher {
    fn send(
        &self,
        contact: &str,
        _template_ref: &str,
        document_ref: &str,
    ) -> Result<(), InternalError> {
        debug!("Discarding email of {} to {}", document_ref, contact);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SentEmail {
    pub contact: String,
    pub template_ref: String,
    pub document_ref: String,
}

/// Records sent emails so that they can be inspected.
#[derive(Clone, Default)]
pub struct MemoryEmailDispatcher {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl MemoryEmailDispatcher {
    pub fn new() -> Self {
        MemoryEmailDispatcher::default()
    }

    pub fn sent(&self) -> Result<Vec<SentEmail>, InternalError> {
        self.sent.lock().map(|sent| sent.clone()).map_err(|_| {
            InternalError::with_message("Cannot access emails: mutex lock poisoned".to_string())
        })
    }
}

impl EmailDispatcher for MemoryEmailDispatcher {
    fn send(
        &self,
        contact: &str,
        template_ref: &str,
        document_ref: &str,
    ) -> Result<(), InternalError> {
        let mut sent = self.sent.lock().map_err(|_| {
            InternalError::with_message("Cannot access emails: mutex lock poisoned".to_string())
        })?;

        sent.push(SentEmail {
            contact: contact.to_string(),
            template_ref: template_ref.to_string(),
            document_ref: document_ref.to_string(),
        });

        Ok(())
    }
}
