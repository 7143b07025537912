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

//! Side channels the engine talks to without depending on their success.
//!
//! Audit logging, review notifications, vendor email and the employee directory live outside
//! of the engine. Their failures never abort a state transition: they are logged and handed
//! back to the caller as `Warning`s next to the successful result.

mod audit;
mod directory;
mod email;
mod notification;

use std::fmt;

pub use audit::{AuditEvent, AuditLog, MemoryAuditLog};
pub use directory::{Directory, Employee, MemoryDirectory};
pub use email::{EmailDispatcher, MemoryEmailDispatcher, NoopEmailDispatcher, SentEmail};
pub use notification::{
    MemoryNotificationScheduler, NoopNotificationScheduler, NotificationScheduler,
    ScheduledNotification,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// The sequence allocator failed and the placeholder reference was used.
    SequenceFallback,
    /// The audit log rejected an event.
    AuditFailed,
    /// A review task could not be scheduled.
    NotificationFailed,
    /// A vendor has no contact channel; the RFQ was marked sent without email.
    MissingContact,
    /// The email dispatcher failed to send the RFQ.
    EmailFailed,
}

/// A non-fatal problem attached to an otherwise successful operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Warning {
    kind: WarningKind,
    message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The result of an operation together with the warnings raised by its side channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    value: T,
    warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }
}
