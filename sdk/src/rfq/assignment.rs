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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::InternalError;

/// A supplier that can be asked to quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    id: String,
    name: String,
    email: Option<String>,
}

impl Vendor {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The address RFQs are mailed to. Vendors without one can still be marked sent.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Draft,
    Sent,
    BidReceived,
    Awarded,
    Rejected,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Draft => "draft",
            AssignmentStatus::Sent => "sent",
            AssignmentStatus::BidReceived => "bid_received",
            AssignmentStatus::Awarded => "awarded",
            AssignmentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AssignmentStatus::Draft),
            "sent" => Ok(AssignmentStatus::Sent),
            "bid_received" => Ok(AssignmentStatus::BidReceived),
            "awarded" => Ok(AssignmentStatus::Awarded),
            "rejected" => Ok(AssignmentStatus::Rejected),
            _ => Err(InternalError::with_message(format!(
                "Unknown vendor assignment status: {}",
                s
            ))),
        }
    }
}

/// The participation of one vendor in one RFQ.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorAssignment {
    pub(crate) id: String,
    pub(crate) rfq_id: String,
    pub(crate) vendor: Vendor,
    pub(crate) status: AssignmentStatus,
    pub(crate) sent_at: Option<DateTime<Utc>>,
    pub(crate) responded_at: Option<DateTime<Utc>>,
    pub(crate) notes: Option<String>,
}

impl VendorAssignment {
    pub(crate) fn new(id: String, rfq_id: &str, vendor: Vendor, notes: Option<String>) -> Self {
        Self {
            id,
            rfq_id: rfq_id.to_string(),
            vendor,
            status: AssignmentStatus::Draft,
            sent_at: None,
            responded_at: None,
            notes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rfq_id(&self) -> &str {
        &self.rfq_id
    }

    pub fn vendor(&self) -> &Vendor {
        &self.vendor
    }

    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub(crate) fn label(&self) -> String {
        format!("vendor assignment of {}", self.vendor.name)
    }
}
