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

use chrono::Utc;
use uuid::Uuid;

use super::rfq::check_not_awarded;
use super::{ProcurementError, ProcurementService};
use crate::collaborators::{Outcome, Warning, WarningKind};
use crate::error::{ConflictError, ConflictType, ValidationError};
use crate::rfq::{AssignmentStatus, Rfq, RfqAggregate, RfqState, Vendor, VendorAssignment};
use crate::store::RfqChangeSet;
use crate::workflow::ASSIGNMENT_SUBWORKFLOW;

impl ProcurementService {
    /// Invites a vendor to quote on an RFQ. A vendor can be assigned to an RFQ only once.
    pub fn assign_vendor(
        &self,
        rfq_id: &str,
        vendor: Vendor,
        notes: Option<&str>,
    ) -> Result<VendorAssignment, ProcurementError> {
        if vendor.id().trim().is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "vendor".to_string(),
                "a vendor needs an id".to_string(),
            )));
        }

        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;
        if aggregate.assignment_for_vendor(vendor.id()).is_some() {
            return Err(ProcurementError::ConflictError(ConflictError::new(
                ConflictType::Unique,
                format!(
                    "Vendor {} is already assigned to {}",
                    vendor.name(),
                    aggregate.rfq().label()
                ),
            )));
        }

        let assignment = VendorAssignment::new(
            Uuid::new_v4().to_string(),
            rfq_id,
            vendor,
            notes.map(String::from),
        );
        self.committed(
            self.store
                .add_vendor_assignment(aggregate.rfq().version(), assignment.clone()),
            &aggregate.rfq().label(),
        )?;
        debug!(
            "Assigned vendor {} to {}",
            assignment.vendor().name(),
            aggregate.rfq().label()
        );

        Ok(assignment)
    }

    /// Marks an assignment sent and emails the RFQ to the vendor.
    ///
    /// The assignment is marked sent even when the vendor has no email address or the email
    /// fails; both cases are reported as warnings.
    pub fn send_to_vendor(
        &self,
        rfq_id: &str,
        assignment_id: &str,
    ) -> Result<Outcome<VendorAssignment>, ProcurementError> {
        let (rfq, assignment) = self.mark_sent(rfq_id, assignment_id)?;

        let mut warnings = Vec::new();
        self.dispatch_rfq(&rfq.reference, assignment.vendor(), &mut warnings);

        Ok(Outcome::new(assignment, warnings))
    }

    /// Marks an assignment sent without emailing the vendor.
    pub fn mark_vendor_sent(
        &self,
        rfq_id: &str,
        assignment_id: &str,
    ) -> Result<VendorAssignment, ProcurementError> {
        self.mark_sent(rfq_id, assignment_id)
            .map(|(_, assignment)| assignment)
    }

    /// Sends the RFQ to every vendor that has not been sent it yet and marks the RFQ sent.
    ///
    /// Returns the number of vendors the RFQ was sent to.
    pub fn send_to_all_vendors(&self, rfq_id: &str) -> Result<Outcome<usize>, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        if aggregate.assignments().is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "assignments".to_string(),
                format!(
                    "Please add at least one vendor to {} before sending",
                    aggregate.rfq().label()
                ),
            )));
        }

        let now = Utc::now();
        let mut to_send = Vec::new();
        for assignment in aggregate
            .assignments()
            .iter()
            .filter(|a| a.status() == AssignmentStatus::Draft)
        {
            self.check_transition(
                ASSIGNMENT_SUBWORKFLOW,
                &assignment.label(),
                assignment.status().as_str(),
                AssignmentStatus::Sent.as_str(),
            )?;
            let mut sent = assignment.clone();
            sent.status = AssignmentStatus::Sent;
            sent.sent_at = Some(now);
            to_send.push(sent);
        }
        if to_send.is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "assignments".to_string(),
                format!(
                    "All vendors have already been sent {}",
                    aggregate.rfq().label()
                ),
            )));
        }

        let mut rfq = aggregate.into_rfq();
        if rfq.state == RfqState::Draft {
            rfq.state = RfqState::Sent;
        }
        let reference = rfq.reference.clone();
        let changes = to_send
            .iter()
            .cloned()
            .fold(RfqChangeSet::new(rfq), RfqChangeSet::with_assignment);
        self.commit_rfq(changes)?;
        info!("Sent {} to {} vendor(s)", reference, to_send.len());

        let mut warnings = Vec::new();
        let mut missing_contact = Vec::new();
        for assignment in &to_send {
            match assignment.vendor().email() {
                Some(_) => self.dispatch_rfq(&reference, assignment.vendor(), &mut warnings),
                None => missing_contact.push(assignment.vendor().name()),
            }
        }
        if !missing_contact.is_empty() {
            warnings.push(Warning::new(
                WarningKind::MissingContact,
                format!(
                    "RFQ {} sent to {} vendor(s). {} have no email - marked as sent but no \
                     email dispatched",
                    reference,
                    to_send.len(),
                    missing_contact.join(", ")
                ),
            ));
        }

        Ok(Outcome::new(to_send.len(), warnings))
    }

    fn mark_sent(
        &self,
        rfq_id: &str,
        assignment_id: &str,
    ) -> Result<(Rfq, VendorAssignment), ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;
        let mut assignment = find_assignment(&aggregate, assignment_id)?.clone();

        self.check_transition(
            ASSIGNMENT_SUBWORKFLOW,
            &assignment.label(),
            assignment.status().as_str(),
            AssignmentStatus::Sent.as_str(),
        )?;
        assignment.status = AssignmentStatus::Sent;
        assignment.sent_at = Some(Utc::now());

        let rfq = self.commit_rfq(
            RfqChangeSet::new(aggregate.into_rfq()).with_assignment(assignment.clone()),
        )?;
        Ok((rfq, assignment))
    }

    fn dispatch_rfq(&self, rfq_reference: &str, vendor: &Vendor, warnings: &mut Vec<Warning>) {
        let email = match vendor.email() {
            Some(email) => email,
            None => {
                warn!("Vendor {} has no email, {} was not mailed", vendor.name(), rfq_reference);
                warnings.push(Warning::new(
                    WarningKind::MissingContact,
                    format!(
                        "Vendor \"{}\" has no email. Marked as sent without email.",
                        vendor.name()
                    ),
                ));
                return;
            }
        };

        if let Err(err) = self
            .email
            .send(email, self.config.rfq_email_template(), rfq_reference)
        {
            warn!("Unable to email {} to {}: {}", rfq_reference, vendor.name(), err);
            warnings.push(Warning::new(
                WarningKind::EmailFailed,
                format!("{} could not be emailed to {}: {}", rfq_reference, vendor.name(), err),
            ));
        }
    }
}

pub(super) fn find_assignment<'a>(
    aggregate: &'a RfqAggregate,
    assignment_id: &str,
) -> Result<&'a VendorAssignment, ProcurementError> {
    aggregate.assignment(assignment_id).ok_or_else(|| {
        ProcurementError::NotFoundError(format!(
            "vendor assignment {} on {}",
            assignment_id,
            aggregate.rfq().label()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    use pretty_assertions::assert_eq;

    use crate::service::testing::{Harness, Unavailable};

    #[test]
    fn test_assign_vendor_once() {
        let harness = Harness::new();
        let rfq = harness.rfq();

        let assignment = harness
            .service
            .assign_vendor(rfq.id(), Vendor::new("v-1", "Wood Corner"), Some("preferred"))
            .expect("Unable to assign vendor");
        assert_eq!(assignment.status(), AssignmentStatus::Draft);
        assert_eq!(assignment.notes(), Some("preferred"));

        match harness
            .service
            .assign_vendor(rfq.id(), Vendor::new("v-1", "Wood Corner"), None)
        {
            Err(ProcurementError::ConflictError(err)) => {
                assert_eq!(err.conflict_type(), ConflictType::Unique)
            }
            res => panic!("Expected ConflictError, got {:?}", res),
        }

        let assignments = harness
            .service
            .list_vendor_assignments(rfq.id())
            .expect("Unable to list assignments");
        assert_eq!(assignments, vec![assignment]);
    }

    #[test]
    fn test_concurrent_assign_same_vendor() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let service = Arc::new(harness.service);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = Arc::clone(&service);
                let rfq_id = rfq.id().to_string();
                thread::spawn(move || {
                    service
                        .assign_vendor(&rfq_id, Vendor::new("v-1", "Wood Corner"), None)
                        .is_ok()
                })
            })
            .collect();
        let assigned = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .filter(|assigned| *assigned)
            .count();

        assert_eq!(assigned, 1);
        assert_eq!(
            service
                .list_vendor_assignments(rfq.id())
                .expect("Unable to list assignments")
                .len(),
            1
        );
    }

    #[test]
    fn test_send_to_vendor() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));

        let outcome = harness
            .service
            .send_to_vendor(rfq.id(), assignment.id())
            .expect("Unable to send RFQ");
        assert!(!outcome.has_warnings());
        assert_eq!(outcome.value().status(), AssignmentStatus::Sent);
        assert!(outcome.value().sent_at().is_some());

        let sent = harness.email.sent().expect("Unable to read emails");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].contact, "sales@woodcorner.example");
        assert_eq!(sent[0].template_ref, harness.service.config().rfq_email_template());
        assert_eq!(sent[0].document_ref, rfq.reference());
    }

    #[test]
    fn test_send_to_vendor_without_email() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);

        let outcome = harness
            .service
            .send_to_vendor(rfq.id(), assignment.id())
            .expect("Unable to send RFQ");
        assert_eq!(outcome.value().status(), AssignmentStatus::Sent);
        assert_eq!(outcome.warnings().len(), 1);
        assert_eq!(outcome.warnings()[0].kind(), WarningKind::MissingContact);
        assert_eq!(
            outcome.warnings()[0].message(),
            "Vendor \"Vendor v-1\" has no email. Marked as sent without email."
        );
        assert!(harness.email.sent().expect("Unable to read emails").is_empty());
    }

    #[test]
    fn test_send_to_vendor_email_failure() {
        let harness = Harness::configured(|builder| builder.with_email_dispatcher(Unavailable));
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));

        let outcome = harness
            .service
            .send_to_vendor(rfq.id(), assignment.id())
            .expect("Unable to send RFQ");
        assert_eq!(outcome.warnings()[0].kind(), WarningKind::EmailFailed);

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(
            aggregate.assignment(assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Sent)
        );
    }

    #[test]
    fn test_mark_vendor_sent() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));

        let assignment = harness
            .service
            .mark_vendor_sent(rfq.id(), assignment.id())
            .expect("Unable to mark sent");
        assert_eq!(assignment.status(), AssignmentStatus::Sent);
        assert!(harness.email.sent().expect("Unable to read emails").is_empty());

        match harness.service.mark_vendor_sent(rfq.id(), "missing") {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }
    }

    #[test]
    fn test_send_to_all_vendors() {
        let harness = Harness::new();
        let rfq = harness.rfq();

        match harness.service.send_to_all_vendors(rfq.id()) {
            Err(ProcurementError::ValidationError(err)) => assert_eq!(err.field(), "assignments"),
            res => panic!("Expected ValidationError, got {:?}", res),
        }

        let mailed = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));
        harness.assign(&rfq, "v-2", None);
        let already_sent = harness.assign(&rfq, "v-3", Some("info@azure.example"));
        harness
            .service
            .mark_vendor_sent(rfq.id(), already_sent.id())
            .expect("Unable to mark sent");

        let outcome = harness
            .service
            .send_to_all_vendors(rfq.id())
            .expect("Unable to send RFQ");
        assert_eq!(*outcome.value(), 2);
        assert_eq!(outcome.warnings().len(), 1);
        assert_eq!(outcome.warnings()[0].kind(), WarningKind::MissingContact);
        assert!(outcome.warnings()[0].message().contains("Vendor v-2"));

        let sent = harness.email.sent().expect("Unable to read emails");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].contact, "sales@woodcorner.example");

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(aggregate.rfq().state(), RfqState::Sent);
        assert!(aggregate
            .assignments()
            .iter()
            .all(|a| a.status() == AssignmentStatus::Sent));
        assert_eq!(
            aggregate.assignment(mailed.id()).and_then(|a| a.sent_at()).is_some(),
            true
        );

        match harness.service.send_to_all_vendors(rfq.id()) {
            Err(ProcurementError::ValidationError(_)) => (),
            res => panic!("Expected ValidationError, got {:?}", res),
        }
    }
}
