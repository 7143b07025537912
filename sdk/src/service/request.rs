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

use super::{ProcurementError, ProcurementService};
use crate::collaborators::{Outcome, Warning, WarningKind};
use crate::error::{ConflictError, ConflictType, InvalidStateError, ValidationError};
use crate::purchase_request::{
    PurchaseRequest, PurchaseRequestDraft, RequestLineDraft, RequestState,
};
use crate::rfq::{Rfq, RfqLine, RfqState};
use crate::sequence::{DocumentKind, PLACEHOLDER_REFERENCE};
use crate::workflow::REQUEST_SUBWORKFLOW;

impl ProcurementService {
    /// Creates a purchase request in `draft`.
    pub fn create_purchase_request(
        &self,
        draft: PurchaseRequestDraft,
    ) -> Result<Outcome<PurchaseRequest>, ProcurementError> {
        let mut warnings = Vec::new();
        let now = Utc::now();

        if draft.requester().id().trim().is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "requester".to_string(),
                "a purchase request needs a requester".to_string(),
            )));
        }

        let (requester, description, request_date, required_by, priority, line_drafts) =
            draft.into_parts();

        let mut lines = Vec::with_capacity(line_drafts.len());
        for (index, line) in line_drafts.into_iter().enumerate() {
            lines.push(line.into_line(
                Uuid::new_v4().to_string(),
                (index as i32 + 1) * 10,
                self.config.default_uom(),
            )?);
        }

        let mut request = PurchaseRequest {
            id: Uuid::new_v4().to_string(),
            reference: self.next_reference(DocumentKind::PurchaseRequest, &mut warnings),
            description,
            requester,
            request_date: request_date.unwrap_or_else(|| now.date_naive()),
            required_by,
            priority,
            lines,
            state: RequestState::Draft,
            company: self.config.company().to_string(),
            currency: self.config.currency().clone(),
            estimated_total: Default::default(),
            rfq_id: None,
            rfq_reference: None,
            approved_by: None,
            approved_at: None,
            created_at: now,
            version: 0,
        };
        request.recompute_estimated_total();

        self.store.add_purchase_request(request.clone())?;
        debug!("Created {} for {}", request.label(), request.requester.name());

        Ok(Outcome::new(request, warnings))
    }

    /// Adds a line to a draft request.
    pub fn add_request_line(
        &self,
        request_id: &str,
        line: RequestLineDraft,
    ) -> Result<PurchaseRequest, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        check_lines_editable(&request)?;

        let line = line.into_line(
            Uuid::new_v4().to_string(),
            request.next_line_sequence(),
            self.config.default_uom(),
        )?;
        request.push_line(line);

        self.commit_request(request)
    }

    /// Removes a line from a draft request.
    pub fn remove_request_line(
        &self,
        request_id: &str,
        line_id: &str,
    ) -> Result<PurchaseRequest, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        check_lines_editable(&request)?;

        if !request.remove_line(line_id) {
            return Err(ProcurementError::NotFoundError(format!(
                "line {} of {}",
                line_id,
                request.label()
            )));
        }

        self.commit_request(request)
    }

    /// Deletes a request and its lines. Only draft and cancelled requests can be deleted.
    pub fn delete_purchase_request(&self, request_id: &str) -> Result<(), ProcurementError> {
        let request = self.get_purchase_request(request_id)?;
        match request.state() {
            RequestState::Draft | RequestState::Cancelled => (),
            state => {
                return Err(ProcurementError::InvalidStateError(
                    InvalidStateError::with_message(format!(
                        "Only draft or cancelled requests can be deleted; {} is {}",
                        request.label(),
                        state
                    )),
                ))
            }
        }

        let label = request.label();
        self.committed(
            self.store
                .remove_purchase_request(request.id(), request.version()),
            &label,
        )?;
        debug!("Deleted {}", label);
        Ok(())
    }

    /// Submits a request for approval and asks the requester's department manager, if any,
    /// to review it.
    pub fn submit_request(
        &self,
        request_id: &str,
    ) -> Result<Outcome<PurchaseRequest>, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        if request.lines().is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "lines".to_string(),
                format!("Cannot submit {} without any lines", request.label()),
            )));
        }
        self.move_request(&mut request, RequestState::Submitted)?;
        let request = self.commit_request(request)?;

        let mut warnings = Vec::new();
        self.notify_manager(&request, &mut warnings);

        Ok(Outcome::new(request, warnings))
    }

    pub fn approve_request(
        &self,
        request_id: &str,
        approver: &str,
    ) -> Result<Outcome<PurchaseRequest>, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        self.move_request(&mut request, RequestState::Approved)?;
        request.record_approval(approver, Utc::now());
        let request = self.commit_request(request)?;

        let mut warnings = Vec::new();
        self.post_audit(
            request.id(),
            &format!("Purchase request approved by {}.", approver),
            &mut warnings,
        );

        Ok(Outcome::new(request, warnings))
    }

    pub fn reject_request(
        &self,
        request_id: &str,
        actor: &str,
    ) -> Result<Outcome<PurchaseRequest>, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        self.move_request(&mut request, RequestState::Rejected)?;
        let request = self.commit_request(request)?;

        let mut warnings = Vec::new();
        self.post_audit(
            request.id(),
            &format!("Purchase request rejected by {}.", actor),
            &mut warnings,
        );

        Ok(Outcome::new(request, warnings))
    }

    /// Cancels a request. A request whose RFQ still exists cannot be cancelled; the RFQ has to
    /// be deleted first.
    pub fn cancel_request(&self, request_id: &str) -> Result<PurchaseRequest, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;

        if request.state() == RequestState::RfqCreated {
            if let Some(rfq_id) = request.rfq_id() {
                if self.store.get_rfq(rfq_id)?.is_some() {
                    return Err(ProcurementError::ConflictError(ConflictError::new(
                        ConflictType::DependentDocument,
                        format!(
                            "Cannot cancel {} while RFQ {} exists; delete the RFQ first",
                            request.label(),
                            request.rfq_reference().unwrap_or(rfq_id)
                        ),
                    )));
                }
            }
        }

        self.move_request(&mut request, RequestState::Cancelled)?;
        self.commit_request(request)
    }

    /// Returns a submitted, approved, rejected or cancelled request to `draft`.
    pub fn reset_request_to_draft(
        &self,
        request_id: &str,
    ) -> Result<PurchaseRequest, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        self.move_request(&mut request, RequestState::Draft)?;
        self.commit_request(request)
    }

    /// Derives an RFQ from an approved request.
    ///
    /// Every request line becomes an RFQ line priced at the estimated unit price and planned
    /// for the request's required-by date, or today. The request moves to `rfq_created` and
    /// cannot produce a second RFQ.
    pub fn create_rfq(
        &self,
        request_id: &str,
        user: &str,
    ) -> Result<Outcome<Rfq>, ProcurementError> {
        let mut request = self.get_purchase_request(request_id)?;
        if request.state() != RequestState::Approved {
            return Err(ProcurementError::InvalidStateError(
                InvalidStateError::with_message(format!(
                    "An RFQ can only be created from an approved request; {} is {}",
                    request.label(),
                    request.state()
                )),
            ));
        }
        if request.lines().is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "lines".to_string(),
                format!("Cannot create an RFQ from {} without lines", request.label()),
            )));
        }

        let mut warnings = Vec::new();
        let today = Utc::now().date_naive();
        let planned_date = request.required_by().unwrap_or(today);

        let lines = request
            .lines()
            .iter()
            .map(|line| RfqLine {
                id: Uuid::new_v4().to_string(),
                sequence: line.sequence(),
                display_type: None,
                product: Some(line.product().clone()),
                description: line.description().to_string(),
                quantity: line.quantity(),
                uom: Some(line.uom().to_string()),
                price_unit: line.estimated_unit_price(),
                discount: Default::default(),
                taxes: Vec::new(),
                planned_date: Some(planned_date),
            })
            .collect();

        let mut rfq = Rfq {
            id: Uuid::new_v4().to_string(),
            reference: PLACEHOLDER_REFERENCE.to_string(),
            company: request.company().to_string(),
            currency: request.currency().clone(),
            origin: Some(request.reference().to_string()),
            request_id: Some(request.id().to_string()),
            created_by: Some(user.to_string()),
            date_order: today,
            notes: Some(format!(
                "Generated from Purchase Request: {}\nPurpose: {}",
                request.reference(),
                request.description().unwrap_or_default()
            )),
            state: RfqState::Draft,
            lines,
            fiscal_position: None,
            payment_terms: None,
            awarded_bid_id: None,
            purchase_order_id: None,
            version: 0,
        };

        self.move_request(&mut request, RequestState::RfqCreated)?;

        // The reference is drawn last so a request that already moved on does not consume one.
        let current = self.get_purchase_request(request_id)?;
        if current.version() != request.version() {
            return Err(ProcurementError::InvalidStateError(
                InvalidStateError::with_message(format!(
                    "{} was modified concurrently; re-fetch it and try again",
                    request.label()
                )),
            ));
        }
        rfq.reference = self.next_reference(DocumentKind::PurchaseOrder, &mut warnings);
        request.link_rfq(rfq.id(), rfq.reference());

        let label = request.label();
        self.committed(self.store.add_rfq(request.clone(), rfq.clone()), &label)?;
        info!("Created {} from {}", rfq.label(), label);

        self.post_audit(
            request.id(),
            &format!("RFQ {} has been created from this request.", rfq.reference()),
            &mut warnings,
        );
        self.post_audit(
            rfq.id(),
            &format!(
                "Created from Purchase Request {} by {} ({}).",
                request.reference(),
                request.requester().name(),
                request.requester().department().unwrap_or_default()
            ),
            &mut warnings,
        );

        Ok(Outcome::new(rfq, warnings))
    }

    fn move_request(
        &self,
        request: &mut PurchaseRequest,
        to: RequestState,
    ) -> Result<(), ProcurementError> {
        self.check_transition(
            REQUEST_SUBWORKFLOW,
            &request.label(),
            request.state().as_str(),
            to.as_str(),
        )?;
        request.set_state(to);
        Ok(())
    }

    fn commit_request(
        &self,
        mut request: PurchaseRequest,
    ) -> Result<PurchaseRequest, ProcurementError> {
        let label = request.label();
        self.committed(self.store.update_purchase_request(request.clone()), &label)?;
        request.version += 1;
        Ok(request)
    }

    fn notify_manager(&self, request: &PurchaseRequest, warnings: &mut Vec<Warning>) {
        let manager = match self.directory.department_manager(request.requester().id()) {
            Some(manager) => manager,
            None => {
                debug!("No department manager to review {}", request.label());
                return;
            }
        };
        let user_id = match manager.user_id() {
            Some(user_id) => user_id,
            None => {
                debug!(
                    "Manager {} of {} has no user account",
                    manager.name(),
                    request.requester().name()
                );
                return;
            }
        };

        let summary = format!("Purchase Request \"{}\" needs approval", request.reference());
        let note = format!(
            "Employee {} has submitted a purchase request that needs your review.",
            request.requester().name()
        );
        if let Err(err) = self.notifications.schedule(user_id, &summary, &note) {
            warn!("Unable to notify {} about {}: {}", manager.name(), request.label(), err);
            warnings.push(Warning::new(
                WarningKind::NotificationFailed,
                format!("{} was not asked to review the request: {}", manager.name(), err),
            ));
        }
    }
}

fn check_lines_editable(request: &PurchaseRequest) -> Result<(), ProcurementError> {
    if request.state() == RequestState::Draft {
        Ok(())
    } else {
        Err(ProcurementError::InvalidStateError(
            InvalidStateError::with_message(format!(
                "Lines can only be changed while the request is draft; {} is {}",
                request.label(),
                request.state()
            )),
        ))
    }
}
