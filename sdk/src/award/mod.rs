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

//! Selection of the winning bid of an RFQ.
//!
//! `plan_award` works on a snapshot of the whole RFQ aggregate and returns every change the
//! award makes: the winning bid and its assignment are awarded, competing bids and every other
//! assignment are rejected, and a purchase order is derived from the winning bid. Nothing is
//! written here; the plan is committed in a single store transaction, so it is applied in full
//! or not at all.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::bid::{Bid, BidState};
use crate::error::{InternalError, InvalidStateError};
use crate::purchase_order::{PurchaseOrder, PurchaseOrderLine};
use crate::rfq::{AssignmentStatus, Rfq, RfqAggregate, VendorAssignment};
use crate::service::ProcurementError;
use crate::tax::TaxCalculator;
use crate::workflow::{check_transition, Workflow, ASSIGNMENT_SUBWORKFLOW, BID_SUBWORKFLOW};

/// Caller choices for an award.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AwardOptions {
    use_bid_pricing: Option<bool>,
    notes: Option<String>,
}

impl AwardOptions {
    pub fn new() -> Self {
        AwardOptions::default()
    }

    /// Prices the purchase order from the winning bid when true, or from the RFQ's own lines
    /// when false. Without a choice the configured default applies.
    pub fn with_bid_pricing(mut self, use_bid_pricing: bool) -> Self {
        self.use_bid_pricing = Some(use_bid_pricing);
        self
    }

    /// Notes on the award decision, recorded in the RFQ's audit trail.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn use_bid_pricing(&self) -> Option<bool> {
        self.use_bid_pricing
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Everything an award changes, ready to be committed.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AwardPlan {
    pub rfq: Rfq,
    pub assignments: Vec<VendorAssignment>,
    pub bids: Vec<Bid>,
    pub purchase_order: PurchaseOrder,
}

impl AwardPlan {
    pub fn winning_bid(&self) -> Option<&Bid> {
        self.bids
            .iter()
            .find(|bid| bid.state() == BidState::Awarded)
    }
}

/// The identity given to the purchase order an award creates.
pub(crate) struct OrderIdentity {
    pub id: String,
    pub reference: String,
}

/// Plans the award of `bid_id` on the RFQ in `aggregate`.
///
/// Fails with `InvalidStateError` if the RFQ already has a winner or if the bid is neither
/// submitted nor under review.
pub(crate) fn plan_award(
    aggregate: &RfqAggregate,
    bid_id: &str,
    use_bid_pricing: bool,
    order: OrderIdentity,
    now: DateTime<Utc>,
    calculator: &dyn TaxCalculator,
    workflow: &Workflow,
) -> Result<AwardPlan, ProcurementError> {
    let rfq = aggregate.rfq();
    let winner = aggregate.bid(bid_id).ok_or_else(|| {
        ProcurementError::NotFoundError(format!("bid {} on {}", bid_id, rfq.label()))
    })?;

    if let Some(awarded) = rfq.awarded_bid_id() {
        return Err(ProcurementError::InvalidStateError(
            InvalidStateError::with_message(format!(
                "{} was already awarded to bid {}",
                rfq.label(),
                aggregate.bid(awarded).map(Bid::reference).unwrap_or(awarded)
            )),
        ));
    }
    if !winner.state().is_open() {
        return Err(ProcurementError::InvalidStateError(
            InvalidStateError::with_message(format!(
                "Only submitted or under review bids can be awarded; {} is {}",
                winner.label(),
                winner.state()
            )),
        ));
    }

    let winning_assignment = aggregate.assignment(winner.assignment_id()).ok_or_else(|| {
        ProcurementError::InternalError(InternalError::with_message(format!(
            "{} has no vendor assignment {}",
            rfq.label(),
            winner.assignment_id()
        )))
    })?;

    let mut bids = Vec::new();
    let mut awarded = winner.clone();
    check_transition(
        workflow,
        BID_SUBWORKFLOW,
        &awarded.label(),
        awarded.state().as_str(),
        BidState::Awarded.as_str(),
    )?;
    awarded.set_state(BidState::Awarded);
    bids.push(awarded);

    // Competing bids, including other open bids of the winning vendor.
    let mut losing_assignment_ids = Vec::new();
    for bid in aggregate
        .bids()
        .iter()
        .filter(|bid| bid.id() != winner.id() && bid.state().is_open())
    {
        let mut rejected = bid.clone();
        check_transition(
            workflow,
            BID_SUBWORKFLOW,
            &rejected.label(),
            rejected.state().as_str(),
            BidState::Rejected.as_str(),
        )?;
        rejected.set_state(BidState::Rejected);
        if rejected.assignment_id() != winning_assignment.id() {
            losing_assignment_ids.push(rejected.assignment_id().to_string());
        }
        bids.push(rejected);
    }

    let mut assignments = Vec::new();
    for assignment in aggregate.assignments() {
        let target = if assignment.id() == winning_assignment.id() {
            AssignmentStatus::Awarded
        } else if losing_assignment_ids.iter().any(|id| id == assignment.id())
            || assignment.status() != AssignmentStatus::Rejected
        {
            AssignmentStatus::Rejected
        } else {
            continue;
        };

        if assignment.status() == target {
            continue;
        }
        check_transition(
            workflow,
            ASSIGNMENT_SUBWORKFLOW,
            &assignment.label(),
            assignment.status().as_str(),
            target.as_str(),
        )?;
        let mut updated = assignment.clone();
        updated.status = target;
        assignments.push(updated);
    }

    let purchase_order = derive_purchase_order(
        rfq,
        winner,
        winning_assignment,
        use_bid_pricing,
        order,
        now,
        calculator,
    )?;

    let mut rfq = rfq.clone();
    rfq.awarded_bid_id = Some(winner.id().to_string());
    rfq.purchase_order_id = Some(purchase_order.id().to_string());

    Ok(AwardPlan {
        rfq,
        assignments,
        bids,
        purchase_order,
    })
}

fn derive_purchase_order(
    rfq: &Rfq,
    winner: &Bid,
    assignment: &VendorAssignment,
    use_bid_pricing: bool,
    order: OrderIdentity,
    now: DateTime<Utc>,
    calculator: &dyn TaxCalculator,
) -> Result<PurchaseOrder, ProcurementError> {
    let mut lines = Vec::with_capacity(winner.lines().len());
    for bid_line in winner.lines() {
        let rfq_line = rfq.line(bid_line.rfq_line_id()).ok_or_else(|| {
            ProcurementError::InternalError(InternalError::with_message(format!(
                "{} quotes line {} which is not on {}",
                winner.label(),
                bid_line.rfq_line_id(),
                rfq.label()
            )))
        })?;

        let (price_unit, discount) = if use_bid_pricing {
            (bid_line.price_unit(), bid_line.discount())
        } else {
            (rfq_line.price_unit(), rfq_line.discount())
        };
        let taxes = if bid_line.taxes().is_empty() {
            rfq_line.taxes().to_vec()
        } else {
            bid_line.taxes().to_vec()
        };
        let description = if rfq_line.description().is_empty() {
            bid_line.product().display_name().to_string()
        } else {
            rfq_line.description().to_string()
        };

        lines.push(PurchaseOrderLine {
            id: Uuid::new_v4().to_string(),
            sequence: bid_line.sequence(),
            product: bid_line.product().clone(),
            description,
            quantity: rfq_line.quantity(),
            uom: rfq_line
                .uom()
                .unwrap_or_else(|| bid_line.uom())
                .to_string(),
            price_unit,
            discount,
            taxes,
            planned_date: now,
            price_subtotal: Default::default(),
            price_tax: Default::default(),
            price_total: Default::default(),
        });
    }

    let mut purchase_order = PurchaseOrder {
        id: order.id,
        reference: order.reference,
        vendor: assignment.vendor().clone(),
        origin: rfq.reference().to_string(),
        rfq_id: rfq.id().to_string(),
        awarded_bid_id: winner.id().to_string(),
        company: rfq.company().to_string(),
        currency: rfq.currency().clone(),
        fiscal_position: rfq.fiscal_position().map(String::from),
        payment_terms: rfq.payment_terms().map(String::from),
        notes: rfq.notes().map(String::from),
        buyer: rfq.created_by().map(String::from),
        date_order: now,
        lines,
        amount_untaxed: Default::default(),
        amount_tax: Default::default(),
        amount_total: Default::default(),
    };
    purchase_order.recompute_amounts(calculator);

    Ok(purchase_order)
}
