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
use super::vendor::find_assignment;
use super::{ProcurementError, ProcurementService};
use crate::bid::{cascade, Bid, BidLineUpdate, BidState, BidTermsUpdate};
use crate::collaborators::Outcome;
use crate::error::{InvalidStateError, ValidationError};
use crate::rfq::{AssignmentStatus, RfqAggregate, VendorAssignment};
use crate::sequence::DocumentKind;
use crate::store::RfqChangeSet;
use crate::workflow::{ASSIGNMENT_SUBWORKFLOW, BID_SUBWORKFLOW};

impl ProcurementService {
    /// Opens a draft bid for a vendor assignment, with one zero-priced line per product line
    /// of the RFQ.
    pub fn create_bid(
        &self,
        rfq_id: &str,
        assignment_id: &str,
    ) -> Result<Outcome<Bid>, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;
        let assignment = find_assignment(&aggregate, assignment_id)?;

        let mut warnings = Vec::new();
        let reference = self.next_reference(DocumentKind::Bid, &mut warnings);
        let mut bid = Bid::for_assignment(
            Uuid::new_v4().to_string(),
            reference,
            assignment,
            aggregate.rfq(),
            Utc::now(),
        );
        bid.recompute_amounts(&*self.tax_calculator);

        self.commit_rfq(RfqChangeSet::new(aggregate.rfq().clone()).with_bid(bid.clone()))?;
        info!(
            "Created {} for vendor {}",
            bid.label(),
            assignment.vendor().name()
        );

        Ok(Outcome::new(bid, warnings))
    }

    /// Changes the price, discount, taxes or lead time of one line of a draft bid.
    pub fn update_bid_line(
        &self,
        bid_id: &str,
        line_id: &str,
        update: BidLineUpdate,
    ) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_draft_bid(bid_id)?;
        if !bid.apply_line_update(line_id, update, &*self.tax_calculator)? {
            return Err(ProcurementError::NotFoundError(format!(
                "line {} on {}",
                line_id,
                bid.label()
            )));
        }

        self.commit_bid(aggregate, bid, None)
    }

    /// Changes the validity date, delivery terms, payment terms or notes of a draft bid.
    pub fn update_bid_terms(
        &self,
        bid_id: &str,
        terms: BidTermsUpdate,
    ) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_draft_bid(bid_id)?;
        bid.apply_terms(terms);

        self.commit_bid(aggregate, bid, None)
    }

    /// Submits a draft bid. Every line needs a unit price greater than zero. The vendor
    /// assignment is marked as having received a bid.
    pub fn submit_bid(&self, bid_id: &str) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_bid(bid_id)?;
        check_not_awarded(&aggregate)?;
        self.move_bid(&mut bid, BidState::Submitted)?;
        bid.check_submittable()?;

        let assignment = find_assignment(&aggregate, bid.assignment_id())?;
        let assignment = match cascade::after_submit(assignment) {
            Some(status) => {
                let mut assignment = self.move_assignment(assignment, status)?;
                assignment.responded_at = Some(Utc::now());
                Some(assignment)
            }
            None => None,
        };

        let bid = self.commit_bid(aggregate, bid, assignment)?;
        info!("Submitted {} totalling {}", bid.label(), bid.amount_total());
        Ok(bid)
    }

    /// Moves a submitted bid under review.
    pub fn mark_bid_under_review(&self, bid_id: &str) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_bid(bid_id)?;
        check_not_awarded(&aggregate)?;
        self.move_bid(&mut bid, BidState::UnderReview)?;

        self.commit_bid(aggregate, bid, None)
    }

    /// Rejects a submitted or under review bid. The vendor assignment is rejected as well once
    /// it has no other bid in play.
    pub fn reject_bid(&self, bid_id: &str) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_bid(bid_id)?;
        self.move_bid(&mut bid, BidState::Rejected)?;

        let assignment = find_assignment(&aggregate, bid.assignment_id())?;
        let assignment = match cascade::after_reject(assignment, &bid, aggregate.bids()) {
            Some(status) => Some(self.move_assignment(assignment, status)?),
            None => None,
        };

        let bid = self.commit_bid(aggregate, bid, assignment)?;
        info!("Rejected {}", bid.label());
        Ok(bid)
    }

    /// Returns a bid to draft so the vendor can revise it. Awarded bids, and bids on an awarded
    /// RFQ, cannot be reset.
    pub fn reset_bid_to_draft(&self, bid_id: &str) -> Result<Bid, ProcurementError> {
        let (aggregate, mut bid) = self.load_bid(bid_id)?;
        check_not_awarded(&aggregate)?;
        self.move_bid(&mut bid, BidState::Draft)?;

        self.commit_bid(aggregate, bid, None)
    }

    /// Lists the submitted and under review bids of an RFQ, cheapest first.
    pub fn compare_bids(&self, rfq_id: &str) -> Result<Vec<Bid>, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        let mut bids: Vec<Bid> = aggregate
            .bids()
            .iter()
            .filter(|bid| bid.state().is_open())
            .cloned()
            .collect();

        if bids.is_empty() {
            return Err(ProcurementError::ValidationError(ValidationError::new(
                "bids".to_string(),
                format!("{} has no submitted bids to compare", aggregate.rfq().label()),
            )));
        }

        bids.sort_by(|a, b| {
            a.amount_total()
                .cmp(&b.amount_total())
                .then_with(|| a.reference().cmp(b.reference()))
        });
        Ok(bids)
    }

    fn load_draft_bid(&self, bid_id: &str) -> Result<(RfqAggregate, Bid), ProcurementError> {
        let (aggregate, bid) = self.load_bid(bid_id)?;
        check_not_awarded(&aggregate)?;
        if bid.state() != BidState::Draft {
            return Err(ProcurementError::InvalidStateError(
                InvalidStateError::with_message(format!(
                    "{} is {}; only draft bids can be edited",
                    bid.label(),
                    bid.state()
                )),
            ));
        }
        Ok((aggregate, bid))
    }

    fn move_bid(&self, bid: &mut Bid, to: BidState) -> Result<(), ProcurementError> {
        self.check_transition(
            BID_SUBWORKFLOW,
            &bid.label(),
            bid.state().as_str(),
            to.as_str(),
        )?;
        bid.set_state(to);
        Ok(())
    }

    fn move_assignment(
        &self,
        assignment: &VendorAssignment,
        to: AssignmentStatus,
    ) -> Result<VendorAssignment, ProcurementError> {
        self.check_transition(
            ASSIGNMENT_SUBWORKFLOW,
            &assignment.label(),
            assignment.status().as_str(),
            to.as_str(),
        )?;
        let mut assignment = assignment.clone();
        assignment.status = to;
        Ok(assignment)
    }

    fn commit_bid(
        &self,
        aggregate: RfqAggregate,
        bid: Bid,
        assignment: Option<VendorAssignment>,
    ) -> Result<Bid, ProcurementError> {
        let mut changes = RfqChangeSet::new(aggregate.into_rfq()).with_bid(bid.clone());
        if let Some(assignment) = assignment {
            changes = changes.with_assignment(assignment);
        }
        self.commit_rfq(changes)?;
        Ok(bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::service::testing::Harness;
    use crate::tax::TaxRule;

    #[test]
    fn test_create_bid() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);

        let bid = harness
            .service
            .create_bid(rfq.id(), assignment.id())
            .expect("Unable to create bid")
            .into_value();
        assert_eq!(bid.reference(), "BID00001");
        assert_eq!(bid.state(), BidState::Draft);
        assert_eq!(bid.vendor_id(), "v-1");
        assert_eq!(bid.lines().len(), 2);
        assert_eq!(bid.lines()[0].quantity(), dec!(2));
        assert_eq!(bid.amount_total(), dec!(0));

        let bids = harness.service.list_bids(rfq.id()).expect("Unable to list bids");
        assert_eq!(bids, vec![bid]);
    }

    #[test]
    fn test_update_bid_line() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.priced_bid(&assignment, &[dec!(100), dec!(50)]);
        let desk = bid.lines()[0].id().to_string();

        let bid = harness
            .service
            .update_bid_line(
                bid.id(),
                &desk,
                BidLineUpdate::new()
                    .with_discount(dec!(10))
                    .with_taxes(vec![TaxRule::percent("VAT 10%", dec!(10))])
                    .with_lead_time_days(14),
            )
            .expect("Unable to update line");
        assert_eq!(bid.lines()[0].price_subtotal(), dec!(180));
        assert_eq!(bid.lines()[0].price_tax(), dec!(18));
        assert_eq!(bid.lines()[0].lead_time_days(), 14);
        assert_eq!(bid.amount_untaxed(), dec!(380));
        assert_eq!(bid.amount_tax(), dec!(18));
        assert_eq!(bid.amount_total(), dec!(398));

        match harness
            .service
            .update_bid_line(bid.id(), "missing", BidLineUpdate::new().with_price_unit(dec!(1)))
        {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }
        match harness.service.update_bid_line(
            bid.id(),
            &desk,
            BidLineUpdate::new().with_discount(dec!(120)),
        ) {
            Err(ProcurementError::ValidationError(err)) => assert_eq!(err.field(), "discount"),
            res => panic!("Expected ValidationError, got {:?}", res),
        }
    }

    #[test]
    fn test_update_bid_terms() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.priced_bid(&assignment, &[]);

        let bid = harness
            .service
            .update_bid_terms(
                bid.id(),
                BidTermsUpdate::new()
                    .with_delivery_terms("DAP")
                    .with_payment_terms("30 days"),
            )
            .expect("Unable to update terms");
        assert_eq!(bid.delivery_terms(), Some("DAP"));
        assert_eq!(bid.payment_terms(), Some("30 days"));
        assert_eq!(bid.notes(), None);
    }

    #[test]
    fn test_submit_bid() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);

        let unpriced = harness.priced_bid(&assignment, &[dec!(90)]);
        match harness.service.submit_bid(unpriced.id()) {
            Err(ProcurementError::ValidationError(err)) => assert_eq!(err.field(), "price_unit"),
            res => panic!("Expected ValidationError, got {:?}", res),
        }
        assert_eq!(
            harness
                .service
                .get_bid(unpriced.id())
                .expect("Unable to fetch bid")
                .state(),
            BidState::Draft
        );

        let bid = harness.submitted_bid(&assignment, &[dec!(90), dec!(45)]);
        assert_eq!(bid.state(), BidState::Submitted);
        assert_eq!(bid.amount_total(), dec!(360));

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        let assignment = aggregate
            .assignment(assignment.id())
            .expect("assignment missing");
        assert_eq!(assignment.status(), AssignmentStatus::BidReceived);
        assert!(assignment.responded_at().is_some());

        match harness.service.update_bid_line(
            bid.id(),
            bid.lines()[0].id(),
            BidLineUpdate::new().with_price_unit(dec!(80)),
        ) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
        match harness.service.submit_bid(bid.id()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
    }

    #[test]
    fn test_review_and_reset() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.submitted_bid(&assignment, &[dec!(90), dec!(45)]);

        let bid = harness
            .service
            .mark_bid_under_review(bid.id())
            .expect("Unable to review bid");
        assert_eq!(bid.state(), BidState::UnderReview);

        let bid = harness
            .service
            .reset_bid_to_draft(bid.id())
            .expect("Unable to reset bid");
        assert_eq!(bid.state(), BidState::Draft);

        match harness.service.reset_bid_to_draft(bid.id()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
    }

    #[test]
    fn test_reject_bid_cascades_to_assignment() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let single = harness.assign(&rfq, "v-1", None);
        let double = harness.assign(&rfq, "v-2", None);

        let bid = harness.submitted_bid(&single, &[dec!(90), dec!(45)]);
        let first = harness.submitted_bid(&double, &[dec!(95), dec!(50)]);
        harness.submitted_bid(&double, &[dec!(94), dec!(50)]);

        harness.service.reject_bid(bid.id()).expect("Unable to reject bid");
        let rejected = harness
            .service
            .reject_bid(first.id())
            .expect("Unable to reject bid");
        assert_eq!(rejected.state(), BidState::Rejected);

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(
            aggregate.assignment(single.id()).map(|a| a.status()),
            Some(AssignmentStatus::Rejected)
        );
        assert_eq!(
            aggregate.assignment(double.id()).map(|a| a.status()),
            Some(AssignmentStatus::BidReceived)
        );

        match harness.service.reject_bid(bid.id()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }

        // A rejected vendor may revise and resubmit.
        harness
            .service
            .reset_bid_to_draft(bid.id())
            .expect("Unable to reset bid");
        harness.service.submit_bid(bid.id()).expect("Unable to resubmit bid");
        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(
            aggregate.assignment(single.id()).map(|a| a.status()),
            Some(AssignmentStatus::BidReceived)
        );
    }

    #[test]
    fn test_compare_bids() {
        let harness = Harness::new();
        let rfq = harness.rfq();

        match harness.service.compare_bids(rfq.id()) {
            Err(ProcurementError::ValidationError(_)) => (),
            res => panic!("Expected ValidationError, got {:?}", res),
        }

        let expensive =
            harness.submitted_bid(&harness.assign(&rfq, "v-1", None), &[dec!(95), dec!(50)]);
        let cheap =
            harness.submitted_bid(&harness.assign(&rfq, "v-2", None), &[dec!(90), dec!(45)]);
        harness.priced_bid(&harness.assign(&rfq, "v-3", None), &[dec!(1), dec!(1)]);

        let ranked: Vec<String> = harness
            .service
            .compare_bids(rfq.id())
            .expect("Unable to compare bids")
            .iter()
            .map(|bid| bid.id().to_string())
            .collect();
        assert_eq!(ranked, vec![cheap.id().to_string(), expensive.id().to_string()]);
    }
}
