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
use crate::award::{plan_award, AwardOptions, OrderIdentity};
use crate::collaborators::Outcome;
use crate::purchase_order::PurchaseOrder;
use crate::sequence::{DocumentKind, PLACEHOLDER_REFERENCE};
use crate::store::RfqChangeSet;

impl ProcurementService {
    /// Awards an RFQ to one of its bids and creates the purchase order for the winning vendor.
    ///
    /// The winning bid and its vendor assignment are marked awarded, every other open bid and
    /// every other assignment is rejected, and the purchase order is stored, all in one commit.
    /// If another award of the same RFQ commits first this fails with `InvalidStateError` and
    /// nothing is changed.
    pub fn award_bid(
        &self,
        bid_id: &str,
        options: AwardOptions,
    ) -> Result<Outcome<PurchaseOrder>, ProcurementError> {
        let (aggregate, _) = self.load_bid(bid_id)?;
        let use_bid_pricing = options
            .use_bid_pricing()
            .unwrap_or_else(|| self.config.use_bid_pricing());

        let mut plan = plan_award(
            &aggregate,
            bid_id,
            use_bid_pricing,
            OrderIdentity {
                id: Uuid::new_v4().to_string(),
                reference: PLACEHOLDER_REFERENCE.to_string(),
            },
            Utc::now(),
            &*self.tax_calculator,
            &self.workflow,
        )?;

        let mut warnings = Vec::new();
        plan.purchase_order.reference =
            self.next_reference(DocumentKind::PurchaseOrder, &mut warnings);

        let purchase_order = plan.purchase_order.clone();
        let winner = plan
            .winning_bid()
            .map(|bid| bid.reference().to_string())
            .unwrap_or_default();
        let rfq_id = plan.rfq.id().to_string();

        let changes = plan
            .assignments
            .into_iter()
            .fold(RfqChangeSet::new(plan.rfq), RfqChangeSet::with_assignment);
        let changes = plan
            .bids
            .into_iter()
            .fold(changes, RfqChangeSet::with_bid)
            .with_purchase_order(purchase_order.clone());
        self.commit_rfq(changes)?;
        info!(
            "Awarded bid {} to {}, created purchase order {}",
            winner,
            purchase_order.vendor().name(),
            purchase_order.reference()
        );

        let mut message = format!(
            "Bid {} from vendor {} has been awarded. Purchase Order {} has been created.",
            winner,
            purchase_order.vendor().name(),
            purchase_order.reference()
        );
        if let Some(notes) = options.notes() {
            message.push_str(&format!(" Notes: {}", notes));
        }
        self.post_audit(&rfq_id, &message, &mut warnings);

        Ok(Outcome::new(purchase_order, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Barrier};
    use std::thread;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::bid::BidState;
    use crate::collaborators::WarningKind;
    use crate::product::Product;
    use crate::purchase_request::{PurchaseRequestDraft, RequestLineDraft};
    use crate::rfq::AssignmentStatus;
    use crate::service::testing::{Harness, Unavailable};

    #[test]
    fn test_award_bid() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        harness
            .service
            .update_rfq_terms(rfq.id(), Some("Domestic"), Some("30 days"))
            .expect("Unable to update terms");
        let winner_assignment = harness.assign(&rfq, "v-1", Some("sales@woodcorner.example"));
        let loser_assignment = harness.assign(&rfq, "v-2", None);
        let idle_assignment = harness.assign(&rfq, "v-3", None);
        let winner = harness.submitted_bid(&winner_assignment, &[dec!(90), dec!(45)]);
        let loser = harness.submitted_bid(&loser_assignment, &[dec!(95), dec!(50)]);

        let outcome = harness
            .service
            .award_bid(winner.id(), AwardOptions::new().with_notes("best price"))
            .expect("Unable to award bid");
        assert!(!outcome.has_warnings());
        let order = outcome.into_value();

        assert_eq!(order.reference(), "P00002");
        assert_eq!(order.vendor().id(), "v-1");
        assert_eq!(order.origin(), rfq.reference());
        assert_eq!(order.awarded_bid_id(), winner.id());
        assert_eq!(order.fiscal_position(), Some("Domestic"));
        assert_eq!(order.payment_terms(), Some("30 days"));
        assert_eq!(order.buyer(), Some("Mitchell Admin"));
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[0].price_unit(), dec!(90));
        assert_eq!(order.amount_untaxed(), dec!(360));
        assert_eq!(order.amount_total(), dec!(360));

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(aggregate.rfq().awarded_bid_id(), Some(winner.id()));
        assert_eq!(aggregate.rfq().purchase_order_id(), Some(order.id()));
        assert_eq!(aggregate.bid(winner.id()).map(|b| b.state()), Some(BidState::Awarded));
        assert_eq!(aggregate.bid(loser.id()).map(|b| b.state()), Some(BidState::Rejected));
        assert_eq!(
            aggregate.assignment(winner_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Awarded)
        );
        assert_eq!(
            aggregate.assignment(loser_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Rejected)
        );
        assert_eq!(
            aggregate.assignment(idle_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Rejected)
        );

        assert_eq!(
            harness
                .service
                .get_purchase_order(order.id())
                .expect("Unable to fetch order"),
            order
        );
        assert_eq!(
            harness
                .service
                .list_purchase_orders()
                .expect("Unable to list orders")
                .len(),
            1
        );

        let events = harness.audit.events_for(rfq.id()).expect("Unable to read audit log");
        assert_eq!(
            events.last().map(|e| e.message.clone()),
            Some(format!(
                "Bid {} from vendor Vendor v-1 has been awarded. Purchase Order P00002 has been \
                 created. Notes: best price",
                winner.reference()
            ))
        );
    }

    /// Walks one request of five widgets from draft to a purchase order at the cheaper of two
    /// vendor prices.
    #[test]
    fn test_request_to_order_walkthrough() {
        let harness = Harness::new();
        let request = harness
            .service
            .create_purchase_request(PurchaseRequestDraft::new(Harness::requester()).with_line(
                RequestLineDraft::new(Product::new("widget", "Widget"), dec!(5), dec!(20)),
            ))
            .expect("Unable to create request")
            .into_value();
        assert_eq!(request.estimated_total(), dec!(100));

        harness
            .service
            .submit_request(request.id())
            .expect("Unable to submit request");
        harness
            .service
            .approve_request(request.id(), "Mitchell Admin")
            .expect("Unable to approve request");
        let rfq = harness
            .service
            .create_rfq(request.id(), "Mitchell Admin")
            .expect("Unable to create RFQ")
            .into_value();
        assert_eq!(rfq.lines().len(), 1);
        assert_eq!(rfq.lines()[0].quantity(), dec!(5));

        let first_assignment = harness.assign(&rfq, "v-1", None);
        let second_assignment = harness.assign(&rfq, "v-2", None);
        let cheaper = harness.submitted_bid(&first_assignment, &[dec!(18)]);
        let dearer = harness.submitted_bid(&second_assignment, &[dec!(22)]);
        assert_eq!(cheaper.amount_total(), dec!(90));
        assert_eq!(dearer.amount_total(), dec!(110));

        let order = harness
            .service
            .award_bid(cheaper.id(), AwardOptions::new())
            .expect("Unable to award bid")
            .into_value();
        assert_eq!(order.vendor().id(), "v-1");
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.lines()[0].quantity(), dec!(5));
        assert_eq!(order.lines()[0].price_unit(), dec!(18));
        assert_eq!(order.amount_total(), dec!(90));

        let aggregate = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(aggregate.bid(cheaper.id()).map(|b| b.state()), Some(BidState::Awarded));
        assert_eq!(aggregate.bid(dearer.id()).map(|b| b.state()), Some(BidState::Rejected));
        assert_eq!(
            aggregate.assignment(first_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Awarded)
        );
        assert_eq!(
            aggregate.assignment(second_assignment.id()).map(|a| a.status()),
            Some(AssignmentStatus::Rejected)
        );
    }

    #[test]
    fn test_award_with_rfq_pricing() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.submitted_bid(&assignment, &[dec!(90), dec!(45)]);

        let order = harness
            .service
            .award_bid(bid.id(), AwardOptions::new().with_bid_pricing(false))
            .expect("Unable to award bid")
            .into_value();
        assert_eq!(order.lines()[0].price_unit(), dec!(100));
        assert_eq!(order.amount_total(), dec!(400));
    }

    #[test]
    fn test_award_twice() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let first =
            harness.submitted_bid(&harness.assign(&rfq, "v-1", None), &[dec!(90), dec!(45)]);
        let second =
            harness.submitted_bid(&harness.assign(&rfq, "v-2", None), &[dec!(95), dec!(50)]);

        harness
            .service
            .award_bid(first.id(), AwardOptions::new())
            .expect("Unable to award bid");

        for bid in &[&first, &second] {
            match harness.service.award_bid(bid.id(), AwardOptions::new()) {
                Err(ProcurementError::InvalidStateError(_)) => (),
                res => panic!("Expected InvalidStateError, got {:?}", res),
            }
        }
        match harness.service.reset_bid_to_draft(second.id()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
        assert_eq!(
            harness
                .service
                .list_purchase_orders()
                .expect("Unable to list orders")
                .len(),
            1
        );
    }

    #[test]
    fn test_award_draft_bid() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let bid = harness.priced_bid(&harness.assign(&rfq, "v-1", None), &[dec!(90), dec!(45)]);

        match harness.service.award_bid(bid.id(), AwardOptions::new()) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
        match harness.service.award_bid("missing", AwardOptions::new()) {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }
    }

    #[test]
    fn test_award_with_unavailable_audit_log() {
        let harness = Harness::configured(|builder| builder.with_audit_log(Unavailable));
        let rfq = harness.rfq();
        let bid = harness.submitted_bid(&harness.assign(&rfq, "v-1", None), &[dec!(90), dec!(45)]);

        let outcome = harness
            .service
            .award_bid(bid.id(), AwardOptions::new())
            .expect("Unable to award bid");
        assert_eq!(outcome.warnings().len(), 1);
        assert_eq!(outcome.warnings()[0].kind(), WarningKind::AuditFailed);
        assert_eq!(
            harness
                .service
                .get_rfq(rfq.id())
                .expect("Unable to fetch RFQ")
                .rfq()
                .awarded_bid_id(),
            Some(bid.id())
        );
    }

    #[test]
    fn test_concurrent_awards() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let bids: Vec<String> = (1..=4)
            .map(|n| {
                let assignment = harness.assign(&rfq, &format!("v-{}", n), None);
                harness
                    .submitted_bid(&assignment, &[dec!(90), dec!(45)])
                    .id()
                    .to_string()
            })
            .collect();

        let service = Arc::new(harness.service);
        let barrier = Arc::new(Barrier::new(bids.len()));
        let handles: Vec<_> = bids
            .iter()
            .cloned()
            .map(|bid_id| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    match service.award_bid(&bid_id, AwardOptions::new()) {
                        Ok(_) => Some(true),
                        Err(ProcurementError::InvalidStateError(_)) => Some(false),
                        Err(_) => None,
                    }
                })
            })
            .collect();

        let results: Vec<Option<bool>> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked"))
            .collect();
        assert!(results.iter().all(Option::is_some));
        assert_eq!(results.iter().filter(|r| **r == Some(true)).count(), 1);

        let aggregate = service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        let awarded: Vec<&str> = aggregate
            .bids()
            .iter()
            .filter(|bid| bid.state() == BidState::Awarded)
            .map(|bid| bid.id())
            .collect();
        assert_eq!(awarded.len(), 1);
        assert_eq!(aggregate.rfq().awarded_bid_id(), Some(awarded[0]));
        assert_eq!(
            service
                .list_purchase_orders()
                .expect("Unable to list orders")
                .len(),
            1
        );
    }
}
