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
use crate::collaborators::Outcome;
use crate::error::InvalidStateError;
use crate::rfq::{Rfq, RfqAggregate, RfqLineDraft};
use crate::store::RfqChangeSet;

impl ProcurementService {
    /// Appends a line to an RFQ that has no bids yet.
    pub fn add_rfq_line(&self, rfq_id: &str, line: RfqLineDraft) -> Result<Rfq, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;
        if !aggregate.bids().is_empty() {
            return Err(ProcurementError::InvalidStateError(
                InvalidStateError::with_message(format!(
                    "Lines cannot be added to {} once bids were placed",
                    aggregate.rfq().label()
                )),
            ));
        }

        let mut rfq = aggregate.into_rfq();
        let line = line.into_line(
            Uuid::new_v4().to_string(),
            rfq.next_line_sequence(),
            self.config.default_uom(),
            Utc::now().date_naive(),
        )?;
        rfq.lines.push(line);

        self.commit_rfq(RfqChangeSet::new(rfq))
    }

    /// Sets the fiscal position and payment terms that the RFQ's purchase order will inherit.
    pub fn update_rfq_terms(
        &self,
        rfq_id: &str,
        fiscal_position: Option<&str>,
        payment_terms: Option<&str>,
    ) -> Result<Rfq, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;

        let mut rfq = aggregate.into_rfq();
        rfq.fiscal_position = fiscal_position.map(String::from);
        rfq.payment_terms = payment_terms.map(String::from);

        self.commit_rfq(RfqChangeSet::new(rfq))
    }

    /// Deletes an RFQ that has not been awarded, together with its vendor assignments and
    /// bids. The request it came from can be cancelled afterwards.
    pub fn delete_rfq(&self, rfq_id: &str) -> Result<Outcome<()>, ProcurementError> {
        let aggregate = self.get_rfq(rfq_id)?;
        check_not_awarded(&aggregate)?;

        let rfq = aggregate.rfq();
        self.committed(self.store.remove_rfq(rfq.id(), rfq.version()), &rfq.label())?;
        info!("Deleted {}", rfq.label());

        let mut warnings = Vec::new();
        if let Some(request_id) = rfq.request_id() {
            self.post_audit(
                request_id,
                &format!("RFQ {} has been deleted.", rfq.reference()),
                &mut warnings,
            );
        }

        Ok(Outcome::new((), warnings))
    }
}

pub(super) fn check_not_awarded(aggregate: &RfqAggregate) -> Result<(), ProcurementError> {
    if aggregate.rfq().is_awarded() {
        Err(ProcurementError::InvalidStateError(
            InvalidStateError::with_message(format!(
                "{} has already been awarded",
                aggregate.rfq().label()
            )),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::product::Product;
    use crate::purchase_request::RequestState;
    use crate::service::testing::Harness;
    use crate::tax::TaxRule;

    #[test]
    fn test_add_rfq_line() {
        let harness = Harness::new();
        let rfq = harness.rfq();

        let rfq = harness
            .service
            .add_rfq_line(rfq.id(), RfqLineDraft::section("Delivery"))
            .expect("Unable to add section");
        let rfq = harness
            .service
            .add_rfq_line(
                rfq.id(),
                RfqLineDraft::product(Product::new("lamp", "Lamp"), dec!(3), dec!(20))
                    .with_tax(TaxRule::percent("VAT 10%", dec!(10))),
            )
            .expect("Unable to add line");

        assert_eq!(rfq.lines().len(), 4);
        assert!(!rfq.lines()[2].is_product_line());
        assert_eq!(rfq.lines()[3].sequence(), 40);
        assert_eq!(rfq.lines()[3].uom(), Some("Units"));

        let stored = harness.service.get_rfq(rfq.id()).expect("Unable to fetch RFQ");
        assert_eq!(stored.rfq(), &rfq);
    }

    #[test]
    fn test_add_rfq_line_after_bids() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        harness.priced_bid(&assignment, &[]);

        match harness.service.add_rfq_line(rfq.id(), RfqLineDraft::note("Deliver before noon")) {
            Err(ProcurementError::InvalidStateError(_)) => (),
            res => panic!("Expected InvalidStateError, got {:?}", res),
        }
    }

    #[test]
    fn test_update_rfq_terms() {
        let harness = Harness::new();
        let rfq = harness.rfq();

        let rfq = harness
            .service
            .update_rfq_terms(rfq.id(), Some("Intra-EU"), Some("30 days"))
            .expect("Unable to update terms");
        assert_eq!(rfq.fiscal_position(), Some("Intra-EU"));
        assert_eq!(rfq.payment_terms(), Some("30 days"));

        let rfq = harness
            .service
            .update_rfq_terms(rfq.id(), None, Some("45 days"))
            .expect("Unable to update terms");
        assert_eq!(rfq.fiscal_position(), None);
        assert_eq!(rfq.version(), 2);
    }

    #[test]
    fn test_delete_rfq() {
        let harness = Harness::new();
        let rfq = harness.rfq();
        let assignment = harness.assign(&rfq, "v-1", None);
        let bid = harness.priced_bid(&assignment, &[dec!(90)]);

        let outcome = harness.service.delete_rfq(rfq.id()).expect("Unable to delete RFQ");
        assert!(!outcome.has_warnings());

        match harness.service.get_rfq(rfq.id()) {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }
        match harness.service.get_bid(bid.id()) {
            Err(ProcurementError::NotFoundError(_)) => (),
            res => panic!("Expected NotFoundError, got {:?}", res),
        }

        let request_id = rfq.request_id().expect("RFQ has no request");
        let request = harness
            .service
            .get_purchase_request(request_id)
            .expect("Unable to fetch request");
        assert_eq!(request.state(), RequestState::RfqCreated);
        let events = harness
            .audit
            .events_for(request_id)
            .expect("Unable to read audit log");
        assert_eq!(
            events.last().map(|e| e.message.clone()),
            Some(format!("RFQ {} has been deleted.", rfq.reference()))
        );
    }
}
