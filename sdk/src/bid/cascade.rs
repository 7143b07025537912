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

//! How a bid's transitions reach its vendor assignment.
//!
//! These functions decide the assignment's next status from the bid and its siblings; they
//! never mutate anything. The caller applies the returned status in the same commit as the bid.

use super::{Bid, BidState};
use crate::rfq::{AssignmentStatus, VendorAssignment};

/// The status an assignment takes when one of its bids is submitted.
pub(crate) fn after_submit(assignment: &VendorAssignment) -> Option<AssignmentStatus> {
    match assignment.status() {
        AssignmentStatus::Awarded => None,
        _ => Some(AssignmentStatus::BidReceived),
    }
}

/// The status an assignment takes when `rejected` is rejected.
///
/// The assignment is rejected too once none of its other bids is still submitted, under
/// review or awarded.
pub(crate) fn after_reject<'a, I>(
    assignment: &VendorAssignment,
    rejected: &Bid,
    siblings: I,
) -> Option<AssignmentStatus>
where
    I: IntoIterator<Item = &'a Bid>,
{
    if assignment.status() == AssignmentStatus::Rejected {
        return None;
    }

    let still_active = siblings.into_iter().any(|bid| {
        bid.id() != rejected.id()
            && bid.assignment_id() == assignment.id()
            && matches!(
                bid.state(),
                BidState::Submitted | BidState::UnderReview | BidState::Awarded
            )
    });

    if still_active {
        None
    } else {
        Some(AssignmentStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::currency::Currency;
    use crate::rfq::Vendor;

    fn assignment(status: AssignmentStatus) -> VendorAssignment {
        let mut assignment =
            VendorAssignment::new("a1".into(), "rfq-1", Vendor::new("v1", "Acme"), None);
        assignment.status = status;
        assignment
    }

    fn bid(id: &str, state: BidState) -> Bid {
        Bid {
            id: id.into(),
            reference: id.to_uppercase(),
            assignment_id: "a1".into(),
            rfq_id: "rfq-1".into(),
            vendor_id: "v1".into(),
            bid_date: Utc::now(),
            validity_date: None,
            lines: Vec::new(),
            state,
            currency: Currency::usd(),
            amount_untaxed: Decimal::ZERO,
            amount_tax: Decimal::ZERO,
            amount_total: Decimal::ZERO,
            delivery_terms: None,
            payment_terms: None,
            notes: None,
        }
    }

    #[test]
    fn test_submit_marks_bid_received() {
        assert_eq!(
            after_submit(&assignment(AssignmentStatus::Sent)),
            Some(AssignmentStatus::BidReceived)
        );
        assert_eq!(
            after_submit(&assignment(AssignmentStatus::Rejected)),
            Some(AssignmentStatus::BidReceived)
        );
        assert_eq!(after_submit(&assignment(AssignmentStatus::Awarded)), None);
    }

    /// Tests that the assignment is only rejected with its last active bid.
    #[test]
    fn test_reject_with_siblings() {
        let assignment = assignment(AssignmentStatus::BidReceived);
        let first = bid("b1", BidState::Rejected);
        let second = bid("b2", BidState::UnderReview);

        assert_eq!(after_reject(&assignment, &first, vec![&first, &second]), None);

        let second = bid("b2", BidState::Draft);
        assert_eq!(
            after_reject(&assignment, &first, vec![&first, &second]),
            Some(AssignmentStatus::Rejected)
        );
    }

    #[test]
    fn test_reject_already_rejected_assignment() {
        let assignment = assignment(AssignmentStatus::Rejected);
        let only = bid("b1", BidState::Rejected);

        assert_eq!(after_reject(&assignment, &only, vec![&only]), None);
    }
}
