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

//! The transition tables of purchase requests, bids and vendor assignments.

use super::{SubWorkflow, SubWorkflowBuilder, Workflow, WorkflowStateBuilder};
use crate::error::InvalidStateError;

pub const REQUEST_SUBWORKFLOW: &str = "purchase_request";
pub const BID_SUBWORKFLOW: &str = "bid";
pub const ASSIGNMENT_SUBWORKFLOW: &str = "vendor_assignment";

pub fn procurement_workflow() -> Workflow {
    Workflow::new(vec![
        request_sub_workflow(),
        bid_sub_workflow(),
        assignment_sub_workflow(),
    ])
}

/// Verifies that a document of `subworkflow` may move from `from` to `to`.
///
/// `document` names the document in the error message, e.g. `"purchase request PR00001"`.
pub fn check_transition(
    workflow: &Workflow,
    subworkflow: &str,
    document: &str,
    from: &str,
    to: &str,
) -> Result<(), InvalidStateError> {
    let state = workflow
        .subworkflow(subworkflow)
        .and_then(|sub_wf| sub_wf.state(from))
        .ok_or_else(|| {
            InvalidStateError::with_message(format!(
                "{} is in unknown state {}",
                document, from
            ))
        })?;

    if state.can_transition(to) {
        Ok(())
    } else {
        Err(InvalidStateError::with_message(format!(
            "Cannot move {} from {} to {}",
            document, from, to
        )))
    }
}

fn request_sub_workflow() -> SubWorkflow {
    let draft = WorkflowStateBuilder::new("draft")
        .add_transition("submitted")
        .add_transition("cancelled")
        .build();

    let submitted = WorkflowStateBuilder::new("submitted")
        .add_transition("approved")
        .add_transition("rejected")
        .add_transition("cancelled")
        .add_transition("draft")
        .build();

    let approved = WorkflowStateBuilder::new("approved")
        .add_transition("rfq_created")
        .add_transition("rejected")
        .add_transition("cancelled")
        .add_transition("draft")
        .build();

    // Leaving rfq_created also requires the RFQ to be gone; the service checks that.
    let rfq_created = WorkflowStateBuilder::new("rfq_created")
        .add_transition("cancelled")
        .build();

    let rejected = WorkflowStateBuilder::new("rejected")
        .add_transition("draft")
        .build();

    let cancelled = WorkflowStateBuilder::new("cancelled")
        .add_transition("draft")
        .build();

    SubWorkflowBuilder::new(REQUEST_SUBWORKFLOW)
        .add_state(draft)
        .add_state(submitted)
        .add_state(approved)
        .add_state(rfq_created)
        .add_state(rejected)
        .add_state(cancelled)
        .add_starting_state("draft")
        .build()
}

fn bid_sub_workflow() -> SubWorkflow {
    let draft = WorkflowStateBuilder::new("draft")
        .add_transition("submitted")
        .build();

    let submitted = WorkflowStateBuilder::new("submitted")
        .add_transition("under_review")
        .add_transition("awarded")
        .add_transition("rejected")
        .add_transition("draft")
        .build();

    let under_review = WorkflowStateBuilder::new("under_review")
        .add_transition("awarded")
        .add_transition("rejected")
        .add_transition("draft")
        .build();

    let rejected = WorkflowStateBuilder::new("rejected")
        .add_transition("draft")
        .build();

    let awarded = WorkflowStateBuilder::new("awarded").build();

    SubWorkflowBuilder::new(BID_SUBWORKFLOW)
        .add_state(draft)
        .add_state(submitted)
        .add_state(under_review)
        .add_state(rejected)
        .add_state(awarded)
        .add_starting_state("draft")
        .build()
}

fn assignment_sub_workflow() -> SubWorkflow {
    let draft = WorkflowStateBuilder::new("draft")
        .add_transition("sent")
        .add_transition("bid_received")
        .add_transition("rejected")
        .build();

    // Sending again is allowed, e.g. after a vendor's contact was corrected.
    let sent = WorkflowStateBuilder::new("sent")
        .add_transition("sent")
        .add_transition("bid_received")
        .add_transition("rejected")
        .build();

    let bid_received = WorkflowStateBuilder::new("bid_received")
        .add_transition("bid_received")
        .add_transition("awarded")
        .add_transition("rejected")
        .build();

    let rejected = WorkflowStateBuilder::new("rejected")
        .add_transition("bid_received")
        .build();

    let awarded = WorkflowStateBuilder::new("awarded").build();

    SubWorkflowBuilder::new(ASSIGNMENT_SUBWORKFLOW)
        .add_state(draft)
        .add_state(sent)
        .add_state(bid_received)
        .add_state(rejected)
        .add_state(awarded)
        .add_starting_state("draft")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_transitions() {
        let workflow = procurement_workflow();
        let check = |from, to| {
            check_transition(&workflow, REQUEST_SUBWORKFLOW, "purchase request", from, to)
        };

        assert!(check("draft", "submitted").is_ok());
        assert!(check("submitted", "approved").is_ok());
        assert!(check("approved", "rfq_created").is_ok());
        assert!(check("draft", "approved").is_err());
        assert!(check("rfq_created", "rfq_created").is_err());
        assert!(check("rfq_created", "draft").is_err());
        assert!(check("rejected", "cancelled").is_err());
    }

    #[test]
    fn test_bid_transitions() {
        let workflow = procurement_workflow();
        let check = |from, to| check_transition(&workflow, BID_SUBWORKFLOW, "bid", from, to);

        assert!(check("draft", "submitted").is_ok());
        assert!(check("submitted", "under_review").is_ok());
        assert!(check("under_review", "awarded").is_ok());
        assert!(check("draft", "awarded").is_err());
        assert!(check("draft", "under_review").is_err());
        assert!(check("awarded", "draft").is_err());
        assert!(check("awarded", "rejected").is_err());
    }

    #[test]
    fn test_unknown_state() {
        let workflow = procurement_workflow();
        let err = check_transition(&workflow, BID_SUBWORKFLOW, "bid B1", "closed", "draft")
            .expect_err("closed is not a bid state");

        assert_eq!(err.to_string(), "bid B1 is in unknown state closed");
    }

    #[test]
    fn test_terminal_states() {
        let workflow = procurement_workflow();
        let bid = workflow.subworkflow(BID_SUBWORKFLOW).expect("bid workflow");
        let assignment = workflow
            .subworkflow(ASSIGNMENT_SUBWORKFLOW)
            .expect("assignment workflow");

        assert!(bid.state("awarded").map(|s| s.is_terminal()).unwrap_or(false));
        assert!(assignment
            .state("awarded")
            .map(|s| s.is_terminal())
            .unwrap_or(false));
        assert!(!bid.state("rejected").map(|s| s.is_terminal()).unwrap_or(true));
    }
}
