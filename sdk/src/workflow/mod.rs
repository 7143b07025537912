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

//! Named-state transition tables.
//!
//! A `Workflow` groups one `SubWorkflow` per document type. Each sub-workflow lists the states
//! a document may be in and, per state, the states it may move to next. Services consult the
//! table before every transition instead of scattering state checks through the code.

mod procurement;
mod state;
mod subworkflow;

pub use procurement::{
    check_transition, procurement_workflow, ASSIGNMENT_SUBWORKFLOW, BID_SUBWORKFLOW,
    REQUEST_SUBWORKFLOW,
};
pub use state::{WorkflowState, WorkflowStateBuilder};
pub use subworkflow::{SubWorkflow, SubWorkflowBuilder};

#[derive(Clone)]
pub struct Workflow {
    subworkflow: Vec<SubWorkflow>,
}

impl Workflow {
    pub fn new(subworkflow: Vec<SubWorkflow>) -> Self {
        Self { subworkflow }
    }

    pub fn subworkflow(&self, name: &str) -> Option<&SubWorkflow> {
        self.subworkflow.iter().find(|sub_wf| sub_wf.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_state() {
        let state = WorkflowStateBuilder::new("submitted")
            .add_transition("approved")
            .add_transition("rejected")
            .build();

        assert_eq!("submitted", state.name());
        assert!(state.can_transition("approved"));
        assert!(!state.can_transition("rfq_created"));
    }

    #[test]
    fn test_subworkflow() {
        let state = WorkflowStateBuilder::new("draft")
            .add_transition("submitted")
            .build();

        let subworkflow = SubWorkflowBuilder::new("request")
            .add_state(state)
            .add_starting_state("draft")
            .build();

        assert_eq!("request", subworkflow.name());
        assert_eq!(&["draft".to_string()], subworkflow.starting_states());
        assert!(subworkflow.state("draft").is_some());
        assert!(subworkflow.state("approved").is_none());
    }

    #[test]
    fn test_workflow() {
        let subworkflow = SubWorkflowBuilder::new("bid")
            .add_state(WorkflowStateBuilder::new("draft").build())
            .add_starting_state("draft")
            .build();

        let workflow = Workflow::new(vec![subworkflow]);

        assert!(workflow.subworkflow("bid").is_some());
        assert!(workflow.subworkflow("request").is_none());
    }
}
