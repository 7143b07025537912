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

#[derive(Clone, Debug)]
pub struct WorkflowState {
    name: String,
    transitions: Vec<String>,
}

impl WorkflowState {
    /// Returns true if a document in this state may move to `new_state`.
    pub fn can_transition(&self, new_state: &str) -> bool {
        self.transitions.iter().any(|t| t == new_state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transitions(&self) -> &[String] {
        &self.transitions
    }

    /// A state without outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[derive(Default)]
pub struct WorkflowStateBuilder {
    name: String,
    transitions: Vec<String>,
}

impl WorkflowStateBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn add_transition(mut self, transition: &str) -> Self {
        self.transitions.push(transition.to_string());
        self
    }

    pub fn build(self) -> WorkflowState {
        WorkflowState {
            name: self.name,
            transitions: self.transitions,
        }
    }
}
