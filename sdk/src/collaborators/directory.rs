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

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// An employee as known by the organization's directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    id: String,
    name: String,
    department: Option<String>,
    user_id: Option<String>,
}

impl Employee {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            department: None,
            user_id: None,
        }
    }

    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    /// Links the employee to a user account, which is required to receive review tasks.
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Resolves organizational relationships between employees.
pub trait Directory: Send + Sync {
    /// Returns the manager of the employee's department, if one is known.
    fn department_manager(&self, employee_id: &str) -> Option<Employee>;
}

/// A directory backed by an in-memory employee to manager map.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    managers: Arc<RwLock<HashMap<String, Employee>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        MemoryDirectory::default()
    }

    /// Records `manager` as the department manager of `employee_id`.
    pub fn set_manager(&self, employee_id: &str, manager: Employee) {
        match self.managers.write() {
            Ok(mut managers) => {
                managers.insert(employee_id.to_string(), manager);
            }
            Err(_) => error!("Cannot record manager: directory lock poisoned"),
        }
    }
}

impl Directory for MemoryDirectory {
    fn department_manager(&self, employee_id: &str) -> Option<Employee> {
        self.managers
            .read()
            .ok()
            .and_then(|managers| managers.get(employee_id).cloned())
    }
}
