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

//! Products referenced by request, RFQ, bid and purchase order lines.

/// A reference to a purchasable product held in an external catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: String,
    display_name: String,
    purchase_uom: Option<String>,
}

impl Product {
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            purchase_uom: None,
        }
    }

    /// Sets the unit of measure the product is normally purchased in.
    pub fn with_purchase_uom(mut self, uom: &str) -> Self {
        self.purchase_uom = Some(uom.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn purchase_uom(&self) -> Option<&str> {
        self.purchase_uom.as_deref()
    }
}
