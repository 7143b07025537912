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

//! Purchase requests raised by employees.
//!
//! A request moves `draft → submitted → approved → rfq_created`, may be rejected while
//! submitted or approved, and cancelled from any state that is not final. Approval unlocks the
//! one-time derivation of an RFQ from the request's lines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::collaborators::Employee;
use crate::currency::Currency;
use crate::error::{InternalError, ValidationError};
use crate::product::Product;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    Draft,
    Submitted,
    Approved,
    RfqCreated,
    Rejected,
    Cancelled,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Draft => "draft",
            RequestState::Submitted => "submitted",
            RequestState::Approved => "approved",
            RequestState::RfqCreated => "rfq_created",
            RequestState::Rejected => "rejected",
            RequestState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestState {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RequestState::Draft),
            "submitted" => Ok(RequestState::Submitted),
            "approved" => Ok(RequestState::Approved),
            "rfq_created" => Ok(RequestState::RfqCreated),
            "rejected" => Ok(RequestState::Rejected),
            "cancelled" => Ok(RequestState::Cancelled),
            _ => Err(InternalError::with_message(format!(
                "Unknown purchase request state: {}",
                s
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Normal,
    Urgent,
    VeryUrgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Urgent => "urgent",
            Priority::VeryUrgent => "very_urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl FromStr for Priority {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Priority::Normal),
            "urgent" => Ok(Priority::Urgent),
            "very_urgent" => Ok(Priority::VeryUrgent),
            _ => Err(InternalError::with_message(format!(
                "Unknown purchase request priority: {}",
                s
            ))),
        }
    }
}

/// One requested product. The estimated cost is always `quantity × estimated_unit_price`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestLine {
    pub(crate) id: String,
    pub(crate) sequence: i32,
    pub(crate) product: Product,
    pub(crate) description: String,
    pub(crate) quantity: Decimal,
    pub(crate) uom: String,
    pub(crate) estimated_unit_price: Decimal,
    pub(crate) specifications: Option<String>,
}

impl RequestLine {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn uom(&self) -> &str {
        &self.uom
    }

    pub fn estimated_unit_price(&self) -> Decimal {
        self.estimated_unit_price
    }

    pub fn estimated_cost(&self) -> Decimal {
        self.quantity * self.estimated_unit_price
    }

    pub fn specifications(&self) -> Option<&str> {
        self.specifications.as_deref()
    }
}

/// The caller's description of a request line, validated when it is added to a request.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestLineDraft {
    product: Product,
    quantity: Decimal,
    estimated_unit_price: Decimal,
    description: Option<String>,
    uom: Option<String>,
    specifications: Option<String>,
}

impl RequestLineDraft {
    pub fn new(product: Product, quantity: Decimal, estimated_unit_price: Decimal) -> Self {
        Self {
            product,
            quantity,
            estimated_unit_price,
            description: None,
            uom: None,
            specifications: None,
        }
    }

    /// Overrides the description, which otherwise defaults to the product's display name.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the unit of measure. Without one, the product's purchase unit is used, then the
    /// configured default unit.
    pub fn with_uom(mut self, uom: &str) -> Self {
        self.uom = Some(uom.to_string());
        self
    }

    pub fn with_specifications(mut self, specifications: &str) -> Self {
        self.specifications = Some(specifications.to_string());
        self
    }

    pub(crate) fn into_line(
        self,
        id: String,
        sequence: i32,
        default_uom: &str,
    ) -> Result<RequestLine, ValidationError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::new(
                "quantity".to_string(),
                format!("must be greater than zero, got {}", self.quantity),
            ));
        }
        if self.estimated_unit_price < Decimal::ZERO {
            return Err(ValidationError::new(
                "estimated_unit_price".to_string(),
                format!("must not be negative, got {}", self.estimated_unit_price),
            ));
        }

        let RequestLineDraft {
            product,
            description,
            quantity,
            uom,
            estimated_unit_price,
            specifications,
        } = self;

        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| product.display_name().to_string());
        let uom = uom
            .or_else(|| product.purchase_uom().map(String::from))
            .unwrap_or_else(|| default_uom.to_string());

        Ok(RequestLine {
            id,
            sequence,
            product,
            description,
            quantity,
            uom,
            estimated_unit_price,
            specifications,
        })
    }
}

/// The caller's description of a new purchase request.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseRequestDraft {
    requester: Employee,
    description: Option<String>,
    request_date: Option<NaiveDate>,
    required_by: Option<NaiveDate>,
    priority: Priority,
    lines: Vec<RequestLineDraft>,
}

impl PurchaseRequestDraft {
    pub fn new(requester: Employee) -> Self {
        Self {
            requester,
            description: None,
            request_date: None,
            required_by: None,
            priority: Priority::Normal,
            lines: Vec::new(),
        }
    }

    /// Sets the purpose or justification of the purchase.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the request date; defaults to today.
    pub fn with_request_date(mut self, date: NaiveDate) -> Self {
        self.request_date = Some(date);
        self
    }

    /// Sets the date by which the items are needed.
    pub fn with_required_by(mut self, date: NaiveDate) -> Self {
        self.required_by = Some(date);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_line(mut self, line: RequestLineDraft) -> Self {
        self.lines.push(line);
        self
    }

    pub(crate) fn requester(&self) -> &Employee {
        &self.requester
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Employee,
        Option<String>,
        Option<NaiveDate>,
        Option<NaiveDate>,
        Priority,
        Vec<RequestLineDraft>,
    ) {
        (
            self.requester,
            self.description,
            self.request_date,
            self.required_by,
            self.priority,
            self.lines,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub(crate) id: String,
    pub(crate) reference: String,
    pub(crate) description: Option<String>,
    pub(crate) requester: Employee,
    pub(crate) request_date: NaiveDate,
    pub(crate) required_by: Option<NaiveDate>,
    pub(crate) priority: Priority,
    pub(crate) lines: Vec<RequestLine>,
    pub(crate) state: RequestState,
    pub(crate) company: String,
    pub(crate) currency: Currency,
    pub(crate) estimated_total: Decimal,
    pub(crate) rfq_id: Option<String>,
    pub(crate) rfq_reference: Option<String>,
    pub(crate) approved_by: Option<String>,
    pub(crate) approved_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) version: i64,
}

impl PurchaseRequest {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable reference, e.g. `PR00001`.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn requester(&self) -> &Employee {
        &self.requester
    }

    pub fn request_date(&self) -> NaiveDate {
        self.request_date
    }

    pub fn required_by(&self) -> Option<NaiveDate> {
        self.required_by
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn lines(&self) -> &[RequestLine] {
        &self.lines
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// The sum of the lines' estimated costs.
    pub fn estimated_total(&self) -> Decimal {
        self.estimated_total
    }

    /// The RFQ derived from this request, set exactly when the state is `rfq_created` or the
    /// request was cancelled after its RFQ was disposed of.
    pub fn rfq_id(&self) -> Option<&str> {
        self.rfq_id.as_deref()
    }

    pub fn rfq_reference(&self) -> Option<&str> {
        self.rfq_reference.as_deref()
    }

    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The storage version this copy was read at.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn next_line_sequence(&self) -> i32 {
        self.lines.iter().map(|l| l.sequence).max().unwrap_or(0) + 10
    }

    pub(crate) fn push_line(&mut self, line: RequestLine) {
        self.lines.push(line);
        self.recompute_estimated_total();
    }

    /// Removes the line `line_id`, returning false if the request has no such line.
    pub(crate) fn remove_line(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != line_id);
        self.recompute_estimated_total();
        self.lines.len() != before
    }

    pub(crate) fn recompute_estimated_total(&mut self) {
        self.estimated_total = self.lines.iter().map(RequestLine::estimated_cost).sum();
    }

    pub(crate) fn set_state(&mut self, state: RequestState) {
        self.state = state;
    }

    pub(crate) fn record_approval(&mut self, approver: &str, at: DateTime<Utc>) {
        self.state = RequestState::Approved;
        self.approved_by = Some(approver.to_string());
        self.approved_at = Some(at);
    }

    pub(crate) fn link_rfq(&mut self, rfq_id: &str, rfq_reference: &str) {
        self.state = RequestState::RfqCreated;
        self.rfq_id = Some(rfq_id.to_string());
        self.rfq_reference = Some(rfq_reference.to_string());
    }

    /// The label used for this request in messages.
    pub(crate) fn label(&self) -> String {
        format!("purchase request {}", self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request_with_lines(lines: Vec<RequestLine>) -> PurchaseRequest {
        let mut request = PurchaseRequest {
            id: "req-1".into(),
            reference: "PR00001".into(),
            description: None,
            requester: Employee::new("emp-1", "Alice"),
            request_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            required_by: None,
            priority: Priority::Normal,
            lines: Vec::new(),
            state: RequestState::Draft,
            company: "My Company".into(),
            currency: Currency::usd(),
            estimated_total: Decimal::ZERO,
            rfq_id: None,
            rfq_reference: None,
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
            version: 0,
        };
        for line in lines {
            request.push_line(line);
        }
        request
    }

    #[test]
    fn test_line_defaults() {
        let line = RequestLineDraft::new(Product::new("p1", "Office chair"), dec!(5), dec!(20))
            .into_line("l1".into(), 10, "Units")
            .expect("valid line");

        assert_eq!(line.description(), "Office chair");
        assert_eq!(line.uom(), "Units");
        assert_eq!(line.estimated_cost(), dec!(100));

        let line = RequestLineDraft::new(
            Product::new("p2", "Paper").with_purchase_uom("Box"),
            dec!(1),
            dec!(3),
        )
        .into_line("l2".into(), 20, "Units")
        .expect("valid line");
        assert_eq!(line.uom(), "Box");
    }

    /// Tests that given values win over product defaults and that a blank description is
    /// replaced by the product name.
    #[test]
    fn test_line_given_values() {
        let line = RequestLineDraft::new(
            Product::new("p2", "Paper").with_purchase_uom("Box"),
            dec!(2),
            dec!(3),
        )
        .with_description("A4 paper, 80g")
        .with_uom("Ream")
        .with_specifications("recycled")
        .into_line("l1".into(), 10, "Units")
        .expect("valid line");
        assert_eq!(line.description(), "A4 paper, 80g");
        assert_eq!(line.uom(), "Ream");
        assert_eq!(line.estimated_cost(), dec!(6));

        let line = RequestLineDraft::new(Product::new("p1", "Office chair"), dec!(1), dec!(20))
            .with_description("   ")
            .into_line("l2".into(), 20, "Units")
            .expect("valid line");
        assert_eq!(line.description(), "Office chair");
    }

    #[test]
    fn test_line_validation() {
        let err = RequestLineDraft::new(Product::new("p1", "Chair"), dec!(0), dec!(20))
            .into_line("l1".into(), 10, "Units")
            .expect_err("zero quantity");
        assert_eq!(err.field(), "quantity");

        let err = RequestLineDraft::new(Product::new("p1", "Chair"), dec!(1), dec!(-1))
            .into_line("l1".into(), 10, "Units")
            .expect_err("negative price");
        assert_eq!(err.field(), "estimated_unit_price");
    }

    /// Tests that the estimated total follows line additions and removals.
    #[test]
    fn test_estimated_total() {
        let chair = RequestLineDraft::new(Product::new("p1", "Chair"), dec!(5), dec!(20))
            .into_line("l1".into(), 10, "Units")
            .expect("valid line");
        let desk = RequestLineDraft::new(Product::new("p2", "Desk"), dec!(2), dec!(150.50))
            .into_line("l2".into(), 20, "Units")
            .expect("valid line");

        let mut request = request_with_lines(vec![chair, desk]);
        assert_eq!(request.estimated_total(), dec!(401));
        assert_eq!(request.next_line_sequence(), 30);

        assert!(request.remove_line("l2"));
        assert!(!request.remove_line("missing"));
        assert_eq!(request.estimated_total(), dec!(100));
    }

    #[test]
    fn test_state_round_trip_names() {
        for state in &[
            RequestState::Draft,
            RequestState::Submitted,
            RequestState::Approved,
            RequestState::RfqCreated,
            RequestState::Rejected,
            RequestState::Cancelled,
        ] {
            assert_eq!(state.as_str().parse::<RequestState>().ok(), Some(*state));
        }
        assert!("closed".parse::<RequestState>().is_err());
    }
}
