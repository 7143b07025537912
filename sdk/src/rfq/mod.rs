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

//! Requests for quotation and the vendors solicited by them.
//!
//! An `Rfq` is derived once from an approved purchase request. Vendors are attached to it
//! through `VendorAssignment`s, one per vendor, and each assignment collects the vendor's bids.
//! The RFQ, its assignments and their bids form one aggregate (`RfqAggregate`) that is read and
//! committed as a unit.

mod assignment;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::bid::Bid;
use crate::currency::Currency;
use crate::error::{InternalError, ValidationError};
use crate::product::Product;
use crate::tax::TaxRule;

pub use assignment::{AssignmentStatus, Vendor, VendorAssignment};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RfqState {
    Draft,
    Sent,
}

impl RfqState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfqState::Draft => "draft",
            RfqState::Sent => "sent",
        }
    }
}

impl fmt::Display for RfqState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RfqState {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RfqState::Draft),
            "sent" => Ok(RfqState::Sent),
            _ => Err(InternalError::with_message(format!(
                "Unknown RFQ state: {}",
                s
            ))),
        }
    }
}

/// Marks an RFQ line as layout only. Such lines carry a title or a remark and are never
/// quoted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDisplayType {
    Section,
    Note,
}

impl LineDisplayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineDisplayType::Section => "line_section",
            LineDisplayType::Note => "line_note",
        }
    }
}

impl FromStr for LineDisplayType {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line_section" => Ok(LineDisplayType::Section),
            "line_note" => Ok(LineDisplayType::Note),
            _ => Err(InternalError::with_message(format!(
                "Unknown line display type: {}",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfqLine {
    pub(crate) id: String,
    pub(crate) sequence: i32,
    pub(crate) display_type: Option<LineDisplayType>,
    pub(crate) product: Option<Product>,
    pub(crate) description: String,
    pub(crate) quantity: Decimal,
    pub(crate) uom: Option<String>,
    pub(crate) price_unit: Decimal,
    pub(crate) discount: Decimal,
    pub(crate) taxes: Vec<TaxRule>,
    pub(crate) planned_date: Option<NaiveDate>,
}

impl RfqLine {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    pub fn display_type(&self) -> Option<LineDisplayType> {
        self.display_type
    }

    /// Returns true for lines that request a product, as opposed to sections and notes.
    pub fn is_product_line(&self) -> bool {
        self.display_type.is_none()
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn uom(&self) -> Option<&str> {
        self.uom.as_deref()
    }

    /// The planned unit price, taken from the request's estimate.
    pub fn price_unit(&self) -> Decimal {
        self.price_unit
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn taxes(&self) -> &[TaxRule] {
        &self.taxes
    }

    pub fn planned_date(&self) -> Option<NaiveDate> {
        self.planned_date
    }
}

#[derive(Clone, Debug, PartialEq)]
enum RfqLineKind {
    Product {
        product: Product,
        quantity: Decimal,
        price_unit: Decimal,
    },
    Layout(LineDisplayType),
}

/// A line to append to an RFQ by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct RfqLineDraft {
    kind: RfqLineKind,
    description: Option<String>,
    uom: Option<String>,
    discount: Decimal,
    taxes: Vec<TaxRule>,
    planned_date: Option<NaiveDate>,
}

impl RfqLineDraft {
    pub fn product(product: Product, quantity: Decimal, price_unit: Decimal) -> Self {
        Self::with_kind(RfqLineKind::Product {
            product,
            quantity,
            price_unit,
        })
    }

    /// A section title grouping the lines that follow it.
    pub fn section(title: &str) -> Self {
        Self::with_kind(RfqLineKind::Layout(LineDisplayType::Section)).with_description(title)
    }

    /// A free-text remark for the vendors.
    pub fn note(text: &str) -> Self {
        Self::with_kind(RfqLineKind::Layout(LineDisplayType::Note)).with_description(text)
    }

    fn with_kind(kind: RfqLineKind) -> Self {
        Self {
            kind,
            description: None,
            uom: None,
            discount: Decimal::ZERO,
            taxes: Vec::new(),
            planned_date: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_uom(mut self, uom: &str) -> Self {
        self.uom = Some(uom.to_string());
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_tax(mut self, tax: TaxRule) -> Self {
        self.taxes.push(tax);
        self
    }

    pub fn with_planned_date(mut self, date: NaiveDate) -> Self {
        self.planned_date = Some(date);
        self
    }

    pub(crate) fn into_line(
        self,
        id: String,
        sequence: i32,
        default_uom: &str,
        default_planned_date: NaiveDate,
    ) -> Result<RfqLine, ValidationError> {
        match self.kind {
            RfqLineKind::Layout(display_type) => {
                let description = self
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .ok_or_else(|| {
                        ValidationError::new(
                            "description".to_string(),
                            "section and note lines need a text".to_string(),
                        )
                    })?;
                Ok(RfqLine {
                    id,
                    sequence,
                    display_type: Some(display_type),
                    product: None,
                    description,
                    quantity: Decimal::ZERO,
                    uom: None,
                    price_unit: Decimal::ZERO,
                    discount: Decimal::ZERO,
                    taxes: Vec::new(),
                    planned_date: None,
                })
            }
            RfqLineKind::Product {
                product,
                quantity,
                price_unit,
            } => {
                if quantity <= Decimal::ZERO {
                    return Err(ValidationError::new(
                        "quantity".to_string(),
                        format!("must be greater than zero, got {}", quantity),
                    ));
                }
                if price_unit < Decimal::ZERO {
                    return Err(ValidationError::new(
                        "price_unit".to_string(),
                        format!("must not be negative, got {}", price_unit),
                    ));
                }
                check_discount(self.discount)?;

                let description = self
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| product.display_name().to_string());
                let uom = self
                    .uom
                    .or_else(|| product.purchase_uom().map(String::from))
                    .unwrap_or_else(|| default_uom.to_string());

                Ok(RfqLine {
                    id,
                    sequence,
                    display_type: None,
                    product: Some(product),
                    description,
                    quantity,
                    uom: Some(uom),
                    price_unit,
                    discount: self.discount,
                    taxes: self.taxes,
                    planned_date: Some(self.planned_date.unwrap_or(default_planned_date)),
                })
            }
        }
    }
}

/// Verifies that a discount percentage lies in `[0, 100]`.
pub(crate) fn check_discount(discount: Decimal) -> Result<(), ValidationError> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        Err(ValidationError::new(
            "discount".to_string(),
            format!("must be between 0 and 100, got {}", discount),
        ))
    } else {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rfq {
    pub(crate) id: String,
    pub(crate) reference: String,
    pub(crate) company: String,
    pub(crate) currency: Currency,
    pub(crate) origin: Option<String>,
    pub(crate) request_id: Option<String>,
    pub(crate) created_by: Option<String>,
    pub(crate) date_order: NaiveDate,
    pub(crate) notes: Option<String>,
    pub(crate) state: RfqState,
    pub(crate) lines: Vec<RfqLine>,
    pub(crate) fiscal_position: Option<String>,
    pub(crate) payment_terms: Option<String>,
    pub(crate) awarded_bid_id: Option<String>,
    pub(crate) purchase_order_id: Option<String>,
    pub(crate) version: i64,
}

impl Rfq {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// The reference of the document this RFQ was derived from.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn date_order(&self) -> NaiveDate {
        self.date_order
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn state(&self) -> RfqState {
        self.state
    }

    pub fn lines(&self) -> &[RfqLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&RfqLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn fiscal_position(&self) -> Option<&str> {
        self.fiscal_position.as_deref()
    }

    pub fn payment_terms(&self) -> Option<&str> {
        self.payment_terms.as_deref()
    }

    /// The winning bid. Once set it never changes.
    pub fn awarded_bid_id(&self) -> Option<&str> {
        self.awarded_bid_id.as_deref()
    }

    pub fn purchase_order_id(&self) -> Option<&str> {
        self.purchase_order_id.as_deref()
    }

    pub fn is_awarded(&self) -> bool {
        self.awarded_bid_id.is_some()
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub(crate) fn next_line_sequence(&self) -> i32 {
        self.lines.iter().map(|l| l.sequence).max().unwrap_or(0) + 10
    }

    pub(crate) fn label(&self) -> String {
        format!("RFQ {}", self.reference)
    }
}

/// An RFQ together with its vendor assignments and every bid placed on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfqAggregate {
    pub(crate) rfq: Rfq,
    pub(crate) assignments: Vec<VendorAssignment>,
    pub(crate) bids: Vec<Bid>,
}

impl RfqAggregate {
    pub fn rfq(&self) -> &Rfq {
        &self.rfq
    }

    pub fn assignments(&self) -> &[VendorAssignment] {
        &self.assignments
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn assignment(&self, assignment_id: &str) -> Option<&VendorAssignment> {
        self.assignments.iter().find(|a| a.id == assignment_id)
    }

    pub fn assignment_for_vendor(&self, vendor_id: &str) -> Option<&VendorAssignment> {
        self.assignments.iter().find(|a| a.vendor.id() == vendor_id)
    }

    pub fn bid(&self, bid_id: &str) -> Option<&Bid> {
        self.bids.iter().find(|b| b.id() == bid_id)
    }

    /// The bids placed under one assignment.
    pub fn bids_for_assignment<'a>(
        &'a self,
        assignment_id: &'a str,
    ) -> impl Iterator<Item = &'a Bid> + 'a {
        self.bids
            .iter()
            .filter(move |b| b.assignment_id() == assignment_id)
    }

    pub fn into_rfq(self) -> Rfq {
        self.rfq
    }
}
