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

//! Vendor bids placed against an RFQ.
//!
//! A bid is created under one vendor assignment with one line per product line of the RFQ.
//! Products, descriptions, quantities and units are copied from the RFQ and cannot be edited;
//! the vendor fills in price, discount, taxes and lead time. The bid's totals are the sums of
//! its lines' amounts as computed by a `TaxCalculator`.

pub(crate) mod cascade;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::currency::Currency;
use crate::error::{InternalError, ValidationError};
use crate::product::Product;
use crate::rfq::{check_discount, Rfq, VendorAssignment};
use crate::tax::{discounted_price, TaxCalculator, TaxRule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidState {
    Draft,
    Submitted,
    UnderReview,
    Awarded,
    Rejected,
}

impl BidState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidState::Draft => "draft",
            BidState::Submitted => "submitted",
            BidState::UnderReview => "under_review",
            BidState::Awarded => "awarded",
            BidState::Rejected => "rejected",
        }
    }

    /// Returns true for bids still competing for the award.
    pub fn is_open(&self) -> bool {
        matches!(self, BidState::Submitted | BidState::UnderReview)
    }
}

impl fmt::Display for BidState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidState {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BidState::Draft),
            "submitted" => Ok(BidState::Submitted),
            "under_review" => Ok(BidState::UnderReview),
            "awarded" => Ok(BidState::Awarded),
            "rejected" => Ok(BidState::Rejected),
            _ => Err(InternalError::with_message(format!(
                "Unknown bid state: {}",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidLine {
    pub(crate) id: String,
    pub(crate) rfq_line_id: String,
    pub(crate) sequence: i32,
    pub(crate) product: Product,
    pub(crate) description: String,
    pub(crate) quantity: Decimal,
    pub(crate) uom: String,
    pub(crate) price_unit: Decimal,
    pub(crate) discount: Decimal,
    pub(crate) taxes: Vec<TaxRule>,
    pub(crate) lead_time_days: i32,
    pub(crate) price_subtotal: Decimal,
    pub(crate) price_tax: Decimal,
    pub(crate) price_total: Decimal,
}

impl BidLine {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The RFQ line this line quotes.
    pub fn rfq_line_id(&self) -> &str {
        &self.rfq_line_id
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

    pub fn price_unit(&self) -> Decimal {
        self.price_unit
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn taxes(&self) -> &[TaxRule] {
        &self.taxes
    }

    /// Days between order confirmation and delivery.
    pub fn lead_time_days(&self) -> i32 {
        self.lead_time_days
    }

    pub fn price_subtotal(&self) -> Decimal {
        self.price_subtotal
    }

    pub fn price_tax(&self) -> Decimal {
        self.price_tax
    }

    pub fn price_total(&self) -> Decimal {
        self.price_total
    }
}

/// The vendor-editable values of a bid line. Unset values are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BidLineUpdate {
    price_unit: Option<Decimal>,
    discount: Option<Decimal>,
    taxes: Option<Vec<TaxRule>>,
    lead_time_days: Option<i32>,
}

impl BidLineUpdate {
    pub fn new() -> Self {
        BidLineUpdate::default()
    }

    pub fn with_price_unit(mut self, price_unit: Decimal) -> Self {
        self.price_unit = Some(price_unit);
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    /// Replaces the line's tax rules.
    pub fn with_taxes(mut self, taxes: Vec<TaxRule>) -> Self {
        self.taxes = Some(taxes);
        self
    }

    pub fn with_lead_time_days(mut self, days: i32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(price) = self.price_unit {
            if price < Decimal::ZERO {
                return Err(ValidationError::new(
                    "price_unit".to_string(),
                    format!("must not be negative, got {}", price),
                ));
            }
        }
        if let Some(discount) = self.discount {
            check_discount(discount)?;
        }
        if let Some(days) = self.lead_time_days {
            if days < 0 {
                return Err(ValidationError::new(
                    "lead_time_days".to_string(),
                    format!("must not be negative, got {}", days),
                ));
            }
        }
        Ok(())
    }
}

/// The commercial terms of a bid. Unset values are left unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BidTermsUpdate {
    validity_date: Option<NaiveDate>,
    delivery_terms: Option<String>,
    payment_terms: Option<String>,
    notes: Option<String>,
}

impl BidTermsUpdate {
    pub fn new() -> Self {
        BidTermsUpdate::default()
    }

    /// Sets the date until which the vendor honors the bid.
    pub fn with_validity_date(mut self, date: NaiveDate) -> Self {
        self.validity_date = Some(date);
        self
    }

    pub fn with_delivery_terms(mut self, terms: &str) -> Self {
        self.delivery_terms = Some(terms.to_string());
        self
    }

    pub fn with_payment_terms(mut self, terms: &str) -> Self {
        self.payment_terms = Some(terms.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub(crate) id: String,
    pub(crate) reference: String,
    pub(crate) assignment_id: String,
    pub(crate) rfq_id: String,
    pub(crate) vendor_id: String,
    pub(crate) bid_date: DateTime<Utc>,
    pub(crate) validity_date: Option<NaiveDate>,
    pub(crate) lines: Vec<BidLine>,
    pub(crate) state: BidState,
    pub(crate) currency: Currency,
    pub(crate) amount_untaxed: Decimal,
    pub(crate) amount_tax: Decimal,
    pub(crate) amount_total: Decimal,
    pub(crate) delivery_terms: Option<String>,
    pub(crate) payment_terms: Option<String>,
    pub(crate) notes: Option<String>,
}

impl Bid {
    /// Opens a draft bid for `assignment` with one zero-priced line per product line of `rfq`.
    pub(crate) fn for_assignment(
        id: String,
        reference: String,
        assignment: &VendorAssignment,
        rfq: &Rfq,
        bid_date: DateTime<Utc>,
    ) -> Self {
        let lines = rfq
            .lines()
            .iter()
            .filter(|line| line.is_product_line())
            .filter_map(|line| {
                let product = line.product()?.clone();
                Some(BidLine {
                    id: Uuid::new_v4().to_string(),
                    rfq_line_id: line.id().to_string(),
                    sequence: line.sequence(),
                    product,
                    description: line.description().to_string(),
                    quantity: line.quantity(),
                    uom: line.uom().unwrap_or_default().to_string(),
                    price_unit: Decimal::ZERO,
                    discount: Decimal::ZERO,
                    taxes: Vec::new(),
                    lead_time_days: 0,
                    price_subtotal: Decimal::ZERO,
                    price_tax: Decimal::ZERO,
                    price_total: Decimal::ZERO,
                })
            })
            .collect();

        Bid {
            id,
            reference,
            assignment_id: assignment.id().to_string(),
            rfq_id: rfq.id().to_string(),
            vendor_id: assignment.vendor().id().to_string(),
            bid_date,
            validity_date: None,
            lines,
            state: BidState::Draft,
            currency: rfq.currency().clone(),
            amount_untaxed: Decimal::ZERO,
            amount_tax: Decimal::ZERO,
            amount_total: Decimal::ZERO,
            delivery_terms: None,
            payment_terms: None,
            notes: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn assignment_id(&self) -> &str {
        &self.assignment_id
    }

    pub fn rfq_id(&self) -> &str {
        &self.rfq_id
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn bid_date(&self) -> DateTime<Utc> {
        self.bid_date
    }

    pub fn validity_date(&self) -> Option<NaiveDate> {
        self.validity_date
    }

    pub fn lines(&self) -> &[BidLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&BidLine> {
        self.lines.iter().find(|line| line.id == line_id)
    }

    pub fn state(&self) -> BidState {
        self.state
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn amount_untaxed(&self) -> Decimal {
        self.amount_untaxed
    }

    pub fn amount_tax(&self) -> Decimal {
        self.amount_tax
    }

    pub fn amount_total(&self) -> Decimal {
        self.amount_total
    }

    pub fn delivery_terms(&self) -> Option<&str> {
        self.delivery_terms.as_deref()
    }

    pub fn payment_terms(&self) -> Option<&str> {
        self.payment_terms.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub(crate) fn label(&self) -> String {
        format!("bid {}", self.reference)
    }

    pub(crate) fn set_state(&mut self, state: BidState) {
        self.state = state;
    }

    /// Applies `update` to the line `line_id` and recomputes every amount of the bid.
    ///
    /// Returns false, leaving the bid untouched, if the bid has no such line.
    pub(crate) fn apply_line_update(
        &mut self,
        line_id: &str,
        update: BidLineUpdate,
        calculator: &dyn TaxCalculator,
    ) -> Result<bool, ValidationError> {
        update.validate()?;

        let line = match self.lines.iter_mut().find(|line| line.id == line_id) {
            Some(line) => line,
            None => return Ok(false),
        };
        if let Some(price_unit) = update.price_unit {
            line.price_unit = price_unit;
        }
        if let Some(discount) = update.discount {
            line.discount = discount;
        }
        if let Some(taxes) = update.taxes {
            line.taxes = taxes;
        }
        if let Some(days) = update.lead_time_days {
            line.lead_time_days = days;
        }

        self.recompute_amounts(calculator);
        Ok(true)
    }

    pub(crate) fn apply_terms(&mut self, terms: BidTermsUpdate) {
        if let Some(date) = terms.validity_date {
            self.validity_date = Some(date);
        }
        if let Some(delivery_terms) = terms.delivery_terms {
            self.delivery_terms = Some(delivery_terms);
        }
        if let Some(payment_terms) = terms.payment_terms {
            self.payment_terms = Some(payment_terms);
        }
        if let Some(notes) = terms.notes {
            self.notes = Some(notes);
        }
    }

    /// Recomputes each line's amounts from its net price and the bid totals from the lines.
    pub(crate) fn recompute_amounts(&mut self, calculator: &dyn TaxCalculator) {
        for line in self.lines.iter_mut() {
            let amounts = calculator.compute(
                discounted_price(line.price_unit, line.discount),
                &self.currency,
                line.quantity,
                &line.product,
                Some(&self.vendor_id),
                &line.taxes,
            );
            line.price_subtotal = amounts.subtotal;
            line.price_tax = amounts.tax_amount;
            line.price_total = amounts.total;
        }

        self.amount_untaxed = self.lines.iter().map(|line| line.price_subtotal).sum();
        self.amount_tax = self.lines.iter().map(|line| line.price_tax).sum();
        self.amount_total = self.amount_untaxed + self.amount_tax;
    }

    /// Verifies that the bid is complete enough to be submitted.
    pub(crate) fn check_submittable(&self) -> Result<(), ValidationError> {
        if self.lines.is_empty() {
            return Err(ValidationError::new(
                "lines".to_string(),
                format!("{} has no lines", self.label()),
            ));
        }
        if let Some(line) = self.lines.iter().find(|line| line.price_unit <= Decimal::ZERO) {
            return Err(ValidationError::new(
                "price_unit".to_string(),
                format!(
                    "every line of {} needs a unit price greater than zero; {} has none",
                    self.label(),
                    line.description
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfq::{RfqLineDraft, RfqState, Vendor};
    use crate::tax::StandardTaxCalculator;
    use rust_decimal_macros::dec;

    fn rfq() -> Rfq {
        let planned = NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date");
        let lines = vec![
            RfqLineDraft::section("Furniture")
                .into_line("l0".into(), 10, "Units", planned)
                .expect("valid section"),
            RfqLineDraft::product(Product::new("p1", "Desk"), dec!(2), dec!(100))
                .into_line("l1".into(), 20, "Units", planned)
                .expect("valid line"),
            RfqLineDraft::product(Product::new("p2", "Chair"), dec!(5), dec!(20))
                .into_line("l2".into(), 30, "Units", planned)
                .expect("valid line"),
        ];

        Rfq {
            id: "rfq-1".into(),
            reference: "P00001".into(),
            company: "My Company".into(),
            currency: Currency::usd(),
            origin: None,
            request_id: None,
            created_by: None,
            date_order: planned,
            notes: None,
            state: RfqState::Draft,
            lines,
            fiscal_position: None,
            payment_terms: None,
            awarded_bid_id: None,
            purchase_order_id: None,
            version: 0,
        }
    }

    fn draft_bid() -> Bid {
        let rfq = rfq();
        let assignment =
            VendorAssignment::new("a1".into(), rfq.id(), Vendor::new("v1", "Acme"), None);
        Bid::for_assignment("b1".into(), "BID00001".into(), &assignment, &rfq, Utc::now())
    }

    #[test]
    fn test_lines_follow_product_lines() {
        let bid = draft_bid();

        assert_eq!(bid.lines().len(), 2);
        assert_eq!(bid.lines()[0].rfq_line_id(), "l1");
        assert_eq!(bid.lines()[0].quantity(), dec!(2));
        assert_eq!(bid.lines()[1].description(), "Chair");
        assert!(bid.lines().iter().all(|l| l.price_unit() == Decimal::ZERO));
        assert_eq!(bid.vendor_id(), "v1");
        assert_eq!(bid.state(), BidState::Draft);
    }

    /// Tests that line and bid amounts follow every line update.
    #[test]
    fn test_amounts() {
        let mut bid = draft_bid();
        let calculator = StandardTaxCalculator::new();
        let desk = bid.lines()[0].id().to_string();
        let chair = bid.lines()[1].id().to_string();

        assert!(bid
            .apply_line_update(
                &desk,
                BidLineUpdate::new()
                    .with_price_unit(dec!(100))
                    .with_discount(dec!(10)),
                &calculator,
            )
            .expect("valid update"));
        assert_eq!(bid.lines()[0].price_subtotal(), dec!(180));
        assert_eq!(bid.lines()[0].price_total(), dec!(180));

        bid.apply_line_update(
            &chair,
            BidLineUpdate::new()
                .with_price_unit(dec!(20))
                .with_taxes(vec![TaxRule::percent("VAT", dec!(10))]),
            &calculator,
        )
        .expect("valid update");

        assert_eq!(bid.amount_untaxed(), dec!(280));
        assert_eq!(bid.amount_tax(), dec!(10));
        assert_eq!(bid.amount_total(), dec!(290));
        assert_eq!(
            bid.amount_total(),
            bid.lines().iter().map(BidLine::price_total).sum::<Decimal>()
        );
    }

    #[test]
    fn test_line_update_validation() {
        let mut bid = draft_bid();
        let calculator = StandardTaxCalculator::new();
        let desk = bid.lines()[0].id().to_string();

        let err = bid
            .apply_line_update(&desk, BidLineUpdate::new().with_discount(dec!(-5)), &calculator)
            .expect_err("negative discount");
        assert_eq!(err.field(), "discount");

        assert!(!bid
            .apply_line_update(
                "missing",
                BidLineUpdate::new().with_price_unit(dec!(1)),
                &calculator
            )
            .expect("valid update"));
    }

    #[test]
    fn test_submittable() {
        let mut bid = draft_bid();
        let calculator = StandardTaxCalculator::new();
        let desk = bid.lines()[0].id().to_string();
        let chair = bid.lines()[1].id().to_string();

        assert_eq!(
            bid.check_submittable().expect_err("unpriced").field(),
            "price_unit"
        );

        bid.apply_line_update(&desk, BidLineUpdate::new().with_price_unit(dec!(90)), &calculator)
            .expect("valid update");
        assert!(bid.check_submittable().is_err());

        bid.apply_line_update(&chair, BidLineUpdate::new().with_price_unit(dec!(19)), &calculator)
            .expect("valid update");
        assert!(bid.check_submittable().is_ok());

        bid.lines.clear();
        assert_eq!(bid.check_submittable().expect_err("no lines").field(), "lines");
    }
}
