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

//! Purchase orders issued to the winner of an RFQ.
//!
//! A purchase order only comes into existence through an award. It is a binding order to a
//! single vendor and carries no bidding state of its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::currency::Currency;
use crate::product::Product;
use crate::rfq::Vendor;
use crate::tax::{discounted_price, TaxCalculator, TaxRule};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub(crate) id: String,
    pub(crate) sequence: i32,
    pub(crate) product: Product,
    pub(crate) description: String,
    pub(crate) quantity: Decimal,
    pub(crate) uom: String,
    pub(crate) price_unit: Decimal,
    pub(crate) discount: Decimal,
    pub(crate) taxes: Vec<TaxRule>,
    pub(crate) planned_date: DateTime<Utc>,
    pub(crate) price_subtotal: Decimal,
    pub(crate) price_tax: Decimal,
    pub(crate) price_total: Decimal,
}

impl PurchaseOrderLine {
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

    pub fn price_unit(&self) -> Decimal {
        self.price_unit
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn taxes(&self) -> &[TaxRule] {
        &self.taxes
    }

    pub fn planned_date(&self) -> DateTime<Utc> {
        self.planned_date
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

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub(crate) id: String,
    pub(crate) reference: String,
    pub(crate) vendor: Vendor,
    pub(crate) origin: String,
    pub(crate) rfq_id: String,
    pub(crate) awarded_bid_id: String,
    pub(crate) company: String,
    pub(crate) currency: Currency,
    pub(crate) fiscal_position: Option<String>,
    pub(crate) payment_terms: Option<String>,
    pub(crate) notes: Option<String>,
    pub(crate) buyer: Option<String>,
    pub(crate) date_order: DateTime<Utc>,
    pub(crate) lines: Vec<PurchaseOrderLine>,
    pub(crate) amount_untaxed: Decimal,
    pub(crate) amount_tax: Decimal,
    pub(crate) amount_total: Decimal,
}

impl PurchaseOrder {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The vendor the order is placed with.
    pub fn vendor(&self) -> &Vendor {
        &self.vendor
    }

    /// The reference of the RFQ the order was awarded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn rfq_id(&self) -> &str {
        &self.rfq_id
    }

    pub fn awarded_bid_id(&self) -> &str {
        &self.awarded_bid_id
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn fiscal_position(&self) -> Option<&str> {
        self.fiscal_position.as_deref()
    }

    pub fn payment_terms(&self) -> Option<&str> {
        self.payment_terms.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// The user responsible for the order, inherited from the RFQ.
    pub fn buyer(&self) -> Option<&str> {
        self.buyer.as_deref()
    }

    pub fn date_order(&self) -> DateTime<Utc> {
        self.date_order
    }

    pub fn lines(&self) -> &[PurchaseOrderLine] {
        &self.lines
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

    pub(crate) fn recompute_amounts(&mut self, calculator: &dyn TaxCalculator) {
        for line in self.lines.iter_mut() {
            let amounts = calculator.compute(
                discounted_price(line.price_unit, line.discount),
                &self.currency,
                line.quantity,
                &line.product,
                Some(self.vendor.id()),
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
}
