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

//! Tax computation for priced lines.
//!
//! Tax evaluation is an external concern: the engine hands a net unit price, a quantity and a
//! set of tax rules to a `TaxCalculator` and stores whatever subtotal, tax and total it gets
//! back. `StandardTaxCalculator` is provided for hosts without their own tax engine.

mod standard;

use std::fmt;

use rust_decimal::Decimal;

use crate::currency::Currency;
use crate::product::Product;

pub use standard::StandardTaxCalculator;

/// How a tax rule's amount is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxKind {
    /// `amount` is a percentage of the line's untaxed base.
    Percent,
    /// `amount` is charged once per unit.
    Fixed,
}

/// A single purchase tax.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    name: String,
    kind: TaxKind,
    amount: Decimal,
    price_include: bool,
}

impl TaxRule {
    pub fn percent(name: &str, amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            kind: TaxKind::Percent,
            amount,
            price_include: false,
        }
    }

    pub fn fixed(name: &str, amount: Decimal) -> Self {
        Self {
            name: name.to_string(),
            kind: TaxKind::Fixed,
            amount,
            price_include: false,
        }
    }

    /// Marks the tax as already included in the unit price it is applied to.
    pub fn included_in_price(mut self) -> Self {
        self.price_include = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TaxKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn price_include(&self) -> bool {
        self.price_include
    }
}

impl fmt::Display for TaxRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TaxKind::Percent => write!(f, "{} ({}%)", self.name, self.amount),
            TaxKind::Fixed => write!(f, "{} ({} per unit)", self.name, self.amount),
        }
    }
}

/// The amounts produced for one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxComputation {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Computes line amounts. Implementations must be pure: the same inputs always produce the
/// same amounts and nothing else is touched.
pub trait TaxCalculator: Send + Sync {
    /// Computes the amounts of a line.
    ///
    /// # Arguments
    ///
    ///  * `net_price` - Unit price after discount
    ///  * `currency` - Currency used for rounding
    ///  * `quantity` - Number of units
    ///  * `product` - The product on the line
    ///  * `partner` - The vendor's id, when the line belongs to a vendor document
    ///  * `taxes` - The tax rules to apply, in order
    fn compute(
        &self,
        net_price: Decimal,
        currency: &Currency,
        quantity: Decimal,
        product: &Product,
        partner: Option<&str>,
        taxes: &[TaxRule],
    ) -> TaxComputation;
}

/// Applies a percentage discount to a unit price: `price × (1 − discount / 100)`.
pub fn discounted_price(price_unit: Decimal, discount: Decimal) -> Decimal {
    price_unit * (Decimal::ONE - discount / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price(dec!(100), dec!(10)), dec!(90));
        assert_eq!(discounted_price(dec!(18), dec!(0)), dec!(18));
        assert_eq!(discounted_price(dec!(50), dec!(100)), dec!(0));
    }
}
