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

use rust_decimal::Decimal;

use super::{TaxCalculator, TaxComputation, TaxKind, TaxRule};
use crate::currency::Currency;
use crate::product::Product;

/// A tax calculator supporting percentage and per-unit taxes, either added on top of the price
/// or already included in it.
///
/// Included taxes are extracted from the gross amount first; every tax is then computed on the
/// resulting untaxed base and rounded individually to the currency.
#[derive(Clone, Debug, Default)]
pub struct StandardTaxCalculator;

impl StandardTaxCalculator {
    pub fn new() -> Self {
        StandardTaxCalculator
    }
}

impl TaxCalculator for StandardTaxCalculator {
    fn compute(
        &self,
        net_price: Decimal,
        currency: &Currency,
        quantity: Decimal,
        _product: &Product,
        _partner: Option<&str>,
        taxes: &[TaxRule],
    ) -> TaxComputation {
        let gross = net_price * quantity;

        let (included_percent, included_fixed) = taxes
            .iter()
            .filter(|tax| tax.price_include())
            .fold((Decimal::ZERO, Decimal::ZERO), |(pct, fixed), tax| {
                match tax.kind() {
                    TaxKind::Percent => (pct + tax.amount(), fixed),
                    TaxKind::Fixed => (pct, fixed + tax.amount() * quantity),
                }
            });

        let base = (gross - included_fixed)
            / (Decimal::ONE + included_percent / Decimal::ONE_HUNDRED);

        let tax_amount = taxes
            .iter()
            .map(|tax| match tax.kind() {
                TaxKind::Percent => currency.round(base * tax.amount() / Decimal::ONE_HUNDRED),
                TaxKind::Fixed => currency.round(tax.amount() * quantity),
            })
            .sum::<Decimal>();

        let subtotal = currency.round(base);

        TaxComputation {
            subtotal,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }
}
