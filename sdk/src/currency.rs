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

//! Currencies attached to procurement documents.
//!
//! A document stores its currency but amounts are never converted between currencies; the
//! currency only decides how monetary amounts are rounded.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    decimal_places: u32,
}

impl Currency {
    /// Creates a currency with an ISO 4217 code and the number of decimal places its amounts
    /// are rounded to.
    pub fn new(code: &str, decimal_places: u32) -> Self {
        Self {
            code: code.to_uppercase(),
            decimal_places,
        }
    }

    pub fn usd() -> Self {
        Self::new("USD", 2)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Rounds an amount to this currency's precision, half away from zero.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::usd()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        let usd = Currency::usd();
        assert_eq!(usd.round(dec!(1.005)), dec!(1.01));
        assert_eq!(usd.round(dec!(-1.005)), dec!(-1.01));
        assert_eq!(usd.round(dec!(2.004)), dec!(2.00));

        let jpy = Currency::new("jpy", 0);
        assert_eq!(jpy.code(), "JPY");
        assert_eq!(jpy.round(dec!(99.5)), dec!(100));
    }
}
