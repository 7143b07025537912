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

//! Engine-wide settings.

use std::error::Error;
use std::fmt;

use crate::currency::Currency;
use crate::sequence::{DocumentKind, SequenceFormat};

const DEFAULT_COMPANY: &str = "My Company";
const DEFAULT_RFQ_EMAIL_TEMPLATE: &str = "purchase.email_template_edi_purchase";
const DEFAULT_UOM: &str = "Units";
const DEFAULT_SEQUENCE_PADDING: usize = 5;

#[derive(Clone, Debug)]
pub struct ProcurementConfig {
    company: String,
    currency: Currency,
    use_bid_pricing: bool,
    rfq_email_template: String,
    default_uom: String,
    request_sequence: SequenceFormat,
    order_sequence: SequenceFormat,
    bid_sequence: SequenceFormat,
}

impl ProcurementConfig {
    /// The company every new document belongs to.
    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Whether an award prices the purchase order from the winning bid when the caller does
    /// not choose.
    pub fn use_bid_pricing(&self) -> bool {
        self.use_bid_pricing
    }

    pub fn rfq_email_template(&self) -> &str {
        &self.rfq_email_template
    }

    pub fn default_uom(&self) -> &str {
        &self.default_uom
    }

    pub fn sequence_format(&self, kind: DocumentKind) -> &SequenceFormat {
        match kind {
            DocumentKind::PurchaseRequest => &self.request_sequence,
            DocumentKind::PurchaseOrder => &self.order_sequence,
            DocumentKind::Bid => &self.bid_sequence,
        }
    }
}

pub struct ProcurementConfigBuilder {
    company: Option<String>,
    currency: Option<Currency>,
    use_bid_pricing: Option<bool>,
    rfq_email_template: Option<String>,
    default_uom: Option<String>,
    request_sequence: Option<SequenceFormat>,
    order_sequence: Option<SequenceFormat>,
    bid_sequence: Option<SequenceFormat>,
}

impl Default for ProcurementConfigBuilder {
    fn default() -> Self {
        Self {
            company: Some(DEFAULT_COMPANY.to_owned()),
            currency: Some(Currency::usd()),
            use_bid_pricing: Some(true),
            rfq_email_template: Some(DEFAULT_RFQ_EMAIL_TEMPLATE.to_owned()),
            default_uom: Some(DEFAULT_UOM.to_owned()),
            request_sequence: Some(SequenceFormat::new("PR", DEFAULT_SEQUENCE_PADDING)),
            order_sequence: Some(SequenceFormat::new("P", DEFAULT_SEQUENCE_PADDING)),
            bid_sequence: Some(SequenceFormat::new("BID", DEFAULT_SEQUENCE_PADDING)),
        }
    }
}

impl ProcurementConfigBuilder {
    pub fn with_company(mut self, company: &str) -> Self {
        self.company = Some(company.to_owned());
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_use_bid_pricing(mut self, use_bid_pricing: bool) -> Self {
        self.use_bid_pricing = Some(use_bid_pricing);
        self
    }

    pub fn with_rfq_email_template(mut self, template: &str) -> Self {
        self.rfq_email_template = Some(template.to_owned());
        self
    }

    pub fn with_default_uom(mut self, uom: &str) -> Self {
        self.default_uom = Some(uom.to_owned());
        self
    }

    pub fn with_sequence_format(mut self, kind: DocumentKind, format: SequenceFormat) -> Self {
        match kind {
            DocumentKind::PurchaseRequest => self.request_sequence = Some(format),
            DocumentKind::PurchaseOrder => self.order_sequence = Some(format),
            DocumentKind::Bid => self.bid_sequence = Some(format),
        }
        self
    }

    pub fn build(mut self) -> Result<ProcurementConfig, ConfigurationError> {
        let company = self
            .company
            .take()
            .ok_or_else(|| ConfigurationError::MissingValue("company".to_owned()))?;
        if company.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "company".to_owned(),
                "must not be empty".to_owned(),
            ));
        }

        let request_sequence = self
            .request_sequence
            .take()
            .ok_or_else(|| ConfigurationError::MissingValue("request_sequence".to_owned()))?;
        let order_sequence = self
            .order_sequence
            .take()
            .ok_or_else(|| ConfigurationError::MissingValue("order_sequence".to_owned()))?;
        let bid_sequence = self
            .bid_sequence
            .take()
            .ok_or_else(|| ConfigurationError::MissingValue("bid_sequence".to_owned()))?;

        let prefixes = [
            request_sequence.prefix(),
            order_sequence.prefix(),
            bid_sequence.prefix(),
        ];
        if prefixes[0] == prefixes[1] || prefixes[0] == prefixes[2] || prefixes[1] == prefixes[2]
        {
            return Err(ConfigurationError::InvalidValue(
                "sequence prefixes".to_owned(),
                "each document kind needs a distinct prefix".to_owned(),
            ));
        }

        Ok(ProcurementConfig {
            company,
            currency: self
                .currency
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("currency".to_owned()))?,
            use_bid_pricing: self
                .use_bid_pricing
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("use_bid_pricing".to_owned()))?,
            rfq_email_template: self
                .rfq_email_template
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("rfq_email_template".to_owned()))?,
            default_uom: self
                .default_uom
                .take()
                .ok_or_else(|| ConfigurationError::MissingValue("default_uom".to_owned()))?,
            request_sequence,
            order_sequence,
            bid_sequence,
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigurationError {
    MissingValue(String),
    InvalidValue(String, String),
}

impl Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigurationError::MissingValue(config_field_name) => {
                write!(f, "Missing configuration for {}", config_field_name)
            }
            ConfigurationError::InvalidValue(config_field_name, reason) => {
                write!(f, "Invalid configuration for {}: {}", config_field_name, reason)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_with_defaults() {
        let config = ProcurementConfigBuilder::default()
            .build()
            .expect("Unable to build configuration");

        assert_eq!("My Company", config.company());
        assert_eq!("USD", config.currency().code());
        assert!(config.use_bid_pricing());
        assert_eq!("Units", config.default_uom());
        assert_eq!(
            "PR00001",
            config.sequence_format(DocumentKind::PurchaseRequest).render(1)
        );
    }

    #[test]
    fn build_with_overrides() {
        let config = ProcurementConfigBuilder::default()
            .with_company("Acme")
            .with_currency(Currency::new("EUR", 2))
            .with_use_bid_pricing(false)
            .with_sequence_format(DocumentKind::Bid, SequenceFormat::new("Q", 3))
            .build()
            .expect("Unable to build configuration");

        assert_eq!("Acme", config.company());
        assert_eq!("EUR", config.currency().code());
        assert!(!config.use_bid_pricing());
        assert_eq!("Q007", config.sequence_format(DocumentKind::Bid).render(7));
    }

    #[test]
    fn build_with_clashing_prefixes() {
        let result = ProcurementConfigBuilder::default()
            .with_sequence_format(DocumentKind::Bid, SequenceFormat::new("PR", 5))
            .build();

        assert!(matches!(result, Err(ConfigurationError::InvalidValue(_, _))));
    }

    #[test]
    fn build_with_empty_company() {
        let result = ProcurementConfigBuilder::default().with_company(" ").build();

        assert_eq!(
            result.err(),
            Some(ConfigurationError::InvalidValue(
                "company".to_owned(),
                "must not be empty".to_owned()
            ))
        );
    }
}
