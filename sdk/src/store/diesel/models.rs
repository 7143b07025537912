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

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use super::schema::{
    bid, bid_line, purchase_order, purchase_order_line, purchase_request, purchase_request_line,
    rfq, rfq_line, vendor_assignment,
};
use crate::bid::{Bid, BidLine, BidState};
use crate::collaborators::Employee;
use crate::currency::Currency;
use crate::error::InternalError;
use crate::product::Product;
use crate::purchase_order::{PurchaseOrder, PurchaseOrderLine};
use crate::purchase_request::{Priority, PurchaseRequest, RequestLine, RequestState};
use crate::rfq::{
    AssignmentStatus, LineDisplayType, Rfq, RfqLine, RfqState, Vendor, VendorAssignment,
};
use crate::store::ProcurementStoreError;
use crate::tax::TaxRule;

#[derive(AsChangeset, Insertable, PartialEq, Debug)]
#[table_name = "purchase_request"]
#[changeset_options(treat_none_as_null = "true")]
pub struct NewPurchaseRequestModel {
    pub request_id: String,
    pub reference: String,
    pub description: Option<String>,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_department: Option<String>,
    pub requester_user_id: Option<String>,
    pub request_date: NaiveDate,
    pub required_by: Option<NaiveDate>,
    pub priority: String,
    pub state: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub estimated_total: String,
    pub rfq_id: Option<String>,
    pub rfq_reference: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub version: i64,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct PurchaseRequestModel {
    pub id: i64,
    pub request_id: String,
    pub reference: String,
    pub description: Option<String>,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_department: Option<String>,
    pub requester_user_id: Option<String>,
    pub request_date: NaiveDate,
    pub required_by: Option<NaiveDate>,
    pub priority: String,
    pub state: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub estimated_total: String,
    pub rfq_id: Option<String>,
    pub rfq_reference: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub version: i64,
}

#[derive(Insertable, PartialEq, Debug)]
#[table_name = "purchase_request_line"]
pub struct NewPurchaseRequestLineModel {
    pub line_id: String,
    pub request_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub estimated_unit_price: String,
    pub specifications: Option<String>,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct PurchaseRequestLineModel {
    pub id: i64,
    pub line_id: String,
    pub request_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub estimated_unit_price: String,
    pub specifications: Option<String>,
}

#[derive(AsChangeset, Insertable, PartialEq, Debug)]
#[table_name = "rfq"]
#[changeset_options(treat_none_as_null = "true")]
pub struct NewRfqModel {
    pub rfq_id: String,
    pub reference: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub origin: Option<String>,
    pub request_id: Option<String>,
    pub created_by: Option<String>,
    pub date_order: NaiveDate,
    pub notes: Option<String>,
    pub state: String,
    pub fiscal_position: Option<String>,
    pub payment_terms: Option<String>,
    pub awarded_bid_id: Option<String>,
    pub purchase_order_id: Option<String>,
    pub version: i64,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct RfqModel {
    pub id: i64,
    pub rfq_id: String,
    pub reference: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub origin: Option<String>,
    pub request_id: Option<String>,
    pub created_by: Option<String>,
    pub date_order: NaiveDate,
    pub notes: Option<String>,
    pub state: String,
    pub fiscal_position: Option<String>,
    pub payment_terms: Option<String>,
    pub awarded_bid_id: Option<String>,
    pub purchase_order_id: Option<String>,
    pub version: i64,
}

#[derive(Insertable, PartialEq, Debug)]
#[table_name = "rfq_line"]
pub struct NewRfqLineModel {
    pub line_id: String,
    pub rfq_id: String,
    pub sequence: i32,
    pub display_type: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: Option<String>,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub planned_date: Option<NaiveDate>,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct RfqLineModel {
    pub id: i64,
    pub line_id: String,
    pub rfq_id: String,
    pub sequence: i32,
    pub display_type: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: Option<String>,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub planned_date: Option<NaiveDate>,
}

#[derive(AsChangeset, Insertable, PartialEq, Debug)]
#[table_name = "vendor_assignment"]
#[changeset_options(treat_none_as_null = "true")]
pub struct NewVendorAssignmentModel {
    pub assignment_id: String,
    pub rfq_id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_email: Option<String>,
    pub status: String,
    pub sent_at: Option<NaiveDateTime>,
    pub responded_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct VendorAssignmentModel {
    pub id: i64,
    pub assignment_id: String,
    pub rfq_id: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_email: Option<String>,
    pub status: String,
    pub sent_at: Option<NaiveDateTime>,
    pub responded_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

#[derive(AsChangeset, Insertable, PartialEq, Debug)]
#[table_name = "bid"]
#[changeset_options(treat_none_as_null = "true")]
pub struct NewBidModel {
    pub bid_id: String,
    pub reference: String,
    pub assignment_id: String,
    pub rfq_id: String,
    pub vendor_id: String,
    pub bid_date: NaiveDateTime,
    pub validity_date: Option<NaiveDate>,
    pub state: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub amount_untaxed: String,
    pub amount_tax: String,
    pub amount_total: String,
    pub delivery_terms: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct BidModel {
    pub id: i64,
    pub bid_id: String,
    pub reference: String,
    pub assignment_id: String,
    pub rfq_id: String,
    pub vendor_id: String,
    pub bid_date: NaiveDateTime,
    pub validity_date: Option<NaiveDate>,
    pub state: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub amount_untaxed: String,
    pub amount_tax: String,
    pub amount_total: String,
    pub delivery_terms: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Insertable, PartialEq, Debug)]
#[table_name = "bid_line"]
pub struct NewBidLineModel {
    pub line_id: String,
    pub bid_id: String,
    pub rfq_line_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub lead_time_days: i32,
    pub price_subtotal: String,
    pub price_tax: String,
    pub price_total: String,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct BidLineModel {
    pub id: i64,
    pub line_id: String,
    pub bid_id: String,
    pub rfq_line_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub lead_time_days: i32,
    pub price_subtotal: String,
    pub price_tax: String,
    pub price_total: String,
}

#[derive(Insertable, PartialEq, Debug)]
#[table_name = "purchase_order"]
pub struct NewPurchaseOrderModel {
    pub purchase_order_id: String,
    pub reference: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_email: Option<String>,
    pub origin: String,
    pub rfq_id: String,
    pub awarded_bid_id: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub fiscal_position: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub buyer: Option<String>,
    pub date_order: NaiveDateTime,
    pub amount_untaxed: String,
    pub amount_tax: String,
    pub amount_total: String,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct PurchaseOrderModel {
    pub id: i64,
    pub purchase_order_id: String,
    pub reference: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub vendor_email: Option<String>,
    pub origin: String,
    pub rfq_id: String,
    pub awarded_bid_id: String,
    pub company: String,
    pub currency_code: String,
    pub currency_decimal_places: i32,
    pub fiscal_position: Option<String>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub buyer: Option<String>,
    pub date_order: NaiveDateTime,
    pub amount_untaxed: String,
    pub amount_tax: String,
    pub amount_total: String,
}

#[derive(Insertable, PartialEq, Debug)]
#[table_name = "purchase_order_line"]
pub struct NewPurchaseOrderLineModel {
    pub line_id: String,
    pub purchase_order_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub planned_date: NaiveDateTime,
    pub price_subtotal: String,
    pub price_tax: String,
    pub price_total: String,
}

#[derive(Queryable, PartialEq, Debug)]
pub struct PurchaseOrderLineModel {
    pub id: i64,
    pub line_id: String,
    pub purchase_order_id: String,
    pub sequence: i32,
    pub product_id: String,
    pub product_name: String,
    pub product_uom: Option<String>,
    pub description: String,
    pub quantity: String,
    pub uom: String,
    pub price_unit: String,
    pub discount: String,
    pub taxes: String,
    pub planned_date: NaiveDateTime,
    pub price_subtotal: String,
    pub price_tax: String,
    pub price_total: String,
}

impl From<&PurchaseRequest> for NewPurchaseRequestModel {
    fn from(request: &PurchaseRequest) -> Self {
        NewPurchaseRequestModel {
            request_id: request.id.clone(),
            reference: request.reference.clone(),
            description: request.description.clone(),
            requester_id: request.requester.id().to_string(),
            requester_name: request.requester.name().to_string(),
            requester_department: request.requester.department().map(String::from),
            requester_user_id: request.requester.user_id().map(String::from),
            request_date: request.request_date,
            required_by: request.required_by,
            priority: request.priority.as_str().to_string(),
            state: request.state.as_str().to_string(),
            company: request.company.clone(),
            currency_code: request.currency.code().to_string(),
            currency_decimal_places: request.currency.decimal_places() as i32,
            estimated_total: request.estimated_total.to_string(),
            rfq_id: request.rfq_id.clone(),
            rfq_reference: request.rfq_reference.clone(),
            approved_by: request.approved_by.clone(),
            approved_at: request.approved_at.map(|at| at.naive_utc()),
            created_at: request.created_at.naive_utc(),
            version: request.version,
        }
    }
}

pub fn make_request_line_models(request: &PurchaseRequest) -> Vec<NewPurchaseRequestLineModel> {
    request
        .lines
        .iter()
        .map(|line| NewPurchaseRequestLineModel {
            line_id: line.id.clone(),
            request_id: request.id.clone(),
            sequence: line.sequence,
            product_id: line.product.id().to_string(),
            product_name: line.product.display_name().to_string(),
            product_uom: line.product.purchase_uom().map(String::from),
            description: line.description.clone(),
            quantity: line.quantity.to_string(),
            uom: line.uom.clone(),
            estimated_unit_price: line.estimated_unit_price.to_string(),
            specifications: line.specifications.clone(),
        })
        .collect()
}

pub fn make_purchase_request(
    model: PurchaseRequestModel,
    lines: Vec<PurchaseRequestLineModel>,
) -> Result<PurchaseRequest, ProcurementStoreError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(RequestLine {
                id: line.line_id,
                sequence: line.sequence,
                product: make_product(line.product_id, line.product_name, line.product_uom),
                description: line.description,
                quantity: parse_decimal(&line.quantity)?,
                uom: line.uom,
                estimated_unit_price: parse_decimal(&line.estimated_unit_price)?,
                specifications: line.specifications,
            })
        })
        .collect::<Result<Vec<_>, ProcurementStoreError>>()?;

    let mut requester = Employee::new(&model.requester_id, &model.requester_name);
    if let Some(department) = &model.requester_department {
        requester = requester.with_department(department);
    }
    if let Some(user_id) = &model.requester_user_id {
        requester = requester.with_user_id(user_id);
    }

    Ok(PurchaseRequest {
        id: model.request_id,
        reference: model.reference,
        description: model.description,
        requester,
        request_date: model.request_date,
        required_by: model.required_by,
        priority: Priority::from_str(&model.priority)?,
        lines,
        state: RequestState::from_str(&model.state)?,
        company: model.company,
        currency: make_currency(&model.currency_code, model.currency_decimal_places),
        estimated_total: parse_decimal(&model.estimated_total)?,
        rfq_id: model.rfq_id,
        rfq_reference: model.rfq_reference,
        approved_by: model.approved_by,
        approved_at: model.approved_at.map(to_utc),
        created_at: to_utc(model.created_at),
        version: model.version,
    })
}

impl From<&Rfq> for NewRfqModel {
    fn from(rfq: &Rfq) -> Self {
        NewRfqModel {
            rfq_id: rfq.id.clone(),
            reference: rfq.reference.clone(),
            company: rfq.company.clone(),
            currency_code: rfq.currency.code().to_string(),
            currency_decimal_places: rfq.currency.decimal_places() as i32,
            origin: rfq.origin.clone(),
            request_id: rfq.request_id.clone(),
            created_by: rfq.created_by.clone(),
            date_order: rfq.date_order,
            notes: rfq.notes.clone(),
            state: rfq.state.as_str().to_string(),
            fiscal_position: rfq.fiscal_position.clone(),
            payment_terms: rfq.payment_terms.clone(),
            awarded_bid_id: rfq.awarded_bid_id.clone(),
            purchase_order_id: rfq.purchase_order_id.clone(),
            version: rfq.version,
        }
    }
}

pub fn make_rfq_line_models(rfq: &Rfq) -> Result<Vec<NewRfqLineModel>, ProcurementStoreError> {
    rfq.lines
        .iter()
        .map(|line| {
            Ok(NewRfqLineModel {
                line_id: line.id.clone(),
                rfq_id: rfq.id.clone(),
                sequence: line.sequence,
                display_type: line.display_type.map(|kind| kind.as_str().to_string()),
                product_id: line.product.as_ref().map(|p| p.id().to_string()),
                product_name: line.product.as_ref().map(|p| p.display_name().to_string()),
                product_uom: line
                    .product
                    .as_ref()
                    .and_then(|p| p.purchase_uom())
                    .map(String::from),
                description: line.description.clone(),
                quantity: line.quantity.to_string(),
                uom: line.uom.clone(),
                price_unit: line.price_unit.to_string(),
                discount: line.discount.to_string(),
                taxes: taxes_to_json(&line.taxes)?,
                planned_date: line.planned_date,
            })
        })
        .collect()
}

pub fn make_rfq(
    model: RfqModel,
    lines: Vec<RfqLineModel>,
) -> Result<Rfq, ProcurementStoreError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            let product = match (line.product_id, line.product_name) {
                (Some(id), Some(name)) => Some(make_product(id, name, line.product_uom)),
                _ => None,
            };
            Ok(RfqLine {
                id: line.line_id,
                sequence: line.sequence,
                display_type: line
                    .display_type
                    .as_deref()
                    .map(LineDisplayType::from_str)
                    .transpose()?,
                product,
                description: line.description,
                quantity: parse_decimal(&line.quantity)?,
                uom: line.uom,
                price_unit: parse_decimal(&line.price_unit)?,
                discount: parse_decimal(&line.discount)?,
                taxes: taxes_from_json(&line.taxes)?,
                planned_date: line.planned_date,
            })
        })
        .collect::<Result<Vec<_>, ProcurementStoreError>>()?;

    Ok(Rfq {
        id: model.rfq_id,
        reference: model.reference,
        company: model.company,
        currency: make_currency(&model.currency_code, model.currency_decimal_places),
        origin: model.origin,
        request_id: model.request_id,
        created_by: model.created_by,
        date_order: model.date_order,
        notes: model.notes,
        state: RfqState::from_str(&model.state)?,
        lines,
        fiscal_position: model.fiscal_position,
        payment_terms: model.payment_terms,
        awarded_bid_id: model.awarded_bid_id,
        purchase_order_id: model.purchase_order_id,
        version: model.version,
    })
}

impl From<&VendorAssignment> for NewVendorAssignmentModel {
    fn from(assignment: &VendorAssignment) -> Self {
        NewVendorAssignmentModel {
            assignment_id: assignment.id.clone(),
            rfq_id: assignment.rfq_id.clone(),
            vendor_id: assignment.vendor.id().to_string(),
            vendor_name: assignment.vendor.name().to_string(),
            vendor_email: assignment.vendor.email().map(String::from),
            status: assignment.status.as_str().to_string(),
            sent_at: assignment.sent_at.map(|at| at.naive_utc()),
            responded_at: assignment.responded_at.map(|at| at.naive_utc()),
            notes: assignment.notes.clone(),
        }
    }
}

pub fn make_vendor_assignment(
    model: VendorAssignmentModel,
) -> Result<VendorAssignment, ProcurementStoreError> {
    Ok(VendorAssignment {
        id: model.assignment_id,
        rfq_id: model.rfq_id,
        vendor: make_vendor(&model.vendor_id, &model.vendor_name, model.vendor_email.as_deref()),
        status: AssignmentStatus::from_str(&model.status)?,
        sent_at: model.sent_at.map(to_utc),
        responded_at: model.responded_at.map(to_utc),
        notes: model.notes,
    })
}

impl From<&Bid> for NewBidModel {
    fn from(bid: &Bid) -> Self {
        NewBidModel {
            bid_id: bid.id.clone(),
            reference: bid.reference.clone(),
            assignment_id: bid.assignment_id.clone(),
            rfq_id: bid.rfq_id.clone(),
            vendor_id: bid.vendor_id.clone(),
            bid_date: bid.bid_date.naive_utc(),
            validity_date: bid.validity_date,
            state: bid.state.as_str().to_string(),
            currency_code: bid.currency.code().to_string(),
            currency_decimal_places: bid.currency.decimal_places() as i32,
            amount_untaxed: bid.amount_untaxed.to_string(),
            amount_tax: bid.amount_tax.to_string(),
            amount_total: bid.amount_total.to_string(),
            delivery_terms: bid.delivery_terms.clone(),
            payment_terms: bid.payment_terms.clone(),
            notes: bid.notes.clone(),
        }
    }
}

pub fn make_bid_line_models(bid: &Bid) -> Result<Vec<NewBidLineModel>, ProcurementStoreError> {
    bid.lines
        .iter()
        .map(|line| {
            Ok(NewBidLineModel {
                line_id: line.id.clone(),
                bid_id: bid.id.clone(),
                rfq_line_id: line.rfq_line_id.clone(),
                sequence: line.sequence,
                product_id: line.product.id().to_string(),
                product_name: line.product.display_name().to_string(),
                product_uom: line.product.purchase_uom().map(String::from),
                description: line.description.clone(),
                quantity: line.quantity.to_string(),
                uom: line.uom.clone(),
                price_unit: line.price_unit.to_string(),
                discount: line.discount.to_string(),
                taxes: taxes_to_json(&line.taxes)?,
                lead_time_days: line.lead_time_days,
                price_subtotal: line.price_subtotal.to_string(),
                price_tax: line.price_tax.to_string(),
                price_total: line.price_total.to_string(),
            })
        })
        .collect()
}

pub fn make_bid(model: BidModel, lines: Vec<BidLineModel>) -> Result<Bid, ProcurementStoreError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(BidLine {
                id: line.line_id,
                rfq_line_id: line.rfq_line_id,
                sequence: line.sequence,
                product: make_product(line.product_id, line.product_name, line.product_uom),
                description: line.description,
                quantity: parse_decimal(&line.quantity)?,
                uom: line.uom,
                price_unit: parse_decimal(&line.price_unit)?,
                discount: parse_decimal(&line.discount)?,
                taxes: taxes_from_json(&line.taxes)?,
                lead_time_days: line.lead_time_days,
                price_subtotal: parse_decimal(&line.price_subtotal)?,
                price_tax: parse_decimal(&line.price_tax)?,
                price_total: parse_decimal(&line.price_total)?,
            })
        })
        .collect::<Result<Vec<_>, ProcurementStoreError>>()?;

    Ok(Bid {
        id: model.bid_id,
        reference: model.reference,
        assignment_id: model.assignment_id,
        rfq_id: model.rfq_id,
        vendor_id: model.vendor_id,
        bid_date: to_utc(model.bid_date),
        validity_date: model.validity_date,
        lines,
        state: BidState::from_str(&model.state)?,
        currency: make_currency(&model.currency_code, model.currency_decimal_places),
        amount_untaxed: parse_decimal(&model.amount_untaxed)?,
        amount_tax: parse_decimal(&model.amount_tax)?,
        amount_total: parse_decimal(&model.amount_total)?,
        delivery_terms: model.delivery_terms,
        payment_terms: model.payment_terms,
        notes: model.notes,
    })
}

impl From<&PurchaseOrder> for NewPurchaseOrderModel {
    fn from(order: &PurchaseOrder) -> Self {
        NewPurchaseOrderModel {
            purchase_order_id: order.id.clone(),
            reference: order.reference.clone(),
            vendor_id: order.vendor.id().to_string(),
            vendor_name: order.vendor.name().to_string(),
            vendor_email: order.vendor.email().map(String::from),
            origin: order.origin.clone(),
            rfq_id: order.rfq_id.clone(),
            awarded_bid_id: order.awarded_bid_id.clone(),
            company: order.company.clone(),
            currency_code: order.currency.code().to_string(),
            currency_decimal_places: order.currency.decimal_places() as i32,
            fiscal_position: order.fiscal_position.clone(),
            payment_terms: order.payment_terms.clone(),
            notes: order.notes.clone(),
            buyer: order.buyer.clone(),
            date_order: order.date_order.naive_utc(),
            amount_untaxed: order.amount_untaxed.to_string(),
            amount_tax: order.amount_tax.to_string(),
            amount_total: order.amount_total.to_string(),
        }
    }
}

pub fn make_purchase_order_line_models(
    order: &PurchaseOrder,
) -> Result<Vec<NewPurchaseOrderLineModel>, ProcurementStoreError> {
    order
        .lines
        .iter()
        .map(|line| {
            Ok(NewPurchaseOrderLineModel {
                line_id: line.id.clone(),
                purchase_order_id: order.id.clone(),
                sequence: line.sequence,
                product_id: line.product.id().to_string(),
                product_name: line.product.display_name().to_string(),
                product_uom: line.product.purchase_uom().map(String::from),
                description: line.description.clone(),
                quantity: line.quantity.to_string(),
                uom: line.uom.clone(),
                price_unit: line.price_unit.to_string(),
                discount: line.discount.to_string(),
                taxes: taxes_to_json(&line.taxes)?,
                planned_date: line.planned_date.naive_utc(),
                price_subtotal: line.price_subtotal.to_string(),
                price_tax: line.price_tax.to_string(),
                price_total: line.price_total.to_string(),
            })
        })
        .collect()
}

pub fn make_purchase_order(
    model: PurchaseOrderModel,
    lines: Vec<PurchaseOrderLineModel>,
) -> Result<PurchaseOrder, ProcurementStoreError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            Ok(PurchaseOrderLine {
                id: line.line_id,
                sequence: line.sequence,
                product: make_product(line.product_id, line.product_name, line.product_uom),
                description: line.description,
                quantity: parse_decimal(&line.quantity)?,
                uom: line.uom,
                price_unit: parse_decimal(&line.price_unit)?,
                discount: parse_decimal(&line.discount)?,
                taxes: taxes_from_json(&line.taxes)?,
                planned_date: to_utc(line.planned_date),
                price_subtotal: parse_decimal(&line.price_subtotal)?,
                price_tax: parse_decimal(&line.price_tax)?,
                price_total: parse_decimal(&line.price_total)?,
            })
        })
        .collect::<Result<Vec<_>, ProcurementStoreError>>()?;

    Ok(PurchaseOrder {
        id: model.purchase_order_id,
        reference: model.reference,
        vendor: make_vendor(&model.vendor_id, &model.vendor_name, model.vendor_email.as_deref()),
        origin: model.origin,
        rfq_id: model.rfq_id,
        awarded_bid_id: model.awarded_bid_id,
        company: model.company,
        currency: make_currency(&model.currency_code, model.currency_decimal_places),
        fiscal_position: model.fiscal_position,
        payment_terms: model.payment_terms,
        notes: model.notes,
        buyer: model.buyer,
        date_order: to_utc(model.date_order),
        lines,
        amount_untaxed: parse_decimal(&model.amount_untaxed)?,
        amount_tax: parse_decimal(&model.amount_tax)?,
        amount_total: parse_decimal(&model.amount_total)?,
    })
}

fn make_product(id: String, name: String, uom: Option<String>) -> Product {
    let product = Product::new(&id, &name);
    match uom {
        Some(uom) => product.with_purchase_uom(&uom),
        None => product,
    }
}

fn make_vendor(id: &str, name: &str, email: Option<&str>) -> Vendor {
    let vendor = Vendor::new(id, name);
    match email {
        Some(email) => vendor.with_email(email),
        None => vendor,
    }
}

fn make_currency(code: &str, decimal_places: i32) -> Currency {
    Currency::new(code, decimal_places.max(0) as u32)
}

fn to_utc(timestamp: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&timestamp)
}

fn parse_decimal(value: &str) -> Result<Decimal, ProcurementStoreError> {
    Decimal::from_str(value).map_err(|err| {
        ProcurementStoreError::InternalError(InternalError::from_source_with_prefix(
            Box::new(err),
            format!("Invalid decimal value {:?} in database", value),
        ))
    })
}

fn taxes_to_json(taxes: &[TaxRule]) -> Result<String, ProcurementStoreError> {
    serde_json::to_string(taxes).map_err(|err| {
        ProcurementStoreError::InternalError(InternalError::from_source(Box::new(err)))
    })
}

fn taxes_from_json(value: &str) -> Result<Vec<TaxRule>, ProcurementStoreError> {
    serde_json::from_str(value).map_err(|err| {
        ProcurementStoreError::InternalError(InternalError::from_source_with_prefix(
            Box::new(err),
            "Invalid tax rules in database".to_string(),
        ))
    })
}
