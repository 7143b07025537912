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

table! {
    purchase_request (id) {
        id -> BigInt,
        request_id -> Text,
        reference -> Text,
        description -> Nullable<Text>,
        requester_id -> Text,
        requester_name -> Text,
        requester_department -> Nullable<Text>,
        requester_user_id -> Nullable<Text>,
        request_date -> Date,
        required_by -> Nullable<Date>,
        priority -> Text,
        state -> Text,
        company -> Text,
        currency_code -> Text,
        currency_decimal_places -> Integer,
        estimated_total -> Text,
        rfq_id -> Nullable<Text>,
        rfq_reference -> Nullable<Text>,
        approved_by -> Nullable<Text>,
        approved_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        version -> BigInt,
    }
}

table! {
    purchase_request_line (id) {
        id -> BigInt,
        line_id -> Text,
        request_id -> Text,
        sequence -> Integer,
        product_id -> Text,
        product_name -> Text,
        product_uom -> Nullable<Text>,
        description -> Text,
        quantity -> Text,
        uom -> Text,
        estimated_unit_price -> Text,
        specifications -> Nullable<Text>,
    }
}

table! {
    rfq (id) {
        id -> BigInt,
        rfq_id -> Text,
        reference -> Text,
        company -> Text,
        currency_code -> Text,
        currency_decimal_places -> Integer,
        origin -> Nullable<Text>,
        request_id -> Nullable<Text>,
        created_by -> Nullable<Text>,
        date_order -> Date,
        notes -> Nullable<Text>,
        state -> Text,
        fiscal_position -> Nullable<Text>,
        payment_terms -> Nullable<Text>,
        awarded_bid_id -> Nullable<Text>,
        purchase_order_id -> Nullable<Text>,
        version -> BigInt,
    }
}

table! {
    rfq_line (id) {
        id -> BigInt,
        line_id -> Text,
        rfq_id -> Text,
        sequence -> Integer,
        display_type -> Nullable<Text>,
        product_id -> Nullable<Text>,
        product_name -> Nullable<Text>,
        product_uom -> Nullable<Text>,
        description -> Text,
        quantity -> Text,
        uom -> Nullable<Text>,
        price_unit -> Text,
        discount -> Text,
        taxes -> Text,
        planned_date -> Nullable<Date>,
    }
}

table! {
    vendor_assignment (id) {
        id -> BigInt,
        assignment_id -> Text,
        rfq_id -> Text,
        vendor_id -> Text,
        vendor_name -> Text,
        vendor_email -> Nullable<Text>,
        status -> Text,
        sent_at -> Nullable<Timestamp>,
        responded_at -> Nullable<Timestamp>,
        notes -> Nullable<Text>,
    }
}

table! {
    bid (id) {
        id -> BigInt,
        bid_id -> Text,
        reference -> Text,
        assignment_id -> Text,
        rfq_id -> Text,
        vendor_id -> Text,
        bid_date -> Timestamp,
        validity_date -> Nullable<Date>,
        state -> Text,
        currency_code -> Text,
        currency_decimal_places -> Integer,
        amount_untaxed -> Text,
        amount_tax -> Text,
        amount_total -> Text,
        delivery_terms -> Nullable<Text>,
        payment_terms -> Nullable<Text>,
        notes -> Nullable<Text>,
    }
}

table! {
    bid_line (id) {
        id -> BigInt,
        line_id -> Text,
        bid_id -> Text,
        rfq_line_id -> Text,
        sequence -> Integer,
        product_id -> Text,
        product_name -> Text,
        product_uom -> Nullable<Text>,
        description -> Text,
        quantity -> Text,
        uom -> Text,
        price_unit -> Text,
        discount -> Text,
        taxes -> Text,
        lead_time_days -> Integer,
        price_subtotal -> Text,
        price_tax -> Text,
        price_total -> Text,
    }
}

table! {
    purchase_order (id) {
        id -> BigInt,
        purchase_order_id -> Text,
        reference -> Text,
        vendor_id -> Text,
        vendor_name -> Text,
        vendor_email -> Nullable<Text>,
        origin -> Text,
        rfq_id -> Text,
        awarded_bid_id -> Text,
        company -> Text,
        currency_code -> Text,
        currency_decimal_places -> Integer,
        fiscal_position -> Nullable<Text>,
        payment_terms -> Nullable<Text>,
        notes -> Nullable<Text>,
        buyer -> Nullable<Text>,
        date_order -> Timestamp,
        amount_untaxed -> Text,
        amount_tax -> Text,
        amount_total -> Text,
    }
}

table! {
    purchase_order_line (id) {
        id -> BigInt,
        line_id -> Text,
        purchase_order_id -> Text,
        sequence -> Integer,
        product_id -> Text,
        product_name -> Text,
        product_uom -> Nullable<Text>,
        description -> Text,
        quantity -> Text,
        uom -> Text,
        price_unit -> Text,
        discount -> Text,
        taxes -> Text,
        planned_date -> Timestamp,
        price_subtotal -> Text,
        price_tax -> Text,
        price_total -> Text,
    }
}

table! {
    document_sequence (kind) {
        kind -> Text,
        next_value -> BigInt,
    }
}

allow_tables_to_appear_in_same_query!(
    bid,
    bid_line,
    purchase_order,
    purchase_order_line,
    purchase_request,
    purchase_request_line,
    rfq,
    rfq_line,
    vendor_assignment,
);
