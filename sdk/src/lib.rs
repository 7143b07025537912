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

//! A procurement workflow engine.
//!
//! Purchase requests are raised by employees and approved by their managers. An approved
//! request becomes a request for quotation (RFQ) that is sent to any number of vendors; each
//! vendor answers with a bid, and awarding one bid creates the purchase order while every
//! competing bid and vendor assignment is closed.
//!
//! All operations run through [`ProcurementService`].

extern crate serde;
#[macro_use]
extern crate serde_derive;
#[macro_use]
#[cfg(feature = "sqlite")]
extern crate diesel;
#[macro_use]
#[cfg(feature = "sqlite")]
extern crate diesel_migrations;
#[macro_use]
extern crate log;

pub mod award;
pub mod bid;
pub mod collaborators;
pub mod config;
pub mod currency;
pub mod error;
#[cfg(feature = "sqlite")]
pub mod migrations;
pub mod product;
pub mod purchase_order;
pub mod purchase_request;
pub mod rfq;
pub mod sequence;
pub mod service;
pub mod store;
pub mod tax;
pub mod workflow;

pub use service::{
    ProcurementError, ProcurementService, ProcurementServiceBuildError, ProcurementServiceBuilder,
};
