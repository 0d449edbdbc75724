//! HVAC Service Job Tracker
//!
//! Registers service jobs, records before/after photo evidence on local disk
//! or an S3-compatible host, completes jobs and reports aggregate counts.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
