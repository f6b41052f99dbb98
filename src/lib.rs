//! Campus Assist - Proactive SMS Student Assistance
//!
//! This crate implements the conversation orchestration engine behind a
//! proactive SMS assistant for college students: guided sub-flows, intent
//! detection, prompt composition, and structured conversation outcomes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
