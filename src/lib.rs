//! sdfkit: a driver for the SuiteCloud Development Framework CLI
//!
//! Discovers authenticated environments, turns user actions into CLI
//! invocations, answers the CLI's interactive prompts, and maintains the
//! `deploy.xml` manifest that scopes deployments.

pub mod cli;
pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod session;
pub mod staging;
pub mod ui;
