//! azrm - typed resource ids and resource handlers for Azure Resource Manager
//!
//! The [`resourceids`] codec formats, parses and validates the hierarchical
//! paths ARM uses to address objects. The [`services`] build resources and
//! data sources on top of it, driven through the [`resource`] layer and the
//! [`azure`] client.

pub mod azure;
pub mod commands;
pub mod config;
pub mod document;
pub mod resource;
pub mod resourceids;
pub mod services;
pub mod state;
pub mod validation;
