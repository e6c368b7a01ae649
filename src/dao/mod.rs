//! Data access layer: canonical entities, the portal store abstraction, and
//! its REST implementation.

pub mod models;
pub mod portal_store;
pub mod storage;
