//! Parts Inventory Core
//!
//! Client-side synchronization and form-state reconciliation for a parts
//! inventory app. Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Collaborator abstractions and implementations
//! - service: List projection and the add/update/delete pipelines
//!
//! The UI shell owns screens and device wiring; it drives this crate
//! through [`PartService`], [`CaptureSession`], and [`PartList`] and renders
//! whatever the projector materializes.

pub mod config;
pub mod domain;
pub mod repository;
pub mod service;

pub use config::RemoteConfig;
pub use domain::{DomainError, DomainResult, Part, PartDraft};
pub use service::{CaptureSession, ListProjector, OpStatus, PartList, PartService};
