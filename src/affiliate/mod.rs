pub mod actions;
pub mod client;
pub mod models;

pub use actions::BatchKind;
pub use client::{AffiliateService, ApiClient, ApiError};
pub use models::{OutreachStatus, PipelineFilter, PipelineView, SavedAffiliate};
