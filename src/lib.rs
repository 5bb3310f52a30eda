//! Catalog value resolution and structured solution patching.
//!
//! [`CatalogConfigProvider`] reads configuration values out of catalogs,
//! evaluating templates and following parent catalogs for missing fields.
//! [`PatchStageProvider`] upserts or removes entries inside a stored
//! solution. Both depend on injected stores and an [`Evaluator`].

pub mod catalog;
pub mod config;
pub mod context;
pub mod evaluator;
pub mod model;
pub mod patch;
pub mod store;
pub mod trace;
pub mod value;
mod error;

pub use catalog::{CatalogConfigProvider, CatalogManager};
pub use config::{Config, ConfigError, ProviderConfig};
pub use context::{ContextOverlay, EvaluationContext};
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{EvalError, Evaluator, ReferenceEvaluator};
pub use patch::{PatchAction, PatchRequest, PatchStageProvider, StageResult};
pub use store::{CatalogStore, SolutionStore, StoreError};
pub use trace::Tracer;
pub use value::{Mapping, Value};
