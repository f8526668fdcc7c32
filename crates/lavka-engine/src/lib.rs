//! # lavka-engine: Order Settlement Engine and Admin Facade
//!
//! The single entry point for every transport in front of the Lavka
//! storefront: the mini-app backend calls the shopper surface, the admin
//! bot calls the admin surface, and nothing else touches lavka-db.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lavka Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Mini-app frontend / Admin bot (external)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lavka-engine (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  engine  │ │  admin  │ │ notify  │ │ session │ │reports │  │   │
//! │  │   │  facade  │ │allowlist│ │  sink   │ │ wizard  │ │monthly │  │   │
//! │  │   └──────────┘ └─────────┘ └─────────┘ └─────────┘ └────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                   lavka-db → lavka-core                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - The [`engine::OrderEngine`] facade
//! - [`admin`] - Fixed admin allowlist
//! - [`notify`] - Best-effort post-commit notifications
//! - [`session`] - Step-by-step product creation wizard
//! - [`reports`] - Monthly profitability report
//! - [`config`] - Engine tunables
//! - [`error`] - The caller-safe error taxonomy
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use lavka_db::{Database, DbConfig};
//! use lavka_engine::{AdminRegistry, CheckoutRequest, OrderEngine};
//!
//! let db = Database::new(DbConfig::new("/var/lib/lavka/lavka.db")).await?;
//! let engine = OrderEngine::new(db, AdminRegistry::from_env());
//!
//! let placed = engine
//!     .place_order(user_id, CheckoutRequest {
//!         promo_code: Some("SALE10".into()),
//!         points_requested: 200,
//!         address: Some("Main St 1".into()),
//!         comment: None,
//!     })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod reports;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use admin::AdminRegistry;
pub use config::EngineConfig;
pub use engine::{CheckoutRequest, OrderEngine, WizardReply};
pub use error::{EngineError, EngineResult};
pub use lavka_db::OrderWithContact;
pub use notify::{format_order_summary, LogNotifier, Notifier, NotifyError};
pub use reports::MonthlyReport;
pub use session::{ProductWizard, WizardOutcome, WizardRegistry, WizardStep};
