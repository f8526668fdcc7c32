//! # lavka-db: Database Layer for the Lavka Storefront
//!
//! SQLite persistence for the order-management backend, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lavka Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  lavka-engine (facade)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lavka-db (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌─────────────────────────┐   │   │
//! │  │   │   pool    │  │ migrations │  │      repository/        │   │   │
//! │  │   │ Database  │  │  embedded  │  │  user product cart      │   │   │
//! │  │   │ DbConfig  │  │    SQL     │  │  order promo expense    │   │   │
//! │  │   └───────────┘  └────────────┘  └─────────────────────────┘   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                         SQLite (WAL mode)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Decisions
//!
//! 1. **SQLite over a server database**: single-tenant storefront, one
//!    writer at a time is a feature (the settlement transactions want it)
//! 2. **Repository per entity**: every SQL statement in the system lives
//!    behind a typed repository method; no free-form query surface
//! 3. **Domain rules cross the boundary**: checks that must run inside a
//!    transaction (empty cart, status guard) return their lavka-core
//!    error through [`DbError::Domain`] so rollback stays in one place
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use lavka_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("/var/lib/lavka/lavka.db")).await?;
//! let products = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::cart::{CartRepository, CartRow};
pub use repository::expense::ExpenseRepository;
pub use repository::order::{
    CompletedOrder, OrderRepository, OrderWithContact, PlaceOrderParams, PlacedOrder,
};
pub use repository::product::ProductRepository;
pub use repository::promo::PromoCodeRepository;
pub use repository::user::{NewUser, UserRepository};
