//! # Repository Module
//!
//! Database repository implementations for the Lavka backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine facade                                                         │
//! │       │                                                                 │
//! │       │  db.orders().place(params)                                     │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place(&self, params)      ← one serialized transaction            │
//! │  ├── complete(&self, id, bps)  ← one serialized transaction            │
//! │  └── get(&self, id)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  One fixed repository per entity replaces the old free-form "DB        │
//! │  manager" that took table and column names from request input. SQL     │
//! │  text here is static; request data only ever flows through binds.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Registration and point balances
//! - [`product::ProductRepository`] - Catalog CRUD
//! - [`cart::CartRepository`] - Cart lines and the priced checkout join
//! - [`order::OrderRepository`] - Order placement and fulfillment
//! - [`promo::PromoCodeRepository`] - Discount tokens
//! - [`expense::ExpenseRepository`] - Manual cost ledger

pub mod cart;
pub mod expense;
pub mod order;
pub mod product;
pub mod promo;
pub mod user;
