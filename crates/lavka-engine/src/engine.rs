//! # Order Engine
//!
//! The facade every transport (mini-app backend, admin bot) calls.
//!
//! ## Orchestration Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        OrderEngine                                      │
//! │                                                                         │
//! │  shopper surface                admin surface                          │
//! │  ───────────────                ─────────────                          │
//! │  register_user                  complete_order                         │
//! │  list_products                  create/update/delete product           │
//! │  add_to_cart                    promo management                       │
//! │  remove_from_cart               record_expense                         │
//! │  load_cart_snapshot             monthly_report                         │
//! │  place_order                    list_active_orders                     │
//! │  list_my_orders                 update_order_details                   │
//! │                                 product wizard                         │
//! │                                                                         │
//! │  The engine validates input, enforces the admin allowlist, delegates   │
//! │  persistence to lavka-db, and fires post-commit notifications. It      │
//! │  holds no mutable state of its own besides the wizard registry.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};
use uuid::Uuid;

use lavka_core::{
    validation::{
        validate_expense_amount, validate_product_name, validate_promo_code,
        validate_promo_percent, validate_quantity,
    },
    CartSnapshot, Expense, NewProduct, Order, OrderStatus, Product, PromoCode, User,
    MAX_CART_ITEMS,
};
use lavka_db::{
    CompletedOrder, Database, NewUser, OrderWithContact, PlaceOrderParams, PlacedOrder,
};

use crate::admin::AdminRegistry;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::notify::{LogNotifier, Notifier};
use crate::reports::{build_monthly_report, MonthlyReport};
use crate::session::{WizardOutcome, WizardRegistry, WizardStep};

// =============================================================================
// Checkout Input
// =============================================================================

/// Shopper input to [`OrderEngine::place_order`].
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    /// Raw promo code as typed. Unknown or inactive codes degrade to 0%
    /// rather than failing the checkout.
    pub promo_code: Option<String>,

    /// Loyalty points the shopper wants to redeem. Clamped to the 15%
    /// post-promo cap and the balance; negative input spends nothing.
    pub points_requested: i64,

    pub address: Option<String>,
    pub comment: Option<String>,
}

/// Reply from one wizard interaction routed through the engine.
#[derive(Debug, Clone)]
pub enum WizardReply {
    /// Ask this question next.
    Ask(WizardStep),

    /// The wizard finished and the product was inserted.
    Created(Product),
}

// =============================================================================
// Engine
// =============================================================================

/// The order-management facade.
pub struct OrderEngine {
    db: Database,
    notifier: Box<dyn Notifier>,
    admins: AdminRegistry,
    config: EngineConfig,
    wizards: WizardRegistry,
}

impl OrderEngine {
    /// Creates an engine with the default configuration and a log-only
    /// notification sink.
    pub fn new(db: Database, admins: AdminRegistry) -> Self {
        OrderEngine {
            db,
            notifier: Box::new(LogNotifier),
            admins,
            config: EngineConfig::default(),
            wizards: WizardRegistry::new(),
        }
    }

    /// Replaces the notification sink.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The admin allowlist.
    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    // =========================================================================
    // Shopper Surface
    // =========================================================================

    /// Registers a user, or returns the existing record for a repeat
    /// call. Registration is the one idempotent write in the system: the
    /// mini-app fires it on every launch.
    pub async fn register_user(
        &self,
        telegram_id: i64,
        name: Option<String>,
        phone: Option<String>,
        username: Option<String>,
    ) -> EngineResult<User> {
        if let Some(existing) = self.db.users().get(telegram_id).await? {
            return Ok(existing);
        }

        let user = self
            .db
            .users()
            .insert(&NewUser {
                telegram_id,
                name,
                phone,
                username,
                referral_code: generate_referral_code(),
                signup_bonus_points: self.config.signup_bonus_points,
            })
            .await?;

        info!(telegram_id, "User registered");
        Ok(user)
    }

    /// The storefront catalog, newest first.
    pub async fn list_products(&self) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// One product, for the detail view.
    pub async fn get_product(&self, product_id: i64) -> EngineResult<Product> {
        self.db
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Product", product_id))
    }

    /// Adds a product to the user's cart. Re-adding increments the line.
    /// Returns the resulting line quantity.
    pub async fn add_to_cart(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> EngineResult<i64> {
        validate_quantity(quantity)?;

        // confirm the product exists so the shopper gets NotFound, not a
        // bare FK violation
        self.get_product(product_id).await?;

        let distinct = self.db.carts().distinct_count(user_id).await?;
        if distinct as usize >= MAX_CART_ITEMS {
            return Err(EngineError::InvalidInput(format!(
                "cart is limited to {MAX_CART_ITEMS} distinct items"
            )));
        }

        Ok(self.db.carts().add(user_id, product_id, quantity).await?)
    }

    /// Removes one unit (or the whole line with `remove_all`). Returns
    /// the remaining line quantity.
    pub async fn remove_from_cart(
        &self,
        user_id: i64,
        product_id: i64,
        remove_all: bool,
    ) -> EngineResult<i64> {
        Ok(self
            .db
            .carts()
            .remove(user_id, product_id, remove_all)
            .await?)
    }

    /// The user's cart, priced against the live catalog. An empty cart
    /// is [`EngineError::EmptyCart`]: there is nothing to show and
    /// nothing to check out.
    pub async fn load_cart_snapshot(&self, user_id: i64) -> EngineResult<CartSnapshot> {
        let snapshot = self.db.carts().snapshot(user_id).await?;
        if snapshot.is_empty() {
            return Err(EngineError::EmptyCart);
        }
        Ok(snapshot)
    }

    /// Places an order from the user's cart.
    ///
    /// The order insert, point debit and cart clear commit atomically;
    /// admin notification happens after commit and its failure never
    /// fails the checkout.
    pub async fn place_order(
        &self,
        user_id: i64,
        request: CheckoutRequest,
    ) -> EngineResult<PlacedOrder> {
        let promo = match request.promo_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                self.db.promo_codes().find_active(code).await?
            }
            _ => None,
        };

        let placed = self
            .db
            .orders()
            .place(PlaceOrderParams {
                user_id,
                promo,
                points_requested: request.points_requested,
                address: request.address,
                comment: request.comment,
            })
            .await?;

        // Post-commit, best-effort: the order exists whatever happens here.
        let admin_ids: Vec<i64> = self.admins.ids().collect();
        if let Err(e) = self
            .notifier
            .order_placed(&admin_ids, &placed.order, &placed.snapshot)
            .await
        {
            warn!(
                order_id = placed.order.id,
                error = %e,
                "Order notification failed"
            );
        }

        Ok(placed)
    }

    /// The user's order history, newest first.
    pub async fn list_my_orders(&self, user_id: i64) -> EngineResult<Vec<Order>> {
        Ok(self.db.orders().list_for_user(user_id).await?)
    }

    // =========================================================================
    // Admin Surface
    // =========================================================================

    /// Completes an active order: stock decrement, optional cashback,
    /// status flip. Not idempotent; a second call is rejected.
    pub async fn complete_order(
        &self,
        admin_id: i64,
        order_id: i64,
    ) -> EngineResult<CompletedOrder> {
        self.admins.require(admin_id)?;

        let completed = self
            .db
            .orders()
            .complete(order_id, self.config.cashback_rate_bps)
            .await?;

        info!(admin_id, order_id, "Order completed by admin");
        Ok(completed)
    }

    /// Orders awaiting fulfillment, newest first, each joined with the
    /// purchaser's contact details so the admin can reach them.
    pub async fn list_active_orders(&self, admin_id: i64) -> EngineResult<Vec<OrderWithContact>> {
        self.admins.require(admin_id)?;
        Ok(self
            .db
            .orders()
            .list_by_status_with_contact(OrderStatus::Active)
            .await?)
    }

    /// Edits an active order's delivery address and comment. Completed
    /// orders are immutable and come back as NotFound.
    pub async fn update_order_details(
        &self,
        admin_id: i64,
        order_id: i64,
        address: Option<&str>,
        comment: Option<&str>,
    ) -> EngineResult<()> {
        self.admins.require(admin_id)?;

        self.db
            .orders()
            .update_details(order_id, address, comment)
            .await?;

        info!(admin_id, order_id, "Order details updated by admin");
        Ok(())
    }

    /// Inserts a catalog product.
    pub async fn create_product(
        &self,
        admin_id: i64,
        draft: NewProduct,
    ) -> EngineResult<Product> {
        self.admins.require(admin_id)?;
        validate_new_product(&draft)?;

        Ok(self.db.products().insert(&draft).await?)
    }

    /// Updates a product's editable fields.
    pub async fn update_product(&self, admin_id: i64, product: &Product) -> EngineResult<()> {
        self.admins.require(admin_id)?;
        validate_product_name(&product.name)?;
        lavka_core::validation::validate_price_minor(product.price_minor)?;
        lavka_core::validation::validate_cost_minor(product.cost_minor)?;

        Ok(self.db.products().update(product).await?)
    }

    /// Deletes a product. Historical orders keep their snapshot.
    pub async fn delete_product(&self, admin_id: i64, product_id: i64) -> EngineResult<()> {
        self.admins.require(admin_id)?;
        Ok(self.db.products().delete(product_id).await?)
    }

    /// Creates a promo code.
    pub async fn create_promo(
        &self,
        admin_id: i64,
        code: &str,
        discount_percent: i64,
    ) -> EngineResult<PromoCode> {
        self.admins.require(admin_id)?;
        let normalized = lavka_core::normalize_promo_code(code);
        validate_promo_code(&normalized)?;
        validate_promo_percent(discount_percent)?;

        Ok(self
            .db
            .promo_codes()
            .create(&normalized, discount_percent)
            .await?)
    }

    /// Activates or retires a promo code.
    pub async fn set_promo_active(
        &self,
        admin_id: i64,
        code: &str,
        active: bool,
    ) -> EngineResult<()> {
        self.admins.require(admin_id)?;
        Ok(self.db.promo_codes().set_active(code, active).await?)
    }

    /// All promo codes, active first.
    pub async fn list_promos(&self, admin_id: i64) -> EngineResult<Vec<PromoCode>> {
        self.admins.require(admin_id)?;
        Ok(self.db.promo_codes().list().await?)
    }

    /// Records a manual operating expense.
    pub async fn record_expense(
        &self,
        admin_id: i64,
        amount_minor: i64,
        comment: Option<&str>,
    ) -> EngineResult<Expense> {
        self.admins.require(admin_id)?;
        validate_expense_amount(amount_minor)?;

        Ok(self.db.expenses().insert(amount_minor, comment).await?)
    }

    /// Profitability report for one calendar month (UTC).
    pub async fn monthly_report(
        &self,
        admin_id: i64,
        year: i32,
        month: u32,
    ) -> EngineResult<MonthlyReport> {
        self.admins.require(admin_id)?;
        build_monthly_report(&self.db, year, month).await
    }

    // =========================================================================
    // Product Wizard
    // =========================================================================

    /// Starts (or restarts) the product wizard for an admin. Returns the
    /// first question to ask.
    pub async fn start_product_wizard(&self, admin_id: i64) -> EngineResult<WizardStep> {
        self.admins.require(admin_id)?;
        Ok(self.wizards.start(admin_id).await)
    }

    /// Feeds one wizard answer. A finished wizard inserts its draft and
    /// returns the created product.
    pub async fn product_wizard_answer(
        &self,
        admin_id: i64,
        input: &str,
    ) -> EngineResult<WizardReply> {
        self.admins.require(admin_id)?;

        match self.wizards.answer(admin_id, input).await? {
            WizardOutcome::Ask(step) => Ok(WizardReply::Ask(step)),
            WizardOutcome::Done(draft) => {
                let product = self.db.products().insert(&draft).await?;
                info!(admin_id, product_id = product.id, "Wizard product created");
                Ok(WizardReply::Created(product))
            }
        }
    }

    /// Abandons the admin's wizard draft, if any.
    pub async fn cancel_product_wizard(&self, admin_id: i64) -> EngineResult<bool> {
        self.admins.require(admin_id)?;
        Ok(self.wizards.cancel(admin_id).await)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// `REF-XXXXXX` from random uuid material; uniqueness is enforced by the
/// database, and 6 hex chars leave collisions to the constraint.
fn generate_referral_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("REF-{}", raw[..6].to_uppercase())
}

fn validate_new_product(draft: &NewProduct) -> EngineResult<()> {
    validate_product_name(&draft.name)?;
    lavka_core::validation::validate_price_minor(draft.price_minor)?;
    lavka_core::validation::validate_cost_minor(draft.cost_minor)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
