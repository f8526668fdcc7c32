//! # Product Creation Wizard
//!
//! Step-by-step product entry for the admin chat surface.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Wizard Steps                                 │
//! │                                                                         │
//! │  Name → Category → Description → Price → CostPrice → Stock → ImageRef  │
//! │                                                                         │
//! │  • One wizard per admin, keyed by admin id                             │
//! │  • "-" skips an optional field (category, description, image)          │
//! │  • Each answer is validated before the wizard advances; a bad          │
//! │    answer leaves the wizard on the same step                           │
//! │  • State is in-memory only; a process restart abandons drafts          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use lavka_core::{
    validation::{
        validate_cost_minor, validate_price_minor, validate_product_name, validate_quantity,
    },
    Money, NewProduct,
};

use crate::error::{EngineError, EngineResult};

/// The answer token that skips an optional field.
const SKIP_TOKEN: &str = "-";

// =============================================================================
// Wizard Steps
// =============================================================================

/// Which question the wizard is currently asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Name,
    Category,
    Description,
    Price,
    CostPrice,
    Stock,
    ImageRef,
}

impl WizardStep {
    /// The prompt shown to the admin for this step.
    pub fn prompt(&self) -> &'static str {
        match self {
            WizardStep::Name => "Product name?",
            WizardStep::Category => "Category? (\"-\" to skip)",
            WizardStep::Description => "Description? (\"-\" to skip)",
            WizardStep::Price => "Price? (e.g. 12.50)",
            WizardStep::CostPrice => "Cost price? (e.g. 6.00, \"-\" for 0)",
            WizardStep::Stock => "Stock quantity?",
            WizardStep::ImageRef => "Image reference? (\"-\" to skip)",
        }
    }
}

/// Outcome of feeding one answer to the wizard.
#[derive(Debug, Clone)]
pub enum WizardOutcome {
    /// The wizard advanced (or stayed put after invalid input); ask the
    /// contained step next.
    Ask(WizardStep),

    /// All steps answered; the draft is ready to insert.
    Done(NewProduct),
}

// =============================================================================
// Wizard
// =============================================================================

/// An in-progress product draft for one admin.
#[derive(Debug, Clone)]
pub struct ProductWizard {
    step: WizardStep,
    draft: NewProduct,
}

impl ProductWizard {
    /// Starts a fresh wizard at the first step.
    pub fn new() -> Self {
        ProductWizard {
            step: WizardStep::Name,
            draft: NewProduct::default(),
        }
    }

    /// The current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Feeds one answer. Invalid input fails with
    /// [`EngineError::InvalidInput`] and leaves the wizard on the same
    /// step; valid input advances it.
    pub fn answer(&mut self, input: &str) -> EngineResult<WizardOutcome> {
        let input = input.trim();

        match self.step {
            WizardStep::Name => {
                validate_product_name(input)?;
                self.draft.name = input.to_string();
                self.step = WizardStep::Category;
            }

            WizardStep::Category => {
                self.draft.category = optional(input);
                self.step = WizardStep::Description;
            }

            WizardStep::Description => {
                self.draft.description = optional(input);
                self.step = WizardStep::Price;
            }

            WizardStep::Price => {
                let price = Money::parse(input)
                    .map_err(|e| EngineError::InvalidInput(format!("price: {e}")))?;
                validate_price_minor(price.minor())?;
                self.draft.price_minor = price.minor();
                self.step = WizardStep::CostPrice;
            }

            WizardStep::CostPrice => {
                let cost = if input == SKIP_TOKEN {
                    Money::zero()
                } else {
                    Money::parse(input)
                        .map_err(|e| EngineError::InvalidInput(format!("cost: {e}")))?
                };
                validate_cost_minor(cost.minor())?;
                self.draft.cost_minor = cost.minor();
                self.step = WizardStep::Stock;
            }

            WizardStep::Stock => {
                let stock: i64 = input
                    .parse()
                    .map_err(|_| EngineError::InvalidInput("stock must be a number".to_string()))?;
                // same bounds as a cart quantity, except 0 is a valid
                // starting stock
                if stock != 0 {
                    validate_quantity(stock)?;
                }
                self.draft.stock = stock;
                self.step = WizardStep::ImageRef;
            }

            WizardStep::ImageRef => {
                self.draft.image_ref = optional(input);
                return Ok(WizardOutcome::Done(self.draft.clone()));
            }
        }

        Ok(WizardOutcome::Ask(self.step))
    }
}

impl Default for ProductWizard {
    fn default() -> Self {
        ProductWizard::new()
    }
}

fn optional(input: &str) -> Option<String> {
    if input == SKIP_TOKEN || input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Tracks at most one wizard per admin.
#[derive(Debug, Clone, Default)]
pub struct WizardRegistry {
    sessions: Arc<Mutex<HashMap<i64, ProductWizard>>>,
}

impl WizardRegistry {
    pub fn new() -> Self {
        WizardRegistry::default()
    }

    /// Starts (or restarts) a wizard for the admin. Returns the first
    /// step to ask.
    pub async fn start(&self, admin_id: i64) -> WizardStep {
        debug!(admin_id, "Starting product wizard");
        let wizard = ProductWizard::new();
        let step = wizard.step();
        self.sessions.lock().await.insert(admin_id, wizard);
        step
    }

    /// Feeds one answer to the admin's wizard. A finished wizard is
    /// removed from the registry; an invalid answer keeps it in place.
    pub async fn answer(&self, admin_id: i64, input: &str) -> EngineResult<WizardOutcome> {
        let mut sessions = self.sessions.lock().await;

        let wizard = sessions
            .get_mut(&admin_id)
            .ok_or_else(|| EngineError::not_found("Wizard session", admin_id))?;

        let outcome = wizard.answer(input)?;
        if matches!(outcome, WizardOutcome::Done(_)) {
            sessions.remove(&admin_id);
        }

        Ok(outcome)
    }

    /// Abandons the admin's wizard, if any.
    pub async fn cancel(&self, admin_id: i64) -> bool {
        self.sessions.lock().await.remove(&admin_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_walkthrough() {
        let mut wizard = ProductWizard::new();

        assert!(matches!(
            wizard.answer("Mango 30ml").unwrap(),
            WizardOutcome::Ask(WizardStep::Category)
        ));
        wizard.answer("liquids").unwrap();
        wizard.answer("-").unwrap(); // no description
        wizard.answer("12.50").unwrap();
        wizard.answer("6.00").unwrap();
        wizard.answer("25").unwrap();

        let outcome = wizard.answer("-").unwrap();
        let WizardOutcome::Done(draft) = outcome else {
            panic!("expected Done");
        };
        assert_eq!(draft.name, "Mango 30ml");
        assert_eq!(draft.category.as_deref(), Some("liquids"));
        assert!(draft.description.is_none());
        assert_eq!(draft.price_minor, 1250);
        assert_eq!(draft.cost_minor, 600);
        assert_eq!(draft.stock, 25);
        assert!(draft.image_ref.is_none());
    }

    #[test]
    fn test_invalid_price_keeps_step() {
        let mut wizard = ProductWizard::new();
        wizard.answer("Mango 30ml").unwrap();
        wizard.answer("-").unwrap();
        wizard.answer("-").unwrap();

        assert!(wizard.answer("free").is_err());
        assert_eq!(wizard.step(), WizardStep::Price);
        // zero price rejected too
        assert!(wizard.answer("0").is_err());

        wizard.answer("9.99").unwrap();
        assert_eq!(wizard.step(), WizardStep::CostPrice);
    }

    #[test]
    fn test_skip_token_for_cost_means_zero() {
        let mut wizard = ProductWizard::new();
        wizard.answer("Mango 30ml").unwrap();
        wizard.answer("-").unwrap();
        wizard.answer("-").unwrap();
        wizard.answer("9.99").unwrap();
        wizard.answer("-").unwrap();
        wizard.answer("0").unwrap();

        let WizardOutcome::Done(draft) = wizard.answer("-").unwrap() else {
            panic!("expected Done");
        };
        assert_eq!(draft.cost_minor, 0);
        assert_eq!(draft.stock, 0);
    }

    #[tokio::test]
    async fn test_registry_lifecycle() {
        let registry = WizardRegistry::new();

        // no session yet
        assert!(registry.answer(10, "x").await.is_err());

        assert_eq!(registry.start(10).await, WizardStep::Name);
        registry.answer(10, "Mango 30ml").await.unwrap();

        // restart resets to the first step
        assert_eq!(registry.start(10).await, WizardStep::Name);

        assert!(registry.cancel(10).await);
        assert!(!registry.cancel(10).await);
    }

    #[tokio::test]
    async fn test_registry_removes_finished_wizard() {
        let registry = WizardRegistry::new();
        registry.start(10).await;

        for answer in ["Mango 30ml", "-", "-", "9.99", "-", "5"] {
            registry.answer(10, answer).await.unwrap();
        }
        let outcome = registry.answer(10, "-").await.unwrap();
        assert!(matches!(outcome, WizardOutcome::Done(_)));

        // the session is gone
        assert!(registry.answer(10, "again").await.is_err());
    }
}
