// ABOUTME: State management for the checkout wizard
// Tracks the active step sequence, customer inputs, pickup choice and the visible error

use serde::Deserialize;

use super::error::{ValidationError, WizardError};
use crate::api::Location;

pub const NAME_MAX_LEN: usize = 100;
pub const PHONE_MAX_DIGITS: usize = 20;
pub const EMAIL_MAX_LEN: usize = 254;
pub const STREET_ADDRESS_MAX_LEN: usize = 200;
pub const CITY_MAX_LEN: usize = 100;
pub const NOTES_MAX_LEN: usize = 1000;

/// What the wizard was opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutMode {
    /// Fresh order from the public storefront
    CreatePublic,
    /// Existing draft order tied to a customer
    CreateLinked,
    /// Modifying an already placed order
    Edit,
}

/// One cart entry as handed over by the storefront
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Previously placed order being edited
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingOrder {
    pub order_id: String,
    #[serde(default)]
    pub pickup_street_address: String,
    #[serde(default)]
    pub pickup_city: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Caller-supplied context, fixed for the wizard's lifetime
#[derive(Debug, Clone)]
pub struct WizardContext {
    pub mode: CheckoutMode,
    pub is_customer_linked: bool,
    pub business_id: String,
    pub draft_order_id: Option<String>,
    pub cart: Vec<CartItem>,
    pub existing_order: Option<ExistingOrder>,
}

impl WizardContext {
    pub fn new(mode: CheckoutMode, business_id: impl Into<String>, cart: Vec<CartItem>) -> Self {
        Self {
            mode,
            is_customer_linked: false,
            business_id: business_id.into(),
            draft_order_id: None,
            cart,
            existing_order: None,
        }
    }

    /// Anonymous checkout from the public storefront
    pub fn public_checkout(business_id: impl Into<String>, cart: Vec<CartItem>) -> Self {
        Self::new(CheckoutMode::CreatePublic, business_id, cart)
    }

    /// Edit of an already placed order
    pub fn edit(business_id: impl Into<String>, order: ExistingOrder, cart: Vec<CartItem>) -> Self {
        Self::new(CheckoutMode::Edit, business_id, cart).with_existing_order(order)
    }

    #[must_use]
    pub fn with_customer_linked(mut self, linked: bool) -> Self {
        self.is_customer_linked = linked;
        self
    }

    #[must_use]
    pub fn with_draft_order(mut self, order_id: impl Into<String>) -> Self {
        self.draft_order_id = Some(order_id.into());
        self
    }

    #[must_use]
    pub fn with_existing_order(mut self, order: ExistingOrder) -> Self {
        self.existing_order = Some(order);
        self
    }

    pub fn is_edit(&self) -> bool {
        self.mode == CheckoutMode::Edit
    }

    /// Check the context before a wizard is built on it
    pub fn validate(&self) -> Result<(), WizardError> {
        if self.business_id.trim().is_empty() {
            return Err(WizardError::InvalidContext("business id is empty".to_string()));
        }

        if self.cart.is_empty() {
            return Err(WizardError::InvalidContext("cart is empty".to_string()));
        }

        for item in &self.cart {
            if item.quantity == 0 {
                return Err(WizardError::InvalidContext(format!(
                    "'{}' has quantity 0",
                    item.name
                )));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(WizardError::InvalidContext(format!(
                    "'{}' has an invalid unit price",
                    item.name
                )));
            }
        }

        match (self.mode, &self.existing_order) {
            (CheckoutMode::Edit, None) => Err(WizardError::InvalidContext(
                "edit mode requires the existing order".to_string(),
            )),
            (CheckoutMode::CreatePublic | CheckoutMode::CreateLinked, Some(_)) => Err(
                WizardError::InvalidContext("existing order given outside edit mode".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Steps in the checkout wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    CustomerInfo,
    PickupLocation,
    Review,
    Success,
}

impl CheckoutStep {
    /// Get display title for this step
    pub fn title(&self) -> &'static str {
        match self {
            Self::CustomerInfo => "Your Details",
            Self::PickupLocation => "Pickup",
            Self::Review => "Review",
            Self::Success => "Done",
        }
    }

    /// Get description for this step
    pub fn description(&self) -> &'static str {
        match self {
            Self::CustomerInfo => "Who is this order for?",
            Self::PickupLocation => "Where will the order be collected?",
            Self::Review => "Check the order before submitting",
            Self::Success => "Your order has been submitted",
        }
    }

    /// Guard evaluated before leaving this step forward
    pub fn guard(&self, state: &WizardState) -> Result<(), ValidationError> {
        match self {
            Self::CustomerInfo => state.customer_info.validate(),
            Self::PickupLocation => {
                if state.pickup_selection.is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::MissingPickupLocation)
                }
            }
            // Review only submits; Success is terminal
            Self::Review | Self::Success => Ok(()),
        }
    }
}

const FULL_STEPS: &[CheckoutStep] = &[
    CheckoutStep::CustomerInfo,
    CheckoutStep::PickupLocation,
    CheckoutStep::Review,
];

const SHORT_STEPS: &[CheckoutStep] = &[CheckoutStep::PickupLocation, CheckoutStep::Review];

/// Step sequence chosen once when the wizard is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSequence {
    /// Customer details, pickup, review
    Full,
    /// Pickup, review. Customer is already known or immutable.
    Short,
}

impl StepSequence {
    pub fn for_context(context: &WizardContext) -> Self {
        if context.is_edit() || context.is_customer_linked {
            Self::Short
        } else {
            Self::Full
        }
    }

    pub fn steps(&self) -> &'static [CheckoutStep] {
        match self {
            Self::Full => FULL_STEPS,
            Self::Short => SHORT_STEPS,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    pub fn first(&self) -> CheckoutStep {
        self.steps()[0]
    }

    pub fn contains(&self, step: CheckoutStep) -> bool {
        self.steps().contains(&step)
    }

    /// 1-indexed position for display. `Success` sits past the last step.
    pub fn number(&self, step: CheckoutStep) -> usize {
        self.steps()
            .iter()
            .position(|s| *s == step)
            .map_or(self.step_count(), |idx| idx + 1)
    }

    pub fn next(&self, step: CheckoutStep) -> Option<CheckoutStep> {
        let steps = self.steps();
        let idx = steps.iter().position(|s| *s == step)?;
        steps.get(idx + 1).copied()
    }

    pub fn previous(&self, step: CheckoutStep) -> Option<CheckoutStep> {
        let steps = self.steps();
        let idx = steps.iter().position(|s| *s == step)?;
        idx.checked_sub(1).map(|prev| steps[prev])
    }
}

/// Direction of the last transition, drives entry animation only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Editable customer fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Name,
    Phone,
    Email,
    StreetAddress,
    City,
}

impl CustomerField {
    pub fn all() -> &'static [CustomerField] {
        &[
            Self::Name,
            Self::Phone,
            Self::Email,
            Self::StreetAddress,
            Self::City,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Phone => "Phone",
            Self::Email => "Email (optional)",
            Self::StreetAddress => "Street address",
            Self::City => "City",
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            Self::Name => NAME_MAX_LEN,
            Self::Phone => PHONE_MAX_DIGITS,
            Self::Email => EMAIL_MAX_LEN,
            Self::StreetAddress => STREET_ADDRESS_MAX_LEN,
            Self::City => CITY_MAX_LEN,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Name => Self::Phone,
            Self::Phone => Self::Email,
            Self::Email => Self::StreetAddress,
            Self::StreetAddress => Self::City,
            Self::City => Self::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Self::Name => Self::City,
            Self::Phone => Self::Name,
            Self::Email => Self::Phone,
            Self::StreetAddress => Self::Email,
            Self::City => Self::StreetAddress,
        }
    }
}

/// Strip control characters and cap the length in characters
pub fn sanitize_text(value: &str, max_len: usize) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .take(max_len)
        .collect()
}

/// Keep ASCII digits only
pub fn sanitize_phone(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_MAX_DIGITS)
        .collect()
}

/// Notes keep line breaks but no other control characters
pub fn sanitize_notes(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .take(NOTES_MAX_LEN)
        .collect()
}

/// Customer details typed into the first step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfoDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub street_address: String,
    pub city: String,
}

impl CustomerInfoDraft {
    pub fn get(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Name => &self.name,
            CustomerField::Phone => &self.phone,
            CustomerField::Email => &self.email,
            CustomerField::StreetAddress => &self.street_address,
            CustomerField::City => &self.city,
        }
    }

    /// Store a sanitized value for the field
    pub fn set(&mut self, field: CustomerField, value: &str) {
        let clean = match field {
            CustomerField::Phone => sanitize_phone(value),
            other => sanitize_text(value, other.max_len()),
        };
        match field {
            CustomerField::Name => self.name = clean,
            CustomerField::Phone => self.phone = clean,
            CustomerField::Email => self.email = clean,
            CustomerField::StreetAddress => self.street_address = clean,
            CustomerField::City => self.city = clean,
        }
    }

    /// Email only when something was typed
    pub fn email(&self) -> Option<String> {
        let trimmed = self.email.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Required fields in fixed order: name, phone, street address, city
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        if self.street_address.trim().is_empty() {
            return Err(ValidationError::MissingStreetAddress);
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::MissingCity);
        }
        Ok(())
    }
}

/// Full checkout wizard state
#[derive(Debug, Clone)]
pub struct WizardState {
    /// Current step in the wizard
    pub current_step: CheckoutStep,
    /// Direction of the last transition
    pub direction: Direction,
    /// Customer details, authoritative only when the sequence includes them
    pub customer_info: CustomerInfoDraft,
    /// Chosen pickup location id
    pub pickup_selection: Option<String>,
    /// Free-text order notes
    pub notes: String,
    /// Locations fetched for the business
    pub locations: Vec<Location>,
    pub is_loading_locations: bool,
    pub is_submitting: bool,
    /// The single visible error
    pub error: Option<WizardError>,
}

impl WizardState {
    pub fn new(first_step: CheckoutStep) -> Self {
        Self {
            current_step: first_step,
            direction: Direction::Forward,
            customer_info: CustomerInfoDraft::default(),
            pickup_selection: None,
            notes: String::new(),
            locations: Vec::new(),
            is_loading_locations: false,
            is_submitting: false,
            error: None,
        }
    }

    /// The loaded location matching the current selection
    pub fn selected_location(&self) -> Option<&Location> {
        let id = self.pickup_selection.as_deref()?;
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Notes as sent to the backend
    pub fn notes_for_request(&self) -> Option<String> {
        let trimmed = self.notes.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
