// ABOUTME: Checkout wizard container driving the step state machine
// Owns the state, applies async load/submit results and fires host callbacks

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{ValidationError, WizardError};
use super::loader;
use super::router::{self, SubmitPlan};
use super::state::{
    sanitize_notes, CartItem, CheckoutStep, CustomerField, CustomerInfoDraft, Direction,
    StepSequence, WizardContext, WizardState,
};
use crate::api::{ApiError, CheckoutApi, Location};
use crate::session::RoleProvider;

type Callback = Box<dyn FnOnce() + Send>;

/// Results of async work started by the host, fed back into the wizard
#[derive(Debug)]
pub enum WizardEvent {
    LocationsLoaded(Result<Vec<Location>, ApiError>),
    /// A plan from `begin_submit` together with the backend's answer
    SubmissionFinished {
        plan: SubmitPlan,
        result: Result<(), ApiError>,
    },
}

/// One review line with its computed total
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Everything the review step shows
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub lines: Vec<ReviewLine>,
    pub total: f64,
    pub pickup: Option<Location>,
    /// Present only when the customer step is part of the flow
    pub customer: Option<CustomerInfoDraft>,
    pub notes: Option<String>,
}

pub struct CheckoutWizard {
    context: WizardContext,
    sequence: StepSequence,
    state: WizardState,
    roles: Arc<dyn RoleProvider>,
    on_success: Option<Callback>,
    on_close: Option<Callback>,
    closed: bool,
}

impl std::fmt::Debug for CheckoutWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutWizard")
            .field("context", &self.context)
            .field("sequence", &self.sequence)
            .field("state", &self.state)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl CheckoutWizard {
    /// Build a wizard. The step sequence is fixed here for the wizard's lifetime.
    pub fn new(context: WizardContext, roles: Arc<dyn RoleProvider>) -> Result<Self, WizardError> {
        context.validate()?;

        let sequence = StepSequence::for_context(&context);
        let mut state = WizardState::new(sequence.first());
        if let Some(notes) = context.existing_order.as_ref().and_then(|o| o.notes.as_deref()) {
            state.notes = sanitize_notes(notes);
        }

        info!(
            "Checkout wizard opened: mode={:?} linked={} steps={}",
            context.mode,
            context.is_customer_linked,
            sequence.step_count()
        );

        Ok(Self {
            context,
            sequence,
            state,
            roles,
            on_success: None,
            on_close: None,
            closed: false,
        })
    }

    #[must_use]
    pub fn on_success(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_close(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn sequence(&self) -> StepSequence {
        self.sequence
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> CheckoutStep {
        self.state.current_step
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.error_message()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the customer details are collected and sent
    pub fn collects_customer_info(&self) -> bool {
        self.sequence.contains(CheckoutStep::CustomerInfo)
    }

    pub fn can_go_back(&self) -> bool {
        !self.state.is_submitting && self.sequence.previous(self.state.current_step).is_some()
    }

    // === Input ===

    pub fn set_customer_field(&mut self, field: CustomerField, value: &str) {
        self.state.customer_info.set(field, value);
        if matches!(&self.state.error, Some(WizardError::Validation(v)) if v.field() == Some(field)) {
            self.state.error = None;
        }
    }

    /// Choose a pickup location from the loaded list
    pub fn select_pickup(&mut self, location_id: &str) -> Result<(), WizardError> {
        if !self.state.locations.iter().any(|l| l.id == location_id) {
            let err = WizardError::Validation(ValidationError::UnknownLocation(
                location_id.to_string(),
            ));
            self.state.error = Some(err.clone());
            return Err(err);
        }

        self.state.pickup_selection = Some(location_id.to_string());
        if matches!(&self.state.error, Some(WizardError::Validation(v)) if v.is_pickup()) {
            self.state.error = None;
        }
        Ok(())
    }

    pub fn set_notes(&mut self, notes: &str) {
        self.state.notes = sanitize_notes(notes);
    }

    // === Transitions ===

    /// Move forward if the current step's guard passes
    pub fn advance(&mut self) -> bool {
        if self.closed || self.state.is_submitting {
            return false;
        }

        let step = self.state.current_step;
        let Some(next) = self.sequence.next(step) else {
            return false;
        };

        if let Err(err) = step.guard(&self.state) {
            debug!("Advance from {:?} blocked: {}", step, err);
            self.state.error = Some(err.into());
            return false;
        }

        self.state.current_step = next;
        self.state.direction = Direction::Forward;
        self.state.error = None;
        debug!("Checkout step {:?} -> {:?}", step, next);
        true
    }

    /// Move back one step. No-op at the first step of the sequence.
    pub fn retreat(&mut self) -> bool {
        if self.closed || self.state.is_submitting {
            return false;
        }

        let step = self.state.current_step;
        let Some(prev) = self.sequence.previous(step) else {
            return false;
        };

        self.state.current_step = prev;
        self.state.direction = Direction::Backward;
        debug!("Checkout step {:?} -> {:?}", step, prev);
        true
    }

    // === Location loading ===

    /// Mark locations as loading. Returns the business to load for, or `None`
    /// when a load is already running or the wizard is gone.
    pub fn begin_location_load(&mut self) -> Option<String> {
        if self.closed || self.state.is_loading_locations {
            return None;
        }
        self.state.is_loading_locations = true;
        Some(self.context.business_id.clone())
    }

    pub fn apply_locations(&mut self, result: Result<Vec<Location>, ApiError>) {
        if self.closed {
            debug!("Discarding location result for closed wizard");
            return;
        }
        self.state.is_loading_locations = false;

        match result {
            Ok(locations) => {
                info!("Loaded {} pickup locations", locations.len());
                if self.state.pickup_selection.is_none() {
                    self.state.pickup_selection =
                        loader::preselect(&locations, self.context.existing_order.as_ref());
                }
                self.state.locations = locations;
            }
            Err(e) => {
                warn!("Failed to load pickup locations: {}", e);
                let message = e
                    .user_message()
                    .unwrap_or("Could not load pickup locations")
                    .to_string();
                self.state.error = Some(WizardError::LocationLoad(message));
            }
        }
    }

    /// Fetch locations and apply them in one go
    pub async fn load_locations(&mut self, api: &dyn CheckoutApi) {
        let Some(business_id) = self.begin_location_load() else {
            return;
        };
        let result = api.locations_for_business(&business_id).await;
        self.apply_locations(result);
    }

    // === Submission ===

    /// Validate and route a submission. On success the wizard is marked as
    /// submitting and the caller must send the plan and report back through
    /// [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(&mut self) -> Result<SubmitPlan, WizardError> {
        if self.closed {
            return Err(WizardError::Closed);
        }
        if self.state.current_step != CheckoutStep::Review {
            return Err(WizardError::NotAtReview(self.state.current_step));
        }
        if self.state.is_submitting {
            return Err(WizardError::AlreadySubmitting);
        }

        let role = self.roles.current_role();
        match router::plan_submission(&self.context, &self.state, role) {
            Ok(plan) => {
                info!("Submitting order via {:?} as {}", plan.endpoint(), role);
                self.state.is_submitting = true;
                self.state.error = None;
                Ok(plan)
            }
            Err(err) => {
                warn!("Submission rejected locally: {}", err);
                if err.is_user_facing() {
                    self.state.error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    /// Apply the backend's answer to a plan returned by `begin_submit`
    pub fn finish_submit(&mut self, plan: &SubmitPlan, result: Result<(), ApiError>) {
        if self.closed {
            debug!("Discarding submission result for closed wizard");
            return;
        }
        self.state.is_submitting = false;

        match result {
            Ok(()) => {
                info!("Order submitted via {:?}", plan.endpoint());
                self.state.current_step = CheckoutStep::Success;
                self.state.direction = Direction::Forward;
                self.state.error = None;
                if let Some(callback) = self.on_success.take() {
                    callback();
                }
            }
            Err(e) => {
                warn!("Order submission failed: {}", e);
                let message = e.user_message().unwrap_or(plan.fallback_message()).to_string();
                self.state.error = Some(WizardError::Submission(message));
            }
        }
    }

    /// Route, send and apply a submission in one go
    pub async fn submit(&mut self, api: &dyn CheckoutApi) -> Result<(), WizardError> {
        let plan = self.begin_submit()?;
        let result = plan.execute(api).await;
        self.finish_submit(&plan, result);

        match &self.state.error {
            Some(err) if self.state.current_step != CheckoutStep::Success => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Feed back an async result produced by the host
    pub fn handle_event(&mut self, event: WizardEvent) {
        match event {
            WizardEvent::LocationsLoaded(result) => self.apply_locations(result),
            WizardEvent::SubmissionFinished { plan, result } => self.finish_submit(&plan, result),
        }
    }

    /// Close the wizard. Later async results are ignored.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("Checkout wizard closed at {:?}", self.state.current_step);
        if let Some(callback) = self.on_close.take() {
            callback();
        }
    }

    // === Review ===

    pub fn order_total(&self) -> f64 {
        self.context.cart.iter().map(CartItem::line_total).sum()
    }

    pub fn review_summary(&self) -> ReviewSummary {
        let lines = self
            .context
            .cart
            .iter()
            .map(|item| ReviewLine {
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
            })
            .collect();

        ReviewSummary {
            lines,
            total: self.order_total(),
            pickup: self.state.selected_location().cloned(),
            customer: self
                .collects_customer_info()
                .then(|| self.state.customer_info.clone()),
            notes: self.state.notes_for_request(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockCheckoutApi;
    use crate::checkout::state::{CheckoutMode, ExistingOrder};
    use crate::session::{Role, StaticRole};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cart() -> Vec<CartItem> {
        vec![CartItem {
            product_id: "p-1".to_string(),
            name: "Widget".to_string(),
            unit_price: 10.0,
            quantity: 3,
        }]
    }

    fn location(id: &str) -> Location {
        Location {
            id: id.to_string(),
            name: "Downtown".to_string(),
            street_address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            phone_number: "5550100".to_string(),
        }
    }

    fn edit_wizard(role: Role) -> CheckoutWizard {
        let order = ExistingOrder {
            order_id: "ord-1".to_string(),
            pickup_street_address: "1 Main St".to_string(),
            pickup_city: "Springfield".to_string(),
            notes: Some("ring the bell".to_string()),
        };
        CheckoutWizard::new(
            WizardContext::edit("biz-1", order, cart()),
            Arc::new(StaticRole(role)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_edit_by_customer_issues_no_network_call() {
        // No expectations: any call on the mock panics
        let api = MockCheckoutApi::new();
        let mut wizard = edit_wizard(Role::Customer);
        wizard.apply_locations(Ok(vec![location("loc-1")]));
        assert!(wizard.advance());

        let result = wizard.submit(&api).await;
        assert_eq!(result, Err(WizardError::Permission { role: Role::Customer }));
        assert_eq!(wizard.current_step(), CheckoutStep::Review);
        assert!(!wizard.state().is_submitting);
        assert!(wizard.error_message().is_some());
    }

    #[tokio::test]
    async fn test_edit_by_agent_uses_agent_endpoint() {
        let mut api = MockCheckoutApi::new();
        api.expect_update_order_for_agent()
            .withf(|order_id: &str, request: &crate::api::UpdateOrderRequest| {
                order_id == "ord-1"
                    && request.pickup_location_id == "loc-1"
                    && request.notes.as_deref() == Some("ring the bell")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let successes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&successes);
        let mut wizard = edit_wizard(Role::Agent).on_success(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        wizard.apply_locations(Ok(vec![location("loc-1"), location("loc-2")]));
        assert_eq!(wizard.state().pickup_selection.as_deref(), Some("loc-1"));
        assert!(wizard.advance());

        wizard.submit(&api).await.unwrap();
        assert_eq!(wizard.current_step(), CheckoutStep::Success);
        assert_eq!(successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_locations_uses_business_id() {
        let mut api = MockCheckoutApi::new();
        api.expect_locations_for_business()
            .withf(|business_id: &str| business_id == "biz-1")
            .times(1)
            .returning(|_| Ok(vec![location("loc-7")]));

        let mut wizard = CheckoutWizard::new(
            WizardContext::public_checkout("biz-1", cart()),
            Arc::new(StaticRole(Role::Anonymous)),
        )
        .unwrap();
        wizard.load_locations(&api).await;

        assert!(!wizard.state().is_loading_locations);
        assert_eq!(wizard.state().pickup_selection.as_deref(), Some("loc-7"));
    }

    #[test]
    fn test_duplicate_load_trigger_ignored() {
        let mut wizard = edit_wizard(Role::Manager);
        assert_eq!(wizard.begin_location_load(), Some("biz-1".to_string()));
        assert_eq!(wizard.begin_location_load(), None);
        wizard.apply_locations(Ok(Vec::new()));
        assert_eq!(wizard.begin_location_load(), Some("biz-1".to_string()));
    }

    #[test]
    fn test_notes_prefilled_from_existing_order() {
        let wizard = edit_wizard(Role::Manager);
        assert_eq!(wizard.state().notes, "ring the bell");
    }

    #[test]
    fn test_late_results_ignored_after_close() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&closes);
        let mut wizard = edit_wizard(Role::Manager).on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        wizard.begin_location_load();
        wizard.close();
        wizard.close();
        wizard.apply_locations(Ok(vec![location("loc-1")]));

        assert!(wizard.is_closed());
        assert!(wizard.state().locations.is_empty());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert_eq!(wizard.begin_location_load(), None);
    }

    fn linked_draft_wizard() -> CheckoutWizard {
        let context = WizardContext::new(CheckoutMode::CreateLinked, "biz-1", cart())
            .with_draft_order("ord-9")
            .with_customer_linked(true);
        CheckoutWizard::new(context, Arc::new(StaticRole(Role::Customer))).unwrap()
    }

    fn away_location(id: &str) -> Location {
        Location {
            street_address: format!("{id} Harbour Rd"),
            ..location(id)
        }
    }

    #[test]
    fn test_second_submit_while_in_flight_is_rejected() {
        let mut wizard = edit_wizard(Role::Manager);
        wizard.apply_locations(Ok(vec![location("loc-1")]));
        assert!(wizard.advance());

        let plan = wizard.begin_submit().unwrap();
        assert_eq!(wizard.begin_submit(), Err(WizardError::AlreadySubmitting));

        assert!(wizard.state().is_submitting);
        assert_eq!(wizard.state().error, None);
        assert_eq!(wizard.current_step(), CheckoutStep::Review);

        wizard.handle_event(WizardEvent::SubmissionFinished {
            plan,
            result: Ok(()),
        });
        assert!(!wizard.state().is_submitting);
        assert_eq!(wizard.current_step(), CheckoutStep::Success);
    }

    #[tokio::test]
    async fn test_submit_outside_review_changes_nothing() {
        // No expectations: any call on the mock panics
        let api = MockCheckoutApi::new();
        let mut wizard = edit_wizard(Role::Manager);
        wizard.apply_locations(Ok(vec![location("loc-1")]));

        let result = wizard.submit(&api).await;

        assert_eq!(
            result,
            Err(WizardError::NotAtReview(CheckoutStep::PickupLocation))
        );
        assert_eq!(wizard.current_step(), CheckoutStep::PickupLocation);
        assert!(!wizard.state().is_submitting);
        assert_eq!(wizard.state().error, None);
    }

    #[test]
    fn test_editing_offending_field_clears_its_error() {
        let mut wizard = CheckoutWizard::new(
            WizardContext::public_checkout("biz-1", cart()),
            Arc::new(StaticRole(Role::Anonymous)),
        )
        .unwrap();
        wizard.set_customer_field(CustomerField::Name, "Ada");
        wizard.set_customer_field(CustomerField::Phone, "5550100");
        wizard.set_customer_field(CustomerField::StreetAddress, "1 Main St");

        assert!(!wizard.advance());
        let missing_city = Some(WizardError::Validation(ValidationError::MissingCity));
        assert_eq!(wizard.state().error, missing_city);

        wizard.set_customer_field(CustomerField::Name, "Ada Lovelace");
        assert_eq!(wizard.state().error, missing_city);

        wizard.set_customer_field(CustomerField::City, "Springfield");
        assert_eq!(wizard.state().error, None);
        assert_eq!(wizard.current_step(), CheckoutStep::CustomerInfo);
    }

    #[test]
    fn test_select_pickup_clears_error_and_rejects_unknown_id() {
        let mut wizard = linked_draft_wizard();
        wizard.apply_locations(Ok(vec![away_location("loc-1"), away_location("loc-2")]));
        assert_eq!(wizard.state().pickup_selection, None);

        assert!(!wizard.advance());
        assert_eq!(
            wizard.state().error,
            Some(WizardError::Validation(ValidationError::MissingPickupLocation))
        );

        let unknown = wizard.select_pickup("loc-404");
        assert_eq!(
            unknown,
            Err(WizardError::Validation(ValidationError::UnknownLocation(
                "loc-404".to_string()
            )))
        );
        assert_eq!(wizard.state().pickup_selection, None);

        wizard.select_pickup("loc-2").unwrap();
        assert_eq!(wizard.state().pickup_selection.as_deref(), Some("loc-2"));
        assert_eq!(wizard.state().error, None);
        assert!(wizard.advance());
    }

    #[test]
    fn test_submission_result_after_close_is_discarded() {
        let successes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&successes);
        let mut wizard = linked_draft_wizard().on_success(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        wizard.apply_locations(Ok(vec![location("loc-1")]));
        assert!(wizard.advance());

        let plan = wizard.begin_submit().unwrap();
        wizard.close();
        wizard.handle_event(WizardEvent::SubmissionFinished {
            plan,
            result: Ok(()),
        });

        assert_eq!(successes.load(Ordering::SeqCst), 0);
        assert_eq!(wizard.current_step(), CheckoutStep::Review);
    }

    #[test]
    fn test_failed_submission_event_releases_submitting() {
        let mut wizard = linked_draft_wizard();
        wizard.apply_locations(Ok(vec![location("loc-1")]));
        assert!(wizard.advance());

        let plan = wizard.begin_submit().unwrap();
        wizard.handle_event(WizardEvent::SubmissionFinished {
            plan,
            result: Err(ApiError::Decode("truncated body".to_string())),
        });

        assert!(!wizard.state().is_submitting);
        assert_eq!(
            wizard.error_message().as_deref(),
            Some("Failed to place order. Please try again.")
        );
        assert!(wizard.begin_submit().is_ok());
    }
}
