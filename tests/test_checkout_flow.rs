// ABOUTME: Integration tests driving the checkout wizard end to end against a fake backend

#[path = "helpers/fake_api.rs"]
mod fake_api;

use fake_api::{location, ApiCall, FakeApi};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storefront_checkout::api::{OrderRequest, ProductLine, UpdateOrderRequest};
use storefront_checkout::checkout::{
    CartItem, CheckoutMode, CheckoutStep, CheckoutWizard, CustomerField, ExistingOrder,
    WizardContext, WizardError,
};
use storefront_checkout::session::{Role, StaticRole};

fn widget_cart() -> Vec<CartItem> {
    vec![CartItem {
        product_id: "p-1".to_string(),
        name: "Widget".to_string(),
        unit_price: 10.0,
        quantity: 3,
    }]
}

fn wizard(context: WizardContext, role: Role) -> CheckoutWizard {
    CheckoutWizard::new(context, Arc::new(StaticRole(role))).unwrap()
}

fn fill_customer(wizard: &mut CheckoutWizard) {
    wizard.set_customer_field(CustomerField::Name, "Ada Lovelace");
    wizard.set_customer_field(CustomerField::Phone, "555-0100");
    wizard.set_customer_field(CustomerField::StreetAddress, "12 Analytical Way");
    wizard.set_customer_field(CustomerField::City, "London");
}

fn edit_context() -> WizardContext {
    WizardContext::edit(
        "b-1",
        ExistingOrder {
            order_id: "o-42".to_string(),
            pickup_street_address: "2 Side St".to_string(),
            pickup_city: "Springfield".to_string(),
            notes: None,
        },
        widget_cart(),
    )
}

#[tokio::test]
async fn test_widget_public_checkout() {
    let api = FakeApi::with_locations(vec![location("loc-1", "1 Main St", "Springfield")]);
    let successes = Arc::new(AtomicUsize::new(0));
    let counter = successes.clone();
    let mut wizard = wizard(WizardContext::public_checkout("b-1", widget_cart()), Role::Anonymous)
        .on_success(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    assert_eq!(wizard.current_step(), CheckoutStep::CustomerInfo);
    assert_eq!(wizard.sequence().step_count(), 3);

    wizard.load_locations(&api).await;
    assert_eq!(wizard.state().pickup_selection.as_deref(), Some("loc-1"));

    fill_customer(&mut wizard);
    assert!(wizard.advance());
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), CheckoutStep::Review);
    assert!((wizard.review_summary().total - 30.0).abs() < f64::EPSILON);

    wizard.submit(&api).await.unwrap();

    assert_eq!(wizard.current_step(), CheckoutStep::Success);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(
        api.submission_calls(),
        vec![ApiCall::CreateAndPlace(
            "b-1".to_string(),
            OrderRequest {
                customer_name: "Ada Lovelace".to_string(),
                customer_phone: "5550100".to_string(),
                customer_email: None,
                customer_street_address: "12 Analytical Way".to_string(),
                customer_city: "London".to_string(),
                pickup_location_id: "loc-1".to_string(),
                products: vec![ProductLine {
                    product_id: "p-1".to_string(),
                    product_name: "Widget".to_string(),
                    quantity: 3,
                    price_per_unit: 10.0,
                }],
                notes: None,
            }
        )]
    );
}

#[tokio::test]
async fn test_linked_draft_places_order_without_customer_details() {
    let api = FakeApi::with_locations(vec![
        location("loc-1", "1 Main St", "Springfield"),
        location("loc-2", "2 Side St", "Springfield"),
    ]);
    let context = WizardContext::new(CheckoutMode::CreateLinked, "b-1", widget_cart())
        .with_draft_order("o-7")
        .with_customer_linked(true);
    let mut wizard = wizard(context, Role::Agent);

    assert_eq!(wizard.current_step(), CheckoutStep::PickupLocation);
    assert!(!wizard.retreat());

    wizard.load_locations(&api).await;
    // Two candidates and nothing to match against
    assert_eq!(wizard.state().pickup_selection, None);
    assert!(!wizard.advance());

    wizard.select_pickup("loc-2").unwrap();
    wizard.set_notes("Leave at the counter");
    assert!(wizard.advance());
    wizard.submit(&api).await.unwrap();

    let calls = api.submission_calls();
    assert_eq!(calls.len(), 1);
    let ApiCall::PlaceOrder(order_id, request) = &calls[0] else {
        panic!("expected a place-order call");
    };
    assert_eq!(order_id, "o-7");
    assert_eq!(request.customer_name, "");
    assert_eq!(request.pickup_location_id, "loc-2");
    assert_eq!(request.notes.as_deref(), Some("Leave at the counter"));
}

#[tokio::test]
async fn test_edit_preselects_matching_location_and_routes_by_role() {
    for role in [Role::Agent, Role::Manager] {
        let api = FakeApi::with_locations(vec![
            location("loc-1", "1 Main St", "Springfield"),
            location("loc-2", " 2 side st ", "SPRINGFIELD"),
        ]);
        let mut wizard = wizard(edit_context(), role);

        wizard.load_locations(&api).await;
        assert_eq!(wizard.state().pickup_selection.as_deref(), Some("loc-2"));
        assert!(wizard.advance());
        wizard.submit(&api).await.unwrap();

        let request = UpdateOrderRequest {
            pickup_location_id: "loc-2".to_string(),
            products: vec![ProductLine {
                product_id: "p-1".to_string(),
                product_name: "Widget".to_string(),
                quantity: 3,
                price_per_unit: 10.0,
            }],
            notes: None,
        };
        let call = if role == Role::Agent {
            ApiCall::UpdateOrderForAgent("o-42".to_string(), request)
        } else {
            ApiCall::UpdateOrder("o-42".to_string(), request)
        };
        assert_eq!(api.submission_calls(), vec![call]);
    }
}

#[tokio::test]
async fn test_customer_cannot_edit_and_nothing_is_sent() {
    let api = FakeApi::with_locations(vec![location("loc-1", "2 Side St", "Springfield")]);
    let mut wizard = wizard(edit_context(), Role::Customer);

    wizard.load_locations(&api).await;
    assert!(wizard.advance());

    let err = wizard.submit(&api).await.unwrap_err();

    assert_eq!(err, WizardError::Permission { role: Role::Customer });
    assert!(wizard.error_message().is_some());
    assert_eq!(wizard.current_step(), CheckoutStep::Review);
    assert!(!wizard.state().is_submitting);
    assert!(api.submission_calls().is_empty());
}

#[tokio::test]
async fn test_failed_submit_stays_on_review() {
    let api = FakeApi::with_locations(vec![location("loc-1", "1 Main St", "Springfield")])
        .failing_submit(500, None);
    let successes = Arc::new(AtomicUsize::new(0));
    let counter = successes.clone();
    let mut wizard = wizard(WizardContext::public_checkout("b-1", widget_cart()), Role::Anonymous)
        .on_success(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    wizard.load_locations(&api).await;
    fill_customer(&mut wizard);
    wizard.advance();
    wizard.advance();

    assert!(wizard.submit(&api).await.is_err());

    assert_eq!(wizard.current_step(), CheckoutStep::Review);
    assert!(!wizard.state().is_submitting);
    assert_eq!(
        wizard.error_message().as_deref(),
        Some("Failed to place order. Please try again.")
    );
    assert_eq!(successes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_submit_shows_server_message() {
    let api = FakeApi::with_locations(vec![location("loc-1", "2 Side St", "Springfield")])
        .failing_submit(409, Some("Order already picked up"));
    let mut wizard = wizard(edit_context(), Role::Manager);

    wizard.load_locations(&api).await;
    wizard.advance();
    assert!(wizard.submit(&api).await.is_err());

    assert_eq!(wizard.error_message().as_deref(), Some("Order already picked up"));
    assert_eq!(api.submission_calls().len(), 1);
}

#[tokio::test]
async fn test_location_failure_is_not_fatal() {
    let api = FakeApi::failing_locations();
    let mut wizard = wizard(WizardContext::public_checkout("b-1", widget_cart()), Role::Anonymous);

    wizard.load_locations(&api).await;

    assert!(!wizard.state().is_loading_locations);
    assert!(wizard.state().locations.is_empty());
    assert!(wizard.error_message().is_some());
    assert!(!wizard.is_closed());

    // The customer step is still usable
    fill_customer(&mut wizard);
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), CheckoutStep::PickupLocation);
    assert!(!wizard.advance());
    assert_eq!(api.calls(), vec![ApiCall::Locations("b-1".to_string())]);
}

#[test]
fn test_blank_required_field_blocks_advance_idempotently() {
    let mut wizard = wizard(WizardContext::public_checkout("b-1", widget_cart()), Role::Anonymous);
    fill_customer(&mut wizard);
    wizard.set_customer_field(CustomerField::City, "   ");

    assert!(!wizard.advance());
    let first = (wizard.current_step(), wizard.error_message());
    assert!(!wizard.advance());
    let second = (wizard.current_step(), wizard.error_message());

    assert_eq!(first, second);
    assert_eq!(first.0, CheckoutStep::CustomerInfo);
    assert_eq!(first.1.as_deref(), Some("Please enter your city"));
}

#[test]
fn test_retreat_from_first_step_is_noop() {
    let mut wizard = wizard(WizardContext::public_checkout("b-1", widget_cart()), Role::Anonymous);
    assert!(!wizard.retreat());
    assert_eq!(wizard.current_step(), CheckoutStep::CustomerInfo);

    let mut edit = wizard_for_edit();
    assert!(!edit.retreat());
    assert_eq!(edit.current_step(), CheckoutStep::PickupLocation);
}

fn wizard_for_edit() -> CheckoutWizard {
    wizard(edit_context(), Role::Manager)
}
