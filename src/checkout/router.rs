// ABOUTME: Submission routing for the checkout wizard
// Maps (submission kind, role) to a backend endpoint and builds the request body

use super::error::{ValidationError, WizardError};
use super::state::{CartItem, WizardContext, WizardState};
use crate::api::{ApiError, CheckoutApi, OrderRequest, ProductLine, UpdateOrderRequest};
use crate::session::Role;

const PLACE_FALLBACK: &str = "Failed to place order. Please try again.";
const UPDATE_FALLBACK: &str = "Failed to update order. Please try again.";

/// What kind of submission the context calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// Editing an already placed order
    Edit,
    /// Placing an existing draft order
    PlaceDraft,
    /// Public storefront checkout without a draft
    PublicCheckout,
}

impl SubmissionKind {
    pub fn for_context(context: &WizardContext) -> Self {
        if context.is_edit() {
            Self::Edit
        } else if context.draft_order_id.is_some() {
            Self::PlaceDraft
        } else {
            Self::PublicCheckout
        }
    }
}

/// Backend operation a submission lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    UpdateOrderForAgent,
    UpdateOrder,
    PlaceOrder,
    CreateAndPlace,
}

/// Routing table. `None` means the role may not perform that submission.
pub fn endpoint_for(kind: SubmissionKind, role: Role) -> Option<Endpoint> {
    use Endpoint::{CreateAndPlace, PlaceOrder, UpdateOrder, UpdateOrderForAgent};
    use SubmissionKind::{Edit, PlaceDraft, PublicCheckout};

    match (kind, role) {
        (Edit, Role::Agent) => Some(UpdateOrderForAgent),
        (Edit, Role::Manager) => Some(UpdateOrder),
        (Edit, Role::Customer | Role::Anonymous) => None,
        (PlaceDraft, Role::Agent | Role::Manager | Role::Customer | Role::Anonymous) => {
            Some(PlaceOrder)
        }
        (PublicCheckout, Role::Agent | Role::Manager | Role::Customer | Role::Anonymous) => {
            Some(CreateAndPlace)
        }
    }
}

/// A fully built submission, ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPlan {
    UpdateOrderForAgent {
        order_id: String,
        request: UpdateOrderRequest,
    },
    UpdateOrder {
        order_id: String,
        request: UpdateOrderRequest,
    },
    PlaceOrder {
        order_id: String,
        request: OrderRequest,
    },
    CreateAndPlace {
        business_id: String,
        request: OrderRequest,
    },
}

impl SubmitPlan {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::UpdateOrderForAgent { .. } => Endpoint::UpdateOrderForAgent,
            Self::UpdateOrder { .. } => Endpoint::UpdateOrder,
            Self::PlaceOrder { .. } => Endpoint::PlaceOrder,
            Self::CreateAndPlace { .. } => Endpoint::CreateAndPlace,
        }
    }

    /// Message shown when the backend gives no user-facing text
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UpdateOrderForAgent { .. } | Self::UpdateOrder { .. } => UPDATE_FALLBACK,
            Self::PlaceOrder { .. } | Self::CreateAndPlace { .. } => PLACE_FALLBACK,
        }
    }

    /// Issue exactly one backend call for this plan
    pub async fn execute(&self, api: &dyn CheckoutApi) -> Result<(), ApiError> {
        match self {
            Self::UpdateOrderForAgent { order_id, request } => {
                api.update_order_for_agent(order_id, request).await
            }
            Self::UpdateOrder { order_id, request } => api.update_order(order_id, request).await,
            Self::PlaceOrder { order_id, request } => api.place_order(order_id, request).await,
            Self::CreateAndPlace {
                business_id,
                request,
            } => {
                api.create_and_place_public_order(business_id, request)
                    .await
            }
        }
    }
}

/// Product lines sent with every submission
pub fn product_lines(cart: &[CartItem]) -> Vec<ProductLine> {
    cart.iter()
        .map(|item| ProductLine {
            product_id: item.product_id.clone(),
            product_name: item.name.clone(),
            quantity: item.quantity,
            price_per_unit: item.unit_price,
        })
        .collect()
}

fn order_request(context: &WizardContext, state: &WizardState, pickup_location_id: String) -> OrderRequest {
    let products = product_lines(&context.cart);
    let notes = state.notes_for_request();

    // Linked orders resolve the customer on the backend
    if context.is_customer_linked {
        return OrderRequest {
            customer_name: String::new(),
            customer_phone: String::new(),
            customer_email: None,
            customer_street_address: String::new(),
            customer_city: String::new(),
            pickup_location_id,
            products,
            notes,
        };
    }

    let customer = &state.customer_info;
    OrderRequest {
        customer_name: customer.name.trim().to_string(),
        customer_phone: customer.phone.clone(),
        customer_email: customer.email(),
        customer_street_address: customer.street_address.trim().to_string(),
        customer_city: customer.city.trim().to_string(),
        pickup_location_id,
        products,
        notes,
    }
}

/// Route the current wizard state to a submission plan
pub fn plan_submission(
    context: &WizardContext,
    state: &WizardState,
    role: Role,
) -> Result<SubmitPlan, WizardError> {
    let kind = SubmissionKind::for_context(context);
    let endpoint = endpoint_for(kind, role).ok_or(WizardError::Permission { role })?;

    let pickup_location_id = state
        .pickup_selection
        .clone()
        .ok_or(WizardError::Validation(ValidationError::MissingPickupLocation))?;

    let plan = match endpoint {
        Endpoint::UpdateOrderForAgent | Endpoint::UpdateOrder => {
            let order_id = context
                .existing_order
                .as_ref()
                .map(|o| o.order_id.clone())
                .ok_or_else(|| {
                    WizardError::InvalidContext("edit mode requires the existing order".to_string())
                })?;
            let request = UpdateOrderRequest {
                pickup_location_id,
                products: product_lines(&context.cart),
                notes: state.notes_for_request(),
            };
            if endpoint == Endpoint::UpdateOrderForAgent {
                SubmitPlan::UpdateOrderForAgent { order_id, request }
            } else {
                SubmitPlan::UpdateOrder { order_id, request }
            }
        }
        Endpoint::PlaceOrder => {
            let order_id = context.draft_order_id.clone().ok_or_else(|| {
                WizardError::InvalidContext("placing a draft requires its order id".to_string())
            })?;
            SubmitPlan::PlaceOrder {
                order_id,
                request: order_request(context, state, pickup_location_id),
            }
        }
        Endpoint::CreateAndPlace => SubmitPlan::CreateAndPlace {
            business_id: context.business_id.clone(),
            request: order_request(context, state, pickup_location_id),
        },
    };

    Ok(plan)
}
