// ABOUTME: Checkout wizard module for placing and editing orders
// Step state machine, pickup pre-selection, submission routing and the terminal view

pub mod component;
pub mod error;
pub mod loader;
pub mod router;
pub mod state;
pub mod wizard;

pub use component::{CheckoutAction, CheckoutComponent};
pub use error::{ValidationError, WizardError};
pub use router::{Endpoint, SubmissionKind, SubmitPlan};
pub use state::{
    CartItem, CheckoutMode, CheckoutStep, CustomerField, CustomerInfoDraft, Direction,
    ExistingOrder, StepSequence, WizardContext, WizardState,
};
pub use wizard::{CheckoutWizard, ReviewLine, ReviewSummary, WizardEvent};
