// ABOUTME: CLI checkout command - runs the checkout / edit wizard in the terminal
// Spawns location loading and submission as tasks and feeds results back over a channel

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info};

use super::{util, CheckoutArgs, OutputFormat};
use crate::api::CheckoutApi;
use crate::checkout::{
    CartItem, CheckoutAction, CheckoutComponent, CheckoutMode, CheckoutWizard, ExistingOrder,
    WizardContext, WizardEvent,
};
use crate::config::AppConfig;
use crate::session::{Role, RoleProvider, StaticRole};

/// Execute the checkout command
pub async fn execute(args: CheckoutArgs, format: OutputFormat) -> Result<()> {
    if !io::stdout().is_terminal() {
        anyhow::bail!("The checkout wizard needs an interactive terminal");
    }

    let config = AppConfig::load()?;
    let session = config.session.store()?;
    let api: Arc<dyn CheckoutApi> = Arc::new(util::api_client(&config, &session)?);

    let roles: Arc<dyn RoleProvider> = match &args.role {
        Some(role) => Arc::new(StaticRole(role.parse::<Role>()?)),
        None => Arc::new(session),
    };

    let context = build_context(&args)?;
    let placed = Arc::new(AtomicBool::new(false));
    let placed_flag = placed.clone();
    let wizard = CheckoutWizard::new(context, roles)?
        .on_success(move || placed_flag.store(true, Ordering::SeqCst));

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    run_tui(wizard, api, tick_rate).await?;

    let placed = placed.load(Ordering::SeqCst);
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "submitted": placed })),
        OutputFormat::Text if placed => println!("Order submitted."),
        OutputFormat::Text => println!("Checkout cancelled."),
    }

    Ok(())
}

/// Build the wizard context from the command line inputs
pub fn build_context(args: &CheckoutArgs) -> Result<WizardContext> {
    let cart: Vec<CartItem> = util::read_json(&args.cart)?;

    let context = if let Some(path) = &args.edit {
        let order: ExistingOrder = util::read_json(path)?;
        WizardContext::edit(&args.business, order, cart)
    } else if let Some(order_id) = &args.draft_order {
        WizardContext::new(CheckoutMode::CreateLinked, &args.business, cart).with_draft_order(order_id)
    } else {
        WizardContext::public_checkout(&args.business, cart)
    };

    Ok(context.with_customer_linked(args.linked))
}

async fn run_tui(
    mut wizard: CheckoutWizard,
    api: Arc<dyn CheckoutApi>,
    tick_rate: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut wizard, api, tick_rate).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        error!("Checkout wizard exited with error: {}", e);
    }
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    wizard: &mut CheckoutWizard,
    api: Arc<dyn CheckoutApi>,
    tick_rate: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WizardEvent>();
    let mut component = CheckoutComponent::new();

    if let Some(business_id) = wizard.begin_location_load() {
        let api = api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.locations_for_business(&business_id).await;
            let _ = tx.send(WizardEvent::LocationsLoaded(result));
        });
    }

    while !wizard.is_closed() {
        terminal.draw(|frame| {
            let area = frame.size();
            component.render(frame, area, wizard);
        })?;

        while let Ok(event) = rx.try_recv() {
            wizard.handle_event(event);
        }

        if !event::poll(tick_rate)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match component.handle_key(key, wizard) {
            Some(CheckoutAction::Submit) => {
                // Rejections are already stored on the wizard for display
                if let Ok(plan) = wizard.begin_submit() {
                    let api = api.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = plan.execute(api.as_ref()).await;
                        let _ = tx.send(WizardEvent::SubmissionFinished { plan, result });
                    });
                }
            }
            Some(CheckoutAction::Close) => wizard.close(),
            None => {}
        }
    }

    info!("Checkout event loop finished");
    Ok(())
}
