// ABOUTME: Terminal view for the checkout wizard
// Renders the active step and maps key presses onto wizard operations

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::state::{CheckoutStep, CustomerField};
use super::wizard::CheckoutWizard;

const ACCENT_BLUE: Color = Color::Rgb(100, 149, 237);
const GOLD: Color = Color::Rgb(255, 215, 0);
const DONE_GREEN: Color = Color::Rgb(100, 200, 100);
const DARK_BG: Color = Color::Rgb(25, 25, 35);
const PANEL_BG: Color = Color::Rgb(30, 30, 40);
const SOFT_WHITE: Color = Color::Rgb(220, 220, 230);
const MUTED_GRAY: Color = Color::Rgb(120, 120, 140);
const SUBDUED_BORDER: Color = Color::Rgb(60, 60, 80);
const ERROR_RED: Color = Color::Rgb(220, 80, 80);

/// Actions the host has to carry out on behalf of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutAction {
    /// Start a submission (begin_submit + send)
    Submit,
    /// Close the wizard
    Close,
}

/// View state that does not belong to the wizard itself
#[derive(Debug)]
pub struct CheckoutComponent {
    field_focus: CustomerField,
}

impl CheckoutComponent {
    pub fn new() -> Self {
        Self {
            field_focus: CustomerField::Name,
        }
    }

    pub fn field_focus(&self) -> CustomerField {
        self.field_focus
    }

    /// Apply a key press to the wizard
    pub fn handle_key(&mut self, key: KeyEvent, wizard: &mut CheckoutWizard) -> Option<CheckoutAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(CheckoutAction::Close);
        }

        if key.code == KeyCode::Esc {
            // The backend's answer must still land while a submission is in flight
            if wizard.state().is_submitting {
                return None;
            }
            if wizard.current_step() == CheckoutStep::Success || !wizard.can_go_back() {
                return Some(CheckoutAction::Close);
            }
            wizard.retreat();
            return None;
        }

        match wizard.current_step() {
            CheckoutStep::CustomerInfo => self.handle_customer_key(key, wizard),
            CheckoutStep::PickupLocation => Self::handle_pickup_key(key, wizard),
            CheckoutStep::Review => Self::handle_review_key(key, wizard),
            CheckoutStep::Success => {
                (key.code == KeyCode::Enter).then_some(CheckoutAction::Close)
            }
        }
    }

    fn handle_customer_key(&mut self, key: KeyEvent, wizard: &mut CheckoutWizard) -> Option<CheckoutAction> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.field_focus = self.field_focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.field_focus = self.field_focus.previous(),
            KeyCode::Enter => {
                wizard.advance();
            }
            KeyCode::Backspace => {
                let mut value = wizard.state().customer_info.get(self.field_focus).to_string();
                value.pop();
                wizard.set_customer_field(self.field_focus, &value);
            }
            KeyCode::Char(c) if Self::is_text_input(key) => {
                let mut value = wizard.state().customer_info.get(self.field_focus).to_string();
                value.push(c);
                wizard.set_customer_field(self.field_focus, &value);
            }
            _ => {}
        }
        None
    }

    fn handle_pickup_key(key: KeyEvent, wizard: &mut CheckoutWizard) -> Option<CheckoutAction> {
        let count = wizard.state().locations.len();
        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Char('k' | 'j') if count > 0 => {
                let current = Self::selected_index(wizard);
                let next = match (key.code, current) {
                    (KeyCode::Up | KeyCode::Char('k'), Some(idx)) => idx.checked_sub(1).unwrap_or(count - 1),
                    (KeyCode::Up | KeyCode::Char('k'), None) => count - 1,
                    (_, Some(idx)) => (idx + 1) % count,
                    (_, None) => 0,
                };
                let id = wizard.state().locations[next].id.clone();
                let _ = wizard.select_pickup(&id);
            }
            KeyCode::Enter => {
                wizard.advance();
            }
            _ => {}
        }
        None
    }

    fn handle_review_key(key: KeyEvent, wizard: &mut CheckoutWizard) -> Option<CheckoutAction> {
        match key.code {
            KeyCode::Enter => return Some(CheckoutAction::Submit),
            KeyCode::Backspace => {
                let mut notes = wizard.state().notes.clone();
                notes.pop();
                wizard.set_notes(&notes);
            }
            KeyCode::Char(c) if Self::is_text_input(key) => {
                let mut notes = wizard.state().notes.clone();
                notes.push(c);
                wizard.set_notes(&notes);
            }
            _ => {}
        }
        None
    }

    fn is_text_input(key: KeyEvent) -> bool {
        key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT
    }

    fn selected_index(wizard: &CheckoutWizard) -> Option<usize> {
        let selected = wizard.state().pickup_selection.as_deref()?;
        wizard.state().locations.iter().position(|l| l.id == selected)
    }

    /// Main render function
    pub fn render(&self, frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(DARK_BG)), area);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header with progress
                Constraint::Min(10),   // Step content
                Constraint::Length(1), // Error line
                Constraint::Length(2), // Navigation footer
            ])
            .split(area);

        Self::render_header(frame, layout[0], wizard);
        match wizard.current_step() {
            CheckoutStep::CustomerInfo => self.render_customer_info(frame, layout[1], wizard),
            CheckoutStep::PickupLocation => Self::render_pickup(frame, layout[1], wizard),
            CheckoutStep::Review => Self::render_review(frame, layout[1], wizard),
            CheckoutStep::Success => Self::render_success(frame, layout[1]),
        }
        Self::render_error(frame, layout[2], wizard);
        Self::render_navigation(frame, layout[3], wizard);
    }

    fn render_header(frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(ACCENT_BLUE))
            .style(Style::default().bg(PANEL_BG));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let title = if wizard.context().is_edit() { "Edit Order" } else { "Checkout" };
        let current = wizard.current_step();
        let current_number = wizard.sequence().number(current);
        let finished = current == CheckoutStep::Success;

        let mut spans = Vec::new();
        for (idx, step) in wizard.sequence().steps().iter().enumerate() {
            let number = idx + 1;
            let (icon, style) = if finished || number < current_number {
                ("●", Style::default().fg(DONE_GREEN))
            } else if number == current_number {
                ("◉", Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
            } else {
                ("○", Style::default().fg(MUTED_GRAY))
            };
            if idx > 0 {
                spans.push(Span::styled(" → ", Style::default().fg(SUBDUED_BORDER)));
            }
            spans.push(Span::styled(format!("{icon} "), style));
            spans.push(Span::styled(step.title(), style));
        }

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
            )),
            Line::from(spans),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(header, inner);
    }

    fn step_block(step: CheckoutStep) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT_BLUE))
            .style(Style::default().bg(PANEL_BG))
            .title(format!(" {} ", step.title()))
            .title_style(Style::default().fg(GOLD).add_modifier(Modifier::BOLD))
    }

    fn render_customer_info(&self, frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        let block = Self::step_block(CheckoutStep::CustomerInfo);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::from(Span::styled(
                CheckoutStep::CustomerInfo.description(),
                Style::default().fg(MUTED_GRAY),
            )),
            Line::from(""),
        ];

        for field in CustomerField::all() {
            let focused = *field == self.field_focus;
            let value = wizard.state().customer_info.get(*field);
            let cursor = if focused { "│" } else { "" };
            lines.push(Line::from(vec![
                Span::styled(
                    if focused { "▶ " } else { "  " },
                    Style::default().fg(GOLD),
                ),
                Span::styled(
                    format!("{:<18}", field.label()),
                    if focused {
                        Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(MUTED_GRAY)
                    },
                ),
                Span::styled(format!("{value}{cursor}"), Style::default().fg(SOFT_WHITE)),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_pickup(frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        let block = Self::step_block(CheckoutStep::PickupLocation);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let state = wizard.state();
        if state.is_loading_locations {
            let loading = Paragraph::new(Span::styled("Loading locations...", Style::default().fg(GOLD)))
                .alignment(Alignment::Center);
            frame.render_widget(loading, inner);
            return;
        }

        if state.locations.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "No pickup locations available",
                Style::default().fg(MUTED_GRAY),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }

        let items: Vec<ListItem> = state
            .locations
            .iter()
            .map(|location| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        location.name.clone(),
                        Style::default().fg(SOFT_WHITE).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("    {}, {}", location.street_address, location.city),
                        Style::default().fg(MUTED_GRAY),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .highlight_symbol("▶ ")
            .highlight_style(Style::default().fg(DONE_GREEN));
        let mut list_state = ListState::default().with_selected(Self::selected_index(wizard));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn render_review(frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        let block = Self::step_block(CheckoutStep::Review);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let summary = wizard.review_summary();
        let mut lines = Vec::new();

        for line in &summary.lines {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>3} × ", line.quantity), Style::default().fg(MUTED_GRAY)),
                Span::styled(format!("{:<30}", line.name), Style::default().fg(SOFT_WHITE)),
                Span::styled(format!("{:>10.2}", line.line_total), Style::default().fg(SOFT_WHITE)),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{:<36}", "Total"), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
            Span::styled(format!("{:>10.2}", summary.total), Style::default().fg(GOLD).add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(""));

        if let Some(pickup) = &summary.pickup {
            lines.push(Line::from(vec![
                Span::styled("Pickup: ", Style::default().fg(MUTED_GRAY)),
                Span::styled(
                    format!("{} ({}, {})", pickup.name, pickup.street_address, pickup.city),
                    Style::default().fg(SOFT_WHITE),
                ),
            ]));
        }

        if let Some(customer) = &summary.customer {
            lines.push(Line::from(vec![
                Span::styled("Customer: ", Style::default().fg(MUTED_GRAY)),
                Span::styled(
                    format!(
                        "{}, {}, {}, {}",
                        customer.name.trim(),
                        customer.phone,
                        customer.street_address.trim(),
                        customer.city.trim()
                    ),
                    Style::default().fg(SOFT_WHITE),
                ),
            ]));
        }

        lines.push(Line::from(vec![
            Span::styled("Notes: ", Style::default().fg(MUTED_GRAY)),
            Span::styled(format!("{}│", wizard.state().notes), Style::default().fg(SOFT_WHITE)),
        ]));

        if wizard.state().is_submitting {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Submitting...", Style::default().fg(GOLD))));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_success(frame: &mut Frame, area: Rect) {
        let block = Self::step_block(CheckoutStep::Success);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let done = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                CheckoutStep::Success.description(),
                Style::default().fg(DONE_GREEN).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Press Enter to close", Style::default().fg(MUTED_GRAY))),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(done, inner);
    }

    fn render_error(frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        if let Some(message) = wizard.error_message() {
            let error = Paragraph::new(Span::styled(message, Style::default().fg(ERROR_RED)))
                .alignment(Alignment::Center);
            frame.render_widget(error, area);
        }
    }

    fn render_navigation(frame: &mut Frame, area: Rect, wizard: &CheckoutWizard) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(GOLD));
        let label = |l: &'static str| Span::styled(l, Style::default().fg(MUTED_GRAY));
        let sep = || Span::styled("  |  ", Style::default().fg(SUBDUED_BORDER));

        let enter_label = match wizard.current_step() {
            CheckoutStep::Review => " Submit",
            CheckoutStep::Success => " Close",
            CheckoutStep::CustomerInfo | CheckoutStep::PickupLocation => " Next",
        };
        let esc_label = if wizard.can_go_back() { " Back" } else { " Cancel" };

        let nav = Paragraph::new(Line::from(vec![
            key("[Enter]"),
            label(enter_label),
            sep(),
            key("[Esc]"),
            label(esc_label),
            sep(),
            key("[Ctrl-C]"),
            label(" Quit"),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(SUBDUED_BORDER)),
        );
        frame.render_widget(nav, area);
    }
}

impl Default for CheckoutComponent {
    fn default() -> Self {
        Self::new()
    }
}
