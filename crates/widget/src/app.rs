use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use claim_core::constants::QUANTITY_DEBOUNCE;
use claim_core::debounce::Debounced;
use claim_core::quantity::{clamp, Step};
use claim_core::{
    ConfigError, DropSdk, DropState, Eligibility, EligibilityState, Notification, Query, SdkError, Update,
    WidgetConfig, WidgetView,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;

use crate::ui;
use crate::worker::{Request, Response, Worker};

/// Event poll interval; worker responses are drained once per tick.
const TICK: Duration = Duration::from_millis(100);

const MAX_LOG_LINES: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Widget,
    Confirm,
}

pub struct Toast {
    pub notification: Notification,
    pub expires_at: Instant,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub config: Result<WidgetConfig, ConfigError>,
    worker: Option<Worker>,
    pub state: DropState,
    pub quantity: u32,
    debounce: Debounced<u32>,
    pub screen: Screen,
    pub toast: Option<Toast>,
    /// A claim is with the worker.
    pub claiming: bool,
    /// Requests sent to the worker and not yet answered.
    pub in_flight: usize,
    pub should_quit: bool,
    pub message_log: Vec<String>,
    pub verbose: bool,
    pub last_refresh: Option<Instant>,
}

impl App {
    /// `sdk` is `None` when there is nothing to talk to (no contract, or a
    /// bad configuration); the shell then only renders the static state.
    pub fn new(config: Result<WidgetConfig, ConfigError>, sdk: Option<Box<dyn DropSdk>>, verbose: bool) -> Self {
        let mut state = DropState::default();
        let worker = match (&config, sdk) {
            (Ok(config), Some(sdk)) => {
                state.wallet = sdk.wallet_address();
                Some(Worker::spawn(sdk, config.token_id.clone()))
            }
            _ => None,
        };

        let mut app = Self {
            config,
            worker,
            state,
            quantity: 1,
            debounce: Debounced::new(1, QUANTITY_DEBOUNCE),
            screen: Screen::Widget,
            toast: None,
            claiming: false,
            in_flight: 0,
            should_quit: false,
            message_log: Vec::new(),
            verbose,
            last_refresh: None,
        };

        app.push_log("Welcome to the drop claim widget");
        match &app.config {
            Ok(config) => {
                let line = match &config.contract {
                    Some(contract) => format!(
                        "Contract: {} | Token #{} | {}",
                        contract, config.token_id, config.chain.name
                    ),
                    None => "No contract address provided".to_string(),
                };
                app.push_log(line);
            }
            Err(e) => {
                let line = format!("Configuration error: {e}");
                app.push_log(line);
            }
        }
        if let Some(wallet) = app.state.wallet.clone() {
            app.push_log(format!("Wallet: {wallet}"));
        }
        app.refresh();
        app
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.verbose {
            eprintln!("[INFO] {}", msg);
        }
        self.message_log.push(msg);
        if self.message_log.len() > MAX_LOG_LINES {
            self.message_log.remove(0);
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            self.tick(Instant::now());
            terminal.draw(|frame| ui::draw(frame, self))?;

            if !event::poll(TICK)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    self.should_quit = true;
                    continue;
                }
                self.handle_key(key.code, Instant::now());
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode, now: Instant) {
        match self.screen {
            Screen::Widget => self.handle_widget(key, now),
            Screen::Confirm => self.handle_confirm(key),
        }
    }

    /// What the terminal should show right now.
    pub fn view(&self) -> WidgetView {
        match &self.config {
            Ok(config) => WidgetView::derive(config, &self.state, self.quantity, unix_now()),
            Err(e) => WidgetView::config_error(e),
        }
    }

    pub fn eligibility(&self) -> Eligibility {
        self.state.eligibility(self.quantity, unix_now())
    }

    // -----------------------------------------------------------------------
    // Worker traffic
    // -----------------------------------------------------------------------

    /// Re-runs every query for the current wallet and quantity.
    pub fn refresh(&mut self) {
        if self.worker.is_none() {
            return;
        }
        for query in Query::initial(self.state.wallet_connected(), self.quantity) {
            self.run_query(query);
        }
        self.last_refresh = Some(Instant::now());
    }

    fn run_query(&mut self, query: Query) {
        self.state.begin(query);
        self.send(Request::Run(query));
    }

    fn send(&mut self, request: Request) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        if worker.send(request) {
            self.in_flight += 1;
            true
        } else {
            self.push_log("Background worker stopped; restart the widget.");
            false
        }
    }

    /// Drains worker responses, fires the debounced quantity query and expires
    /// the toast.
    pub fn tick(&mut self, now: Instant) {
        let responses = self.worker.as_ref().map(Worker::drain).unwrap_or_default();
        for response in responses {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.handle_response(response);
        }

        if let Some(quantity) = self.debounce.poll(now) {
            if self.state.wallet_connected() {
                self.run_query(Query::Ineligibility { quantity });
            }
        }

        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
    }

    fn handle_response(&mut self, response: Response) {
        match response {
            Response::Update(update) => {
                if let Some(err) = update_error(&update) {
                    tracing::warn!(error = %err, "query failed");
                    let line = format!("Query failed: {err}");
                    self.push_log(line);
                }
                self.state.apply(update);
            }
            Response::Connected(Ok(address)) => {
                self.push_log(format!("Wallet connected: {address}"));
                for query in self.state.connect(address, self.quantity) {
                    self.run_query(query);
                }
            }
            Response::Connected(Err(e)) => {
                tracing::warn!(error = %e, "wallet connection failed");
                self.push_log(format!("Wallet connection failed: {e}"));
            }
            Response::Claimed { quantity, notification } => {
                self.claiming = false;
                match notification {
                    Some(notification) => self.finish_claim(quantity, notification),
                    None => self.push_log("Claim refused: the drop cannot be minted right now."),
                }
            }
        }
    }

    fn finish_claim(&mut self, quantity: u32, notification: Notification) {
        if notification.is_success() {
            let tx = notification.tx_hash.clone().unwrap_or_default();
            self.push_log(format!("Minted {quantity}: {tx}"));
            for query in Query::after_claim(self.quantity) {
                self.run_query(query);
            }
        } else if notification.description.is_empty() {
            self.push_log(notification.title.clone());
        } else {
            let line = format!("{}: {}", notification.title, notification.description);
            self.push_log(line);
        }
        self.toast = Some(Toast {
            expires_at: Instant::now() + notification.duration,
            notification,
        });
    }

    // -----------------------------------------------------------------------
    // Widget handler
    // -----------------------------------------------------------------------

    fn handle_widget(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => {
                self.push_log("Refreshing...");
                self.refresh();
            }
            KeyCode::Esc => self.toast = None,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.step(Step::Increment, now),
            KeyCode::Char('-') | KeyCode::Left => self.step(Step::Decrement, now),
            KeyCode::Enter | KeyCode::Char('m') => self.activate(),
            _ => {}
        }
    }

    pub fn step(&mut self, step: Step, now: Instant) {
        if self.worker.is_none() {
            return;
        }
        let eligibility = self.eligibility();
        if eligibility.is_sold_out || eligibility.state.is_terminal() {
            return;
        }
        let next = clamp(self.quantity, step, eligibility.max_claimable);
        if next != self.quantity {
            self.quantity = next;
            self.debounce.set(next, now);
        }
    }

    /// The action button: connects a wallet, or opens the mint confirmation.
    fn activate(&mut self) {
        if self.worker.is_none() || self.claiming {
            return;
        }
        let eligibility = self.eligibility();
        if eligibility.state == EligibilityState::ConnectWallet {
            if self.send(Request::Connect) {
                self.push_log("Connecting wallet...");
            }
        } else if eligibility.button_disabled() {
            self.push_log(format!("Cannot mint: {}", eligibility.button_text));
        } else {
            self.screen = Screen::Confirm;
        }
    }

    // -----------------------------------------------------------------------
    // Confirm handler
    // -----------------------------------------------------------------------

    fn handle_confirm(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.screen = Screen::Widget;
                let quantity = self.quantity;
                let eligibility = self.eligibility();
                if self.send(Request::Claim { quantity, eligibility }) {
                    self.claiming = true;
                    self.push_log(format!("Submitting claim for {quantity}..."));
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.screen = Screen::Widget;
                self.push_log("Mint cancelled.");
            }
            _ => {}
        }
    }
}

fn update_error(update: &Update) -> Option<&SdkError> {
    match update {
        Update::ContractMetadata(Err(e))
        | Update::TokenMetadata(Err(e))
        | Update::ClaimedSupply(Err(e))
        | Update::ClaimConditions(Err(e))
        | Update::ActiveCondition(Err(e))
        | Update::ClaimerProof(Err(e)) => Some(e),
        Update::Ineligibility { result: Err(e), .. } => Some(e),
        _ => None,
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}..{}", &address[..6], &address[address.len() - 4..])
}
