//! Debounced Eircode lookups for the search input.
//!
//! Each keystroke restarts a 1000ms timer; the lookup fires only once the
//! normalized input has at least 6 characters and typing has paused. A lookup
//! that is already in flight is not cancelled, but its result is dropped
//! unless it belongs to the most recent keystroke.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use log::{debug, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use crate::address::{AddressResolver, ResolutionError, ResolvedAddress};
use crate::eircode::{self, EircodeError, EIRCODE_LEN};
use crate::form::BookingForm;

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);
/// Shorter input never triggers a lookup.
pub const MIN_LOOKUP_LEN: usize = 6;

/// Something that turns an Eircode into an address.
pub trait EircodeLookup: Send + Sync + 'static {
    fn lookup(&self, eircode: String) -> impl Future<Output = Result<ResolvedAddress, ResolutionError>> + Send;
}

impl EircodeLookup for AddressResolver {
    async fn lookup(&self, eircode: String) -> Result<ResolvedAddress, ResolutionError> {
        self.resolve_by_eircode(&eircode).await
    }
}

/// Handle proving which request a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic request counter; only the latest ticket may write results.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

/// What a keystroke did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Input emptied; the current location was cleared.
    Cleared,
    /// Too short to look up yet.
    Waiting,
    /// Complete but invalid; the error is already on the form.
    Rejected(EircodeError),
    /// A lookup will fire after the debounce delay.
    Scheduled,
}

/// Owns the debounce timer for one form's Eircode input.
pub struct EircodeWatcher<L> {
    lookup: Arc<L>,
    form: Arc<Mutex<BookingForm>>,
    sequence: Arc<RequestSequence>,
    pending: Option<JoinHandle<()>>,
    delay: Duration,
}

impl<L: EircodeLookup> EircodeWatcher<L> {
    pub fn new(lookup: Arc<L>, form: Arc<Mutex<BookingForm>>) -> Self {
        Self {
            lookup,
            form,
            sequence: Arc::new(RequestSequence::default()),
            pending: None,
            delay: DEBOUNCE_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn form(&self) -> &Arc<Mutex<BookingForm>> {
        &self.form
    }

    /// Handle one change of the Eircode input.
    pub async fn on_input(&mut self, raw: &str) -> InputOutcome {
        self.cancel_pending();
        let ticket = self.sequence.issue();
        let code = eircode::normalize(raw);
        let entered = code.chars().count();

        let mut form = self.form.lock().await;
        form.eircode = raw.to_string();
        form.status.eircode_error = None;
        form.status.loading_eircode = false;

        if raw.is_empty() {
            form.clear_current_location();
            return InputOutcome::Cleared;
        }
        if entered < MIN_LOOKUP_LEN {
            return InputOutcome::Waiting;
        }
        if entered >= EIRCODE_LEN {
            if let Err(e) = eircode::validate(&code) {
                debug!("rejecting [{code}] without a lookup: {e}");
                form.status.eircode_error = Some(e.to_string());
                return InputOutcome::Rejected(e);
            }
        }
        drop(form);

        let lookup = self.lookup.clone();
        let form = self.form.clone();
        let sequence = self.sequence.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // detached: later keystrokes only abort the timer, not the request
            tokio::spawn(run_lookup(lookup, form, sequence, ticket, code));
        }));
        InputOutcome::Scheduled
    }

    /// Drop the scheduled lookup, if its timer has not fired yet.
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl<L> Drop for EircodeWatcher<L> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

async fn run_lookup<L: EircodeLookup>(
    lookup: Arc<L>,
    form: Arc<Mutex<BookingForm>>,
    sequence: Arc<RequestSequence>,
    ticket: Ticket,
    code: String,
) {
    {
        let mut form = form.lock().await;
        if !sequence.is_latest(ticket) {
            return;
        }
        form.status.loading_eircode = true;
    }

    let result = lookup.lookup(code.clone()).await;

    let mut form = form.lock().await;
    if !sequence.is_latest(ticket) {
        info!("discarding stale lookup result for [{code}]");
        return;
    }
    form.status.loading_eircode = false;
    match result {
        Ok(resolved) => {
            info!("[{code}] resolved by {}", resolved.source);
            form.apply_eircode_address(&resolved.address);
        }
        Err(e) => form.status.eircode_error = Some(e.to_string()),
    }
}
