use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::address::{ReceiverInput, is_address};

/// Default pause before a typed name is looked up.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub type LookupSeq = u64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReceiverError {
    #[error("`{0}` is not a valid address")]
    Invalid(String),
    #[error("`{0}` could not be resolved to an address")]
    ResolutionFailed(String),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Name service unavailable: {0}")]
    Unavailable(String),
}

/// Name service, mapping human-readable names to addresses.
pub trait AddressResolver {
    /// `Ok(None)` when the name has no address.
    fn resolve(&mut self, name: &str) -> Result<Option<String>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub seq: LookupSeq,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Idle,
    Scheduled { request: LookupRequest, due: Instant },
    InFlight(LookupRequest),
}

/// Receiver field of the send form.
///
/// Literal addresses are validated on every keystroke. Names are looked up
/// once input pauses for the debounce interval; every keystroke supersedes
/// the previous lookup by bumping the sequence number, and a result is only
/// adopted when it answers the latest request.
#[derive(Debug)]
pub struct ReceiverField {
    debounce: Duration,
    input: String,
    resolved: Option<String>,
    using_name: bool,
    error: Option<ReceiverError>,
    lookup: Lookup,
    latest_seq: LookupSeq,
}

impl Default for ReceiverField {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl ReceiverField {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            input: String::new(),
            resolved: None,
            using_name: false,
            error: None,
            lookup: Lookup::Idle,
            latest_seq: 0,
        }
    }

    /// Text as typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Address a confirmed transfer goes to.
    pub fn resolved(&self) -> Option<&str> {
        self.resolved.as_deref()
    }

    pub fn error(&self) -> Option<&ReceiverError> {
        self.error.as_ref()
    }

    pub fn is_using_name(&self) -> bool {
        self.using_name
    }

    /// True from the moment a name is typed until its lookup settles.
    pub fn is_resolving(&self) -> bool {
        self.lookup != Lookup::Idle
    }

    /// When the pending lookup becomes due, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.lookup {
            Lookup::Scheduled { due, .. } => Some(*due),
            _ => None,
        }
    }

    pub fn update(&mut self, raw: &str, now: Instant) {
        self.input = raw.to_owned();
        self.latest_seq += 1;
        match ReceiverInput::classify(raw) {
            ReceiverInput::Name(name) => {
                debug!(seq = self.latest_seq, %name, "name lookup scheduled");
                self.using_name = true;
                self.resolved = None;
                self.error = None;
                self.lookup = Lookup::Scheduled {
                    request: LookupRequest {
                        seq: self.latest_seq,
                        name,
                    },
                    due: now + self.debounce,
                };
            }
            ReceiverInput::Literal(address) => {
                self.using_name = false;
                self.lookup = Lookup::Idle;
                if address.is_empty() {
                    self.error = None;
                    self.resolved = None;
                } else if is_address(&address) {
                    self.error = None;
                    self.resolved = Some(address);
                } else {
                    self.error = Some(ReceiverError::Invalid(address));
                    self.resolved = None;
                }
            }
        }
    }

    /// Hands out the scheduled lookup once its debounce interval elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<LookupRequest> {
        let request = match &self.lookup {
            Lookup::Scheduled { request, due } if *due <= now => request.clone(),
            _ => return None,
        };
        debug!(seq = request.seq, name = %request.name, "name lookup issued");
        self.lookup = Lookup::InFlight(request.clone());
        Some(request)
    }

    /// Applies a lookup result. Returns `false` when it answers a request
    /// that has been superseded since, in which case nothing changes.
    pub fn complete(&mut self, seq: LookupSeq, address: Option<String>) -> bool {
        let name = match &self.lookup {
            Lookup::InFlight(request) if request.seq == seq && seq == self.latest_seq => {
                request.name.clone()
            }
            _ => {
                debug!(seq, latest = self.latest_seq, "stale name lookup result discarded");
                return false;
            }
        };
        self.lookup = Lookup::Idle;
        match address.filter(|address| !address.is_empty()) {
            Some(address) => {
                debug!(%name, %address, "name resolved");
                self.resolved = Some(address);
                self.error = None;
            }
            None => {
                self.resolved = None;
                self.error = Some(ReceiverError::ResolutionFailed(name));
            }
        }
        true
    }

    /// Issues the due lookup, if any, against `resolver` and applies its
    /// result. Returns whether a result was adopted.
    pub fn drive<R>(&mut self, now: Instant, resolver: &mut R) -> bool
    where
        R: AddressResolver + ?Sized,
    {
        let Some(request) = self.poll(now) else {
            return false;
        };
        let address = match resolver.resolve(&request.name) {
            Ok(address) => address,
            Err(err) => {
                warn!(name = %request.name, "name lookup failed: {err}");
                None
            }
        };
        self.complete(request.seq, address)
    }

    /// Clears the field and abandons any pending or in-flight lookup.
    pub fn reset(&mut self) {
        self.latest_seq += 1;
        self.input.clear();
        self.resolved = None;
        self.using_name = false;
        self.error = None;
        self.lookup = Lookup::Idle;
    }
}
