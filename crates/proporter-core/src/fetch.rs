// ── Fetch bookkeeping ──
//
// Every fetch a view issues gets a ticket. Results come back with the
// ticket attached and are committed only if the view is still waiting on
// that exact ticket, so a late answer for a view the user already left is
// dropped instead of overwriting newer state.

use std::fmt;

/// What a fetch is for. Compared together with the ticket id before a
/// result is committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    Listing { resource_type: String },
    Scan,
    Detail { resource_type: String, id: u64 },
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing { resource_type } => write!(f, "listing {resource_type}"),
            Self::Scan => f.write_str("instance scan"),
            Self::Detail { resource_type, id } => write!(f, "detail {resource_type}:{id}"),
        }
    }
}

/// A single issued request: monotonic id plus target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub id: u64,
    pub target: FetchTarget,
}

/// Monotonic ticket source. Never hands out the same id twice.
#[derive(Debug, Default)]
pub struct TicketCounter {
    last: u64,
}

impl TicketCounter {
    pub fn issue(&mut self, target: FetchTarget) -> RequestTicket {
        self.last += 1;
        RequestTicket {
            id: self.last,
            target,
        }
    }
}

/// Load state of one piece of view data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    /// Waiting on the ticket with this id.
    Loading { ticket: u64 },
    Loaded(T),
    /// Inline, retryable failure.
    Failed { message: String },
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// The id this slot is waiting on, if any.
    pub fn pending_ticket(&self) -> Option<u64> {
        match self {
            Self::Loading { ticket } => Some(*ticket),
            _ => None,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Commit `result` if this slot is waiting on `ticket_id`.
    ///
    /// Returns `false` (and leaves the slot untouched) for stale tickets.
    pub fn settle<E: fmt::Display>(&mut self, ticket_id: u64, result: Result<T, E>) -> bool {
        if self.pending_ticket() != Some(ticket_id) {
            return false;
        }
        *self = match result {
            Ok(v) => Self::Loaded(v),
            Err(e) => Self::Failed {
                message: e.to_string(),
            },
        };
        true
    }
}
