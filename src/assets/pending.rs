use std::collections::HashMap;

use crate::foundation::ids::LayerId;

/// What an in-flight operation will change when it resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpTarget {
    BaseImage,
    Layer(LayerId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    CropUpload,
    BackgroundRemoval,
    ShapeRaster,
    ImageLoad,
}

/// Handle for one asynchronous request. Returned to the caller at issue time and handed back
/// with the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpTicket {
    pub kind: OpKind,
    pub target: OpTarget,
    generation: u64,
}

impl OpTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Debug)]
struct InFlight<P> {
    ticket: OpTicket,
    payload: P,
}

/// In-flight asynchronous operations, at most one per target.
///
/// Issuing a request for a target supersedes whatever was in flight for it: the latest request
/// wins and the older ticket becomes stale. `payload` carries whatever the caller needs to apply
/// the result (e.g. the planned crop geometry).
#[derive(Clone, Debug)]
pub struct PendingOps<P> {
    in_flight: HashMap<OpTarget, InFlight<P>>,
    next_generation: u64,
}

impl<P> Default for PendingOps<P> {
    fn default() -> Self {
        Self {
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }
}

impl<P> PendingOps<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Register a request, superseding any earlier one on the same target.
    pub fn issue(&mut self, kind: OpKind, target: OpTarget, payload: P) -> OpTicket {
        self.next_generation += 1;
        let ticket = OpTicket {
            kind,
            target,
            generation: self.next_generation,
        };
        if let Some(prev) = self.in_flight.insert(target, InFlight { ticket, payload }) {
            tracing::debug!(
                ?target,
                superseded = ?prev.ticket.kind,
                by = ?kind,
                "pending operation superseded"
            );
        }
        ticket
    }

    /// Whether `ticket` is still the latest request for its target.
    pub fn is_current(&self, ticket: &OpTicket) -> bool {
        self.in_flight
            .get(&ticket.target)
            .is_some_and(|f| f.ticket == *ticket)
    }

    /// Kind of the request in flight for `target`.
    pub fn in_flight(&self, target: OpTarget) -> Option<OpKind> {
        self.in_flight.get(&target).map(|f| f.ticket.kind)
    }

    pub fn payload(&self, ticket: &OpTicket) -> Option<&P> {
        self.in_flight
            .get(&ticket.target)
            .filter(|f| f.ticket == *ticket)
            .map(|f| &f.payload)
    }

    /// Retire `ticket`, returning its payload when it was still current. A stale ticket yields
    /// `None` and leaves the newer request in place.
    pub fn resolve(&mut self, ticket: &OpTicket) -> Option<P> {
        if !self.is_current(ticket) {
            return None;
        }
        self.in_flight.remove(&ticket.target).map(|f| f.payload)
    }

    /// Drop whatever is in flight for `target`; its result will be ignored when it arrives.
    pub fn forget(&mut self, target: OpTarget) -> Option<OpKind> {
        self.in_flight.remove(&target).map(|f| f.ticket.kind)
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/pending.rs"]
mod tests;
