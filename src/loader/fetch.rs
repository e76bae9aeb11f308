use std::collections::HashMap;

use crate::foundation::core::{MediaKind, Quality, Timestamp};
use crate::foundation::error::{LoadFailureKind, MediaError, MediaResult};
use crate::foundation::ids::{LoadTicket, SlotId};

/// Everything a fetcher needs to start one load.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadRequest {
    /// Slot being loaded.
    pub slot: SlotId,
    /// Image or video.
    pub kind: MediaKind,
    /// URL to fetch.
    pub source: String,
    /// Quality variant (video only).
    pub quality: Option<Quality>,
    /// The media element must be reloaded after its source was rewritten (video only).
    pub reload: bool,
}

/// Completion signal for one load.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LoadOutcome {
    /// Content is ready (image decoded / video can play through).
    Loaded,
    /// The load failed.
    Failed {
        /// Failure classification.
        kind: LoadFailureKind,
        /// Detail for logs.
        message: String,
    },
}

impl LoadOutcome {
    /// Build a failed outcome.
    pub fn failed(kind: LoadFailureKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }
}

/// What a fetcher did with a start request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchStart {
    /// Running; completion arrives later through [`crate::MediaPipeline::complete`].
    Pending,
    /// Finished synchronously (cache hit, immediate rejection).
    Ready(LoadOutcome),
}

/// Seam between the pipeline and whatever actually downloads media.
///
/// `start` must not block: long loads return [`FetchStart::Pending`] and report back later.
pub trait MediaFetcher {
    /// Begin loading `request`, identified by `ticket`.
    fn start(&mut self, ticket: LoadTicket, request: &LoadRequest) -> MediaResult<FetchStart>;

    /// The load for `ticket` is no longer wanted. Fetchers that cannot abort may ignore this.
    fn cancel(&mut self, _ticket: LoadTicket) {}
}

#[derive(Clone, Debug)]
pub(crate) struct InFlight {
    pub(crate) ticket: LoadTicket,
    pub(crate) request: LoadRequest,
    pub(crate) deadline: Option<Timestamp>,
}

/// Tracks in-flight loads; at most one per slot.
#[derive(Debug, Default)]
pub(crate) struct LoadTracker {
    next_ticket: u64,
    by_slot: HashMap<SlotId, InFlight>,
    by_ticket: HashMap<LoadTicket, SlotId>,
}

impl LoadTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin(
        &mut self,
        request: LoadRequest,
        now: Timestamp,
        timeout_ms: Option<u64>,
    ) -> MediaResult<LoadTicket> {
        let slot = request.slot;
        if self.by_slot.contains_key(&slot) {
            return Err(MediaError::validation(format!(
                "{slot}: a load is already in flight"
            )));
        }
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.by_ticket.insert(ticket, slot);
        self.by_slot.insert(
            slot,
            InFlight {
                ticket,
                request,
                deadline: timeout_ms.map(|ms| now.after_ms(ms)),
            },
        );
        Ok(ticket)
    }

    /// Remove and return the load for `ticket`; `None` for unknown or already finished tickets.
    pub(crate) fn finish(&mut self, ticket: LoadTicket) -> Option<InFlight> {
        let slot = self.by_ticket.remove(&ticket)?;
        self.by_slot.remove(&slot)
    }

    pub(crate) fn cancel_slot(&mut self, slot: SlotId) -> Option<InFlight> {
        let inflight = self.by_slot.remove(&slot)?;
        self.by_ticket.remove(&inflight.ticket);
        Some(inflight)
    }

    /// Tickets whose deadline is at or before `now`, oldest ticket first.
    pub(crate) fn expired(&self, now: Timestamp) -> Vec<LoadTicket> {
        let mut out: Vec<LoadTicket> = self
            .by_slot
            .values()
            .filter(|f| f.deadline.is_some_and(|d| d <= now))
            .map(|f| f.ticket)
            .collect();
        out.sort_unstable();
        out
    }

    pub(crate) fn ticket_for(&self, slot: SlotId) -> Option<LoadTicket> {
        self.by_slot.get(&slot).map(|f| f.ticket)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_slot.len()
    }
}

/// Rules for [`ScriptedFetcher`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptedFetcherOpts {
    /// Complete synchronously instead of waiting for an explicit completion.
    pub immediate: bool,
    /// Sources containing any of these substrings fail synchronously with a network error.
    pub fail_matching: Vec<String>,
}

/// In-memory fetcher for tests, scenarios and debugging. Records every request and cancellation.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    opts: ScriptedFetcherOpts,
    started: Vec<(LoadTicket, LoadRequest)>,
    cancelled: Vec<LoadTicket>,
}

impl ScriptedFetcher {
    /// Fetcher that leaves every load pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher driven by `opts`.
    pub fn with_opts(opts: ScriptedFetcherOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Requests in start order.
    pub fn started(&self) -> &[(LoadTicket, LoadRequest)] {
        &self.started
    }

    /// Cancelled tickets in order.
    pub fn cancelled(&self) -> &[LoadTicket] {
        &self.cancelled
    }

    /// Ticket of the most recent request for `slot`.
    pub fn ticket_for(&self, slot: SlotId) -> Option<LoadTicket> {
        self.started
            .iter()
            .rev()
            .find(|(_, r)| r.slot == slot)
            .map(|(t, _)| *t)
    }
}

impl MediaFetcher for ScriptedFetcher {
    fn start(&mut self, ticket: LoadTicket, request: &LoadRequest) -> MediaResult<FetchStart> {
        self.started.push((ticket, request.clone()));
        if self
            .opts
            .fail_matching
            .iter()
            .any(|pat| request.source.contains(pat.as_str()))
        {
            return Ok(FetchStart::Ready(LoadOutcome::failed(
                LoadFailureKind::Network,
                format!("scripted failure for '{}'", request.source),
            )));
        }
        if self.opts.immediate {
            return Ok(FetchStart::Ready(LoadOutcome::Loaded));
        }
        Ok(FetchStart::Pending)
    }

    fn cancel(&mut self, ticket: LoadTicket) {
        self.cancelled.push(ticket);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/fetch.rs"]
mod tests;
