//! Memoized, ticketed route parsing.
//!
//! A [`RouteSession`] owns the reference data and the last good route. Parse
//! requests are memoized by a hash of everything that shapes the output, one
//! entry per route kind, and every request is handed a ticket so that a slow,
//! older result can never overwrite a newer one.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use log::{debug, info, warn};

use exile_data::{ReferenceData, Route};
use exile_route::{ParseOptions, RouteError, RouteFile, parse_route, parse_voidstone_route};

/// Which route a request builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Act,
    /// The four voidstone files, run in this order.
    Voidstone { order: Vec<usize> },
}

/// Memo slot: the act route and the voidstone route are cached side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MemoSlot {
    Act,
    Voidstone,
}

impl RouteKind {
    fn slot(&self) -> MemoSlot {
        match self {
            RouteKind::Act => MemoSlot::Act,
            RouteKind::Voidstone { .. } => MemoSlot::Voidstone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteRequest {
    pub kind: RouteKind,
    pub files: Vec<RouteFile>,
    pub options: ParseOptions,
}

impl RouteRequest {
    pub fn act(files: Vec<RouteFile>, options: ParseOptions) -> Self {
        Self {
            kind: RouteKind::Act,
            files,
            options,
        }
    }

    pub fn voidstone(files: Vec<RouteFile>, order: Vec<usize>, options: ParseOptions) -> Self {
        Self {
            kind: RouteKind::Voidstone { order },
            files,
            options,
        }
    }

    /// Memo key over sources, order, defines, class and gems.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn run(&self, reference: &ReferenceData) -> Result<Route, RouteError> {
        match &self.kind {
            RouteKind::Act => parse_route(&self.files, reference, &self.options),
            RouteKind::Voidstone { order } => {
                parse_voidstone_route(&self.files, order, reference, &self.options.defines)
            },
        }
    }
}

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    Ready(Arc<Route>),
    /// Reference data has not been installed yet.
    Pending,
    Failed(RouteError),
}

#[derive(Debug, Default)]
pub struct RouteSession {
    reference: Option<Arc<ReferenceData>>,
    /// Latest `(fingerprint, result)` per route kind.
    memo: HashMap<MemoSlot, (u64, Result<Arc<Route>, RouteError>)>,
    next_ticket: Ticket,
    accepted: Option<Ticket>,
    current: Option<Arc<Route>>,
    last_error: Option<RouteError>,
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the reference data. Memoized results are dropped
    /// because they were resolved against the old tables.
    pub fn install_reference(&mut self, reference: ReferenceData) {
        info!(
            "reference data installed: {} area(s), {} quest(s), {} gem(s)",
            reference.areas.len(),
            reference.quests.len(),
            reference.gems.len()
        );
        self.reference = Some(Arc::new(reference));
        self.memo.clear();
    }

    pub fn reference(&self) -> Option<&ReferenceData> {
        self.reference.as_deref()
    }

    /// Parse `request`, or return the memoized result for an identical one.
    /// Only the latest request of each route kind is remembered.
    ///
    /// The returned ticket orders this result against other requests; hand
    /// both back to [`RouteSession::accept`].
    pub fn try_parse(&mut self, request: &RouteRequest) -> (Ticket, ParseStatus) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let Some(reference) = self.reference.clone() else {
            debug!("ticket {ticket}: reference data not installed, parse pending");
            return (ticket, ParseStatus::Pending);
        };
        let key = request.fingerprint();
        let slot = request.kind.slot();
        let result = match self.memo.get(&slot) {
            Some((cached, result)) if *cached == key => result.clone(),
            _ => {
                debug!("ticket {ticket}: parsing {} file(s)", request.files.len());
                let result = request.run(&reference).map(Arc::new);
                self.memo.insert(slot, (key, result.clone()));
                result
            },
        };
        let status = match result {
            Ok(route) => ParseStatus::Ready(route),
            Err(err) => ParseStatus::Failed(err),
        };
        (ticket, status)
    }

    /// Adopt a parse result unless a newer ticket was already accepted.
    ///
    /// Returns whether the result was taken. A failure is recorded but never
    /// replaces the last good route. Pending results are ignored.
    pub fn accept(&mut self, ticket: Ticket, status: ParseStatus) -> bool {
        if self.accepted.is_some_and(|latest| latest >= ticket) {
            debug!("ticket {ticket} is stale, ignoring");
            return false;
        }
        match status {
            ParseStatus::Pending => return false,
            ParseStatus::Ready(route) => {
                self.current = Some(route);
                self.last_error = None;
            },
            ParseStatus::Failed(err) => {
                warn!("route parse failed: {err}");
                self.last_error = Some(err);
            },
        }
        self.accepted = Some(ticket);
        true
    }

    /// Last successfully parsed route.
    pub fn current(&self) -> Option<Arc<Route>> {
        self.current.clone()
    }

    pub fn last_error(&self) -> Option<&RouteError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exile_route::RouteErrorKind;

    fn request(body: &str) -> RouteRequest {
        RouteRequest::act(vec![RouteFile::new("act_1.txt", body)], ParseOptions::default())
    }

    #[test]
    fn parse_is_pending_until_reference_is_installed() {
        let mut session = RouteSession::new();
        let (ticket, status) = session.try_parse(&request("#Act 1\nHello\n"));
        assert_eq!(status, ParseStatus::Pending);
        assert!(!session.accept(ticket, status));
        assert!(session.current().is_none());

        session.install_reference(ReferenceData::default());
        let (ticket, status) = session.try_parse(&request("#Act 1\nHello\n"));
        assert!(matches!(status, ParseStatus::Ready(_)));
        assert!(session.accept(ticket, status));
        assert_eq!(session.current().map(|r| r.len()), Some(1));
    }

    #[test]
    fn identical_requests_share_a_result() {
        let mut session = RouteSession::new();
        session.install_reference(ReferenceData::default());
        let (_, first) = session.try_parse(&request("#Act 1\nHello\n"));
        let (_, second) = session.try_parse(&request("#Act 1\nHello\n"));
        match (first, second) {
            (ParseStatus::Ready(a), ParseStatus::Ready(b)) => assert!(Arc::ptr_eq(&a, &b)),
            other => panic!("expected two ready results, got {other:?}"),
        }
        let mut with_define = request("#Act 1\nHello\n");
        with_define.options.defines.insert("LEAGUE_START".into());
        assert_ne!(with_define.fingerprint(), request("#Act 1\nHello\n").fingerprint());
    }

    #[test]
    fn memo_keeps_only_the_latest_request_per_kind() {
        let mut session = RouteSession::new();
        session.install_reference(ReferenceData::default());
        let (_, first) = session.try_parse(&request("#Act 1\nfirst\n"));
        for i in 0..5 {
            session.try_parse(&request(&format!("#Act 1\nedit {i}\n")));
        }
        let voidstone = RouteRequest::voidstone(
            vec![RouteFile::new("1_eater.txt", "#Eater\n")],
            vec![0, 1, 2, 3],
            ParseOptions::default(),
        );
        let (_, failed) = session.try_parse(&voidstone);
        assert!(matches!(failed, ParseStatus::Failed(_)));
        assert_eq!(session.memo.len(), 2);

        let (_, again) = session.try_parse(&request("#Act 1\nfirst\n"));
        match (first, again) {
            (ParseStatus::Ready(a), ParseStatus::Ready(b)) => {
                assert_eq!(a, b);
                assert!(!Arc::ptr_eq(&a, &b));
            },
            other => panic!("expected two ready results, got {other:?}"),
        }
        assert_eq!(session.memo.len(), 2);
    }

    #[test]
    fn older_tickets_lose() {
        let mut session = RouteSession::new();
        session.install_reference(ReferenceData::default());
        let (old, old_status) = session.try_parse(&request("#Old\nfirst\n"));
        let (new, new_status) = session.try_parse(&request("#New\nsecond\n"));
        assert!(session.accept(new, new_status));
        assert!(!session.accept(old, old_status));
        let current = session.current().unwrap();
        assert_eq!(current[0].name, "New");
    }

    #[test]
    fn failure_keeps_the_last_good_route() {
        let mut session = RouteSession::new();
        session.install_reference(ReferenceData::default());
        let (t, status) = session.try_parse(&request("#Act 1\nHello\n"));
        session.accept(t, status);
        let (t, status) = session.try_parse(&request("#Act 1\n{area|nowhere}\n"));
        assert!(matches!(status, ParseStatus::Failed(_)));
        assert!(session.accept(t, status));
        assert_eq!(session.current().unwrap()[0].name, "Act 1");
        assert!(matches!(
            session.last_error().map(|e| &e.kind),
            Some(RouteErrorKind::UnknownArea(_))
        ));
    }
}
