// ABOUTME: Route guard gating protected pages on the resolved session state.
// ABOUTME: Loading renders nothing, Authenticated renders the page, Unauthenticated redirects to "/".

use crate::route::Route;
use crate::session::{SessionState, SessionStore};

/// Guard view of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Authenticated,
    Unauthenticated,
}

impl From<&SessionState> for GuardState {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Loading => GuardState::Loading,
            SessionState::Authenticated(_) => GuardState::Authenticated,
            SessionState::Unauthenticated => GuardState::Unauthenticated,
        }
    }
}

/// What to do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving; render nothing yet.
    Wait,
    Render(Route),
    Redirect(Route),
}

/// Gates protected routes on the session it was given.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn state(&self) -> GuardState {
        GuardState::from(&self.session.state())
    }

    /// Decide immediately from the current session state.
    pub fn check(&self, route: Route) -> GuardDecision {
        decide(route, self.state())
    }

    /// Wait for the session to resolve, then decide. Never yields `Wait`.
    pub async fn resolve(&self, route: Route) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::Render(route);
        }
        let state = self.session.resolved().await;
        let decision = decide(route, GuardState::from(&state));
        if let GuardDecision::Redirect(to) = decision {
            tracing::info!(from = %route, to = %to, "not signed in; redirecting");
        }
        decision
    }
}

fn decide(route: Route, state: GuardState) -> GuardDecision {
    if !route.is_protected() {
        return GuardDecision::Render(route);
    }
    match state {
        GuardState::Loading => GuardDecision::Wait,
        GuardState::Authenticated => GuardDecision::Render(route),
        GuardState::Unauthenticated => GuardDecision::Redirect(Route::Landing),
    }
}
