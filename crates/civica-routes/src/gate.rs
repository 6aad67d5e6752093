//! The authorization gate.
//!
//! Maps the current session to the set of mounted routes. There is no
//! denial page: a route outside the mounted tree resolves to NotFound,
//! whether it exists for another role or not. Evaluation is pure; the
//! only state is which tree is mounted.

use tracing::debug;

use civica_session::{Session, SessionStore};

/// Gate state, derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Session hydration is still in progress.
    Loading,
    /// No valid session; only the public tree is mounted.
    Unauthenticated,
    /// Logged in; admin selects whether the admin routes are mounted.
    Authenticated {
        /// Whether the admin-only routes are mounted.
        admin: bool,
    },
}

/// A reachable screen of the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteView {
    /// Public landing page.
    Home,
    /// Login form.
    Login,
    /// Self-service signup.
    Register,
    /// Password recovery flow.
    RecoverAccount,
    /// Credit title browsing, public.
    CreditTitles {
        /// Zero-based page.
        page: u32,
    },
    /// User listing.
    Users {
        /// Zero-based page.
        page: u32,
    },
    /// Registration-type chooser (admin).
    SelectRegister,
    /// User editing (admin).
    EditUser {
        /// The user being edited.
        id: i64,
    },
    /// Terms-of-service management (admin).
    Terms,
}

/// Result of resolving a path against the mounted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Hydration pending; nothing is mounted yet.
    Loading,
    /// The path is mounted and maps to this view.
    Allowed(RouteView),
    /// The path is not mounted for the current session.
    NotFound,
}

/// Decides, per navigation, which routes are reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGate {
    state: GateState,
}

impl AuthGate {
    /// Create a gate in the loading state.
    pub fn new() -> Self {
        Self {
            state: GateState::Loading,
        }
    }

    /// Current gate state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Recompute the state from a session snapshot.
    pub fn apply(&mut self, session: &Session, loading: bool) {
        let next = if loading {
            GateState::Loading
        } else if session.is_auth {
            GateState::Authenticated {
                admin: session.is_admin,
            }
        } else {
            GateState::Unauthenticated
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "gate transition");
            self.state = next;
        }
    }

    /// Recompute the state from the session store.
    pub fn sync(&mut self, store: &SessionStore) {
        self.apply(&store.session(), store.is_loading());
    }

    /// Resolve a path against the mounted route tree.
    pub fn resolve(&self, path: &str) -> RouteOutcome {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match self.state {
            GateState::Loading => RouteOutcome::Loading,
            GateState::Unauthenticated => resolve_public(&segments),
            GateState::Authenticated { admin } => resolve_authenticated(&segments, admin),
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_public(segments: &[&str]) -> RouteOutcome {
    match segments {
        [] => RouteOutcome::Allowed(RouteView::Home),
        ["login"] => RouteOutcome::Allowed(RouteView::Login),
        ["register"] => RouteOutcome::Allowed(RouteView::Register),
        ["recover-account"] => RouteOutcome::Allowed(RouteView::RecoverAccount),
        ["credit-titles"] => RouteOutcome::Allowed(RouteView::CreditTitles { page: 0 }),
        ["credit-titles", "page", page] => match page.parse() {
            Ok(page) => RouteOutcome::Allowed(RouteView::CreditTitles { page }),
            Err(_) => RouteOutcome::NotFound,
        },
        _ => RouteOutcome::NotFound,
    }
}

fn resolve_authenticated(segments: &[&str], admin: bool) -> RouteOutcome {
    match segments {
        [] => RouteOutcome::Allowed(RouteView::Home),
        ["users"] => RouteOutcome::Allowed(RouteView::Users { page: 0 }),
        ["users", "page", page] => match page.parse() {
            Ok(page) => RouteOutcome::Allowed(RouteView::Users { page }),
            Err(_) => RouteOutcome::NotFound,
        },
        ["users", "selectRegister"] if admin => RouteOutcome::Allowed(RouteView::SelectRegister),
        ["users", "edit", id] if admin => match id.parse() {
            Ok(id) => RouteOutcome::Allowed(RouteView::EditUser { id }),
            Err(_) => RouteOutcome::NotFound,
        },
        ["terms"] if admin => RouteOutcome::Allowed(RouteView::Terms),
        _ => RouteOutcome::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civica_session::UserIdentity;

    fn session(is_auth: bool, is_admin: bool) -> Session {
        Session {
            is_auth,
            is_admin,
            user: is_auth.then(|| UserIdentity {
                id: 1,
                username: "u".to_string(),
            }),
        }
    }

    fn gate_for(is_auth: bool, is_admin: bool) -> AuthGate {
        let mut gate = AuthGate::new();
        gate.apply(&session(is_auth, is_admin), false);
        gate
    }

    #[test]
    fn test_loading_resolves_nothing() {
        let gate = AuthGate::new();
        assert_eq!(gate.state(), GateState::Loading);
        assert_eq!(gate.resolve("/"), RouteOutcome::Loading);
        assert_eq!(gate.resolve("/users"), RouteOutcome::Loading);
    }

    #[test]
    fn test_public_tree() {
        let gate = gate_for(false, false);

        assert_eq!(gate.resolve("/"), RouteOutcome::Allowed(RouteView::Home));
        assert_eq!(gate.resolve("/login"), RouteOutcome::Allowed(RouteView::Login));
        assert_eq!(
            gate.resolve("/register"),
            RouteOutcome::Allowed(RouteView::Register)
        );
        assert_eq!(
            gate.resolve("/recover-account"),
            RouteOutcome::Allowed(RouteView::RecoverAccount)
        );
        assert_eq!(
            gate.resolve("/credit-titles"),
            RouteOutcome::Allowed(RouteView::CreditTitles { page: 0 })
        );
        assert_eq!(
            gate.resolve("/credit-titles/page/3"),
            RouteOutcome::Allowed(RouteView::CreditTitles { page: 3 })
        );
    }

    #[test]
    fn test_unauthenticated_cannot_reach_admin_routes() {
        let gate = gate_for(false, false);

        assert_eq!(gate.resolve("/users"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/users/selectRegister"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/terms"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/nowhere"), RouteOutcome::NotFound);
    }

    #[test]
    fn test_authenticated_non_admin_tree() {
        let gate = gate_for(true, false);

        assert_eq!(gate.resolve("/"), RouteOutcome::Allowed(RouteView::Home));
        assert_eq!(
            gate.resolve("/users"),
            RouteOutcome::Allowed(RouteView::Users { page: 0 })
        );
        assert_eq!(
            gate.resolve("/users/page/2"),
            RouteOutcome::Allowed(RouteView::Users { page: 2 })
        );

        // Admin-only routes are simply not mounted.
        assert_eq!(gate.resolve("/users/selectRegister"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/users/edit/4"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/terms"), RouteOutcome::NotFound);

        // The public tree is replaced, not extended.
        assert_eq!(gate.resolve("/login"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/credit-titles"), RouteOutcome::NotFound);
    }

    #[test]
    fn test_admin_tree_mounts_admin_routes() {
        let gate = gate_for(true, true);

        assert_eq!(
            gate.resolve("/users/selectRegister"),
            RouteOutcome::Allowed(RouteView::SelectRegister)
        );
        assert_eq!(
            gate.resolve("/users/edit/4"),
            RouteOutcome::Allowed(RouteView::EditUser { id: 4 })
        );
        assert_eq!(gate.resolve("/terms"), RouteOutcome::Allowed(RouteView::Terms));
    }

    #[test]
    fn test_malformed_parameters_are_not_found() {
        let gate = gate_for(true, true);
        assert_eq!(gate.resolve("/users/page/abc"), RouteOutcome::NotFound);
        assert_eq!(gate.resolve("/users/edit/abc"), RouteOutcome::NotFound);
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let gate = gate_for(true, true);
        assert_eq!(gate.resolve("/terms/"), RouteOutcome::Allowed(RouteView::Terms));
        assert_eq!(gate.resolve("terms"), RouteOutcome::Allowed(RouteView::Terms));
    }

    #[test]
    fn test_transitions_follow_session() {
        let mut gate = AuthGate::new();
        assert_eq!(gate.state(), GateState::Loading);

        // Hydration completed with no session.
        gate.apply(&session(false, false), false);
        assert_eq!(gate.state(), GateState::Unauthenticated);

        // Login as admin.
        gate.apply(&session(true, true), false);
        assert_eq!(gate.state(), GateState::Authenticated { admin: true });

        // Forced logout on 401.
        gate.apply(&session(false, false), false);
        assert_eq!(gate.state(), GateState::Unauthenticated);
    }
}
