use super::routes::RouteDescriptor;
use crate::session::Session;

/// Result of checking one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Allow,
    RedirectTo(String),
}

impl AuthorizationOutcome {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether a navigation may proceed.
///
/// Pure: no network, no session mutation. Rules, first match wins:
///
/// 1. Public target, authenticated session, target is the login route →
///    home.
/// 2. Protected target, unauthenticated session → login.
/// 3. Target restricts roles and the user's role (or the user) is missing
///    from the set → home.
/// 4. Allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGuard {
    login_path: &'static str,
    home_path: &'static str,
}

impl NavigationGuard {
    #[must_use]
    pub const fn new(login_path: &'static str, home_path: &'static str) -> Self {
        Self {
            login_path,
            home_path,
        }
    }

    #[must_use]
    pub fn decide(
        &self,
        target: &RouteDescriptor,
        from: Option<&str>,
        session: &Session,
    ) -> AuthorizationOutcome {
        let authenticated = session.is_authenticated();

        let outcome = if !target.requires_auth && authenticated && target.path == self.login_path
        {
            AuthorizationOutcome::RedirectTo(self.home_path.to_owned())
        } else if target.requires_auth && !authenticated {
            AuthorizationOutcome::RedirectTo(self.login_path.to_owned())
        } else if !target.admits(session.role()) {
            AuthorizationOutcome::RedirectTo(self.home_path.to_owned())
        } else {
            AuthorizationOutcome::Allow
        };

        if let AuthorizationOutcome::RedirectTo(to) = &outcome {
            tracing::debug!(
                target_path = target.path,
                from = from.unwrap_or("-"),
                redirect = %to,
                role = ?session.role(),
                "Navigation redirected"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{HOME_PATH, LOGIN_PATH, RouteTable};
    use crate::testing::sample_profile;
    use crate::types::Role;

    fn guard() -> NavigationGuard {
        NavigationGuard::new(LOGIN_PATH, HOME_PATH)
    }

    fn signed_in(role: Role) -> Session {
        Session::authenticated("tok", "ref", sample_profile(role))
    }

    fn redirect(path: &str) -> AuthorizationOutcome {
        AuthorizationOutcome::RedirectTo(path.to_owned())
    }

    #[test]
    fn anonymous_on_protected_route_goes_to_login() {
        let table = RouteTable::standard();
        let outcome = guard().decide(table.resolve("/visitor/list"), None, &Session::anonymous());
        assert_eq!(outcome, redirect(LOGIN_PATH));
    }

    #[test]
    fn anonymous_on_unknown_route_goes_to_login() {
        let table = RouteTable::standard();
        let outcome = guard().decide(table.resolve("/missing"), None, &Session::anonymous());
        assert_eq!(outcome, redirect(LOGIN_PATH));
    }

    #[test]
    fn anonymous_may_open_login() {
        let table = RouteTable::standard();
        let outcome = guard().decide(table.resolve(LOGIN_PATH), None, &Session::anonymous());
        assert!(outcome.is_allowed());
    }

    #[test]
    fn authenticated_on_login_goes_home() {
        let table = RouteTable::standard();
        let outcome = guard().decide(
            table.resolve(LOGIN_PATH),
            Some("/system/users"),
            &signed_in(Role::Visitor),
        );
        assert_eq!(outcome, redirect(HOME_PATH));
    }

    #[test]
    fn other_public_routes_stay_open_when_authenticated() {
        let about = RouteDescriptor::new("/about", "About").public();
        assert!(guard().decide(&about, None, &signed_in(Role::Visitor)).is_allowed());
    }

    #[test]
    fn administrator_only_route() {
        let table = RouteTable::standard();
        let users = table.resolve("/system/users");
        assert_eq!(
            guard().decide(users, None, &signed_in(Role::Visitor)),
            redirect(HOME_PATH)
        );
        assert!(guard()
            .decide(users, None, &signed_in(Role::SystemAdministrator))
            .is_allowed());
    }

    #[test]
    fn restricted_route_denies_token_without_profile() {
        let table = RouteTable::standard();
        let session = Session {
            token: "tok".into(),
            ..Session::default()
        };
        assert_eq!(
            guard().decide(table.resolve("/research/projects"), None, &session),
            redirect(HOME_PATH)
        );
    }

    #[test]
    fn unrestricted_protected_route_admits_any_role() {
        let table = RouteTable::standard();
        for role in Role::ALL {
            assert!(guard()
                .decide(table.resolve("/missing"), None, &signed_in(role))
                .is_allowed());
        }
    }

    #[test]
    fn decisions_are_deterministic() {
        let table = RouteTable::standard();
        let session = signed_in(Role::Researcher);
        for route in table.iter() {
            let first = guard().decide(route, None, &session);
            let second = guard().decide(route, Some(HOME_PATH), &session);
            assert_eq!(first, second, "{}", route.path);
        }
    }
}
