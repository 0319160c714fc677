//! Screen-route gating, evaluated on every navigation before a screen mounts.

pub mod back;

use crate::auth::{AuthPhase, AuthSnapshot};

/// Prefix under which the child-management screens live; they stay reachable
/// during onboarding so the first child can actually be created.
pub const CHILDREN_PATH_PREFIX: &str = "/profile/children";

pub const SIGN_IN_PATH: &str = "/auth";
pub const ONBOARDING_PATH: &str = "/profile/children/new";

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub requires_auth: bool,
    pub onboarding_exempt: bool,
}

/// The application's screen table.
pub const ROUTES: &[Route] = &[
    Route {
        path: "/auth",
        requires_auth: false,
        onboarding_exempt: true,
    },
    Route {
        path: "/",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/chat",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/normal",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/growth",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/emergency",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/reminders",
        requires_auth: true,
        onboarding_exempt: false,
    },
    Route {
        path: "/profile",
        requires_auth: true,
        onboarding_exempt: true,
    },
    Route {
        path: "/profile/children",
        requires_auth: true,
        onboarding_exempt: true,
    },
    Route {
        path: "/profile/children/new",
        requires_auth: true,
        onboarding_exempt: true,
    },
    Route {
        path: "/profile/children/:id",
        requires_auth: true,
        onboarding_exempt: true,
    },
    Route {
        path: "/admin/push-notifications",
        requires_auth: true,
        onboarding_exempt: true,
    },
];

/// What to do with a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Auth state is still partial; render a neutral placeholder and decide
    /// nothing.
    Wait,
    /// Not signed in; the originally requested location rides along so a
    /// successful sign-in can return to it.
    RedirectToSignIn { from: String },
    /// Signed in with no child profile yet.
    RedirectToOnboarding,
    Allow,
}

fn lookup(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| {
        if r.path.ends_with("/:id") {
            let prefix = r.path.trim_end_matches(":id");
            path.starts_with(prefix) && path.len() > prefix.len()
        } else {
            r.path == path
        }
    })
}

/// Decide a navigation from the current auth snapshot. Unknown paths are
/// treated as protected and onboarding-gated.
pub fn evaluate(auth: &AuthSnapshot, path: &str) -> RouteDecision {
    let (requires_auth, onboarding_exempt) = match lookup(path) {
        Some(route) => (route.requires_auth, route.onboarding_exempt),
        None => (true, false),
    };

    if !requires_auth {
        return RouteDecision::Allow;
    }

    match &auth.phase {
        AuthPhase::Loading => return RouteDecision::Wait,
        AuthPhase::SignedOut => {
            return RouteDecision::RedirectToSignIn {
                from: path.to_string(),
            }
        }
        AuthPhase::SignedIn(_) => {}
    }

    if !onboarding_exempt && !path.starts_with(CHILDREN_PATH_PREFIX) {
        match auth.has_children {
            // Both identity and the flag must be resolved before any
            // onboarding redirect fires.
            None => return RouteDecision::Wait,
            Some(false) => return RouteDecision::RedirectToOnboarding,
            Some(true) => {}
        }
    }

    RouteDecision::Allow
}
