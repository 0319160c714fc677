#[cfg(test)]
mod tests {
    use tameny::auth::{AuthPhase, AuthSnapshot, Identity};
    use tameny::routing::back::{handle_back, BackAction};
    use tameny::routing::{evaluate, RouteDecision};
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            display_name: Some("Parent".to_string()),
        }
    }

    fn snapshot(phase: AuthPhase, has_children: Option<bool>) -> AuthSnapshot {
        AuthSnapshot {
            phase,
            has_children,
        }
    }

    #[test]
    fn loading_never_redirects() {
        let auth = snapshot(AuthPhase::Loading, None);
        for path in ["/", "/chat", "/growth", "/reminders", "/unknown"] {
            assert_eq!(evaluate(&auth, path), RouteDecision::Wait, "path {path}");
        }
    }

    #[test]
    fn public_route_is_open_even_while_loading() {
        let auth = snapshot(AuthPhase::Loading, None);
        assert_eq!(evaluate(&auth, "/auth"), RouteDecision::Allow);
    }

    #[test]
    fn signed_out_redirects_to_sign_in_preserving_location() {
        let auth = snapshot(AuthPhase::SignedOut, None);
        assert_eq!(
            evaluate(&auth, "/growth"),
            RouteDecision::RedirectToSignIn {
                from: "/growth".to_string()
            }
        );
    }

    #[test]
    fn unresolved_children_flag_waits_on_gated_routes() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), None);
        assert_eq!(evaluate(&auth, "/chat"), RouteDecision::Wait);
        // Exempt screens render without waiting for the flag.
        assert_eq!(evaluate(&auth, "/profile"), RouteDecision::Allow);
    }

    #[test]
    fn onboarding_redirects_every_gated_route() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), Some(false));
        for path in ["/", "/chat", "/normal", "/growth", "/emergency", "/reminders"] {
            assert_eq!(
                evaluate(&auth, path),
                RouteDecision::RedirectToOnboarding,
                "path {path}"
            );
        }
    }

    #[test]
    fn child_management_stays_reachable_during_onboarding() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), Some(false));
        assert_eq!(evaluate(&auth, "/profile/children/new"), RouteDecision::Allow);
        assert_eq!(evaluate(&auth, "/profile/children"), RouteDecision::Allow);
        let child_id = Uuid::new_v4();
        assert_eq!(
            evaluate(&auth, &format!("/profile/children/{child_id}")),
            RouteDecision::Allow
        );
    }

    #[test]
    fn exempt_routes_allow_without_children() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), Some(false));
        assert_eq!(evaluate(&auth, "/profile"), RouteDecision::Allow);
        assert_eq!(
            evaluate(&auth, "/admin/push-notifications"),
            RouteDecision::Allow
        );
    }

    #[test]
    fn unknown_paths_are_treated_as_gated() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), Some(false));
        assert_eq!(
            evaluate(&auth, "/somewhere-new"),
            RouteDecision::RedirectToOnboarding
        );
    }

    #[test]
    fn complete_state_allows_everything() {
        let auth = snapshot(AuthPhase::SignedIn(identity()), Some(true));
        for path in ["/", "/chat", "/growth", "/reminders", "/profile"] {
            assert_eq!(evaluate(&auth, path), RouteDecision::Allow, "path {path}");
        }
    }

    #[test]
    fn hardware_back_exits_only_at_roots() {
        assert_eq!(handle_back("/"), BackAction::ExitApp);
        assert_eq!(handle_back("/auth"), BackAction::ExitApp);
        assert_eq!(handle_back("/chat"), BackAction::Pop);
        assert_eq!(handle_back("/profile/children"), BackAction::Pop);
    }
}
