#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tameny::auth::{
        AuthApi, AuthError, AuthHolder, AuthPhase, ChildrenProbe, Identity,
    };
    use tameny::remote::RemoteError;
    use uuid::Uuid;

    struct FakeAuthApi {
        user_id: Uuid,
        registered: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl FakeAuthApi {
        fn new() -> Self {
            Self {
                user_id: Uuid::new_v4(),
                registered: Mutex::new(vec!["taken@b.com".to_string()]),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if password != "secret1" {
                return Err(RemoteError::InvalidCredentials);
            }
            Ok(Identity {
                id: self.user_id,
                email: email.to_string(),
                display_name: Some("Parent".to_string()),
            })
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            _display_name: &str,
        ) -> Result<(), RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut registered = self.registered.lock().unwrap();
            if registered.iter().any(|e| e == email) {
                return Err(RemoteError::DuplicateAccount);
            }
            registered.push(email.to_string());
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    struct FakeProbe {
        children: Mutex<u64>,
        calls: AtomicUsize,
    }

    impl FakeProbe {
        fn new(children: u64) -> Self {
            Self {
                children: Mutex::new(children),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ChildrenProbe for FakeProbe {
        async fn has_children(&self, _parent: Uuid) -> Result<bool, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(*self.children.lock().unwrap() > 0)
        }
    }

    fn holder(api: &Arc<FakeAuthApi>, probe: &Arc<FakeProbe>) -> AuthHolder {
        AuthHolder::new(api.clone(), probe.clone())
    }

    #[tokio::test]
    async fn starts_loading_then_settles_signed_out() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);

        assert!(auth.snapshot().is_loading());
        auth.initialize().await;
        assert_eq!(auth.snapshot().phase, AuthPhase::SignedOut);
        assert_eq!(auth.snapshot().has_children, None);
    }

    #[tokio::test]
    async fn new_account_scenario_resolves_has_children_false() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);
        auth.initialize().await;

        auth.sign_up("a@b.com", "secret1", "A Parent").await.unwrap();
        // Account creation leaves the user signed out; they sign in next.
        assert_eq!(auth.snapshot().phase, AuthPhase::SignedOut);

        auth.sign_in("a@b.com", "secret1").await.unwrap();
        let snapshot = auth.snapshot();
        assert!(snapshot.identity().is_some());
        assert_eq!(snapshot.has_children, Some(false));
        // Resolved exactly once for the sign-in, not per observation.
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_classified_for_the_caller() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);

        let result = auth.sign_up("taken@b.com", "secret1", "A Parent").await;
        assert!(matches!(result, Err(AuthError::DuplicateAccount)));
    }

    #[tokio::test]
    async fn wrong_password_is_classified() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);

        let result = auth.sign_in("a@b.com", "wrong-1").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(auth.snapshot().identity(), None);
    }

    #[tokio::test]
    async fn validation_blocks_before_any_remote_call() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);

        assert!(matches!(
            auth.sign_in("not-an-email", "secret1").await,
            Err(AuthError::Validation { field: "email", .. })
        ));
        assert!(matches!(
            auth.sign_in("a@b.com", "short").await,
            Err(AuthError::Validation { field: "password", .. })
        ));
        assert!(matches!(
            auth.sign_up("a@b.com", "secret1", "x").await,
            Err(AuthError::Validation { field: "name", .. })
        ));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sign_out_clears_identity_and_derived_state() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(2));
        let auth = holder(&api, &probe);

        auth.sign_in("a@b.com", "secret1").await.unwrap();
        assert_eq!(auth.snapshot().has_children, Some(true));

        auth.sign_out().await;
        assert_eq!(auth.snapshot().phase, AuthPhase::SignedOut);
        assert_eq!(auth.snapshot().has_children, None);
    }

    #[tokio::test]
    async fn refresh_picks_up_the_first_child_mid_session() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);

        auth.sign_in("a@b.com", "secret1").await.unwrap();
        assert_eq!(auth.snapshot().has_children, Some(false));

        *probe.children.lock().unwrap() = 1;
        auth.refresh_children().await;
        assert_eq!(auth.snapshot().has_children, Some(true));
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let api = Arc::new(FakeAuthApi::new());
        let probe = Arc::new(FakeProbe::new(0));
        let auth = holder(&api, &probe);
        let mut rx = auth.subscribe();

        auth.sign_in("a@b.com", "secret1").await.unwrap();

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert!(seen.identity().is_some());
    }
}
