/// Session lifecycle integration tests
///
/// These tests walk sessions and transactions through their states and check
/// that session-local bindings stay invisible to the owning profile.

use ferrous_profile::{
    BaseStorage, InMemoryProfile, Inject, InjectionContext, InjectionError, Profile, ProfileBackend,
    ProfileError, SessionState,
};

struct Ledger {
    pool: String,
}

struct StatelessBackend;

impl ProfileBackend for StatelessBackend {
    fn name(&self) -> &'static str {
        "stateless"
    }
}

#[tokio::test]
async fn test_fresh_session_is_inactive() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.session();

    assert!(!session.is_active());
    assert_eq!(session.state(), SessionState::Inactive);
    assert!(matches!(session.commit().await, Err(ProfileError::SessionInactive)));
    assert!(matches!(session.rollback().await, Err(ProfileError::SessionInactive)));
    assert!(matches!(session.inject::<Ledger>(), Err(ProfileError::SessionInactive)));
    assert!(matches!(
        session.inject_optional::<Ledger>(),
        Err(ProfileError::SessionInactive)
    ));
    assert!(matches!(session.context(), Err(ProfileError::SessionInactive)));
}

#[tokio::test]
async fn test_session_bindings_are_scoped() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.session();
    session.activate().await.unwrap();
    assert!(session.is_active());

    session
        .context()
        .unwrap()
        .injector()
        .bind_instance(Ledger { pool: "sovrin".into() });

    let ledger = session.inject_optional::<Ledger>().unwrap().unwrap();
    assert_eq!(ledger.pool, "sovrin");
    assert!(profile.inject_optional::<Ledger>().unwrap().is_none());
}

#[tokio::test]
async fn test_deactivate_drops_session_bindings() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.session();
    session.activate().await.unwrap();
    session
        .context()
        .unwrap()
        .injector()
        .bind_instance(Ledger { pool: "sovrin".into() });

    session.deactivate().await.unwrap();
    assert!(!session.is_active());
    assert!(matches!(session.inject_optional::<Ledger>(), Err(ProfileError::SessionInactive)));

    let next = profile.session().open().await.unwrap();
    assert!(next.inject_optional::<Ledger>().unwrap().is_none());
}

#[tokio::test]
async fn test_open_activates_and_returns_session() {
    let profile = InMemoryProfile::test_profile();
    let session = profile.session().open().await.unwrap();
    assert!(session.is_active());
    assert_eq!(session.state(), SessionState::Active);
    assert!(session.inject_trait::<dyn BaseStorage>().is_ok());
}

#[tokio::test]
async fn test_enter_guard_scopes_activation() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.transaction();
    {
        let guard = session.enter().await.unwrap();
        assert!(guard.is_active());
        guard.inject_trait::<dyn BaseStorage>().unwrap();
    }
    assert!(!session.is_active());
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_guard_released_on_error_path() {
    async fn failing_unit_of_work(profile: &Profile) -> Result<(), ProfileError> {
        let mut session = profile.transaction();
        let mut guard = session.enter().await?;
        guard.inject::<Ledger>()?;
        guard.commit().await?;
        Ok(())
    }

    let profile = InMemoryProfile::test_profile();
    let err = failing_unit_of_work(&profile).await.unwrap_err();
    assert!(matches!(err, ProfileError::Injection(InjectionError::NotFound(_))));
    assert!(!err.is_lifecycle());
}

#[tokio::test]
async fn test_closed_session_cannot_reactivate() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.transaction().open().await.unwrap();
    session.commit().await.unwrap();

    let err = session.activate().await.unwrap_err();
    assert!(matches!(err, ProfileError::SessionClosed));
    assert!(err.is_lifecycle());
    assert!(matches!(session.commit().await, Err(ProfileError::SessionInactive)));
}

#[tokio::test]
async fn test_double_activation_keeps_context() {
    let profile = InMemoryProfile::test_profile();
    let mut session = profile.session();
    session.activate().await.unwrap();
    session.context().unwrap().injector().bind_instance(5u16);
    session.activate().await.unwrap();
    assert_eq!(*session.inject::<u16>().unwrap(), 5);
}

#[tokio::test]
async fn test_profile_bindings_reach_session() {
    let profile = InMemoryProfile::test_profile();
    profile
        .context()
        .injector()
        .bind_instance(Ledger { pool: "profile-pool".into() });

    let session = profile.session().open().await.unwrap();
    assert_eq!(session.inject::<Ledger>().unwrap().pool, "profile-pool");
}

#[tokio::test]
async fn test_backend_without_transactions_degrades_to_noop() {
    let profile = Profile::new(StatelessBackend, InjectionContext::new());
    assert!(!profile.supports_transactions());

    let mut committed = profile.transaction().open().await.unwrap();
    committed.commit().await.unwrap();
    assert_eq!(committed.state(), SessionState::Closed);

    let mut rolled_back = profile.transaction().open().await.unwrap();
    rolled_back.rollback().await.unwrap();
    assert_eq!(rolled_back.state(), SessionState::Closed);
}

#[tokio::test]
async fn test_test_session_helper() {
    let session = InMemoryProfile::test_session(None).await.unwrap();
    assert!(session.is_active());
    assert_eq!(session.profile().name(), InMemoryProfile::TEST_PROFILE_NAME);

    let settings = [("debug.seed", "000000000000000000000000Trustee1")].into_iter().collect();
    let session = InMemoryProfile::test_session(Some(settings)).await.unwrap();
    assert_eq!(
        session.settings().unwrap().get_str("debug.seed"),
        Some("000000000000000000000000Trustee1")
    );
}
