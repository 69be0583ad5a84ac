#![no_main]

use ferrous_profile::{BaseStorage, InMemoryProfile, Inject, ProfileError, SessionState, StorageRecord, TagQuery};
use libfuzzer_sys::fuzz_target;

// Each byte drives one session operation; the state machine is checked after every step.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    runtime.block_on(async {
        let profile = InMemoryProfile::test_profile();
        let mut session = if data[0] % 2 == 0 {
            profile.session()
        } else {
            profile.transaction()
        };
        let mut committed = 0usize;
        let mut pending = 0usize;

        for (step, op) in data[1..].iter().enumerate() {
            let before = session.state();
            match op % 6 {
                0 => match session.activate().await {
                    Ok(()) => assert_eq!(session.state(), SessionState::Active),
                    Err(ProfileError::SessionClosed) => assert_eq!(before, SessionState::Closed),
                    Err(other) => panic!("unexpected activation error {other:?}"),
                },
                1 => match session.commit().await {
                    Ok(()) => {
                        assert_eq!(before, SessionState::Active);
                        if session.is_transaction() {
                            committed += pending;
                        }
                        pending = 0;
                    }
                    Err(err) => {
                        assert!(matches!(err, ProfileError::SessionInactive));
                        assert_ne!(before, SessionState::Active);
                    }
                },
                2 => {
                    let result = session.rollback().await;
                    assert_eq!(result.is_ok(), before == SessionState::Active);
                    if result.is_ok() && session.is_transaction() {
                        pending = 0;
                    }
                }
                3 => {
                    session.deactivate().await.unwrap();
                    if before == SessionState::Active && session.is_transaction() {
                        pending = 0;
                    }
                }
                4 => match session.inject_trait::<dyn BaseStorage>() {
                    Ok(storage) => {
                        let record = StorageRecord::new("fuzz", "{}").with_id(format!("r{step}"));
                        storage.add_record(record).await.unwrap();
                        if session.is_transaction() {
                            pending += 1;
                        } else {
                            committed += 1;
                        }
                    }
                    Err(err) => assert!(matches!(err, ProfileError::SessionInactive)),
                },
                _ => {
                    let inactive = !session.is_active();
                    assert_eq!(session.context().is_err(), inactive);
                }
            }
            if session.state() != SessionState::Active {
                assert!(session.context().is_err());
            }
        }

        let reader = profile.session().open().await.unwrap();
        let found = reader
            .inject_trait::<dyn BaseStorage>()
            .unwrap()
            .find_all_records("fuzz", &TagQuery::new())
            .await
            .unwrap();
        assert_eq!(found.len(), committed);
    });
});
