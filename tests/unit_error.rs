/// Unit tests for InjectionError, ProfileError and StorageError

use ferrous_profile::{InjectResult, InjectionError, ProfileError, ProfileResult, StorageError};
use std::error::Error;

#[test]
fn test_error_display_not_found() {
    let error = InjectionError::NotFound("TestService");
    let display_str = format!("{}", error);
    assert_eq!(display_str, "No binding found for: TestService");
    assert!(display_str.contains("TestService"));
}

#[test]
fn test_error_display_type_mismatch() {
    let error = InjectionError::TypeMismatch {
        key: "limit",
        requested: "alloc::string::String",
        bound: "u32",
    };
    assert_eq!(
        error.to_string(),
        "Type mismatch for limit: requested alloc::string::String, bound u32"
    );
}

#[test]
fn test_error_display_circular() {
    let error = InjectionError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
    assert_eq!(error.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
}

#[test]
fn test_error_display_empty_circular_path() {
    let error = InjectionError::Circular(vec![]);
    assert_eq!(error.to_string(), "Circular dependency: ");
}

#[test]
fn test_error_display_depth_exceeded() {
    let error = InjectionError::DepthExceeded(256);
    assert_eq!(error.to_string(), "Max resolution depth 256 exceeded");
}

#[test]
fn test_error_display_settings() {
    let missing = InjectionError::MissingSetting("wallet.type".into());
    assert_eq!(missing.to_string(), "Missing required setting: wallet.type");

    let invalid = InjectionError::InvalidSetting {
        key: "wallet.type".into(),
        value: "invalid-type".into(),
    };
    assert_eq!(
        invalid.to_string(),
        "Invalid value for setting wallet.type: \"invalid-type\""
    );
}

#[test]
fn test_inject_result_err() {
    let result: InjectResult<String> = Err(InjectionError::NotFound("TestService"));
    match result {
        Err(InjectionError::NotFound(name)) => assert_eq!(name, "TestService"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_profile_error_is_transparent_over_injection() {
    let error: ProfileError = InjectionError::NotFound("Ledger").into();
    assert_eq!(error.to_string(), "No binding found for: Ledger");
    assert!(!error.is_lifecycle());
}

#[test]
fn test_profile_error_is_transparent_over_storage() {
    let result: ProfileResult<()> = Err(StorageError::Duplicate("rec-1".into()).into());
    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Duplicate record id: rec-1");
    assert!(matches!(error, ProfileError::Storage(StorageError::Duplicate(_))));
}

#[test]
fn test_lifecycle_errors() {
    assert!(ProfileError::SessionInactive.is_lifecycle());
    assert!(ProfileError::SessionClosed.is_lifecycle());
    assert_eq!(ProfileError::SessionInactive.to_string(), "Profile session is not active");
    assert_eq!(
        ProfileError::SessionClosed.to_string(),
        "Profile session has already been closed"
    );
}

#[test]
fn test_storage_error_display() {
    let error = StorageError::NotFound {
        record_type: "connection".into(),
        id: "conn-1".into(),
    };
    assert_eq!(error.to_string(), "Record not found: connection/conn-1");
    assert_eq!(
        StorageError::Closed.to_string(),
        "Storage handle used after its session was closed"
    );
}

#[test]
fn test_error_clone() {
    let error = InjectionError::MissingSetting("wallet.type".into());
    let cloned = error.clone();
    assert_eq!(error, cloned);
    assert_eq!(format!("{}", error), format!("{}", cloned));
}

#[test]
fn test_error_as_std_error() {
    let error = InjectionError::NotFound("TestService");
    let _: &dyn std::error::Error = &error;
    assert!(error.source().is_none());

    let wrapped = ProfileError::from(StorageError::Closed);
    let _: &dyn std::error::Error = &wrapped;
}
