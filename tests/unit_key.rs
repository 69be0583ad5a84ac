/// Unit tests for Key and Request

use ferrous_profile::{key_of_trait, key_of_type, Key, Request};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

trait Wallet: Send + Sync {}

#[test]
fn test_key_display_name_type() {
    let key = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    assert_eq!(key.display_name(), "alloc::string::String");
    assert!(!key.display_name().is_empty());
}

#[test]
fn test_key_display_name_trait() {
    let key = key_of_trait::<dyn Wallet>();
    assert!(key.display_name().ends_with("Wallet"));
    assert!(key.display_name().starts_with("dyn "));
}

#[test]
fn test_key_display_name_named() {
    assert_eq!(Key::Named("wallet.type").display_name(), "wallet.type");
}

#[test]
fn test_type_keys_compare_by_type_id() {
    // The display name is diagnostic only
    let a = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    let b = Key::Type(TypeId::of::<String>(), "String");
    let c = Key::Type(TypeId::of::<u32>(), "u32");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, key_of_type::<String>());
}

#[test]
fn test_variants_never_collide() {
    assert_ne!(Key::Trait("x"), Key::Named("x"));
    assert_ne!(key_of_type::<u8>(), Key::Named("u8"));
}

#[test]
fn test_key_hash() {
    let mut map = HashMap::new();
    map.insert(key_of_type::<String>(), "type");
    map.insert(Key::Named("alloc::string::String"), "named");

    assert_eq!(map.get(&Key::Type(TypeId::of::<String>(), "other")), Some(&"type"));
    assert_eq!(map.get(&Key::Named("alloc::string::String")), Some(&"named"));
    assert_eq!(map.len(), 2);
}

#[test]
fn test_key_debug_format() {
    let debug_str = format!("{:?}", Key::Named("wallet.name"));
    assert!(debug_str.contains("Named"));
    assert!(debug_str.contains("wallet.name"));
}

#[test]
fn test_request_expected_types() {
    let typed = Request::of_type::<u64>();
    assert_eq!(typed.key, key_of_type::<u64>());
    assert_eq!(typed.type_id, TypeId::of::<u64>());

    // Trait objects travel as Arc<dyn Trait>
    let trait_request = Request::of_trait::<dyn Wallet>();
    assert_eq!(trait_request.key, key_of_trait::<dyn Wallet>());
    assert_eq!(trait_request.type_id, TypeId::of::<Arc<dyn Wallet>>());

    let named = Request::named::<String>("label");
    assert_eq!(named.key, Key::Named("label"));
    assert_eq!(named.type_name, "alloc::string::String");
}
