use ferrous_profile::{Inject, InjectResult, InjectionError, Injector, Lifetime, Provider, Settings};
use std::sync::{Arc, Mutex};

#[test]
fn test_bind_instance_shares_value() {
    let injector = Injector::new();
    injector.bind_instance(42usize);
    injector.bind_instance("hello".to_string());

    let num1 = injector.inject::<usize>().unwrap();
    let num2 = injector.inject::<usize>().unwrap();
    let str1 = injector.inject::<String>().unwrap();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2)); // Same instance
}

#[test]
fn test_provider_with_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let injector = Injector::new();
    injector.bind_instance(Config { port: 8080 });
    injector.bind_provider(Lifetime::Transient, |_, r| {
        Ok(Arc::new(Server {
            config: r.inject::<Config>()?,
            name: "MyServer".to_string(),
        }))
    });

    let server = injector.inject::<Server>().unwrap();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_transient_provider_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let injector = Injector::new();
    injector.bind_provider(Lifetime::Transient, move |_, _| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        Ok(Arc::new(format!("instance-{}", *c)))
    });

    let a = injector.inject::<String>().unwrap();
    let b = injector.inject::<String>().unwrap();

    assert_eq!(a.as_str(), "instance-1");
    assert_eq!(b.as_str(), "instance-2");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*counter.lock().unwrap(), 2);
}

#[test]
fn test_singleton_provider_runs_once() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let injector = Injector::new();
    injector.bind_provider(Lifetime::Singleton, move |_, _| {
        *counter_clone.lock().unwrap() += 1;
        Ok(Arc::new(vec![1u32, 2, 3]))
    });

    let a = injector.inject::<Vec<u32>>().unwrap();
    let b = injector.inject::<Vec<u32>>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*counter.lock().unwrap(), 1);
}

#[test]
fn test_trait_binding() {
    trait Ledger: Send + Sync {
        fn pool_name(&self) -> String;
    }

    struct IndyLedger;
    impl Ledger for IndyLedger {
        fn pool_name(&self) -> String {
            "indy-test".to_string()
        }
    }

    let injector = Injector::new();
    injector.bind_trait::<dyn Ledger>(Arc::new(IndyLedger));

    let ledger = injector.inject_trait::<dyn Ledger>().unwrap();
    assert_eq!(ledger.pool_name(), "indy-test");
}

#[test]
fn test_trait_provider_reads_settings() {
    trait Resolver: Send + Sync {
        fn endpoint(&self) -> &str;
    }

    struct HttpResolver(String);
    impl Resolver for HttpResolver {
        fn endpoint(&self) -> &str {
            &self.0
        }
    }

    struct ResolverProvider;
    impl Provider<dyn Resolver> for ResolverProvider {
        fn provide(&self, settings: &Settings, _: &Injector) -> InjectResult<Arc<dyn Resolver>> {
            let endpoint = settings
                .get_str("resolver.endpoint")
                .ok_or_else(|| InjectionError::MissingSetting("resolver.endpoint".into()))?;
            Ok(Arc::new(HttpResolver(endpoint.to_string())))
        }
    }

    let mut injector = Injector::new();
    injector.bind_trait_provider_with(Lifetime::Transient, ResolverProvider);
    assert_eq!(
        injector.inject_trait::<dyn Resolver>().err(),
        Some(InjectionError::MissingSetting("resolver.endpoint".into()))
    );

    injector.settings_mut().set("resolver.endpoint", "http://localhost:8080");
    let resolver = injector.inject_trait::<dyn Resolver>().unwrap();
    assert_eq!(resolver.endpoint(), "http://localhost:8080");
}

#[test]
fn test_named_bindings() {
    let injector = Injector::new();
    injector.bind_named("admin.port", 8031u16);
    injector.bind_named("inbound.port", 8030u16);

    assert_eq!(*injector.inject_named::<u16>("admin.port").unwrap(), 8031);
    assert_eq!(*injector.inject_named::<u16>("inbound.port").unwrap(), 8030);
    assert!(injector.inject_named_optional::<u16>("outbound.port").unwrap().is_none());
}

#[test]
fn test_required_versus_optional() {
    struct Unbound;

    let injector = Injector::new();
    match injector.inject::<Unbound>() {
        Err(InjectionError::NotFound(name)) => assert!(name.ends_with("Unbound")),
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
    assert!(injector.inject_optional::<Unbound>().unwrap().is_none());
    assert!(injector.inject_trait_optional::<dyn std::fmt::Debug + Send + Sync>().unwrap().is_none());
}

#[test]
fn test_rebinding_overwrites() {
    let injector = Injector::new();
    injector.bind_instance(1u64);
    injector.bind_provider(Lifetime::Transient, |_, _| Ok(Arc::new(2u64)));
    assert_eq!(*injector.inject::<u64>().unwrap(), 2);

    injector.bind_instance(3u64);
    assert_eq!(*injector.inject::<u64>().unwrap(), 3);
    assert_eq!(injector.len(), 1);
}

#[test]
fn test_provider_error_propagates() {
    let injector = Injector::new();
    injector.bind_provider::<String, _>(Lifetime::Singleton, |_, _| {
        Err(InjectionError::Provider {
            key: "String",
            message: "backend unavailable".into(),
        })
    });

    let err = injector.inject::<String>().unwrap_err();
    assert_eq!(err.to_string(), "Provider for String failed: backend unavailable");

    // A failed singleton is not cached
    injector.bind_provider(Lifetime::Singleton, |_, _| Ok(Arc::new("up".to_string())));
    assert_eq!(injector.inject::<String>().unwrap().as_str(), "up");
}
