#![no_main]

use ferrous_profile::{BackendKind, Injector, ProfileManagerProvider, Provider, Settings, WALLET_TYPE_SETTING};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary JSON must never panic
    if let Ok(settings) = Settings::from_json_str(text) {
        let round_trip = serde_json_round_trip(&settings);
        assert_eq!(round_trip.len(), settings.len());
    }

    // Backend parsing agrees with the provider
    let parsed = text.parse::<BackendKind>();
    let mut settings = Settings::new();
    settings.set(WALLET_TYPE_SETTING, text);
    let provided = ProfileManagerProvider::new().provide(&settings, &Injector::new());
    match (parsed, provided) {
        (Ok(kind), Ok(manager)) => assert_eq!(manager.backend(), kind),
        (Err(_), Err(_)) => {}
        _ => panic!("parse and provide disagree for {text:?}"),
    }

    // Environment-style variables
    let vars = text
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(name, value)| (name.to_string(), value.to_string()));
    let from_vars = Settings::from_vars("FUZZ", vars);
    for (key, _) in from_vars.iter() {
        assert!(!key.contains("__"));
    }
});

fn serde_json_round_trip(settings: &Settings) -> Settings {
    let rendered = serde_json::to_string(settings).unwrap();
    Settings::from_json_str(&rendered).unwrap()
}
