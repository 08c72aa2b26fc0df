#![no_main]

use homescreen_core::enrich::enrich_home_screen;
use homescreen_core::lookup::{Context, StaticEmails, StaticPhoneNumbers};
use homescreen_core::model::item::HomeScreen;
use homescreen_core::model::record::{EmailRecord, PhoneNumberRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut home) = serde_json::from_slice::<HomeScreen>(data) else {
        return;
    };

    let phones = StaticPhoneNumbers(vec![
        PhoneNumberRecord::new("+15550001", true, false),
        PhoneNumberRecord::new("+15550002", false, false),
    ]);
    let emails = StaticEmails(vec![
        EmailRecord::new("primary@example.com", true, true),
        EmailRecord::new("pending@example.com", false, false),
    ]);

    let before = home.items.len();
    let _ = enrich_home_screen(&Context::new(), &mut home, &phones, &emails);
    assert_eq!(home.items.len(), before);

    let encoded = serde_json::to_vec(&home).expect("enriched snapshot encodes");
    let _ = serde_json::from_slice::<HomeScreen>(&encoded);
});
