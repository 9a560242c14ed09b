#![no_main]

use calc_journal::JournalSnapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = JournalSnapshot::decode(data) {
        // Anything accepted must survive re-encoding.
        let bytes = snapshot.encode().expect("valid snapshot encodes");
        let again = JournalSnapshot::decode(&bytes).expect("re-encoded snapshot decodes");
        assert_eq!(snapshot, again);
    }
});
