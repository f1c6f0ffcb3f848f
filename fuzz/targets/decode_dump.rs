#![no_main]

use libfuzzer_sys::fuzz_target;
use redkit::rdb::{decode_dump_to_commands, verify_dump_payload};

fuzz_target!(|data: &[u8]| {
    // Декодер не должен паниковать ни на каких данных: только Ok или Err.
    let _ = verify_dump_payload(data);

    if let Ok(cmds) = decode_dump_to_commands(data, b"fuzz") {
        for cmd in &cmds {
            assert_eq!(cmd.key().map(|k| &k[..]), Some(&b"fuzz"[..]));
        }
    }
});
