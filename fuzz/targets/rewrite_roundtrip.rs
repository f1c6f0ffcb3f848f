#![no_main]

use std::collections::{BTreeMap, BTreeSet};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use redkit::rdb::{decode_verified_dump, dump_value, RdbValue};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    String(Vec<u8>),
    List(Vec<Vec<u8>>),
    Set(Vec<Vec<u8>>),
    Hash(Vec<(Vec<u8>, Vec<u8>)>),
    ZSet(Vec<(Vec<u8>, f64)>),
}

impl From<FuzzValue> for RdbValue {
    fn from(v: FuzzValue) -> Self {
        match v {
            FuzzValue::String(s) => RdbValue::String(s.into()),
            FuzzValue::List(items) => RdbValue::List(items.into_iter().map(Into::into).collect()),
            FuzzValue::Set(items) => {
                RdbValue::Set(items.into_iter().map(Into::into).collect::<BTreeSet<_>>())
            }
            FuzzValue::Hash(pairs) => RdbValue::Hash(
                pairs
                    .into_iter()
                    .map(|(f, v)| (f.into(), v.into()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            FuzzValue::ZSet(entries) => RdbValue::ZSet(
                entries
                    .into_iter()
                    .filter(|(_, score)| !score.is_nan())
                    .map(|(m, score)| (m.into(), score.into()))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

fuzz_target!(|input: FuzzValue| {
    let value = RdbValue::from(input);
    let payload = dump_value(&value);

    // Всё, что закодировали сами, должно читаться обратно без потерь.
    let decoded = decode_verified_dump(&payload).expect("own payload must decode");
    assert_eq!(decoded, value);
});
