//! Property-based тесты для кодека DUMP-пакетов.
//!
//! Тесты генерируют случайные значения `RdbValue` и проверяют, что
//! encode/decode не теряет данные, а испорченные пакеты отвергаются
//! ошибкой, без паники.

use bytes::Bytes;
use proptest::prelude::*;
use redkit::rdb::{
    decode_dump, decode_dump_to_commands, decode_verified_dump, dump_value, verify_dump_payload,
};
use redkit_error::RdbError;

use generators::*;

const PROPTEST_CASES: u32 = 256;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        .. ProptestConfig::default()
    })]

    /// Главный roundtrip тест: любое значение читается обратно без потерь.
    #[test]
    fn roundtrip_all_values(value in rdb_value_strategy()) {
        let payload = dump_value(&value);

        let decoded = decode_verified_dump(&payload)
            .map_err(|e| TestCaseError::fail(format!("Failed to decode value: {e}")))?;

        prop_assert_eq!(decoded, value);
    }

    /// Переписывание даёт по команде на элемент, и все команды адресуют
    /// переданный ключ.
    #[test]
    fn rewrite_targets_key(value in rdb_value_strategy(), key in bytes_strategy()) {
        let payload = dump_value(&value);
        let cmds = decode_dump_to_commands(&payload, &key)
            .map_err(|e| TestCaseError::fail(format!("Failed to rewrite value: {e}")))?;

        prop_assert_eq!(cmds.len(), expected_command_count(&value));
        for cmd in &cmds {
            prop_assert_eq!(cmd.key(), Some(&key));
        }
    }

    /// Пакет без футера тоже декодируется.
    #[test]
    fn footer_is_optional(value in rdb_value_strategy()) {
        let payload = dump_value(&value);
        let body = &payload[..payload.len() - 10];

        let decoded = decode_dump(body)
            .map_err(|e| TestCaseError::fail(format!("Failed to decode body: {e}")))?;
        prop_assert_eq!(decoded, value);
    }

    /// Любой обрезанный внутри тела пакет даёт `TruncatedInput`.
    #[test]
    fn truncated_body_is_rejected(value in rdb_value_strategy(), cut in any::<prop::sample::Index>()) {
        let payload = dump_value(&value);
        let body_len = payload.len() - 10;
        let at = cut.index(body_len);

        let err = decode_dump(&payload[..at]).unwrap_err();
        prop_assert_eq!(err, RdbError::TruncatedInput);
    }

    /// Изменение любого байта до контрольной суммы ломает проверку футера.
    #[test]
    fn tampered_payload_fails_verification(
        value in rdb_value_strategy(),
        pos in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let mut payload = dump_value(&value).to_vec();
        let covered = payload.len() - 8;
        payload[pos.index(covered)] ^= flip;

        prop_assert!(verify_dump_payload(&payload).is_err());
    }

    /// Декодер не паникует на произвольных байтах.
    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_dump(&data);
        let _ = decode_dump_to_commands(&data, b"k");
        let _ = verify_dump_payload(&data);
    }

    /// Ziplist и listpack дают одинаковый хеш для одних и тех же пар.
    #[test]
    fn packed_hash_encodings_agree(
        pairs in prop::collection::btree_map("[a-z]{1,20}", "[a-z0-9]{0,20}", 0..16)
    ) {
        let flat: Vec<&[u8]> = pairs
            .iter()
            .flat_map(|(f, v)| [f.as_bytes(), v.as_bytes()])
            .collect();

        let from_ziplist = decode_dump(&payload(13, &rdb_string(&ziplist(&flat)))).unwrap();
        let from_listpack = decode_dump(&payload(16, &rdb_string(&listpack(&flat)))).unwrap();
        prop_assert_eq!(&from_ziplist, &from_listpack);

        let cmds = decode_dump_to_commands(&payload(16, &rdb_string(&listpack(&flat))), b"h").unwrap();
        prop_assert_eq!(cmds.len(), pairs.len());
        for cmd in cmds {
            prop_assert_eq!(cmd.name(), "hset");
            let field = String::from_utf8(cmd.args()[1].to_vec()).unwrap();
            prop_assert_eq!(
                Bytes::from(pairs[&field].clone()),
                cmd.args()[2].clone()
            );
        }
    }
}
