use std::io::Read;

use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{ensure_unique, into_pairs, wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{
    structure::{read_length, read_listpack, read_string, read_ziplist},
    tags::RdbType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashObject {
    pub key: Bytes,
    pub fields: Vec<(Bytes, Bytes)>,
}

impl RdbObject for HashObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        let fields = match tag {
            RdbType::Hash => {
                let len = read_length(r)?;
                let mut fields = Vec::new();
                for _ in 0..len {
                    let field = read_string(r)?;
                    let value = read_string(r)?;
                    fields.push((field, value));
                }
                fields
            }
            RdbType::HashZipmap => {
                return Err(RdbError::UnsupportedEncoding {
                    encoding: "hash-zipmap",
                })
            }
            RdbType::HashZiplist => into_pairs(read_ziplist(r)?, "ziplist")?,
            RdbType::HashListpack => into_pairs(read_listpack(r)?, "listpack")?,
            other => return Err(wrong_tag("hash", other)),
        };
        ensure_unique(fields.iter().map(|(f, _)| f), "hash")?;
        Ok(Self { key, fields })
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Ok(self
            .fields
            .iter()
            .map(|(f, v)| RedisCmd::new("hset", &self.key, [f.clone(), v.clone()]))
            .collect())
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::rdb::structure::fixtures::{build_listpack, build_ziplist, lp_str, rdb_string, zl_str};

    fn load(
        input: &[u8],
        tag: RdbType,
    ) -> RdbResult<HashObject> {
        let mut c = Cursor::new(input);
        HashObject::load_from_buffer(&mut c, Bytes::from_static(b"k"), tag)
    }

    #[test]
    fn test_plain_hash_rewrite() {
        let obj = load(b"\x02\x01a\x011\x01b\x012", RdbType::Hash).unwrap();
        let cmds = obj.rewrite().unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].parts(), &["hset", "k", "a", "1"]);
        assert_eq!(cmds[1].parts(), &["hset", "k", "b", "2"]);
    }

    #[test]
    fn test_ziplist_and_listpack_pairs() {
        let zl = build_ziplist(&[zl_str(b"f"), vec![0xF6]]);
        let obj = load(&rdb_string(&zl), RdbType::HashZiplist).unwrap();
        assert_eq!(obj.fields, vec![(Bytes::from("f"), Bytes::from("5"))]);

        let lp = build_listpack(&[lp_str(b"f"), lp_str(b"v")]);
        let obj = load(&rdb_string(&lp), RdbType::HashListpack).unwrap();
        assert_eq!(obj.fields, vec![(Bytes::from("f"), Bytes::from("v"))]);
    }

    /// Тест проверяет, что нечётное число записей отвергается без частичного
    /// результата.
    #[test]
    fn test_odd_entries_rejected() {
        let zl = build_ziplist(&[zl_str(b"a"), zl_str(b"1"), zl_str(b"b")]);
        assert!(matches!(
            load(&rdb_string(&zl), RdbType::HashZiplist),
            Err(RdbError::MalformedContainer {
                container: "ziplist",
                ..
            })
        ));
        let lp = build_listpack(&[lp_str(b"a")]);
        assert!(matches!(
            load(&rdb_string(&lp), RdbType::HashListpack),
            Err(RdbError::MalformedContainer {
                container: "listpack",
                ..
            })
        ));
    }

    /// Тест проверяет, что повторное поле хеша отвергается, а не
    /// склеивается с первым.
    #[test]
    fn test_duplicate_field_rejected() {
        assert!(matches!(
            load(b"\x02\x01a\x011\x01a\x012", RdbType::Hash),
            Err(RdbError::MalformedContainer {
                container: "hash",
                ..
            })
        ));
        let lp = build_listpack(&[lp_str(b"f"), lp_str(b"1"), lp_str(b"f"), lp_str(b"2")]);
        assert!(matches!(
            load(&rdb_string(&lp), RdbType::HashListpack),
            Err(RdbError::MalformedContainer {
                container: "hash",
                ..
            })
        ));
    }

    #[test]
    fn test_zipmap_unsupported() {
        assert_eq!(
            load(b"", RdbType::HashZipmap),
            Err(RdbError::UnsupportedEncoding {
                encoding: "hash-zipmap"
            })
        );
    }
}
