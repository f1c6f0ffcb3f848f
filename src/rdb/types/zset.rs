use std::io::Read;

use bytes::Bytes;
use redkit_error::RdbResult;

use super::{ensure_unique, into_pairs, wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{
    structure::{
        parse_float, read_double, read_float, read_length, read_listpack, read_string, read_ziplist,
    },
    tags::RdbType,
};

/// Упорядоченное множество: пары (member, score).
///
/// Legacy-кодировки хранят score текстом, zset2 — бинарным double; после
/// разбора оба варианта дают одно и то же `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSetObject {
    pub key: Bytes,
    pub entries: Vec<(Bytes, f64)>,
}

impl RdbObject for ZSetObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        let entries = match tag {
            RdbType::ZSet | RdbType::ZSet2 => {
                let len = read_length(r)?;
                let mut entries = Vec::new();
                for _ in 0..len {
                    let member = read_string(r)?;
                    let score = if tag == RdbType::ZSet2 {
                        read_double(r)?
                    } else {
                        read_float(r)?
                    };
                    entries.push((member, score));
                }
                entries
            }
            RdbType::ZSetZiplist => scored_pairs(into_pairs(read_ziplist(r)?, "ziplist")?)?,
            RdbType::ZSetListpack => scored_pairs(into_pairs(read_listpack(r)?, "listpack")?)?,
            other => return Err(wrong_tag("zset", other)),
        };
        ensure_unique(entries.iter().map(|(m, _)| m), "zset")?;
        Ok(Self { key, entries })
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Ok(self
            .entries
            .iter()
            .map(|(member, score)| {
                RedisCmd::new("zadd", &self.key, [format_score(*score), member.clone()])
            })
            .collect())
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}

/// Текстовое представление score для команды `zadd`: кратчайшая запись,
/// однозначно восстанавливающая `f64` (`inf` и `-inf` для бесконечностей).
pub fn format_score(score: f64) -> Bytes {
    Bytes::from(score.to_string())
}

fn scored_pairs(pairs: Vec<(Bytes, Bytes)>) -> RdbResult<Vec<(Bytes, f64)>> {
    pairs
        .into_iter()
        .map(|(member, score)| Ok((member, parse_float(&score)?)))
        .collect()
}
