use std::io::Read;

use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{
    structure::{read_length, read_listpack, read_string, read_ziplist},
    tags::{ContainerKind, RdbType},
};

/// Список; порядок элементов значим.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObject {
    pub key: Bytes,
    pub entries: Vec<Bytes>,
}

impl RdbObject for ListObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        let entries = match tag {
            RdbType::List => {
                let len = read_length(r)?;
                let mut entries = Vec::new();
                for _ in 0..len {
                    entries.push(read_string(r)?);
                }
                entries
            }
            RdbType::ListZiplist => read_ziplist(r)?,
            RdbType::ListQuicklist => {
                let nodes = read_length(r)?;
                let mut entries = Vec::new();
                for _ in 0..nodes {
                    entries.extend(read_ziplist(r)?);
                }
                entries
            }
            RdbType::ListQuicklist2 => read_quicklist2(r)?,
            other => return Err(wrong_tag("list", other)),
        };
        Ok(Self { key, entries })
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Ok(self
            .entries
            .iter()
            .map(|e| RedisCmd::new("rpush", &self.key, [e.clone()]))
            .collect())
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}

/// Quicklist v2: перед каждым узлом идёт вид контейнера (1 — plain, 2 —
/// packed listpack).
fn read_quicklist2<R: Read>(r: &mut R) -> RdbResult<Vec<Bytes>> {
    let nodes = read_length(r)?;
    let mut entries = Vec::new();
    for _ in 0..nodes {
        let raw = read_length(r)?;
        let kind = u8::try_from(raw)
            .ok()
            .and_then(|b| ContainerKind::try_from(b).ok())
            .ok_or(RdbError::UnknownContainerKind(raw))?;
        match kind {
            ContainerKind::Plain => entries.push(read_string(r)?),
            ContainerKind::Packed => entries.extend(read_listpack(r)?),
        }
    }
    Ok(entries)
}
