use std::io::Read;

use bytes::Bytes;
use redkit_error::RdbResult;

use super::{ensure_unique, wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{
    structure::{read_intset, read_length, read_string},
    tags::RdbType,
};

/// Множество. Порядок `members` — порядок в пакете, а не вставки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetObject {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl RdbObject for SetObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        let members = match tag {
            RdbType::Set => {
                let len = read_length(r)?;
                let mut members = Vec::new();
                for _ in 0..len {
                    members.push(read_string(r)?);
                }
                members
            }
            RdbType::SetIntset => read_intset(r)?,
            other => return Err(wrong_tag("set", other)),
        };
        ensure_unique(&members, "set")?;
        Ok(Self { key, members })
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Ok(self
            .members
            .iter()
            .map(|m| RedisCmd::new("sadd", &self.key, [m.clone()]))
            .collect())
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}
