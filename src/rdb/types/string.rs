use std::io::Read;

use bytes::Bytes;
use redkit_error::RdbResult;

use super::{wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{structure::read_string, tags::RdbType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringObject {
    pub key: Bytes,
    pub value: Bytes,
}

impl RdbObject for StringObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        if tag != RdbType::String {
            return Err(wrong_tag("string", tag));
        }
        let value = read_string(r)?;
        Ok(Self { key, value })
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Ok(vec![RedisCmd::new("set", &self.key, [self.value.clone()])])
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}
