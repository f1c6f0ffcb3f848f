use std::io::Read;

use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{wrong_tag, RdbObject, RedisCmd};
use crate::rdb::tags::RdbType;

/// Поток. Кодировки stream-listpacks распознаются, но не материализуются.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamObject {
    pub key: Bytes,
}

impl RdbObject for StreamObject {
    fn load_from_buffer<R: Read>(
        _r: &mut R,
        _key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        match tag {
            RdbType::StreamListpacks | RdbType::StreamListpacks2 => {
                Err(RdbError::NotImplemented {
                    what: tag.encoding_name(),
                })
            }
            other => Err(wrong_tag("stream", other)),
        }
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Err(RdbError::NotImplemented {
            what: "stream rewrite",
        })
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_stream_not_implemented() {
        let mut c = Cursor::new(&b"\x00"[..]);
        assert_eq!(
            StreamObject::load_from_buffer(&mut c, Bytes::new(), RdbType::StreamListpacks2),
            Err(RdbError::NotImplemented {
                what: "stream-listpacks2"
            })
        );
        let obj = StreamObject {
            key: Bytes::from("s"),
        };
        assert!(obj.rewrite().is_err());
    }
}
