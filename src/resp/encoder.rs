use bytes::{BufMut, BytesMut};

use crate::rdb::RedisCmd;

/// Кодирует команду как RESP-массив bulk-строк прямо в `buf`, без
/// промежуточного [`super::RespFrame`].
pub fn encode_command<T: AsRef<[u8]>>(
    args: &[T],
    buf: &mut BytesMut,
) {
    buf.put_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        let arg = arg.as_ref();
        buf.put_slice(format!("${}\r\n", arg.len()).as_bytes());
        buf.put_slice(arg);
        buf.put_slice(b"\r\n");
    }
}

/// Кодирует команду переписывания.
pub fn encode_redis_cmd(
    cmd: &RedisCmd,
    buf: &mut BytesMut,
) {
    encode_command(cmd.parts(), buf);
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::resp::RespFrame;

    /// Тест проверяет, что прямое кодирование совпадает с кодированием
    /// через фрейм.
    #[test]
    fn test_matches_frame_encoding() {
        let args = ["hset", "k", "f", "v\r\n"];
        let mut direct = BytesMut::new();
        encode_command(&args, &mut direct);
        assert_eq!(direct.freeze(), RespFrame::command(args).to_bytes());
    }

    #[test]
    fn test_redis_cmd() {
        let cmd = RedisCmd::new("set", &Bytes::from("k"), [Bytes::from("v")]);
        let mut buf = BytesMut::new();
        encode_redis_cmd(&cmd, &mut buf);
        assert_eq!(&buf[..], b"*3\r\n$3\r\nset\r\n$1\r\nk\r\n$1\r\nv\r\n");
    }
}
