use std::io::Read;

use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};
use tracing::trace;

use super::{wrong_tag, RdbObject, RedisCmd};
use crate::rdb::{
    structure::{read_binary_float, read_double, read_length, read_string},
    tags::{ModuleOpcode, RdbType},
};

const MODULE_NAME_CHARSET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Значение модуля. Поток module2 только проходится, содержимое не
/// сохраняется.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleObject {
    pub key: Bytes,
    pub module_id: u64,
    /// Количество пропущенных значений до опкода EOF.
    pub skipped_values: usize,
}

impl ModuleObject {
    /// Имя типа модуля: 9 символов по 6 бит из старших 54 бит id.
    pub fn module_name(&self) -> String {
        let mut id = self.module_id >> 10;
        let mut name = [0u8; 9];
        for slot in name.iter_mut().rev() {
            *slot = MODULE_NAME_CHARSET[(id & 63) as usize];
            id >>= 6;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    /// Версия кодировки модуля: младшие 10 бит id.
    pub fn encoding_version(&self) -> u64 {
        self.module_id & 1023
    }
}

impl RdbObject for ModuleObject {
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self> {
        match tag {
            RdbType::Module => Err(RdbError::UnsupportedEncoding {
                encoding: "module-v1",
            }),
            RdbType::Module2 => {
                let module_id = read_length(r)?;
                let skipped_values = skip_module_values(r)?;
                Ok(Self {
                    key,
                    module_id,
                    skipped_values,
                })
            }
            other => Err(wrong_tag("module", other)),
        }
    }

    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        Err(RdbError::NotImplemented {
            what: "module rewrite",
        })
    }

    fn key(&self) -> &Bytes {
        &self.key
    }
}

/// Проходит поток опкодов до EOF и возвращает число пропущенных значений.
fn skip_module_values<R: Read>(r: &mut R) -> RdbResult<usize> {
    let mut skipped = 0;
    loop {
        let op = ModuleOpcode::from_length(read_length(r)?)?;
        trace!(?op, "module2 opcode");
        match op {
            ModuleOpcode::Eof => return Ok(skipped),
            ModuleOpcode::SInt | ModuleOpcode::UInt => {
                read_length(r)?;
            }
            ModuleOpcode::Float => {
                read_binary_float(r)?;
            }
            ModuleOpcode::Double => {
                read_double(r)?;
            }
            ModuleOpcode::String => {
                read_string(r)?;
            }
        }
        skipped += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Кодирует id модуля так же, как Redis.
    fn module_id(
        name: &[u8; 9],
        version: u64,
    ) -> u64 {
        let mut id = 0u64;
        for ch in name {
            let pos = MODULE_NAME_CHARSET.iter().position(|c| c == ch).unwrap() as u64;
            id = (id << 6) | pos;
        }
        (id << 10) | version
    }

    fn load(input: &[u8]) -> RdbResult<(ModuleObject, u64)> {
        let mut c = Cursor::new(input);
        let obj = ModuleObject::load_from_buffer(&mut c, Bytes::from("m"), RdbType::Module2)?;
        Ok((obj, c.position()))
    }

    /// Тест проверяет проход по всем опкодам и остановку курсора на EOF.
    #[test]
    fn test_module2_walk() {
        let id = module_id(b"ReJSON-RL", 3);
        let mut input = vec![0x81];
        input.extend_from_slice(&id.to_be_bytes());
        input.extend_from_slice(&[1, 0x05]); // SINT
        input.extend_from_slice(&[2, 0x40, 0xFF]); // UINT
        input.push(3); // FLOAT
        input.extend_from_slice(&1.0f32.to_le_bytes());
        input.push(4); // DOUBLE
        input.extend_from_slice(&2.0f64.to_le_bytes());
        input.extend_from_slice(&[5, 3, b'a', b'b', b'c']); // STRING
        input.push(0); // EOF
        let expected_len = input.len() as u64;
        input.extend_from_slice(b"trailing");

        let (obj, pos) = load(&input).unwrap();
        assert_eq!(pos, expected_len);
        assert_eq!(obj.skipped_values, 5);
        assert_eq!(obj.module_name(), "ReJSON-RL");
        assert_eq!(obj.encoding_version(), 3);
        assert!(matches!(
            obj.rewrite(),
            Err(RdbError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_unknown_opcode() {
        let input = [0x01, 0x09];
        assert_eq!(load(&input), Err(RdbError::UnknownModuleOpcode(9)));
    }

    #[test]
    fn test_missing_eof_is_truncated() {
        let input = [0x01, 0x01, 0x05];
        assert_eq!(load(&input), Err(RdbError::TruncatedInput));
    }

    #[test]
    fn test_module_v1_unsupported() {
        let mut c = Cursor::new(&b"\x00"[..]);
        assert_eq!(
            ModuleObject::load_from_buffer(&mut c, Bytes::new(), RdbType::Module),
            Err(RdbError::UnsupportedEncoding {
                encoding: "module-v1"
            })
        );
    }
}
