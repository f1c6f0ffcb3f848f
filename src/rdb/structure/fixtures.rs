//! Сборщики упакованных контейнеров для тестов.

use super::listpack::backlen_size;

/// Собирает ziplist из закодированных записей, дописывая prevlen.
pub(crate) fn build_ziplist(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    let mut prev_len = 0usize;
    let mut tail = 10usize;
    for e in entries {
        tail = 10 + body.len();
        let mut entry = Vec::new();
        if prev_len < 254 {
            entry.push(prev_len as u8);
        } else {
            entry.push(0xFE);
            entry.extend_from_slice(&(prev_len as u32).to_le_bytes());
        }
        entry.extend_from_slice(e);
        prev_len = entry.len();
        body.extend_from_slice(&entry);
    }
    let total = 10 + body.len() + 1;
    let mut blob = Vec::with_capacity(total);
    blob.extend_from_slice(&(total as u32).to_le_bytes());
    blob.extend_from_slice(&(tail as u32).to_le_bytes());
    blob.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    blob.extend_from_slice(&body);
    blob.push(0xFF);
    blob
}

/// Строковая запись ziplist до 63 байт.
pub(crate) fn zl_str(s: &[u8]) -> Vec<u8> {
    let mut e = vec![s.len() as u8];
    e.extend_from_slice(s);
    e
}

/// Собирает listpack из закодированных записей, дописывая back-length.
pub(crate) fn build_listpack(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut body = Vec::new();
    for e in entries {
        body.extend_from_slice(e);
        body.extend(encode_backlen(e.len() as u64));
    }
    let total = 6 + body.len() + 1;
    let mut blob = Vec::with_capacity(total);
    blob.extend_from_slice(&(total as u32).to_le_bytes());
    blob.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    blob.extend_from_slice(&body);
    blob.push(0xFF);
    blob
}

fn encode_backlen(mut l: u64) -> Vec<u8> {
    let size = backlen_size(l) as usize;
    let mut out = vec![0u8; size];
    for (i, b) in out.iter_mut().rev().enumerate() {
        *b = (l & 0x7F) as u8;
        if i + 1 < size {
            *b |= 0x80;
        }
        l >>= 7;
    }
    out
}

/// Строковая запись listpack до 63 байт.
pub(crate) fn lp_str(s: &[u8]) -> Vec<u8> {
    let mut e = vec![0x80 | s.len() as u8];
    e.extend_from_slice(s);
    e
}

/// Intset заданной ширины.
pub(crate) fn build_intset(
    width: u32,
    values: &[i64],
) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(&width.to_le_bytes());
    blob.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for v in values {
        blob.extend_from_slice(&v.to_le_bytes()[..width as usize]);
    }
    blob
}

/// Оборачивает блоб в RDB-строку с префиксом длины.
pub(crate) fn rdb_string(blob: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let n = blob.len();
    if n < 64 {
        out.push(n as u8);
    } else if n < 16_384 {
        out.push(0x40 | (n >> 8) as u8);
        out.push((n & 0xFF) as u8);
    } else {
        out.push(0x80);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    }
    out.extend_from_slice(blob);
    out
}
