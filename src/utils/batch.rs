use bytes::Bytes;

/// Одна операция пакетной записи.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Bytes, value: Bytes },
    Delete { key: Bytes },
}

impl BatchOp {
    pub fn key(&self) -> &Bytes {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Буфер операций в порядке поступления с учётом суммарного объёма.
#[derive(Debug, Default, Clone)]
pub struct BatchOpBuffer {
    ops: Vec<BatchOp>,
    size: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BatchOpBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(
        &mut self,
        key: Bytes,
        value: Bytes,
    ) {
        self.size += key.len() + value.len();
        self.ops.push(BatchOp::Put { key, value });
    }

    pub fn delete(
        &mut self,
        key: Bytes,
    ) {
        self.size += key.len();
        self.ops.push(BatchOp::Delete { key });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Суммарный размер ключей и значений в байтах.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchOp> {
        self.ops.iter()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Забирает накопленные операции и сбрасывает буфер.
    pub fn take(&mut self) -> Vec<BatchOp> {
        self.size = 0;
        std::mem::take(&mut self.ops)
    }

    pub fn reset(&mut self) {
        self.ops.clear();
        self.size = 0;
    }
}
