use bytes::BytesMut;
use parking_lot::Mutex;

/// Пул переиспользуемых `BytesMut` для кодирования пакетов и команд.
///
/// Буфер очищается при возврате; пул хранит не больше `max_pooled` буферов,
/// лишние просто освобождаются.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<BytesMut>>,
    buffer_capacity: usize,
    max_pooled: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BufferPool {
    pub fn new(
        buffer_capacity: usize,
        max_pooled: usize,
    ) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(max_pooled)),
            buffer_capacity,
            max_pooled,
        }
    }

    pub fn get(&self) -> BytesMut {
        self.buffers
            .lock()
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(self.buffer_capacity))
    }

    pub fn put(
        &self,
        mut buf: BytesMut,
    ) {
        buf.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_pooled {
            buffers.push(buf);
        }
    }

    /// Количество буферов, ожидающих повторного использования.
    pub fn pooled(&self) -> usize {
        self.buffers.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(4096, 64)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    #[test]
    fn test_returned_buffer_is_cleared_and_reused() {
        let pool = BufferPool::new(16, 2);
        let mut buf = pool.get();
        buf.put_slice(b"payload");
        let cap = buf.capacity();
        pool.put(buf);
        assert_eq!(pool.pooled(), 1);

        let again = pool.get();
        assert!(again.is_empty());
        assert_eq!(again.capacity(), cap);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn test_pool_is_bounded() {
        let pool = BufferPool::new(8, 1);
        pool.put(BytesMut::new());
        pool.put(BytesMut::new());
        assert_eq!(pool.pooled(), 1);
    }
}
