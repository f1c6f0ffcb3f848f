use parking_lot::Mutex;

/// Пул байтовых буферов по классам размеров.
///
/// Классы идут от `min` до `max` включительно, каждый следующий в `factor`
/// раз больше предыдущего. При `factor < 2` пул отключён и каждый запрос
/// даёт новый буфер. Запросы больше `max` также обслуживаются новым
/// буфером, а при возврате такие буферы не кэшируются.
#[derive(Debug)]
pub struct SlabPool {
    classes: Vec<SlabClass>,
}

#[derive(Debug)]
struct SlabClass {
    size: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SlabPool {
    pub fn new(
        min: usize,
        max: usize,
        factor: f64,
    ) -> Self {
        let mut classes = Vec::new();
        if factor >= 2.0 && min > 0 {
            let mut size = min;
            while size <= max {
                classes.push(SlabClass {
                    size,
                    free: Mutex::new(Vec::new()),
                });
                size = (size as f64 * factor) as usize;
            }
        }
        Self { classes }
    }

    pub fn is_enabled(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Размеры классов по возрастанию.
    pub fn class_sizes(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.size).collect()
    }

    /// Буфер длины `size`, заполненный нулями.
    pub fn alloc(
        &self,
        size: usize,
    ) -> Vec<u8> {
        let Some(class) = self.classes.iter().find(|c| c.size >= size) else {
            return vec![0; size];
        };
        let mut buf = class
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(class.size));
        buf.clear();
        buf.resize(size, 0);
        buf
    }

    /// Возвращает буфер в класс, совпадающий по ёмкости.
    pub fn free(
        &self,
        buf: Vec<u8>,
    ) {
        if let Some(class) = self.classes.iter().find(|c| c.size == buf.capacity()) {
            class.free.lock().push(buf);
        }
    }

    /// Количество буферов, ожидающих повторного использования.
    pub fn pooled(&self) -> usize {
        self.classes.iter().map(|c| c.free.lock().len()).sum()
    }
}
