//! Вспомогательные примитивы: пулы буферов, пакетные операции, очередь
//! фоновых задач.

pub mod async_task;
pub mod batch;
pub mod buffer_pool;
pub mod slab_pool;

pub use async_task::*;
pub use batch::*;
pub use buffer_pool::*;
pub use slab_pool::*;

/// Сетевой протокол для адреса: `unix`, если адрес похож на путь, иначе
/// `tcp`.
pub fn get_proto(addr: &str) -> &'static str {
    if addr.contains('/') {
        "unix"
    } else {
        "tcp"
    }
}
