//! Протокол RESP2: фреймы, декодер, кодирование команд и асинхронный
//! клиент, через которого выполняются `DUMP`/`RESTORE` и переписанные
//! команды.

pub mod client;
pub mod decoder;
pub mod encoder;
pub mod frame;

pub use client::*;
pub use decoder::*;
pub use encoder::*;
pub use frame::*;
