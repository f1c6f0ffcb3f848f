//! Примитивы формата RDB и упакованные контейнеры.
//!
//! Все функции читают из любого [`std::io::Read`] ровно столько байт,
//! сколько требует значение, и возвращают `TruncatedInput`, если данных
//! меньше. Состояния нет, поэтому вызовы можно выполнять параллельно на
//! независимых входах.
//!
//! - [`byte`] — сырые байты
//! - [`length`] — длины переменной ширины
//! - [`string`] — строки, включая целочисленные кодировки
//! - [`float`] — legacy-float и double
//! - [`intset`], [`ziplist`], [`listpack`] — упакованные контейнеры

pub mod byte;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod float;
pub mod intset;
pub mod length;
pub mod listpack;
pub mod string;
pub mod ziplist;

pub use byte::*;
pub use float::*;
pub use intset::*;
pub use length::*;
pub use listpack::*;
pub use string::*;
pub use ziplist::*;
