//! Группы команд хранилища и применение команд переписывания.

use async_trait::async_trait;
use bytes::Bytes;
use redkit_error::{DriverError, RedkitResult};
use tracing::trace;

use crate::{rdb::RedisCmd, resp::RespCmdClient};

#[async_trait]
pub trait StringCmd: Send + Sync {
    async fn set(
        &self,
        key: &[u8],
        value: Bytes,
    ) -> RedkitResult<()>;

    async fn get(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>>;
}

#[async_trait]
pub trait ListCmd: Send + Sync {
    /// Возвращает длину списка после вставки.
    async fn rpush(
        &self,
        key: &[u8],
        values: Vec<Bytes>,
    ) -> RedkitResult<usize>;

    /// Диапазон с отрицательными индексами от конца, как в Redis.
    async fn lrange(
        &self,
        key: &[u8],
        start: i64,
        stop: i64,
    ) -> RedkitResult<Vec<Bytes>>;

    async fn llen(
        &self,
        key: &[u8],
    ) -> RedkitResult<usize>;
}

#[async_trait]
pub trait HashCmd: Send + Sync {
    /// `true`, если поле новое.
    async fn hset(
        &self,
        key: &[u8],
        field: Bytes,
        value: Bytes,
    ) -> RedkitResult<bool>;

    async fn hget(
        &self,
        key: &[u8],
        field: &[u8],
    ) -> RedkitResult<Option<Bytes>>;

    async fn hgetall(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<(Bytes, Bytes)>>;
}

#[async_trait]
pub trait SetCmd: Send + Sync {
    /// Число добавленных (ранее отсутствовавших) элементов.
    async fn sadd(
        &self,
        key: &[u8],
        members: Vec<Bytes>,
    ) -> RedkitResult<usize>;

    async fn smembers(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<Bytes>>;
}

#[async_trait]
pub trait ZSetCmd: Send + Sync {
    /// `true`, если элемент новый.
    async fn zadd(
        &self,
        key: &[u8],
        score: f64,
        member: Bytes,
    ) -> RedkitResult<bool>;

    async fn zscore(
        &self,
        key: &[u8],
        member: &[u8],
    ) -> RedkitResult<Option<f64>>;

    /// Все элементы по возрастанию score.
    async fn zrange_with_scores(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<(Bytes, f64)>>;
}

#[async_trait]
pub trait CommonCmd: Send + Sync {
    async fn del(
        &self,
        key: &[u8],
    ) -> RedkitResult<bool>;

    async fn exists(
        &self,
        key: &[u8],
    ) -> RedkitResult<bool>;

    /// Имя типа значения (`string`, `list`, ...) или `None`.
    async fn key_type(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<&'static str>>;

    /// Сериализует значение ключа в DUMP-пакет.
    async fn dump(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>>;

    /// Восстанавливает ключ из DUMP-пакета с проверкой футера.
    async fn restore(
        &self,
        key: &[u8],
        payload: &[u8],
        replace: bool,
    ) -> RedkitResult<()>;
}

/// Логическая база данных: все группы команд сразу.
pub trait Db: StringCmd + ListCmd + HashCmd + SetCmd + ZSetCmd + CommonCmd {}

impl<T> Db for T where T: StringCmd + ListCmd + HashCmd + SetCmd + ZSetCmd + CommonCmd {}

/// Получатель команд переписывания. Команды применяются строго по
/// порядку; атомарность на уровне ключа не гарантируется.
#[async_trait]
pub trait CommandSink: Send {
    async fn apply(
        &mut self,
        cmds: &[RedisCmd],
    ) -> RedkitResult<()>;
}

#[async_trait]
impl CommandSink for RespCmdClient {
    async fn apply(
        &mut self,
        cmds: &[RedisCmd],
    ) -> RedkitResult<()> {
        for cmd in cmds {
            self.send_cmd(cmd).await?;
        }
        Ok(())
    }
}

/// Применяет команды переписывания (`set`, `rpush`, `sadd`, `hset`, `zadd`,
/// `del`) к базе по порядку.
pub async fn replay_commands<D>(
    db: &D,
    cmds: &[RedisCmd],
) -> RedkitResult<()>
where
    D: Db + ?Sized,
{
    for cmd in cmds {
        let name = cmd.name();
        let args = cmd.args();
        trace!(command = %cmd, "replaying command");
        match name.as_str() {
            "set" => {
                let [key, value] = args else {
                    return Err(arity(&name, "2", args.len()));
                };
                db.set(key, value.clone()).await?;
            }
            "rpush" => {
                let Some((key, values)) = args.split_first().filter(|(_, v)| !v.is_empty()) else {
                    return Err(arity(&name, "at least 2", args.len()));
                };
                db.rpush(key, values.to_vec()).await?;
            }
            "sadd" => {
                let Some((key, members)) = args.split_first().filter(|(_, m)| !m.is_empty())
                else {
                    return Err(arity(&name, "at least 2", args.len()));
                };
                db.sadd(key, members.to_vec()).await?;
            }
            "hset" => {
                let Some((key, pairs)) = args
                    .split_first()
                    .filter(|(_, p)| !p.is_empty() && p.len() % 2 == 0)
                else {
                    return Err(arity(&name, "key and field/value pairs", args.len()));
                };
                for pair in pairs.chunks_exact(2) {
                    db.hset(key, pair[0].clone(), pair[1].clone()).await?;
                }
            }
            "zadd" => {
                let Some((key, pairs)) = args
                    .split_first()
                    .filter(|(_, p)| !p.is_empty() && p.len() % 2 == 0)
                else {
                    return Err(arity(&name, "key and score/member pairs", args.len()));
                };
                for pair in pairs.chunks_exact(2) {
                    db.zadd(key, parse_score(&pair[0])?, pair[1].clone()).await?;
                }
            }
            "del" => {
                if args.is_empty() {
                    return Err(arity(&name, "at least 1", 0));
                }
                for key in args {
                    db.del(key).await?;
                }
            }
            _ => {
                return Err(DriverError::UnknownCommand {
                    command: name.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Разбирает score так же, как его печатает `format_score`
/// (включая `inf` и `-inf`).
pub fn parse_score(raw: &[u8]) -> Result<f64, DriverError> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| DriverError::InvalidNumber {
            value: String::from_utf8_lossy(raw).into_owned(),
        })
}

fn arity(
    command: &str,
    expected: &'static str,
    got: usize,
) -> redkit_error::StackError {
    DriverError::WrongArity {
        command: command.to_string(),
        expected,
        got,
    }
    .into()
}
