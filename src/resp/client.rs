use std::{io::Cursor, time::Duration};

use bytes::{Buf, Bytes, BytesMut};
use redkit_error::{ClientError, RedkitResult, ResultExt};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    time::timeout,
};
use tracing::{debug, info, trace, warn};

use super::{decoder::RespDecoder, encoder::encode_command, frame::RespFrame};
use crate::rdb::RedisCmd;

/// Защитный предел на размер одного ответа в буфере чтения.
const MAX_PENDING_BYTES: usize = 512 * 1024 * 1024 + 64;

/// Конфигурация клиента.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Таймаут подключения
    pub connect_timeout: Duration,
    /// Таймаут чтения одного ответа
    pub read_timeout: Duration,
    /// Таймаут записи одной команды
    pub write_timeout: Duration,
    /// Пароль для `AUTH` (опционально)
    pub password: Option<String>,
    /// Имя пользователя ACL (опционально, только вместе с паролем)
    pub username: Option<String>,
}

/// Клиент RESP для одного сервера.
///
/// Одна команда — один ответ; конвейеризация не поддерживается. После любой
/// ошибки ввода-вывода или таймаута соединение помечается закрытым и все
/// последующие вызовы возвращают `ConnectionClosed`.
pub struct RespCmdClient {
    addr: String,
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    decoder: RespDecoder,
    read_buf: BytesMut,
    write_buf: BytesMut,
    config: ClientConfig,
    closed: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
            password: None,
            username: None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RespCmdClient {
    /// Подключается к серверу и, если задан пароль, выполняет `AUTH`.
    pub async fn connect(
        addr: &str,
        config: ClientConfig,
    ) -> RedkitResult<Self> {
        debug!(addr, "connecting to resp server");
        let stream = timeout(config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::ConnectionTimeout)?
            .map_err(|e| ClientError::ConnectionFailed {
                address: addr.to_string(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        let mut client = Self {
            addr: addr.to_string(),
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            decoder: RespDecoder::new(),
            read_buf: BytesMut::with_capacity(8192),
            write_buf: BytesMut::with_capacity(1024),
            config,
            closed: false,
            bytes_read: 0,
            bytes_written: 0,
        };

        if let Some(password) = client.config.password.clone() {
            let mut args = vec![Bytes::from_static(b"AUTH")];
            if let Some(user) = client.config.username.clone() {
                args.push(Bytes::from(user));
            }
            args.push(Bytes::from(password));
            client.send(&args).await.context("authentication failed")?;
        }

        info!(addr, "connected to resp server");
        Ok(client)
    }

    /// Отправляет команду и ждёт один ответ. Ответ `-ERR ...` превращается
    /// в `ClientError::ServerError`.
    pub async fn send<T: AsRef<[u8]>>(
        &mut self,
        args: &[T],
    ) -> RedkitResult<RespFrame> {
        if self.closed {
            return Err(ClientError::ConnectionClosed.into());
        }
        let result = self.roundtrip(args).await;
        match result {
            Ok(RespFrame::Error(message)) => Err(ClientError::ServerError { message }.into()),
            Ok(frame) => Ok(frame),
            Err(e) => {
                warn!(addr = %self.addr, error = %e, "closing resp connection");
                self.closed = true;
                Err(e.into())
            }
        }
    }

    pub async fn send_cmd(
        &mut self,
        cmd: &RedisCmd,
    ) -> RedkitResult<RespFrame> {
        self.send(cmd.parts()).await
    }

    pub async fn ping(&mut self) -> RedkitResult<()> {
        match self.send(&["PING"]).await? {
            RespFrame::Simple(s) if s == "PONG" => Ok(()),
            other => Err(unexpected("PONG", &other)),
        }
    }

    /// `DUMP key`: сырой пакет или `None`, если ключа нет.
    pub async fn dump(
        &mut self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>> {
        match self.send(&[&b"DUMP"[..], key]).await? {
            RespFrame::Bulk(payload) => Ok(payload),
            other => Err(unexpected("bulk string", &other)),
        }
    }

    /// `RESTORE key ttl payload [REPLACE]`.
    pub async fn restore(
        &mut self,
        key: &[u8],
        ttl_ms: u64,
        payload: &[u8],
        replace: bool,
    ) -> RedkitResult<()> {
        let ttl = ttl_ms.to_string();
        let mut args: Vec<&[u8]> = vec![&b"RESTORE"[..], key, ttl.as_bytes(), payload];
        if replace {
            args.push(b"REPLACE");
        }
        match self.send(&args).await? {
            RespFrame::Simple(s) if s == "OK" => Ok(()),
            other => Err(unexpected("OK", &other)),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub async fn close(mut self) -> RedkitResult<()> {
        debug!(addr = %self.addr, "closing resp connection");
        self.closed = true;
        self.writer
            .shutdown()
            .await
            .context("failed to shutdown connection")?;
        Ok(())
    }

    async fn roundtrip<T: AsRef<[u8]>>(
        &mut self,
        args: &[T],
    ) -> Result<RespFrame, ClientError> {
        self.write_buf.clear();
        encode_command(args, &mut self.write_buf);
        timeout(self.config.write_timeout, async {
            self.writer.write_all(&self.write_buf).await?;
            self.writer.flush().await?;
            Ok::<_, std::io::Error>(())
        })
        .await
        .map_err(|_| ClientError::WriteTimeout)??;
        self.bytes_written += self.write_buf.len() as u64;
        trace!(addr = %self.addr, len = self.write_buf.len(), "command sent");

        timeout(self.config.read_timeout, self.read_frame())
            .await
            .map_err(|_| ClientError::ReadTimeout)?
    }

    async fn read_frame(&mut self) -> Result<RespFrame, ClientError> {
        loop {
            if !self.read_buf.is_empty() {
                let mut cursor = Cursor::new(&self.read_buf[..]);
                if let Some(frame) = self.decoder.decode(&mut cursor)? {
                    let consumed = cursor.position() as usize;
                    self.read_buf.advance(consumed);
                    return Ok(frame);
                }
            }
            if self.read_buf.len() > MAX_PENDING_BYTES {
                return Err(ClientError::Protocol {
                    reason: "reply exceeds the read buffer limit".to_string(),
                });
            }
            let n = self.reader.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            self.bytes_read += n as u64;
        }
    }
}

fn unexpected(
    expected: &'static str,
    got: &RespFrame,
) -> redkit_error::StackError {
    ClientError::UnexpectedResponse {
        expected,
        got: got.to_string(),
    }
    .into()
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
