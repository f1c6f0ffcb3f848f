//! CLI redkit
//!
//! Разбор DUMP-пакетов в команды записи и перенос ключей между двумя
//! RESP-совместимыми серверами через `DUMP` и повтор команд.

use std::{
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use redkit::{
    decode_dump_to_commands,
    driver::CommandSink,
    init_logging,
    rdb::verify_dump_payload,
    resp::{encode_redis_cmd, ClientConfig, RespCmdClient},
    LoggingHandle, RedisCmd, Settings,
};
use tracing::{debug, info, warn};

/// Аргументы командной строки
#[derive(Parser)]
#[command(name = "redkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
))]
#[command(about = "Redis DUMP payload decoder and key migration tool", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Файл конфигурации (toml, json, yaml)
    #[arg(short, long, env = "REDKIT_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Подробный вывод (debug)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Только ошибки
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Формат вывода команд
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// По команде в строке
    Text,
    /// Массивы RESP, пригодные для `redis-cli --pipe`
    Resp,
}

#[derive(Subcommand)]
enum Commands {
    /// Разобрать DUMP-пакет и напечатать команды переписывания
    Decode {
        /// Файл с пакетом или `-` для stdin
        input: String,
        /// Ключ, под которым печатаются команды
        #[arg(short, long, default_value = "key")]
        key: String,
        /// Проверить версию и CRC-64 футера даже при `verify_checksum = false`
        #[arg(long)]
        verify: bool,
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Перенести ключи с одного сервера на другой
    Migrate {
        /// Адрес сервера-источника (host:port)
        #[arg(long)]
        source: String,
        /// Адрес сервера-приёмника (host:port)
        #[arg(long)]
        target: String,
        /// Удалять ключ на приёмнике перед записью
        #[arg(long)]
        replace: bool,
        /// Переносимые ключи
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(cli.config.clone()).context("failed to load settings")?;
    let _logging = setup_logging(&cli, &settings)?;

    debug!(
        config = ?cli.config,
        verify_checksum = settings.verify_checksum,
        "settings loaded"
    );

    match cli.command {
        Commands::Decode {
            input,
            key,
            verify,
            output,
        } => decode(&settings, &input, &key, verify, output),
        Commands::Migrate {
            source,
            target,
            replace,
            keys,
        } => migrate(&settings, &source, &target, replace, &keys).await,
    }
}

fn setup_logging(
    cli: &Cli,
    settings: &Settings,
) -> Result<LoggingHandle> {
    let mut config = settings.logging_config();
    if cli.verbose {
        config.level = "debug".to_string();
    } else if cli.quiet {
        config.level = "error".to_string();
    }
    init_logging(config).map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if input == "-" {
        io::stdin()
            .lock()
            .read_to_end(&mut data)
            .context("failed to read payload from stdin")?;
    } else {
        data = std::fs::read(input).with_context(|| format!("failed to read {input}"))?;
    }
    Ok(data)
}

fn decode(
    settings: &Settings,
    input: &str,
    key: &str,
    verify: bool,
    output: OutputFormat,
) -> Result<()> {
    let payload = read_input(input)?;
    if settings.verify_dump(verify) {
        let version = verify_dump_payload(&payload)?;
        debug!(version, "dump footer verified");
    }

    let cmds = decode_dump_to_commands(&payload, key.as_bytes())?;
    info!(key, commands = cmds.len(), "payload decoded");
    print_commands(settings, &cmds, output)
}

fn print_commands(
    settings: &Settings,
    cmds: &[RedisCmd],
    output: OutputFormat,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputFormat::Text => {
            for cmd in cmds {
                writeln!(out, "{cmd}")?;
            }
        }
        OutputFormat::Resp => {
            let pool = settings.buffer_pool();
            for cmd in cmds {
                let mut buf = pool.get();
                encode_redis_cmd(cmd, &mut buf);
                out.write_all(&buf)?;
                pool.put(buf);
            }
        }
    }
    out.flush()?;
    Ok(())
}

async fn migrate(
    settings: &Settings,
    source: &str,
    target: &str,
    replace: bool,
    keys: &[String],
) -> Result<()> {
    if source == target {
        bail!("source and target must differ");
    }
    let config: ClientConfig = settings.client_config();
    let mut src = RespCmdClient::connect(source, config.clone())
        .await
        .with_context(|| format!("failed to connect to source {source}"))?;
    let mut dst = RespCmdClient::connect(target, config)
        .await
        .with_context(|| format!("failed to connect to target {target}"))?;

    let mut migrated = 0usize;
    let mut missing = 0usize;
    for key in keys {
        let Some(payload) = src.dump(key.as_bytes()).await? else {
            warn!(key = %key, "key not found on source, skipping");
            missing += 1;
            continue;
        };
        if settings.verify_dump(false) {
            verify_dump_payload(&payload).with_context(|| format!("bad dump for key {key}"))?;
        }

        let mut cmds = decode_dump_to_commands(&payload, key.as_bytes())
            .with_context(|| format!("failed to decode dump for key {key}"))?;
        if replace {
            cmds.insert(0, RedisCmd::from_parts(vec!["del".into(), key.clone().into()]));
        }
        dst.apply(&cmds).await?;
        debug!(key = %key, commands = cmds.len(), "key migrated");
        migrated += 1;
    }

    info!(
        migrated,
        missing,
        bytes_read = src.bytes_read(),
        bytes_written = dst.bytes_written(),
        "migration finished"
    );
    println!("migrated {migrated} keys, {missing} missing");

    src.close().await?;
    dst.close().await?;
    Ok(())
}
