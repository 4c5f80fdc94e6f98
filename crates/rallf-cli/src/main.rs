//! rallf - タスクをローカルで mock に対して実行する CLI
//!
//! ```text
//! rallf init tasks/weather
//! rallf run tasks/weather --input '{"city":"Tokyo"}' --linger 30
//! rallf emit tasks/weather alert:weather '{"level":"storm"}'
//! ```

mod demo;
mod logging;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rallf_core::app::EventChannel;
use rallf_core::domain::event::lenient_json;
use rallf_core::{DelegationError, EventEnvelope, Manifest, RunError, RunnerBuilder, RunnerConfig};
use serde_json::Value;
use tracing::{error, info};

use crate::logging::LogFormat;

/// プロジェクト内のランナー設定（任意）
const RUNNER_CONFIG_PATH: &str = "config/runner.json";

#[derive(Parser, Debug)]
#[command(name = "rallf", version, about = "Run rallf tasks against mocked skills and devices")]
struct Cli {
    /// ログの出力形式
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "RALLF_LOG_FORMAT", global = true)]
    log_format: LogFormat,

    /// ANSI カラーを無効化
    #[arg(long, global = true)]
    no_color: bool,

    /// 詳細ログ（-v: debug, -vv: trace）。RUST_LOG があればそちらが優先
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// タスクプロジェクトの雛形（config/manifest.json）を作る
    Init {
        dir: PathBuf,

        /// タスク名（省略時はディレクトリ名）
        #[arg(long)]
        name: Option<String>,

        /// エントリポイント
        #[arg(long, default_value = demo::DEFAULT_MAIN)]
        main: String,

        /// 既存の manifest を上書きする
        #[arg(long)]
        force: bool,
    },

    /// タスクを作成して実行し、結果を JSON で stdout に出す
    Run {
        dir: PathBuf,

        /// タスクの input（JSON として読めなければ文字列）
        #[arg(long)]
        input: Option<String>,

        /// 使う mock bundle
        #[arg(long, default_value = "default")]
        mock: String,

        /// 実行後もイベントチャネルを監視し続ける秒数
        #[arg(long, default_value_t = 0)]
        linger: u64,
    },

    /// イベントチャネルに `<type>:<name> <payload>` を書き込む
    Emit {
        dir: PathBuf,

        /// `<event_type>:<event_name>`
        event: String,

        /// payload（複数語は空白で連結）
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        payload: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, !cli.no_color, cli.verbose);

    match cli.command {
        Command::Init {
            dir,
            name,
            main,
            force,
        } => init(&dir, name, main, force),
        Command::Run {
            dir,
            input,
            mock,
            linger,
        } => run(&dir, input.as_deref(), &mock, linger).await,
        Command::Emit {
            dir,
            event,
            payload,
        } => emit(&dir, &event, &payload.join(" ")),
    }
}

fn init(dir: &Path, name: Option<String>, main: String, force: bool) -> anyhow::Result<()> {
    let manifest_path = Manifest::manifest_path(dir);
    if manifest_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            manifest_path.display()
        );
    }

    let name = match name {
        Some(name) => name,
        None => dir
            .file_name()
            .and_then(|n| n.to_str())
            .context("cannot derive a task name from the directory; pass --name")?
            .to_string(),
    };
    let manifest = Manifest::new(name, main).grant("weather", ["getTemp", "getHumidity"]);
    let issues = manifest.validate();
    if !issues.is_empty() {
        bail!("generated manifest is invalid: {issues:?}");
    }

    if let Some(parent) = manifest_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)? + "\n")
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    info!(path = %manifest_path.display(), task = %manifest.name, "initialized task project");
    Ok(())
}

async fn run(dir: &Path, input: Option<&str>, mock_name: &str, linger: u64) -> anyhow::Result<()> {
    let config = load_config(dir)?;
    let channel = config.channel_path(dir);

    let runner = RunnerBuilder::new()
        .catalog(demo::catalog()?)
        .config(config)
        .build()?;

    let manifest = runner
        .load_manifest(dir)
        .with_context(|| format!("failed to load task project at {}", dir.display()))?;
    let mock = demo::mock(mock_name).with_context(|| {
        format!(
            "unknown mock '{mock_name}' (available: {})",
            demo::MOCK_NAMES.join(", ")
        )
    })?;
    let input = input.map(lenient_json).unwrap_or(Value::Null);
    let name = manifest.name.clone();

    runner.create_task(dir, manifest, input, mock)?;
    info!(task = %name, channel = %channel.display(), "listening for events");

    let result = runner.run_task(&name).await;

    if linger > 0 && result.is_ok() {
        info!(task = %name, seconds = linger, "lingering on event channel (ctrl-c to stop)");
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(linger)) => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    runner.remove(&name);

    let value = result.inspect_err(report_rejection)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn emit(dir: &Path, event: &str, payload: &str) -> anyhow::Result<()> {
    let config = load_config(dir)?;
    let channel = config.channel_path(dir);

    let line = format!("{event} {payload}");
    let envelope = EventEnvelope::decode(&line)
        .with_context(|| format!("'{event}' is not of the form <event_type>:<event_name>"))?;

    EventChannel::open(&channel)?;
    std::fs::write(&channel, envelope.encode())
        .with_context(|| format!("failed to write {}", channel.display()))?;

    info!(
        channel = %channel.display(),
        key = %envelope.emission_key(),
        "event written"
    );
    Ok(())
}

fn load_config(dir: &Path) -> anyhow::Result<RunnerConfig> {
    let path = dir.join(RUNNER_CONFIG_PATH);
    if !path.exists() {
        return Ok(RunnerConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid runner config {}", path.display()))
}

/// delegate の拒否で終わった場合、タスクから見えたエラーの形をログに残す
fn report_rejection(err: &RunError) {
    if let RunError::Task(inner) = err {
        if let Some(rejection) = inner.downcast_ref::<DelegationError>() {
            error!(payload = %rejection.to_payload(), "task ended on a rejected delegation");
        }
    }
}
