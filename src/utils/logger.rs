use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日誌輸出格式，`--json-logs` 切換成 Json
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// 沒有 RUST_LOG 時的預設過濾；HTTP 堆疊的連線細節只在 verbose 時看得到
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "field_jobs=debug,reqwest=debug,hyper_util=info,info"
    } else {
        "field_jobs=info,warn"
    }
}

/// 日誌一律寫到 stderr，stdout 只留給指令的 JSON 輸出
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry
            .with(layer.json().flatten_event(true).with_current_span(false))
            .init(),
    }
}
