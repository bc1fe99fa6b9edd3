use std::{fs::OpenOptions, path::Path, sync::Arc};

use anyhow::Context;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

const DEFAULT_FILTER: &str = "scribe=debug,axum=info,tower_http=info";

/// One append-only file per level, next to the console output.
const LEVEL_FILES: [(Level, &str); 3] = [
    (Level::INFO, "info.log"),
    (Level::WARN, "warning.log"),
    (Level::ERROR, "error.log"),
];

/// Console logging from `RUST_LOG` / `LOG_FORMAT`, plus level files under
/// `LOG_DIR` when it is set.
pub fn init() -> anyhow::Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    let console = if json_logs {
        fmt::layer().with_target(false).json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let files = match std::env::var("LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => Some(level_file_layers(Path::new(dir.trim()))?),
        _ => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(console)
        .with(files)
        .init();
    Ok(())
}

fn level_file_layers<S>(dir: &Path) -> anyhow::Result<Vec<BoxedLayer<S>>>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;

    LEVEL_FILES
        .iter()
        .map(|&(level, name)| {
            let path = dir.join(name);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Ok(fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .with_filter(filter_fn(move |meta| *meta.level() == level))
                .boxed())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tracing_subscriber::Registry;

    use super::*;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("scribe-{tag}-{}-{nanos}", std::process::id()))
    }

    fn emit_into(dir: &Path, f: impl FnOnce()) {
        let layers: Vec<BoxedLayer<Registry>> = level_file_layers(dir).unwrap();
        let subscriber = tracing_subscriber::registry().with(layers);
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn each_level_lands_in_its_own_file() {
        let dir = scratch_dir("levels");
        emit_into(&dir, || {
            tracing::info!("user registered");
            tracing::warn!("login with wrong password");
            tracing::error!("database unreachable");
            tracing::debug!("not persisted");
        });

        let read = |name: &str| fs::read_to_string(dir.join(name)).unwrap();
        let info = read("info.log");
        let warning = read("warning.log");
        let error = read("error.log");

        assert!(info.contains("user registered"));
        assert!(!info.contains("wrong password"));
        assert!(warning.contains("login with wrong password"));
        assert!(!warning.contains("unreachable"));
        assert!(error.contains("database unreachable"));
        for body in [&info, &warning, &error] {
            assert!(!body.contains("not persisted"));
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = scratch_dir("append");
        emit_into(&dir, || tracing::info!("first run"));
        emit_into(&dir, || tracing::info!("second run"));

        let info = fs::read_to_string(dir.join("info.log")).unwrap();
        assert!(info.contains("first run"));
        assert!(info.contains("second run"));

        fs::remove_dir_all(&dir).ok();
    }
}
