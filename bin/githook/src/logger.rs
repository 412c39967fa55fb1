use anyhow::Context;
use tracing_subscriber::{
  Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// How log lines are rendered: human-readable text or structured
/// JSON, e.g. for shipping to a log aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
  #[default]
  Text,
  Json,
}

pub fn init(level: tracing::Level, format: LogFormat) -> anyhow::Result<()> {
  let registry = Registry::default()
    .with(tracing_subscriber::filter::LevelFilter::from_level(level));

  match format {
    LogFormat::Text => registry
      .with(
        tracing_subscriber::fmt::layer()
          .with_target(false)
          .with_file(false)
          .with_line_number(false),
      )
      .try_init(),
    LogFormat::Json => {
      registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    }
  }
  .context("failed to initialize logger")
}
