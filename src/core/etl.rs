use crate::core::tap::BloomerangTap;
use crate::domain::model::SyncRun;
use crate::domain::ports::{ApiClient, Backoff, Sink};
use crate::utils::error::Result;

/// What a single invocation of the tap does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Mode {
    /// Probe credentials and report `test_result`.
    Test,
    /// Emit schemas only.
    Discover,
    /// Full sync of the selected collections.
    #[default]
    Tap,
    /// List the collection names.
    Tables,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    ConnectionTested(bool),
    Discovered(usize),
    Synced(Vec<SyncRun>),
    TablesListed(usize),
}

impl RunOutcome {
    pub fn total_records(&self) -> usize {
        match self {
            RunOutcome::Synced(runs) => runs.iter().map(|r| r.total_records).sum(),
            _ => 0,
        }
    }
}

pub struct TapEngine<C: ApiClient, S: Sink, B: Backoff> {
    tap: BloomerangTap<C, S, B>,
    streams: Option<Vec<String>>,
}

impl<C: ApiClient, S: Sink, B: Backoff> TapEngine<C, S, B> {
    /// `streams = None` selects the whole catalog.
    pub fn new(tap: BloomerangTap<C, S, B>, streams: Option<Vec<String>>) -> Self {
        Self { tap, streams }
    }

    pub fn into_tap(self) -> BloomerangTap<C, S, B> {
        self.tap
    }

    pub async fn run(&mut self, mode: Mode) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting Bloomerang tap in {:?} mode", mode);
        let selection = self.streams.as_deref();

        let outcome = match mode {
            Mode::Test => RunOutcome::ConnectionTested(self.tap.check().await?),
            Mode::Discover => RunOutcome::Discovered(self.tap.discover(selection).await?.len()),
            Mode::Tap => RunOutcome::Synced(self.tap.sync(selection).await?),
            Mode::Tables => RunOutcome::TablesListed(self.tap.list_tables()?.len()),
        };

        match &outcome {
            RunOutcome::ConnectionTested(ok) => {
                tracing::info!("🔌 Connection test {}", if *ok { "passed" } else { "failed" })
            }
            RunOutcome::Discovered(count) => tracing::info!("📋 Discovered {} collections", count),
            RunOutcome::Synced(runs) => tracing::info!(
                "✅ Synced {} collections, {} records",
                runs.len(),
                outcome.total_records()
            ),
            RunOutcome::TablesListed(count) => tracing::info!("📋 Listed {} tables", count),
        }

        Ok(outcome)
    }
}
