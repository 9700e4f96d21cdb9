//! Model export: `.pn` files on disk, clipboard copies, and the batch path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{info, warn};

use crate::app::coordinator::MiningStrategy;
use crate::app::selection::IndexSpec;
use crate::domain::net::PetriNet;
use crate::infra::clipboard::Clipboard;
use crate::infra::config::Config;
use crate::infra::log::load_log;
use crate::mine::producer::{FragmentProducer, WindowProducer};
use crate::synth::fold::FoldSynthesizer;
use crate::synth::incremental::IncrementalFoldMiner;
use crate::synth::serialize::PnSerializer;
use crate::synth::{FullSynthesizer, IncrementalMiner, ModelSerializer};

/// Export behavior resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub directory: PathBuf,
    pub auto_export: bool,
    pub copy_to_clipboard: bool,
}

impl ExportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            directory: PathBuf::from(&config.export.directory),
            auto_export: config.export.auto_export,
            copy_to_clipboard: config.export.copy_to_clipboard,
        }
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub path: PathBuf,
    pub copied: bool,
    pub bytes: usize,
}

/// Serializes published models and writes them out.
pub struct ModelExporter {
    serializer: PnSerializer,
    options: ExportOptions,
    clipboard: Mutex<Clipboard>,
}

impl ModelExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            serializer: PnSerializer,
            options,
            clipboard: Mutex::new(Clipboard::new()),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn render(&self, net: &PetriNet) -> String {
        self.serializer.serialize(net)
    }

    /// Write the model to `explicit`, or to a timestamped file in the
    /// configured export directory. Clipboard trouble is downgraded to a
    /// warning so the file export still succeeds.
    pub fn export_to_file(&self, net: &PetriNet, explicit: Option<&Path>) -> Result<ExportResult> {
        let rendered = self.render(net);
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => self.default_path()?,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create export directory: {}", parent.display())
            })?;
        }
        fs::write(&path, &rendered)
            .with_context(|| format!("failed to write model to {}", path.display()))?;

        let copied = self.options.copy_to_clipboard && self.try_copy(&rendered);
        info!(path = %path.display(), bytes = rendered.len(), "exported model");
        Ok(ExportResult {
            path,
            copied,
            bytes: rendered.len(),
        })
    }

    /// Copy the serialized model to the clipboard without touching disk.
    pub fn copy_to_clipboard(&self, net: &PetriNet) -> Result<usize> {
        let rendered = self.render(net);
        self.clipboard
            .lock()
            .copy(&rendered)
            .context("failed to copy model to clipboard")?;
        Ok(rendered.len())
    }

    fn try_copy(&self, rendered: &str) -> bool {
        match self.clipboard.lock().copy(rendered) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "clipboard copy failed");
                false
            }
        }
    }

    fn default_path(&self) -> Result<PathBuf> {
        let stamp = OffsetDateTime::now_utc()
            .format(&format_description!(
                "[year][month][day]-[hour][minute][second][subsecond digits:3]"
            ))
            .context("failed to format export timestamp")?;
        Ok(self.options.directory.join(format!("model-{stamp}.pn")))
    }
}

/// One-shot mining request from the command line.
#[derive(Debug, Clone)]
pub struct BatchRequest<'a> {
    pub log_path: &'a Path,
    pub output: Option<&'a Path>,
    pub spec: IndexSpec,
    pub strategy: MiningStrategy,
}

/// What a batch run did, for the terminal summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub fragments: usize,
    pub selected: usize,
    pub places: usize,
    pub transitions: usize,
    pub arcs: usize,
    pub export: ExportResult,
}

/// Load a log, mine the requested fragment subset, and export the model.
pub fn run_batch(config: &Config, request: &BatchRequest) -> Result<BatchSummary> {
    let log = load_log(request.log_path)?;
    let producer = WindowProducer;
    let fragments = Arc::new(producer.produce(&log, &config.producer_options()));
    let indices = request.spec.resolve(fragments.len());
    let synthesis = config.synthesis_config();

    let net = if indices.is_empty() {
        PetriNet::default()
    } else {
        match request.strategy {
            MiningStrategy::Full => {
                FoldSynthesizer.synthesize(&fragments.subset(&indices), &synthesis)?
            }
            MiningStrategy::Incremental => {
                IncrementalFoldMiner::new(Arc::clone(&fragments)).mine(&indices, &synthesis)?
            }
        }
    };

    let exporter = ModelExporter::new(ExportOptions::from_config(config));
    let export = exporter.export_to_file(&net, request.output)?;
    Ok(BatchSummary {
        fragments: fragments.len(),
        selected: indices.len(),
        places: net.place_count(),
        transitions: net.transition_count(),
        arcs: net.arc_count(),
        export,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fragment::FragmentCollection;
    use crate::domain::order::PartialOrder;
    use crate::synth::SynthesisConfig;

    fn options(dir: &Path) -> ExportOptions {
        ExportOptions {
            directory: dir.to_path_buf(),
            auto_export: false,
            copy_to_clipboard: false,
        }
    }

    fn chain_net() -> PetriNet {
        let fragments = FragmentCollection::rank(vec![(PartialOrder::from_chain(["a", "b"]), 1)]);
        let indices = (0..1).collect();
        FoldSynthesizer
            .synthesize(&fragments.subset(&indices), &SynthesisConfig::default())
            .unwrap()
    }

    #[test]
    fn default_export_lands_in_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ModelExporter::new(options(dir.path()));
        let result = exporter.export_to_file(&chain_net(), None).unwrap();

        assert!(result.path.starts_with(dir.path()));
        let name = result.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("model-") && name.ends_with(".pn"));
        let written = fs::read_to_string(&result.path).unwrap();
        assert!(written.starts_with(".type pn"));
        assert_eq!(written.len(), result.bytes);
        assert!(!result.copied);
    }

    #[test]
    fn explicit_path_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out/model.pn");
        let exporter = ModelExporter::new(options(dir.path()));
        let result = exporter.export_to_file(&chain_net(), Some(&target)).unwrap();
        assert_eq!(result.path, target);
        assert!(target.exists());
    }

    #[test]
    fn batch_run_mines_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        fs::write(&log_path, "3x a b\na b\n").unwrap();
        let mut config = Config::default();
        config.export.directory = dir.path().join("out").display().to_string();

        for strategy in [MiningStrategy::Full, MiningStrategy::Incremental] {
            let summary = run_batch(
                &config,
                &BatchRequest {
                    log_path: &log_path,
                    output: None,
                    spec: IndexSpec::All,
                    strategy,
                },
            )
            .unwrap();
            assert_eq!(summary.fragments, 1);
            assert_eq!(summary.selected, 1);
            assert_eq!(summary.transitions, 2);
            assert!(summary.export.path.exists());
        }
    }

    #[test]
    fn batch_with_no_selection_exports_the_empty_model() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.log");
        fs::write(&log_path, "a b\n").unwrap();
        let out = dir.path().join("empty.pn");
        let mut config = Config::default();
        config.export.directory = dir.path().display().to_string();

        let summary = run_batch(
            &config,
            &BatchRequest {
                log_path: &log_path,
                output: Some(&out),
                spec: IndexSpec::None,
                strategy: MiningStrategy::Full,
            },
        )
        .unwrap();
        assert_eq!(summary.selected, 0);
        assert_eq!(summary.places, 0);
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains(".type pn"));
    }
}
