use crate::chunk::Chunk;
use crate::config::ChunkingConfig;
use crate::discovery::{relative_path, FileDiscovery, WalkDiscovery};
use crate::error::{BundleError, Result};
use crate::optimizer::GroupSizeOptimizer;
use crate::packer::ChunkPacker;
use crate::report::{ChunkingOutcome, ChunkingReport, FailedFile};
use codebundle_graph::{assign_weights, GraphBuilder, GroupAssembler};
use codebundle_units::{LanguageAnalyzer, SemanticUnit, UnitExtractor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Partitions a codebase into dependency-coherent, token-bounded chunks
///
/// One instance runs one codebase at a time. The only state kept between
/// runs is the graph builder's name-resolution cache, see [`Self::clear_cache`].
pub struct SemanticChunker<D: FileDiscovery = WalkDiscovery> {
    config: ChunkingConfig,
    analyzer: Box<dyn LanguageAnalyzer>,
    discovery: D,
    graph_builder: GraphBuilder,
}

impl SemanticChunker<WalkDiscovery> {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        let discovery = WalkDiscovery::new(config.max_file_bytes);
        Self::with_discovery(config, discovery)
    }
}

impl<D: FileDiscovery> SemanticChunker<D> {
    pub fn with_discovery(config: ChunkingConfig, discovery: D) -> Result<Self> {
        config.validate().map_err(BundleError::InvalidConfig)?;
        let analyzer = config.language().analyzer();
        log::debug!("Using {} analyzer", analyzer.language());

        Ok(Self {
            config,
            analyzer,
            discovery,
            graph_builder: GraphBuilder::new(),
        })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Forget memoized name resolutions from earlier runs
    pub fn clear_cache(&mut self) {
        self.graph_builder.clear_cache();
    }

    /// Chunk the codebase at `codebase_path` with a target of `max_chunk_size` tokens
    pub fn create_semantic_chunks(
        &mut self,
        codebase_path: impl AsRef<Path>,
        max_chunk_size: usize,
    ) -> Result<Vec<Chunk>> {
        self.run(codebase_path, max_chunk_size)
            .map(|outcome| outcome.chunks)
    }

    /// Like [`Self::create_semantic_chunks`], also returning the run report
    pub fn run(
        &mut self,
        codebase_path: impl AsRef<Path>,
        max_chunk_size: usize,
    ) -> Result<ChunkingOutcome> {
        let root = codebase_path.as_ref();
        if !root.is_dir() {
            log::error!("Codebase path {} is missing or not a directory", root.display());
            return Err(BundleError::InvalidPath(root.display().to_string()));
        }
        if max_chunk_size == 0 {
            return Err(BundleError::InvalidArgument(
                "max_chunk_size must be > 0".to_string(),
            ));
        }

        let mut report = ChunkingReport {
            language: self.analyzer.language().to_string(),
            ..ChunkingReport::default()
        };

        let include = self.config.effective_includes(self.analyzer.as_ref());
        let exclude = self.config.effective_excludes(self.analyzer.as_ref());
        let files = self.discovery.discover(root, &include, &exclude)?;
        report.files_discovered = files.len();

        if files.is_empty() {
            log::warn!(
                "No files matched under {} (include: {include:?}, exclude: {exclude:?})",
                root.display()
            );
            return Ok(ChunkingOutcome {
                chunks: Vec::new(),
                report,
            });
        }

        let units = self.extract_units(root, &files, &mut report);
        report.units = units.len();

        if units.is_empty() {
            log::warn!("No semantic units extracted from {} files", files.len());
            return Ok(ChunkingOutcome {
                chunks: Vec::new(),
                report,
            });
        }

        let mut graph = self.graph_builder.build(&units)?;
        assign_weights(&mut graph);
        report.graph = graph.stats();

        let groups = GroupAssembler::new(self.config.max_recursion_depth).assemble(&graph);
        report.groups = groups.len();

        let groups = GroupSizeOptimizer::new(self.config.max_group_tokens).optimize(groups);
        report.optimized_groups = groups.len();

        let chunks = ChunkPacker::new(max_chunk_size).pack(groups);
        report.chunks = chunks.len();
        report.total_tokens = chunks.iter().map(|c| c.token_estimate).sum();

        log::info!(
            "Created {} chunks ({} tokens) from {} units in {} files",
            chunks.len(),
            report.total_tokens,
            report.units,
            report.files_read
        );

        Ok(ChunkingOutcome { chunks, report })
    }

    /// Read files one by one; a failing file is logged, recorded and skipped
    fn extract_units(
        &self,
        root: &Path,
        files: &[PathBuf],
        report: &mut ChunkingReport,
    ) -> Vec<Arc<SemanticUnit>> {
        let mut extractor = UnitExtractor::new(self.analyzer.as_ref());
        let mut units = Vec::new();

        for path in files {
            let relative = relative_path(root, path);
            let result = std::fs::read_to_string(path)
                .map_err(BundleError::from)
                .and_then(|content| {
                    extractor
                        .extract(path, &relative, &content)
                        .map_err(BundleError::from)
                });

            match result {
                Ok(file_units) => {
                    report.files_read += 1;
                    units.extend(file_units.into_iter().map(Arc::new));
                }
                Err(e) => {
                    log::error!("Skipping {relative}: {e}");
                    report.failed_files.push(FailedFile {
                        path: relative,
                        reason: e.to_string(),
                    });
                }
            }
        }

        units
    }
}
