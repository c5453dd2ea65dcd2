//! File-writing metrics sink producing plot-ready text files.

use std::{
    collections::{hash_map::Entry, HashMap},
    fmt::Display,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tumor_immune_core::{MetricEvent, MetricsSink, ScalarMetric, SnapshotGrid, StepIndex};

/// Writes scalar series as `<step> <value>` lines and snapshots as `<row> <column> <value>` grids.
///
/// Scalar files are truncated when first touched during a run and appended to
/// afterwards. I/O failures are held until [`FileSink::finish`], since
/// [`MetricsSink::record`] cannot report them.
#[derive(Debug)]
pub(crate) struct FileSink {
    directory: PathBuf,
    scalars: HashMap<ScalarMetric, BufWriter<File>>,
    files: usize,
    failure: Option<anyhow::Error>,
}

impl FileSink {
    /// Creates the output directory and an empty sink writing into it.
    pub(crate) fn create(directory: &Path) -> Result<Self> {
        fs::create_dir_all(directory).with_context(|| {
            format!("failed to create output directory {}", directory.display())
        })?;
        Ok(Self {
            directory: directory.to_path_buf(),
            scalars: HashMap::new(),
            files: 0,
            failure: None,
        })
    }

    /// Flushes every open file, returning the number of files written or the first I/O error.
    pub(crate) fn finish(mut self) -> Result<usize> {
        if let Some(error) = self.failure.take() {
            return Err(error);
        }
        for (metric, writer) in &mut self.scalars {
            writer
                .flush()
                .with_context(|| format!("failed to flush {}", metric.as_str()))?;
        }
        Ok(self.files)
    }

    fn write(&mut self, event: &MetricEvent) -> Result<()> {
        match event {
            MetricEvent::Scalar {
                metric,
                step,
                value,
            } => {
                let writer = match self.scalars.entry(*metric) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let path = self.directory.join(format!("{}.txt", metric.as_str()));
                        let file = File::create(&path)
                            .with_context(|| format!("failed to create {}", path.display()))?;
                        self.files += 1;
                        entry.insert(BufWriter::new(file))
                    }
                };
                writeln!(writer, "{} {}", step.get(), value)
                    .with_context(|| format!("failed to append to {}", metric.as_str()))
            }
            MetricEvent::Occupancy { metric, step, grid } => {
                self.write_grid(*step, metric.as_str(), grid)
            }
            MetricEvent::Material { metric, step, grid } => {
                self.write_grid(*step, metric.as_str(), grid)
            }
        }
    }

    fn write_grid<T: Display>(
        &mut self,
        step: StepIndex,
        name: &str,
        grid: &SnapshotGrid<T>,
    ) -> Result<()> {
        let path = self.directory.join(format!("{}-{name}.txt", step.get()));
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let last_column = grid.bounds().width().saturating_sub(1);
        for (cell, value) in grid.iter() {
            writeln!(writer, "{} {} {}", cell.row(), cell.column(), value)?;
            if cell.column() == last_column {
                writeln!(writer)?;
            }
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.files += 1;
        Ok(())
    }
}

impl MetricsSink for FileSink {
    fn record(&mut self, event: &MetricEvent) {
        if self.failure.is_some() {
            return;
        }
        if let Err(error) = self.write(event) {
            self.failure = Some(error);
        }
    }
}
