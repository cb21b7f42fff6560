//! A loader and splitter sharing a "last loaded file" alias.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{error, warn};

use crate::chunk::{ChunkManifest, ChunkSplitter};
use crate::convert::Converter;
use crate::error::Result;
use crate::formats::{Delimiter, Format};
use crate::loader::Loader;
use crate::progress::Progress;
use crate::table::Table;
use crate::workspace::DatasetWorkspace;

/// Remembers the most recently loaded file so it can be split without
/// naming it again.
///
/// The alias is last-writer-wins and safe to update from several threads.
/// Every operation that uses it also exists on [`Loader`] and
/// [`ChunkSplitter`] with an explicit path.
#[derive(Debug)]
pub struct Session {
    loader: Loader,
    splitter: ChunkSplitter,
    last_loaded: RwLock<Option<PathBuf>>,
}

impl Session {
    /// A session whose chunks go under `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self::with_parts(Loader::new(), ChunkSplitter::new(workspace_root))
    }

    pub fn with_parts(loader: Loader, splitter: ChunkSplitter) -> Self {
        Self {
            loader,
            splitter,
            last_loaded: RwLock::new(None),
        }
    }

    pub fn loader_mut(&mut self) -> &mut Loader {
        &mut self.loader
    }

    pub fn splitter_mut(&mut self) -> &mut ChunkSplitter {
        &mut self.splitter
    }

    /// Load a dataset and remember its path on success.
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        progress: Option<&mut dyn Progress>,
    ) -> Result<Table> {
        let path = path.as_ref();
        let table = self.loader.load(path, progress)?;
        *self
            .last_loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(path.to_path_buf());
        Ok(table)
    }

    /// Path of the most recent successful load.
    pub fn last_loaded(&self) -> Option<PathBuf> {
        self.last_loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Split the last loaded file into chunks.
    ///
    /// Files that are not comma-separated are first converted to CSV in the
    /// dataset's `converted/` directory. Without a prior load, or when that
    /// conversion fails, the empty manifest is returned.
    pub fn split_last(
        &self,
        dataset_name: &str,
        mut log: Option<&mut dyn FnMut(&str)>,
        progress: Option<&mut dyn Progress>,
    ) -> ChunkManifest {
        let mut say = |msg: &str| {
            if let Some(sink) = log.as_deref_mut() {
                sink(msg);
            }
        };
        let Some(path) = self.last_loaded() else {
            warn!("Split requested before any file was loaded");
            say("Error: no file has been loaded.");
            return ChunkManifest::empty(PathBuf::new());
        };

        let source = if Format::from_path(&path).ok() == Some(Format::DelimitedText(Delimiter::COMMA)) {
            path
        } else {
            say(&format!("Converting {} to CSV", path.display()));
            match self.companion_csv(dataset_name, &path) {
                Ok(csv) => csv,
                Err(e) => {
                    error!("Error preparing {} for splitting: {e}", path.display());
                    say(&format!("Error: {e}"));
                    return ChunkManifest::empty(PathBuf::new());
                }
            }
        };
        self.splitter.split(dataset_name, source, log, progress)
    }

    fn companion_csv(&self, dataset_name: &str, path: &Path) -> Result<PathBuf> {
        let workspace = DatasetWorkspace::create(self.splitter.root(), dataset_name)?;
        Converter::with_loader(self.loader.clone()).convert(path, &workspace.converted, "csv", None)
    }
}
