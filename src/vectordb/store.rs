//! Persisted vector store: a flat index plus the chunk table it indexes.
//!
//! # Layout
//!
//! ```text
//! <root>/CURRENT                 -> "gen-<build_id>"
//! <root>/gen-<build_id>/index.rkyv
//! <root>/gen-<build_id>/metadata.rkyv
//! ```
//!
//! Both artifacts carry the build id. A build writes a fresh generation directory and only
//! then swaps `CURRENT`, so readers see either the previous pair or the new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::VectorDbError;
use super::flat::{FlatL2Index, Neighbor};
use crate::chunking::Chunk;
use crate::storage::{DirectoryWriter, MmapFileHandle, StorageError, StorageWriter, write_atomic};

/// Pointer file naming the active generation.
pub const CURRENT_FILE: &str = "CURRENT";
/// Vector artifact within a generation.
pub const INDEX_FILE: &str = "index.rkyv";
/// Chunk-table artifact within a generation.
pub const METADATA_FILE: &str = "metadata.rkyv";

const GENERATION_PREFIX: &str = "gen-";

#[derive(Archive, Deserialize, Serialize, Debug)]
struct IndexArtifact {
    build_id: String,
    index: FlatL2Index,
}

#[derive(Archive, Deserialize, Serialize, Debug)]
struct MetadataArtifact {
    build_id: String,
    chunks: Vec<Chunk>,
}

/// A retrieved chunk and its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Position in the index and the chunk table.
    pub id: usize,
    /// Squared L2 distance to the query vector.
    pub distance: f32,
    /// The chunk record at `id`.
    pub chunk: Chunk,
}

/// Immutable index + chunk table. Vector `i` was embedded from `chunks()[i]`.
#[derive(Debug, Clone)]
pub struct VectorStore {
    index: FlatL2Index,
    chunks: Vec<Chunk>,
    build_id: String,
}

impl VectorStore {
    /// Pairs an index with its chunk table. Fails unless they are the same length.
    pub fn new(
        index: FlatL2Index,
        chunks: Vec<Chunk>,
        build_id: impl Into<String>,
    ) -> Result<Self, VectorDbError> {
        if index.len() != chunks.len() {
            return Err(VectorDbError::LengthMismatch {
                vectors: index.len(),
                chunks: chunks.len(),
            });
        }
        Ok(Self {
            index,
            chunks,
            build_id: build_id.into(),
        })
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The `k` nearest chunks to `query`, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, VectorDbError> {
        let neighbors = self.index.search(query, k)?;
        neighbors
            .into_iter()
            .map(|Neighbor { id, distance }| {
                let chunk = self
                    .chunks
                    .get(id)
                    .cloned()
                    .ok_or(VectorDbError::LengthMismatch {
                        vectors: self.index.len(),
                        chunks: self.chunks.len(),
                    })?;
                Ok(SearchHit {
                    id,
                    distance,
                    chunk,
                })
            })
            .collect()
    }

    /// Writes both artifacts into a new generation under `root` and publishes it.
    ///
    /// Never writes into an existing generation directory.
    ///
    /// Returns the generation directory.
    pub fn persist(&self, root: &Path) -> Result<PathBuf, VectorDbError> {
        let generation = format!("{}{}", GENERATION_PREFIX, self.build_id);
        let gen_dir = root.join(&generation);

        fs::create_dir_all(root).map_err(StorageError::from)?;
        if let Err(e) = fs::create_dir(&gen_dir) {
            if e.kind() == io::ErrorKind::AlreadyExists {
                return Err(VectorDbError::GenerationExists { path: gen_dir });
            }
            return Err(StorageError::from(e).into());
        }

        let result = self.write_generation(&gen_dir).and_then(|()| {
            write_atomic(&root.join(CURRENT_FILE), generation.as_bytes()).map_err(Into::into)
        });

        if let Err(e) = result {
            if current_generation(root).ok().as_deref() != Some(generation.as_str()) {
                if let Err(cleanup) = fs::remove_dir_all(&gen_dir) {
                    warn!(
                        path = %gen_dir.display(),
                        error = %cleanup,
                        "Failed to remove unpublished generation"
                    );
                }
            }
            return Err(e);
        }

        info!(
            path = %gen_dir.display(),
            build_id = %self.build_id,
            vectors = self.index.len(),
            dimension = self.dimension(),
            "Vector store published"
        );
        Ok(gen_dir)
    }

    fn write_generation(&self, gen_dir: &Path) -> Result<(), VectorDbError> {
        let writer = DirectoryWriter::create(gen_dir)?;

        let index_bytes = rkyv::to_bytes::<RkyvError>(&IndexArtifact {
            build_id: self.build_id.clone(),
            index: self.index.clone(),
        })
        .map_err(|e| VectorDbError::Serialization(e.to_string()))?;
        let metadata_bytes = rkyv::to_bytes::<RkyvError>(&MetadataArtifact {
            build_id: self.build_id.clone(),
            chunks: self.chunks.clone(),
        })
        .map_err(|e| VectorDbError::Serialization(e.to_string()))?;

        let index_handle = writer.write(INDEX_FILE, &index_bytes)?;
        let metadata_handle = writer.write(METADATA_FILE, &metadata_bytes)?;

        // Read back through the same validation a loader will use.
        open_artifact::<ArchivedIndexArtifact>(&index_handle)?;
        open_artifact::<ArchivedMetadataArtifact>(&metadata_handle)?;

        debug!(
            index_bytes = index_bytes.len(),
            metadata_bytes = metadata_bytes.len(),
            "Generation written"
        );
        Ok(())
    }

    /// Loads the published generation under `root`.
    pub fn load(root: &Path) -> Result<Self, VectorDbError> {
        let generation = current_generation(root)?;
        let gen_dir = root.join(&generation);
        let expected_id = &generation[GENERATION_PREFIX.len()..];

        let index_path = gen_dir.join(INDEX_FILE);
        let metadata_path = gen_dir.join(METADATA_FILE);
        let index_handle = MmapFileHandle::open(&index_path)
            .map_err(|e| VectorDbError::from_read(&index_path, e))?;
        let metadata_handle = MmapFileHandle::open(&metadata_path)
            .map_err(|e| VectorDbError::from_read(&metadata_path, e))?;

        let archived_index = open_artifact::<ArchivedIndexArtifact>(&index_handle)?;
        let archived_metadata = open_artifact::<ArchivedMetadataArtifact>(&metadata_handle)?;

        for (path, build_id) in [
            (&index_path, archived_index.build_id.as_str()),
            (&metadata_path, archived_metadata.build_id.as_str()),
        ] {
            if build_id != expected_id {
                return Err(VectorDbError::StoreCorrupt {
                    path: path.clone(),
                    reason: format!(
                        "build id {:?} does not match generation {:?}",
                        build_id, generation
                    ),
                });
            }
        }

        let index: FlatL2Index = rkyv::deserialize::<FlatL2Index, RkyvError>(&archived_index.index)
            .map_err(|e| corrupt(&index_path, e.to_string()))?;
        let chunks: Vec<Chunk> =
            rkyv::deserialize::<Vec<Chunk>, RkyvError>(&archived_metadata.chunks)
                .map_err(|e| corrupt(&metadata_path, e.to_string()))?;

        if !index.is_well_formed() {
            return Err(corrupt(&index_path, "vector buffer is not a whole number of rows"));
        }
        if index.len() != chunks.len() {
            return Err(corrupt(
                &gen_dir,
                format!(
                    "index holds {} vectors but metadata holds {} chunks",
                    index.len(),
                    chunks.len()
                ),
            ));
        }

        info!(
            path = %gen_dir.display(),
            build_id = expected_id,
            vectors = index.len(),
            dimension = index.dimension(),
            "Vector store loaded"
        );

        Ok(Self {
            index,
            chunks,
            build_id: expected_id.to_string(),
        })
    }

    /// Returns `true` when `root` has a published generation pointer.
    pub fn exists(root: &Path) -> bool {
        root.join(CURRENT_FILE).is_file()
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> VectorDbError {
    VectorDbError::StoreCorrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn open_artifact<T>(handle: &MmapFileHandle) -> Result<&T, VectorDbError>
where
    T: rkyv::Portable
        + for<'a> rkyv::bytecheck::CheckBytes<rkyv::api::high::HighValidator<'a, RkyvError>>,
{
    handle
        .access_archived::<T>()
        .map_err(|e| corrupt(handle.path(), e.to_string()))
}

/// Reads and validates the generation name in `<root>/CURRENT`.
fn current_generation(root: &Path) -> Result<String, VectorDbError> {
    let current_path = root.join(CURRENT_FILE);
    let contents = match fs::read_to_string(&current_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(VectorDbError::StoreNotFound { path: current_path });
        }
        Err(e) => return Err(corrupt(&current_path, e.to_string())),
    };

    let generation = contents.trim();
    let valid = generation.len() > GENERATION_PREFIX.len()
        && generation.starts_with(GENERATION_PREFIX)
        && !generation.contains(['/', '\\']);
    if !valid {
        return Err(corrupt(
            &current_path,
            format!("invalid generation name {:?}", generation),
        ));
    }
    Ok(generation.to_string())
}
