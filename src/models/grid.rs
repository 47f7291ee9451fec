//! Loading of tabulated departure-coefficient model grids.
//!
//! A grid file is a whitespace-separated text table whose first column
//! is a contiguous run of principal quantum numbers and whose remaining
//! columns hold the tabulated quantity. Files are named after the atom
//! and the physical conditions they were computed for, with the
//! conditions encoded as codec keys:
//!
//! `{atom}_opt_T_{te}_ne_{ne}_ncrit_{ncrit}[_{tr}]_vriens_delta_500_vrinc_nmax_9900_{suffix}`

use crate::error::{RrlError, RrlResult};
use crate::models::codec;
use crate::transition::Species;
use ndarray::{s, Array2, Array3, ArrayView1};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Which tabulated quantity a grid file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridKind {
    /// Plain departure coefficients b_n.
    Bn,
    /// Departure coefficients folded with the stimulated-emission
    /// correction, b_n beta.
    BnBeta,
}

impl GridKind {
    fn file_suffix(self) -> &'static str {
        match self {
            GridKind::Bn => "dat",
            GridKind::BnBeta => "datbn_beta",
        }
    }
}

/// The physical conditions a grid was tabulated for, as codec keys.
///
/// The radiation-field key is absent for grids computed without an
/// external radiation field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub te: String,
    pub ne: String,
    pub tr: Option<String>,
}

impl GridKey {
    pub fn new(te: &str, ne: &str, tr: Option<&str>) -> Self {
        GridKey {
            te: te.to_string(),
            ne: ne.to_string(),
            tr: tr.map(str::to_string),
        }
    }

    /// Encodes physical values into a grid key.
    pub fn from_values(te: f64, ne: f64, tr: Option<f64>) -> RrlResult<Self> {
        Ok(GridKey {
            te: codec::value_to_key(te)?,
            ne: codec::value_to_key(ne)?,
            tr: tr.map(codec::value_to_key).transpose()?,
        })
    }

    fn tr_label(&self) -> &str {
        self.tr.as_deref().unwrap_or("-")
    }
}

/// A directory of model-grid files for one set of atomic models.
#[derive(Debug, Clone)]
pub struct GridStore {
    root: PathBuf,
}

impl GridStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        GridStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file-name pattern for the given conditions. The density key
    /// may carry trailing digits in historical file names, so the
    /// pattern allows them; more than one match is reported as
    /// ambiguous rather than resolved arbitrarily.
    fn file_pattern(&self, species: Species, key: &GridKey, kind: GridKind) -> String {
        let tr_part = match &key.tr {
            Some(tr) => format!("_{}", regex::escape(tr)),
            None => String::new(),
        };
        format!(
            "^{}_opt_T_{}_ne_{}[0-9]*_ncrit_{}{}_vriens_delta_500_vrinc_nmax_9900_{}$",
            species.atom_name(),
            regex::escape(&key.te),
            regex::escape(&key.ne),
            regex::escape(species.ncrit_key()),
            tr_part,
            kind.file_suffix(),
        )
    }

    /// Locates the single grid file matching the given conditions.
    pub fn find_grid(&self, species: Species, key: &GridKey, kind: GridKind) -> RrlResult<PathBuf> {
        let pattern = self.file_pattern(species, key, kind);
        let regex = Regex::new(&pattern).map_err(|err| {
            RrlError::InvalidInput(format!("grid keys form an invalid pattern: {err}"))
        })?;

        let mut matches = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if regex.is_match(name) {
                    matches.push(entry.path());
                }
            }
        }
        matches.sort();

        match matches.len() {
            0 => Err(RrlError::GridNotFound {
                dir: self.root.clone(),
                pattern,
            }),
            1 => Ok(matches.remove(0)),
            count => Err(RrlError::AmbiguousGrid {
                dir: self.root.clone(),
                pattern,
                count,
            }),
        }
    }

    /// Loads the grid for the given conditions, restricted to the
    /// levels closest to `n_min` and `n_max` (inclusive).
    pub fn load(
        &self,
        species: Species,
        key: &GridKey,
        kind: GridKind,
        n_min: f64,
        n_max: f64,
    ) -> RrlResult<ModelGrid> {
        let path = self.find_grid(species, key, kind)?;
        let table = read_table(&path)?;
        ModelGrid::from_table(table)?.sliced(n_min, n_max)
    }

    /// Loads one grid per key into a stacked array of shape
    /// `(keys, columns, levels)`, in key order.
    ///
    /// The grids are read in parallel; the first failure aborts the
    /// batch and reports which conditions it belongs to.
    pub fn load_batch(
        &self,
        species: Species,
        keys: &[GridKey],
        kind: GridKind,
        n_min: f64,
        n_max: f64,
    ) -> RrlResult<Array3<f64>> {
        if keys.is_empty() {
            return Ok(Array3::zeros((0, 0, 0)));
        }

        let grids: Vec<ModelGrid> = keys
            .par_iter()
            .map(|key| {
                self.load(species, key, kind, n_min, n_max)
                    .map_err(|err| RrlError::BatchLoad {
                        te: key.te.clone(),
                        ne: key.ne.clone(),
                        tr: key.tr_label().to_string(),
                        source: Box::new(err),
                    })
            })
            .collect::<RrlResult<_>>()?;

        let (levels, columns) = grids[0].data().dim();
        for (key, grid) in keys.iter().zip(&grids) {
            if grid.data().dim() != (levels, columns) {
                return Err(RrlError::InvalidInput(format!(
                    "grid for Te = {}, ne = {}, Tr = {} has shape {:?}, expected {:?}",
                    key.te,
                    key.ne,
                    key.tr_label(),
                    grid.data().dim(),
                    (levels, columns)
                )));
            }
        }

        let mut stacked = Array3::zeros((keys.len(), columns, levels));
        for (i, grid) in grids.iter().enumerate() {
            stacked.slice_mut(s![i, .., ..]).assign(&grid.data().t());
        }
        Ok(stacked)
    }
}

/// An in-memory model grid: one row per principal quantum number.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGrid {
    data: Array2<f64>,
}

impl ModelGrid {
    fn from_table(data: Array2<f64>) -> RrlResult<Self> {
        let (rows, columns) = data.dim();
        if rows == 0 || columns < 2 {
            return Err(RrlError::InvalidInput(format!(
                "a model grid needs at least one row and two columns, got {rows} x {columns}"
            )));
        }
        let n = data.column(0);
        for i in 1..rows {
            if n[i] != n[i - 1] + 1.0 {
                return Err(RrlError::InvalidInput(format!(
                    "grid levels must be contiguous, but level {} follows {}",
                    n[i],
                    n[i - 1]
                )));
            }
        }
        Ok(ModelGrid { data })
    }

    /// Restricts the grid to the levels closest to `n_min` and `n_max`
    /// (inclusive).
    fn sliced(self, n_min: f64, n_max: f64) -> RrlResult<Self> {
        let n = self.data.column(0).to_vec();
        let start = codec::best_match_index(n_min, &n, None)?;
        let end = codec::best_match_index(n_max, &n, None)?;
        if start > end {
            return Err(RrlError::InvalidInput(format!(
                "empty level range {n_min}..{n_max}"
            )));
        }
        Ok(ModelGrid {
            data: self.data.slice(s![start..=end, ..]).to_owned(),
        })
    }

    /// Number of tabulated levels.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// The principal quantum numbers (first column).
    pub fn n(&self) -> ArrayView1<f64> {
        self.data.column(0)
    }

    /// The tabulated quantity (second column).
    pub fn values(&self) -> ArrayView1<f64> {
        self.data.column(1)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}

/// Parses a whitespace-separated numeric table, skipping blank lines
/// and `#` comments.
fn read_table(path: &Path) -> RrlResult<Array2<f64>> {
    let text = fs::read_to_string(path)?;

    let mut values = Vec::new();
    let mut rows = 0;
    let mut columns = 0;
    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut row_len = 0;
        for field in line.split_whitespace() {
            let value: f64 = field.parse().map_err(|_| {
                RrlError::InvalidInput(format!(
                    "non-numeric field `{}` at {}:{}",
                    field,
                    path.display(),
                    line_number + 1
                ))
            })?;
            values.push(value);
            row_len += 1;
        }
        if rows == 0 {
            columns = row_len;
        } else if row_len != columns {
            return Err(RrlError::InvalidInput(format!(
                "ragged row at {}:{} ({} fields, expected {})",
                path.display(),
                line_number + 1,
                row_len,
                columns
            )));
        }
        rows += 1;
    }

    Array2::from_shape_vec((rows, columns), values)
        .map_err(|err| RrlError::InvalidInput(format!("{}: {err}", path.display())))
}

/// A read-through cache of loaded grids.
///
/// Grids are keyed by their file name and level range and shared
/// through `Arc`, so repeated lookups of the same conditions reuse the
/// parsed table.
#[derive(Debug)]
pub struct GridCache {
    store: GridStore,
    loaded: Mutex<HashMap<String, Arc<ModelGrid>>>,
}

impl GridCache {
    pub fn new(store: GridStore) -> Self {
        GridCache {
            store,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// Loads the grid for the given conditions, reusing a previously
    /// parsed copy when one exists.
    pub fn load(
        &self,
        species: Species,
        key: &GridKey,
        kind: GridKind,
        n_min: f64,
        n_max: f64,
    ) -> RrlResult<Arc<ModelGrid>> {
        let cache_key = format!(
            "{}:{}:{}:{}:{}:{}..{}",
            species.atom_name(),
            key.te,
            key.ne,
            key.tr_label(),
            kind.file_suffix(),
            n_min,
            n_max
        );
        {
            // The map holds only fully loaded grids, so a lock poisoned
            // by a panicking sibling thread is still consistent.
            let loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(grid) = loaded.get(&cache_key) {
                return Ok(Arc::clone(grid));
            }
        }

        let grid = Arc::new(self.store.load(species, key, kind, n_min, n_max)?);
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cache_key, Arc::clone(&grid));
        Ok(grid)
    }
}
