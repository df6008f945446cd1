//! Design-matrix assembly.
//!
//! [`DesignMatrixBuilder`] runs the fixed pipeline
//!
//! ```text
//! events ─ encode (hires) ─ convolve HRF ─ resample @ TR/2 ─ demean ─ highpass?
//!                                                                       │
//! regressors ─ validate ─────────────────────────────────────────────────┤
//! confounds ─ validate ─ PCA? ───────────────────────────────────────────┤
//! artifact mask ─ one-hot ─ validate ────────────────────────────────────┤
//!                                                                        └─ concat ─ demean ─ DesignMatrix
//! ```
//!
//! and produces an immutable [`DesignMatrix`].  Column order is always
//! conditions, condition derivatives (in condition order), regressors,
//! confounds, artifacts.
use std::collections::HashSet;

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::component::{validate_artifacts, validate_component, default_names, ComponentInput};
use crate::config::DesignConfig;
use crate::error::{DesignError, Result};
use crate::events::{condition_names, encode_condition, validate_events, Event};
use crate::filter::{apply_highpass, highpass_matrix};
use crate::grid::FrameGrid;
use crate::hrf::HrfModel;
use crate::normalize::{demean_columns_inplace, peak_to_peak};
use crate::record::DesignRecord;
use crate::reduce::{ConfoundReducer, PcaReducer};
use crate::resample::resample;
use crate::table::RegressorTable;

/// Group a design column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    Condition,
    ConditionDerivative,
    Regressor,
    Confound,
    Artifact,
}

/// Named views onto a [`DesignMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Submatrix {
    /// Every column.
    Full,
    /// Conditions (without derivatives) and regressors of interest.
    Main,
    /// Condition columns only.
    Condition,
    Confound,
    Artifact,
}

impl Submatrix {
    /// Whether a column of `group` belongs to this view.
    pub fn contains(self, group: ColumnGroup) -> bool {
        match self {
            Submatrix::Full => true,
            Submatrix::Main => matches!(group, ColumnGroup::Condition | ColumnGroup::Regressor),
            Submatrix::Condition => group == ColumnGroup::Condition,
            Submatrix::Confound => group == ColumnGroup::Confound,
            Submatrix::Artifact => group == ColumnGroup::Artifact,
        }
    }

    /// Views that are absent, rather than empty, when they select no column.
    fn optional(self) -> bool {
        matches!(self, Submatrix::Confound | Submatrix::Artifact)
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Builder for a [`DesignMatrix`].
///
/// ```
/// use fmri_design::{DesignConfig, DesignMatrixBuilder, Event, GammaDifferenceHrf};
///
/// let events = vec![Event::new("go", 4.0).with_duration(2.0), Event::new("stop", 20.0)];
/// let hrf = GammaDifferenceHrf::canonical(2.0, 16).unwrap();
/// let design = DesignMatrixBuilder::new(&events, &hrf, 40)
///     .config(DesignConfig { hpf_cutoff: None, ..DesignConfig::default() })
///     .artifacts(vec![false; 40])
///     .build()
///     .unwrap();
/// assert_eq!(design.column_names(), &["go".to_string(), "stop".to_string()]);
/// assert!(design.artifact_submatrix().is_none());
/// ```
pub struct DesignMatrixBuilder<'a> {
    events: &'a [Event],
    hrf: &'a dyn HrfModel,
    ntp: usize,
    config: DesignConfig,
    regressors: Option<ComponentInput>,
    confounds: Option<ComponentInput>,
    artifacts: Option<Vec<bool>>,
    reducer: Option<Box<dyn ConfoundReducer + 'a>>,
}

impl<'a> DesignMatrixBuilder<'a> {
    /// Start a design for `ntp` acquisitions with the default configuration.
    pub fn new(events: &'a [Event], hrf: &'a dyn HrfModel, ntp: usize) -> Self {
        Self {
            events,
            hrf,
            ntp,
            config: DesignConfig::default(),
            regressors: None,
            confounds: None,
            artifacts: None,
            reducer: None,
        }
    }

    pub fn config(mut self, config: DesignConfig) -> Self {
        self.config = config;
        self
    }

    /// Regressors of interest (demeaned, never filtered).
    pub fn regressors(mut self, regressors: impl Into<ComponentInput>) -> Self {
        self.regressors = Some(regressors.into());
        self
    }

    /// Nuisance regressors (demeaned, never filtered).
    pub fn confounds(mut self, confounds: impl Into<ComponentInput>) -> Self {
        self.confounds = Some(confounds.into());
        self
    }

    /// Boolean mask over acquisitions; each flagged frame gets an indicator.
    pub fn artifacts(mut self, mask: impl Into<Vec<bool>>) -> Self {
        self.artifacts = Some(mask.into());
        self
    }

    /// Reducer used when [`DesignConfig::confound_pca`] is set.
    ///
    /// Defaults to [`PcaReducer`].
    pub fn confound_reducer(mut self, reducer: impl ConfoundReducer + 'a) -> Self {
        self.reducer = Some(Box::new(reducer));
        self
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// * [`DesignError::Configuration`] for invalid parameters, unknown
    ///   condition names, malformed events or duplicate column names.
    /// * [`DesignError::Alignment`] when an external component is not aligned
    ///   to the acquisition grid.
    pub fn build(self) -> Result<DesignMatrix> {
        let cfg = &self.config;
        cfg.validate()?;
        validate_events(self.events)?;
        let grid = FrameGrid::new(self.ntp, cfg.tr, cfg.oversampling)?;

        let (hrf_tr, hrf_os) = self.hrf.sampling();
        if (hrf_tr - cfg.tr).abs() > 1e-9 || hrf_os != cfg.oversampling {
            warn!(
                hrf_tr,
                hrf_os,
                tr = cfg.tr,
                oversampling = cfg.oversampling,
                "HRF sampling differs from design sampling; kernel is sampled on the HRF grid"
            );
        }

        let names = condition_names(self.events, cfg.condition_names.as_deref())?;

        // 1–3. Encode, convolve and subsample each condition.
        let (hires_conditions, cond_groups) = self.convolved_conditions(&names, &grid)?;
        let (cond_names, _, hires_data) = hires_conditions.into_parts();
        let hires = grid.hires().to_vec();
        let frametimes = grid.frametimes().to_vec();
        let mut cond_data = resample(&hires_data, &hires, &frametimes, cfg.tr)?;
        debug!(columns = cond_data.ncols(), ntp = self.ntp, "subsampled condition columns");

        // 4. Demean and record heights before filtering.
        demean_columns_inplace(&mut cond_data);
        let mut pp_heights = peak_to_peak(&cond_data);

        // 5. Highpass filter the condition columns only.
        if let Some(cutoff) = cfg.hpf_cutoff.filter(|_| cond_data.ncols() > 0) {
            let f = highpass_matrix(self.ntp, cutoff, cfg.tr)?;
            apply_highpass(&mut cond_data, &f)?;
            debug!(cutoff, "highpass filtered condition columns");
        }
        let conditions = RegressorTable::new(cond_names, grid.frametimes().clone(), cond_data)?;

        // 6. External components.
        let regressors = validate_component(self.regressors, "regressor", grid.frametimes())?;
        let mut confounds = validate_component(self.confounds, "confound", grid.frametimes())?;
        if cfg.confound_pca {
            if let Some(conf) = confounds.take() {
                let reducer: Box<dyn ConfoundReducer + 'a> =
                    self.reducer.unwrap_or_else(|| Box::new(PcaReducer));
                let reduced = reducer.reduce(conf.data(), cfg.confound_variance)?;
                debug!(before = conf.ncols(), after = reduced.ncols(), "reduced confounds");
                confounds = Some(RegressorTable::new(
                    default_names("confound", reduced.ncols()),
                    grid.frametimes().clone(),
                    reduced,
                )?);
            }
        }
        let artifacts = validate_artifacts(self.artifacts.as_deref(), grid.frametimes())?;

        // 7. Concatenate in fixed order.
        let mut groups = cond_groups;
        let mut pieces = vec![&conditions];
        for (piece, group) in [
            (&regressors, ColumnGroup::Regressor),
            (&confounds, ColumnGroup::Confound),
            (&artifacts, ColumnGroup::Artifact),
        ] {
            if let Some(table) = piece {
                pp_heights.extend(peak_to_peak(table.data()));
                groups.extend(std::iter::repeat(group).take(table.ncols()));
                pieces.push(table);
            }
        }
        let mut full = RegressorTable::hstack(&pieces)?;
        check_unique_names(full.names())?;
        demean_columns_inplace(full.data_mut());

        // 8. Diagnostics.
        let singular_values = singular_values(full.data())?;
        debug!(
            shape = ?full.shape(),
            rank_hint = singular_values.iter().filter(|&&s| s > 1e-10).count(),
            "assembled design matrix"
        );

        Ok(DesignMatrix { table: full, groups, pp_heights, singular_values, tr: cfg.tr })
    }

    /// Hires convolved conditions, grouped by HRF channel: every condition's
    /// main column first, then every condition's derivative.
    fn convolved_conditions(
        &self,
        names: &[String],
        grid: &FrameGrid,
    ) -> Result<(RegressorTable, Vec<ColumnGroup>)> {
        let hires = grid.hires().to_vec();
        let mut tables = Vec::with_capacity(names.len());
        for cond in names {
            let ev = encode_condition(self.events.iter().filter(|e| &e.condition == cond), &hires);
            tables.push(self.hrf.convolve(ev.view(), Some(grid.hires()), Some(cond))?);
        }
        debug!(conditions = names.len(), hires = hires.len(), "convolved hires conditions");

        let n_channels = tables.first().map_or(0, RegressorTable::ncols);
        let mut channels = Vec::with_capacity(n_channels * tables.len());
        let mut groups = Vec::with_capacity(n_channels * tables.len());
        for c in 0..n_channels {
            let group = if c == 0 { ColumnGroup::Condition } else { ColumnGroup::ConditionDerivative };
            for table in &tables {
                channels.push(table.select(&[c]));
                groups.push(group);
            }
        }

        if channels.is_empty() {
            return Ok((RegressorTable::empty(grid.hires().clone()), groups));
        }
        let refs: Vec<&RegressorTable> = channels.iter().collect();
        Ok((RegressorTable::hstack(&refs)?, groups))
    }
}

fn check_unique_names(names: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DesignError::Configuration(format!(
                "duplicate design column name '{name}'"
            )));
        }
    }
    Ok(())
}

/// Singular values in descending order.
pub fn singular_values(data: &Array2<f64>) -> Result<Vec<f64>> {
    let (n, m) = data.dim();
    if n == 0 || m == 0 {
        return Ok(Vec::new());
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(DesignError::Linalg("design matrix contains non-finite values".into()));
    }
    let x = DMatrix::from_fn(n, m, |i, j| data[[i, j]]);
    let mut s: Vec<f64> = x.singular_values().iter().copied().collect();
    s.sort_by(|a, b| b.total_cmp(a));
    Ok(s)
}

// ── Design matrix ────────────────────────────────────────────────────────────

/// An assembled, mean-centred GLM design matrix.
///
/// Immutable once built; every submatrix accessor returns an owned copy.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    table: RegressorTable,
    groups: Vec<ColumnGroup>,
    pp_heights: Vec<f64>,
    singular_values: Vec<f64>,
    tr: f64,
}

impl DesignMatrix {
    /// Shorthand for [`DesignMatrixBuilder::new`].
    pub fn builder<'a>(events: &'a [Event], hrf: &'a dyn HrfModel, ntp: usize) -> DesignMatrixBuilder<'a> {
        DesignMatrixBuilder::new(events, hrf, ntp)
    }

    /// The full matrix, indexed by frame time.
    pub fn matrix(&self) -> &RegressorTable {
        &self.table
    }

    /// `(timepoints, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.table.shape()
    }

    pub fn column_names(&self) -> &[String] {
        self.table.names()
    }

    pub fn frametimes(&self) -> &Array1<f64> {
        self.table.index()
    }

    pub fn tr(&self) -> f64 {
        self.tr
    }

    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Peak-to-peak height per column (condition columns measured before
    /// filtering).
    pub fn pp_heights(&self) -> &[f64] {
        &self.pp_heights
    }

    /// Singular values of the full matrix, descending.
    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Names of the columns in `kind`.
    pub fn names(&self, kind: Submatrix) -> Vec<String> {
        self.positions(kind).into_iter().map(|j| self.table.names()[j].clone()).collect()
    }

    fn positions(&self, kind: Submatrix) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(j, &g)| kind.contains(g).then_some(j))
            .collect()
    }

    /// Copy of the columns in `kind`.
    ///
    /// `Confound` and `Artifact` are `None` when the design has no such
    /// columns; the other views are always present.
    pub fn submatrix(&self, kind: Submatrix) -> Option<RegressorTable> {
        let pos = self.positions(kind);
        if pos.is_empty() && kind.optional() {
            return None;
        }
        Some(self.table.select(&pos))
    }

    pub fn main_submatrix(&self) -> RegressorTable {
        self.table.select(&self.positions(Submatrix::Main))
    }

    pub fn condition_submatrix(&self) -> RegressorTable {
        self.table.select(&self.positions(Submatrix::Condition))
    }

    pub fn confound_submatrix(&self) -> Option<RegressorTable> {
        self.submatrix(Submatrix::Confound)
    }

    pub fn artifact_submatrix(&self) -> Option<RegressorTable> {
        self.submatrix(Submatrix::Artifact)
    }

    /// Boolean column mask for `kind`; `None` for an absent optional view.
    pub fn mask(&self, kind: Submatrix) -> Option<Array1<bool>> {
        let mask: Array1<bool> = self.groups.iter().map(|&g| kind.contains(g)).collect();
        if kind.optional() && !mask.iter().any(|&b| b) {
            return None;
        }
        Some(mask)
    }

    pub fn main_vector(&self) -> Array1<bool> {
        self.groups.iter().map(|&g| Submatrix::Main.contains(g)).collect()
    }

    pub fn condition_vector(&self) -> Array1<bool> {
        self.groups.iter().map(|&g| Submatrix::Condition.contains(g)).collect()
    }

    pub fn confound_vector(&self) -> Option<Array1<bool>> {
        self.mask(Submatrix::Confound)
    }

    pub fn artifact_vector(&self) -> Option<Array1<bool>> {
        self.mask(Submatrix::Artifact)
    }

    /// Full-width contrast with `weights[i]` at column `names[i]`, zero elsewhere.
    ///
    /// ```
    /// # use fmri_design::{DesignConfig, DesignMatrix, Event, IdentityHrf};
    /// # let events = vec![Event::new("a", 0.0), Event::new("b", 8.0)];
    /// # let hrf = IdentityHrf::new(2.0, 16);
    /// # let cfg = DesignConfig { hpf_cutoff: None, ..DesignConfig::default() };
    /// # let design = DesignMatrix::builder(&events, &hrf, 10).config(cfg).build().unwrap();
    /// let c = design.contrast_vector(&["a", "b"], &[1.0, -1.0]).unwrap();
    /// assert_eq!(c.to_vec(), vec![1.0, -1.0]);
    /// ```
    pub fn contrast_vector<S: AsRef<str>>(&self, names: &[S], weights: &[f64]) -> Result<Array1<f64>> {
        if names.len() != weights.len() {
            return Err(DesignError::Configuration(format!(
                "{} contrast names for {} weights",
                names.len(),
                weights.len()
            )));
        }
        let mut vector = Array1::<f64>::zeros(self.table.ncols());
        for (name, &weight) in names.iter().zip(weights) {
            let name = name.as_ref();
            let j = self.table.position(name).ok_or_else(|| {
                DesignError::Configuration(format!("contrast column '{name}' not in design"))
            })?;
            vector[j] = weight;
        }
        Ok(vector)
    }

    /// Plain value snapshot for serialisation.
    pub fn to_record(&self) -> DesignRecord {
        DesignRecord {
            column_names: self.table.names().to_vec(),
            groups: self.groups.clone(),
            frametimes: self.table.index().to_vec(),
            matrix: self.table.data().rows().into_iter().map(|r| r.to_vec()).collect(),
            pp_heights: self.pp_heights.clone(),
            singular_values: self.singular_values.clone(),
            tr: self.tr,
        }
    }

    /// Rebuild from a record, checking that its parts agree in shape.
    ///
    /// Singular values are recomputed from the matrix; the stored ones are
    /// ignored.
    pub fn from_record(record: DesignRecord) -> Result<Self> {
        let ntp = record.frametimes.len();
        let ncols = record.column_names.len();
        if record.groups.len() != ncols || record.pp_heights.len() != ncols {
            return Err(DesignError::Configuration(format!(
                "record has {ncols} columns but {} groups and {} heights",
                record.groups.len(),
                record.pp_heights.len()
            )));
        }
        if record.matrix.len() != ntp || record.matrix.iter().any(|r| r.len() != ncols) {
            return Err(DesignError::Configuration(format!(
                "record matrix is not {ntp} × {ncols}"
            )));
        }
        let flat: Vec<f64> = record.matrix.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((ntp, ncols), flat)
            .map_err(|e| DesignError::Configuration(format!("record matrix: {e}")))?;
        let table = RegressorTable::new(record.column_names, Array1::from_vec(record.frametimes), data)?;
        check_unique_names(table.names())?;
        let singular_values = singular_values(table.data())?;
        Ok(Self {
            table,
            groups: record.groups,
            pp_heights: record.pp_heights,
            singular_values,
            tr: record.tr,
        })
    }
}

impl std::fmt::Display for DesignMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (ntp, ncols) = self.shape();
        write!(f, "{:>8}", "frame")?;
        for name in self.column_names() {
            write!(f, " {name:>12}")?;
        }
        writeln!(f)?;
        for i in 0..ntp {
            write!(f, "{:>8.2}", self.frametimes()[i])?;
            for j in 0..ncols {
                write!(f, " {:>12.5}", self.table.data()[[i, j]])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hrf::IdentityHrf;

    fn no_filter() -> DesignConfig {
        DesignConfig { hpf_cutoff: None, ..DesignConfig::default() }
    }

    #[test]
    fn submatrix_dispatch_table() {
        use ColumnGroup::*;
        assert!(Submatrix::Main.contains(Condition));
        assert!(Submatrix::Main.contains(Regressor));
        assert!(!Submatrix::Main.contains(ConditionDerivative));
        assert!(!Submatrix::Condition.contains(Regressor));
        assert!(Submatrix::Full.contains(Artifact));
    }

    #[test]
    fn duplicate_names_rejected() {
        let events = vec![Event::new("regressor_0", 0.0)];
        let hrf = IdentityHrf::new(2.0, 16);
        let err = DesignMatrix::builder(&events, &hrf, 10)
            .config(no_filter())
            .regressors(Array2::<f64>::ones((10, 1)))
            .build()
            .unwrap_err();
        assert!(matches!(err, DesignError::Configuration(_)));
    }

    #[test]
    fn contrast_unknown_name_rejected() {
        let events = vec![Event::new("a", 0.0)];
        let hrf = IdentityHrf::new(2.0, 16);
        let d = DesignMatrix::builder(&events, &hrf, 10).config(no_filter()).build().unwrap();
        assert!(d.contrast_vector(&["nope"], &[1.0]).is_err());
        assert!(d.contrast_vector(&["a"], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn singular_values_descending() {
        let x = Array2::from_shape_fn((6, 3), |(i, j)| ((i + 1) * (j + 2)) as f64 + if i == j { 1.0 } else { 0.0 });
        let s = singular_values(&x).unwrap();
        assert_eq!(s.len(), 3);
        assert!(s.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn record_singular_values_follow_matrix() {
        let events = vec![Event::new("a", 0.0), Event::new("b", 8.0)];
        let hrf = IdentityHrf::new(2.0, 16);
        let d = DesignMatrix::builder(&events, &hrf, 10).config(no_filter()).build().unwrap();

        let mut rec = d.to_record();
        rec.singular_values = vec![42.0; 7];
        let back = DesignMatrix::from_record(rec).unwrap();
        assert_eq!(back.singular_values().len(), 2);
        for (a, b) in back.singular_values().iter().zip(d.singular_values()) {
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn display_has_header_and_rows() {
        let events = vec![Event::new("a", 0.0)];
        let hrf = IdentityHrf::new(2.0, 16);
        let d = DesignMatrix::builder(&events, &hrf, 3).config(no_filter()).build().unwrap();
        let text = d.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().next().unwrap().contains('a'));
    }
}
