//! Repeated analyze/apply passes that write fixes back to disk.

use crate::analyzer::{Analyzer, AnalyzerError};
use crate::edit::{apply_edits, plan_fixes};
use crate::types::LintResult;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Upper bound on analyze/apply passes in [`Analyzer::fix`].
pub const MAX_FIX_PASSES: usize = 10;

/// Outcome of [`Analyzer::fix`].
#[derive(Debug, Default)]
pub struct FixReport {
    /// Passes that applied at least one fix.
    pub passes: usize,
    /// Violations fixed across all passes.
    pub fixes_applied: usize,
    /// Files rewritten, relative to the analysis root.
    pub files_changed: Vec<PathBuf>,
    /// Analysis of the final state of the files.
    pub result: LintResult,
}

impl Analyzer {
    /// Applies fixes until none apply, then reports what remains.
    ///
    /// Each pass re-reads and re-analyzes the files, so fixes deferred
    /// because of a conflict are retried against the updated text. At most
    /// [`MAX_FIX_PASSES`] passes write files.
    ///
    /// # Errors
    ///
    /// Returns an error if analysis fails or a file cannot be written.
    pub fn fix(&self) -> Result<FixReport, AnalyzerError> {
        let mut report = FixReport::default();
        let mut changed: BTreeSet<PathBuf> = BTreeSet::new();

        loop {
            let modules = self.load_modules()?;
            let result = self.check_modules(&modules);

            if report.passes == MAX_FIX_PASSES {
                info!("Stopping after {MAX_FIX_PASSES} fix passes");
                report.result = result;
                break;
            }

            let texts: HashMap<&Path, &str> = modules
                .iter()
                .flat_map(|m| &m.files)
                .map(|f| (f.path(), f.text()))
                .collect();
            let plan = plan_fixes(&result.violations, |path| texts.get(path).copied());

            if plan.accepted == 0 {
                report.result = result;
                break;
            }

            for (path, edits) in &plan.edits {
                let Some(text) = texts.get(path.as_path()) else {
                    continue;
                };
                let fixed = apply_edits(text, edits)?;
                if fixed != *text {
                    debug!("Writing {} edit(s) to {}", edits.len(), path.display());
                    std::fs::write(self.root().join(path), fixed)?;
                    changed.insert(path.clone());
                }
            }

            report.passes += 1;
            report.fixes_applied += plan.accepted;
            debug!("Fix pass {} applied {} fix(es)", report.passes, plan.accepted);
        }

        report.files_changed = changed.into_iter().collect();
        info!(
            "Applied {} fix(es) to {} file(s) in {} pass(es)",
            report.fixes_applied,
            report.files_changed.len(),
            report.passes
        );
        Ok(report)
    }
}
