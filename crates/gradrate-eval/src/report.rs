//! Console reporting.

use crate::cross_validate::CrossValidationReport;
use gradrate_models::ModelFamily;
use std::fmt;

/// Three labelled scores printed after an evaluation or a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBlock {
    /// Heading naming the family and scaling
    pub label: String,
    /// R² on the training rows
    pub train_r2: f64,
    /// R² on the held-out rows
    pub holdout_r2: f64,
    /// Name printed for the held-out R² (`R^2 Validation` or `R^2 Test`)
    pub holdout_label: &'static str,
    /// Mean squared error on the held-out rows
    pub mse: f64,
}

impl ScoreBlock {
    /// Heading used for a family with or without scaling.
    pub fn label_for(family: &ModelFamily, standardize: bool) -> String {
        if standardize {
            format!("{family} with standard scaling")
        } else {
            family.to_string()
        }
    }
}

impl fmt::Display for ScoreBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "  R^2 Train: {:.4}", self.train_r2)?;
        writeln!(f, "  {}: {:.4}", self.holdout_label, self.holdout_r2)?;
        write!(f, "  MSE: {:.4}", self.mse)
    }
}

/// Side-by-side table of several cross-validation runs.
pub fn comparison_table(reports: &[CrossValidationReport]) -> String {
    let mut output = String::new();

    output.push_str("\nCross-Validated Model Comparison\n");
    output.push_str(&"=".repeat(80));
    output.push('\n');

    output.push_str(&format!(
        "{:<44} {:>11} {:>11} {:>11}\n",
        "Model", "R^2 Train", "R^2 Valid", "MSE"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for report in reports {
        output.push_str(&format!(
            "{:<44} {:>11.4} {:>11.4} {:>11.4}\n",
            report.label(),
            report.mean_train_r2,
            report.mean_validation_r2,
            report.mean_validation_mse
        ));
    }

    output.push_str(&"-".repeat(80));
    output.push('\n');

    let best = reports
        .iter()
        .max_by(|a, b| a.mean_validation_r2.total_cmp(&b.mean_validation_r2));
    if let Some(best) = best {
        output.push_str(&format!(
            "Best by validation R^2: {} ({:.4})\n",
            best.label(),
            best.mean_validation_r2
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(family: ModelFamily, standardize: bool, r2: f64) -> CrossValidationReport {
        CrossValidationReport {
            family,
            standardize,
            folds: Vec::new(),
            mean_train_r2: r2 + 0.05,
            mean_validation_r2: r2,
            mean_validation_mse: 10.0,
        }
    }

    #[test]
    fn test_score_block_lines() {
        let block = ScoreBlock {
            label: "Linear regression".to_string(),
            train_r2: 0.81234,
            holdout_r2: 0.79,
            holdout_label: "R^2 Test",
            mse: 42.0,
        };
        let text = block.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Linear regression");
        assert_eq!(lines[1], "  R^2 Train: 0.8123");
        assert_eq!(lines[2], "  R^2 Test: 0.7900");
        assert_eq!(lines[3], "  MSE: 42.0000");
    }

    #[test]
    fn test_label_for() {
        assert_eq!(ScoreBlock::label_for(&ModelFamily::Ols, false), "Linear regression");
        assert_eq!(
            ScoreBlock::label_for(&ModelFamily::Lasso { alpha: 0.5 }, true),
            "LASSO regression (alpha=0.5) with standard scaling"
        );
    }

    #[test]
    fn test_comparison_table_names_best() {
        let table = comparison_table(&[
            report(ModelFamily::Ols, false, 0.70),
            report(ModelFamily::Ridge { alpha: 1.0 }, true, 0.74),
            report(ModelFamily::Lasso { alpha: 1.0 }, true, 0.72),
        ]);

        assert!(table.contains("Linear regression"));
        assert!(table.contains("Best by validation R^2: Ridge regression (alpha=1) with standard scaling (0.7400)"));
    }

    #[test]
    fn test_empty_comparison() {
        let table = comparison_table(&[]);
        assert!(!table.contains("Best"));
    }
}
