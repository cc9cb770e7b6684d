//! The end-to-end run
//!
//! Load → prepare → one-vs-rest logistic regression → SVM sweep → softmax
//! logistic regression. Accuracy lines go to the caller's writer; progress
//! goes to the log.

use crate::config::RunConfig;
use crate::core::{DataSplits, Result, SplitKind};
use crate::data::{open_source, prepare, PreparedData};
use crate::logistic::{LogisticMode, LogisticRegression};
use crate::metrics::AccuracyReport;
use crate::optimizer::SelectedMinimizer;
use crate::report::{LogisticOutcome, RunSummary};
use crate::svm::{SmoBackend, SvmBackend};
use crate::sweep::run_sweep;
use log::info;
use std::io::Write;

/// Printed between the logistic and SVM results
pub const SVM_BANNER: &str = "--------------SVM-------------------";

/// Read the configured dataset and build the three splits
pub fn load_and_prepare(config: &RunConfig) -> Result<PreparedData> {
    let source = open_source(&config.dataset, config.format);
    info!("Loading {}", source.describe());
    let raw = source.load()?;
    info!(
        "Loaded {} training and {} test images over {} classes",
        raw.n_train_images(),
        raw.n_test_images(),
        raw.n_classes()
    );
    prepare(&raw, &config.preprocess_config())
}

/// Run every enabled stage and write the report file if one is configured
pub fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<RunSummary> {
    config.validate()?;
    let prepared = load_and_prepare(config)?;
    let backend = SmoBackend::new(config.solver_config());

    let mut summary = RunSummary::new(&config.dataset, &prepared.splits);
    run_stages(config, &prepared.splits, &backend, out, &mut summary)?;

    if let Some(path) = &config.report {
        summary.save_to_file(path)?;
        info!("Run summary written to {path:?}");
    }
    Ok(summary)
}

/// The stages of [`run`] on already prepared splits
pub fn run_stages<W, B>(
    config: &RunConfig,
    splits: &DataSplits,
    backend: &B,
    out: &mut W,
    summary: &mut RunSummary,
) -> Result<()>
where
    W: Write,
    B: SvmBackend + ?Sized,
{
    if config.run_binary {
        info!("Training one-vs-rest logistic regression");
        let outcome = fit_logistic(config, LogisticMode::OneVsRest, splits)?;
        write_report(out, &outcome.accuracy)?;
        summary.binary_logistic = Some(outcome);
    }

    if config.run_svm {
        writeln!(out, "\n\n{SVM_BANNER}\n")?;
        let mut write_error = None;
        summary.svm = run_sweep(backend, splits, &config.svm.configurations, |result| {
            let written = write_entry(&mut *out, &result.config.description(), &result.report);
            if let Err(e) = written {
                write_error.get_or_insert(e);
            }
        })?;
        if let Some(e) = write_error {
            return Err(e.into());
        }
    }

    if config.run_multiclass {
        info!("Training multinomial logistic regression");
        let outcome = fit_logistic(config, LogisticMode::Multinomial, splits)?;
        write_report(out, &outcome.accuracy)?;
        summary.multiclass_logistic = Some(outcome);
    }

    Ok(())
}

/// Train one logistic flavour on the training split and score all three
pub fn fit_logistic(
    config: &RunConfig,
    mode: LogisticMode,
    splits: &DataSplits,
) -> Result<LogisticOutcome> {
    let minimizer = SelectedMinimizer::new(config.logistic.method, config.minimize_options());
    let model = LogisticRegression::new(mode)
        .with_minimizer(minimizer)
        .with_n_classes(splits.n_classes)
        .fit(&splits.train)?;

    let accuracy = AccuracyReport::from_fn(|kind: SplitKind| model.evaluate(splits.get(kind)))?;
    Ok(LogisticOutcome {
        accuracy,
        fits: model.fits().to_vec(),
    })
}

fn write_entry<W: Write>(out: &mut W, heading: &str, report: &AccuracyReport) -> std::io::Result<()> {
    writeln!(out, "\n {heading}")?;
    write_report(out, report)
}

fn write_report<W: Write>(out: &mut W, report: &AccuracyReport) -> std::io::Result<()> {
    for line in report.lines() {
        writeln!(out, "\n{line}")?;
    }
    Ok(())
}
