// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap, hands the work to Layer 2, and prints the results.
//
//   1. `train`   — run the training pipeline, print the summary
//   2. `predict` — load a model, predict one feature vector
//                  or every row of a CSV (--input)
//   3. `info`    — load a model, print what it was trained on
//
// All human-readable output goes to stdout here; tracing logs
// go to stderr.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InfoArgs, PredictArgs, TrainArgs};

use std::path::Path;

use crate::application::predict_use_case::{BatchPrediction, ModelInfo, Prediction, PredictUseCase};
use crate::application::train_use_case::{TrainOutcome, TrainUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "forest-trainer",
    version,
    about = "Train, evaluate and persist a random forest classifier on a CSV dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routes only, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Info(args)    => run_info(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.data);
    let outcome = TrainUseCase::new(args.into()).execute()?;
    print_training_summary(&outcome);
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let use_case = PredictUseCase::new(args.model_dir)?;
    match args.input {
        Some(input) => print_batch(&use_case.predict_batch(Path::new(&input))?),
        None        => print_prediction(&use_case.predict(&args.features)?),
    }
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let info = PredictUseCase::new(args.model_dir)?.info()?;
    print_model_info(&info);
    Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_training_summary(o: &TrainOutcome) {
    let m = &o.metrics;

    println!("Dataset shape: {:?}", o.shape);
    println!("Dataset columns: {:?}", o.columns);
    println!("Target classes: {:?}", o.classes);
    println!();
    println!("Training set size: {}", m.training_samples);
    println!("Test set size: {}", m.test_samples);
    println!();
    println!("Train Accuracy: {:.4}", m.train_accuracy);
    println!("Test Accuracy: {:.4}", m.test_accuracy);
    println!();
    println!("Classification Report:");
    println!("{}", m.classification_report);
    println!("Feature Importance:");
    let width = m
        .feature_importances
        .iter()
        .map(|f| f.feature.len())
        .max()
        .unwrap_or(7)
        .max("feature".len());
    println!("  {:<width$}  importance", "feature");
    for f in &m.feature_importances {
        println!("  {:<width$}  {:.4}", f.feature, f.importance);
    }
    println!();
    println!(
        "Model saved to {} ({} bytes)",
        o.artifacts.model_path.display(),
        o.artifacts.model_bytes
    );
    println!("Metrics saved to {}", o.artifacts.metrics_path.display());
    println!();
    println!("Training pipeline completed successfully!");
}

fn print_prediction(p: &Prediction) {
    println!("Prediction: {}", p.label);
    println!("Confidence: {:.4}", p.confidence);
    println!("Input features:");
    for (name, value) in &p.inputs {
        println!("  {name}: {value}");
    }
}

fn print_batch(results: &[BatchPrediction]) {
    println!("{:>5}  {:<15}  confidence", "index", "prediction");
    for r in results {
        println!("{:>5}  {:<15}  {:.4}", r.index, r.label, r.confidence);
    }
    println!();
    println!("Total predictions: {}", results.len());
}

fn print_model_info(info: &ModelInfo) {
    println!("Model type: {}", info.model_type);
    println!("Trees: {}", info.n_trees);
    println!("Features: {:?}", info.features);
    println!("Classes: {:?}", info.classes);
    println!(
        "Max depth: {}, max features per split: {}, seed: {}",
        info.params.max_depth.map_or("unbounded".to_string(), |d| d.to_string()),
        info.params.max_features.map_or("all".to_string(), |f| f.to_string()),
        info.params.seed,
    );
    match &info.metrics {
        Some(m) => {
            println!("Train accuracy: {:.4}", m.train_accuracy);
            println!("Test accuracy: {:.4}", m.test_accuracy);
            println!(
                "Trained on {} rows, tested on {} (train fraction {})",
                m.training_samples, m.test_samples, m.config.train_fraction
            );
            for f in &m.feature_importances {
                println!("  {}: {:.4}", f.feature, f.importance);
            }
        }
        None => println!("Metrics: not available"),
    }
}
