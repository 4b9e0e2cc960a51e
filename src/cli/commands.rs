// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `predict` and `info`.
//
// clap's derive macros generate help text, error messages for
// bad values, and typed parsing (string → f64 / u64 / usize),
// so a non-numeric seed never reaches the pipeline.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{ArgGroup, Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a random forest on a CSV dataset and write model + metrics
    Train(TrainArgs),

    /// Predict one feature vector, or every row of a CSV, with a trained model
    Predict(PredictArgs),

    /// Describe a trained model and its recorded metrics
    Info(InfoArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with a header row, numeric features and a label column
    #[arg(long, default_value = "data/dataset.csv")]
    pub data: String,

    /// Directory that receives model.bin and metrics.json
    #[arg(long, default_value = "models")]
    pub output_dir: String,

    /// Name of the label column
    #[arg(long, default_value = "species")]
    pub target: String,

    /// Share of rows used for training, strictly between 0 and 1
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the split, the bootstrap samples and feature draws
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub n_trees: usize,

    /// Maximum tree depth (unbounded if omitted)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Candidate feature columns drawn per split (all if omitted)
    #[arg(long)]
    pub max_features: Option<usize>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data,
            output_dir:     a.output_dir,
            label_column:   a.target,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            n_trees:        a.n_trees,
            max_depth:      a.max_depth,
            max_features:   a.max_features,
        }
    }
}

/// All arguments for the `predict` command.
/// Exactly one of `--features` and `--input` is required.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["features", "input"])))]
pub struct PredictArgs {
    /// Comma-separated feature values in training column order,
    /// e.g. 5.1,3.5,1.4,0.2
    #[arg(long, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
    pub features: Vec<f64>,

    /// CSV file of rows to predict; its header must name every
    /// feature the model was trained on
    #[arg(long)]
    pub input: Option<String>,

    /// Directory written by `train`
    #[arg(long, default_value = "models")]
    pub model_dir: String,
}

/// All arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "models")]
    pub model_dir: String,
}
