use anyhow::Context;
use clap::Parser;

use efficientdet_inference::{Args, init_logger, run_prediction};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let predict_args = args
        .into_predict_args()
        .context("Failed to assemble prediction settings")?;

    let outcome = run_prediction(&predict_args).context("Prediction failed")?;
    tracing::info!("Done, {} detections", outcome.detections.len());

    Ok(())
}
