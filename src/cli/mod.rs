// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands a plain
// TrainConfig to the application layer. Printing of the final
// summary happens here; everything else is delegated.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::TrainArgs;

#[derive(Parser, Debug)]
#[command(
    name = "ecg-train",
    version = "0.1.0",
    about = "Train a convolutional/recurrent ECG classifier, keeping the best checkpoint."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: TrainArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on data in: {}", self.args.data_path);

        let use_case = TrainUseCase::new(self.args.into());
        let outcome  = use_case.execute()?;

        match outcome.history.best_epoch() {
            Some(best) => println!(
                "Training complete. Best epoch {:02} with val_loss={:.4}. Artifacts in {}",
                best.epoch,
                best.val_loss,
                outcome.run_dir.display(),
            ),
            None => println!(
                "Training complete. No finite validation loss recorded. Artifacts in {}",
                outcome.run_dir.display(),
            ),
        }
        Ok(())
    }
}
