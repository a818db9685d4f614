//! Floral Whisper Command Line (Desktop)
//!
//! Runs one bouquet session from saved sketches: the PNG files become the
//! flowers, the flags fill in the gift details, and the generated bouquet is
//! written to disk next to a printed greeting card.
//! For WASM/web builds, the entry point is in lib.rs (wasm_start).

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use anyhow::{Context, Result};
    use clap::Parser;

    use floral_whisper::{
        hooks, BouquetGenerator, EncodedImage, GeminiGenerator, GeneratorConfig, GreetingCard,
        Wizard, WizardError, MAX_SKETCHES,
    };

    #[derive(Debug, Parser)]
    #[command(name = "floral_whisper", version, about = "Turn hand-drawn flowers into a bouquet")]
    pub struct Args {
        /// Sender name signed on the card
        #[arg(long = "from")]
        sender: String,

        /// Recipient name the bouquet is for
        #[arg(long = "to")]
        recipient: String,

        /// Personal message for the card
        #[arg(long, default_value = "")]
        message: String,

        /// JSON file with generator settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the generated bouquet
        #[arg(long, short, default_value = "bouquet.png")]
        output: PathBuf,

        /// Sketch PNG files, one per flower
        #[arg(required = true, num_args = 1..=MAX_SKETCHES)]
        sketches: Vec<PathBuf>,
    }

    fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
        let config = match path {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        Ok(config.apply_env())
    }

    fn read_sketch(path: &Path) -> Result<EncodedImage> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        EncodedImage::from_png_bytes(bytes).with_context(|| format!("loading {}", path.display()))
    }

    fn announce(wizard: &Wizard) {
        hooks::wizard_state_changed(wizard.state().as_str(), wizard.state().step_index());
    }

    /// Walk the wizard from drawing to the final card
    pub async fn run_session<G>(args: &Args, generator: &G) -> Result<bool>
    where
        G: BouquetGenerator + ?Sized,
    {
        let mut wizard = Wizard::new();
        announce(&wizard);

        for path in &args.sketches {
            let image = read_sketch(path)?;
            let sketch = wizard.add_sketch(image)?;
            log::info!("{} <- {}", sketch.badge(), path.display());
            hooks::sketches_changed(wizard.sketches().len());
        }

        wizard.advance_to_details()?;
        announce(&wizard);
        wizard.set_sender(args.sender.as_str())?;
        wizard.set_recipient(args.recipient.as_str())?;
        wizard.set_message(args.message.as_str())?;

        let outcome = wizard.submit(generator).await.map(|artifact| artifact.image().clone());
        announce(&wizard);

        let image = match outcome {
            Ok(image) => image,
            Err(WizardError::Validation(_)) | Err(WizardError::Generation(_)) => {
                if let Some(notice) = wizard.take_notice() {
                    hooks::notice(notice.message());
                    eprintln!("{}", notice.message());
                }
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        std::fs::write(&args.output, image.bytes())
            .with_context(|| format!("writing {}", args.output.display()))?;
        log::info!("Bouquet saved to {}", args.output.display());

        print!("{}", GreetingCard::from_details(wizard.details()).render_text());
        println!("\nBouquet: {}", args.output.display());
        Ok(true)
    }

    pub async fn main() -> Result<ExitCode> {
        env_logger::init();

        let args = Args::parse();
        log::info!("🌸 Starting Floral Whisper with {} sketches", args.sketches.len());

        let config = load_config(args.config.as_deref())?;
        let generator = GeminiGenerator::new(config).context("configuring the image service")?;

        if run_session(&args, &generator).await? {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::FAILURE)
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<std::process::ExitCode> {
    cli::main().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
