use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value as JsonValue};
use slidever::smart::{aggressive_converter, conservative_converter, standard_converter};
use slidever::{adapter, compat, detect, middleware, slide, Version};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slidever")]
#[command(version, about = "Detect and convert V1/V2 slide elements")]
#[command(long_about = "Detect and convert V1/V2 slide elements\n\n\
    The input file holds an element array, a single element, an object with an\n\
    `elements` array, or (for `slide`) a whole slide.\n\
    JSON output is pretty-printed by default with indentation.\n\n\
    Examples:\n  \
    slidever deck.json convert --to v2 [--smart] [-o out.json]\n  \
    slidever deck.json detect\n  \
    slidever slide.json slide --to v1 --compact")]
struct Cli {
    /// Input JSON file path
    input: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Output JSON file path (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Compact JSON output (default is pretty-printed with indentation)
    #[arg(long, global = true)]
    compact: bool,

    /// Verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every element to the target version
    Convert {
        #[arg(long, value_enum)]
        to: VersionArg,

        /// Use the strategy-based converter and report batch statistics
        #[arg(long)]
        smart: bool,

        /// Smart converter preset
        #[arg(long, value_enum, default_value = "standard")]
        profile: Profile,
    },
    /// Classify each element and the whole collection
    Detect,
    /// Dry run: show which elements would convert, skip or fail
    Preview {
        #[arg(long, value_enum)]
        to: VersionArg,
    },
    /// Recommend a target version for the collection
    Infer,
    /// Report version mixing and unsupported elements
    Check,
    /// Convert a whole slide, including its background
    Slide {
        #[arg(long, value_enum)]
        to: VersionArg,
    },
    /// Run the elements through a preset middleware
    Process {
        #[arg(long = "for", value_enum)]
        purpose: Purpose,

        /// Target version for imports
        #[arg(long, value_enum, default_value = "v2")]
        prefer: VersionArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VersionArg {
    V1,
    V2,
}

impl From<VersionArg> for Version {
    fn from(arg: VersionArg) -> Self {
        match arg {
            VersionArg::V1 => Version::V1,
            VersionArg::V2 => Version::V2,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Standard,
    Conservative,
    Aggressive,
}

#[derive(Clone, Copy, ValueEnum)]
enum Purpose {
    Api,
    Storage,
    Ui,
    Import,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("Reading input file: {}", cli.input.display());

    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {}", cli.input.display()))?;
    let input: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("Input is not valid JSON: {}", cli.input.display()))?;

    let result = run(&cli.command, &input)?;

    // Format output (pretty by default, compact if flag is set)
    let output = if cli.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };

    match cli.output.as_ref() {
        Some(path) => {
            info!("Writing output to: {}", path.display());
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}

fn run(command: &Command, input: &JsonValue) -> Result<JsonValue> {
    match command {
        Command::Convert { to, smart, profile } => {
            let elements = element_list(input)?;
            let target = Version::from(*to);
            if *smart {
                let converter = match profile {
                    Profile::Standard => standard_converter(),
                    Profile::Conservative => conservative_converter(),
                    Profile::Aggressive => aggressive_converter(),
                };
                let batch = converter
                    .smart_batch_convert(&elements, target)
                    .context("Smart conversion failed")?;
                debug!("Batch stats: {:?}", batch.stats);
                Ok(serde_json::to_value(batch)?)
            } else {
                let converted = match target {
                    Version::V1 => adapter::all_to_v1(&elements),
                    Version::V2 => adapter::all_to_v2(&elements),
                }
                .with_context(|| format!("Failed to convert elements to {}", target))?;
                info!("Converted {} of {} elements", converted.len(), elements.len());
                Ok(JsonValue::Array(converted))
            }
        }
        Command::Detect => {
            let elements = element_list(input)?;
            let details: Vec<JsonValue> = elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    json!({
                        "index": index,
                        "id": element.get("id"),
                        "type": element.get("type"),
                        "version": detect::classify(element),
                        "signals": detect::matched_signals(element),
                    })
                })
                .collect();
            Ok(json!({
                "version": detect::detect_elements_version(&elements),
                "elements": details,
            }))
        }
        Command::Preview { to } => {
            let elements = element_list(input)?;
            let preview = standard_converter().preview_conversion(&elements, Version::from(*to));
            Ok(serde_json::to_value(preview)?)
        }
        Command::Infer => {
            let elements = element_list(input)?;
            let inference = standard_converter().infer_best_strategy(&elements);
            Ok(serde_json::to_value(inference)?)
        }
        Command::Check => {
            let elements = element_list(input)?;
            Ok(serde_json::to_value(compat::check_compatibility(&elements))?)
        }
        Command::Slide { to } => {
            if !input.is_object() {
                bail!("Slide input must be a JSON object");
            }
            let converted = match Version::from(*to) {
                Version::V1 => slide::slide_to_v1(input),
                Version::V2 => slide::slide_to_v2(input),
            }
            .context("Failed to convert slide")?;
            Ok(converted)
        }
        Command::Process { purpose, prefer } => {
            let result = match purpose {
                Purpose::Api => middleware::for_api(input)?,
                Purpose::Storage => middleware::for_storage(input)?,
                Purpose::Ui => middleware::for_ui(input)?,
                Purpose::Import => {
                    middleware::for_import(input, Version::from(*prefer))?.map_data(JsonValue::Array)
                }
            };
            Ok(serde_json::to_value(result)?)
        }
    }
}

fn element_list(input: &JsonValue) -> Result<Vec<JsonValue>> {
    middleware::input_elements(input).context("Unrecognized input layout")
}
