mod data;
mod job;

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Args as ClapArgs, Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use handlebars::Handlebars;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::json;
use slidegen::{Definitions, Renderers, SlideConfigBuilder, SlideElement};

use crate::{data::DatasetCache, job::Job};

const OUTPUT_TEMPLATE: &str = "output";

#[derive(Parser, Debug)]
#[clap(name = "slidegen", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct Inputs {
    /// Directory holding templates/, text_patterns.yaml and styles.yaml.
    #[clap(short, long)]
    definitions: PathBuf,

    /// Job file listing the decks to generate.
    #[clap(short, long)]
    job: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and render every slide of every deck in the job.
    Render {
        #[clap(flatten)]
        inputs: Inputs,

        /// Output path pattern, rendered with the deck name as `deck`.
        #[clap(short, long, default_value = "{{deck}}.json")]
        output: String,

        /// Skip slides that fail instead of aborting the run.
        #[clap(short, long)]
        keep_going: bool,
    },
    /// Check that every slide in the job could be built.
    Check {
        #[clap(flatten)]
        inputs: Inputs,
    },
}

/// One rendered deck, as written to the output file.
#[derive(Debug, Serialize)]
struct DeckOutput<'a> {
    deck: &'a str,
    slides: Vec<SlideOutput>,
}

#[derive(Debug, Serialize)]
struct SlideOutput {
    page: usize,
    template_id: String,
    fingerprint: String,
    elements: Vec<SlideElement>,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match &args.command {
        Command::Render {
            inputs,
            output,
            keep_going,
        } => render(inputs, output, *keep_going),
        Command::Check { inputs } => check(inputs),
    };
    match result {
        Ok(_) => info!("Success!"),
        Err(e) => {
            error!("Failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

fn load(inputs: &Inputs) -> Result<(Definitions, Job)> {
    let definitions = Definitions::load_from_dir(&inputs.definitions)?;
    let job = Job::load(&inputs.job)?;
    Ok((definitions, job))
}

fn render(inputs: &Inputs, output: &str, keep_going: bool) -> Result<()> {
    let (definitions, job) = load(inputs)?;
    let builder = SlideConfigBuilder::new(&definitions);
    let renderers = Renderers::standard();
    let mut cache = DatasetCache::default();

    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_template_string(OUTPUT_TEMPLATE, output)
        .wrap_err_with(|| format!("invalid output pattern \"{}\"", output))?;

    let mut failed = 0;
    for deck in &job.decks {
        let deck_ctx = job.context(deck, &mut cache)?;
        let mut slides = Vec::with_capacity(deck.slides.len());
        for (position, slide) in deck.slides.iter().enumerate() {
            let template_id = slide.template();
            let page = slides.len() + 1;
            let result = slide.context(&deck_ctx).and_then(|ctx| {
                let config = builder.build(template_id, &ctx)?;
                let elements = renderers.render(&config, page)?;
                Ok(SlideOutput {
                    page,
                    template_id: config.template_id.clone(),
                    fingerprint: config.fingerprint()?,
                    elements,
                })
            });
            match result {
                Ok(out) => {
                    debug!(
                        "Deck {}: page {} from template {} ({})",
                        deck.name, page, template_id, out.fingerprint
                    );
                    slides.push(out);
                }
                Err(e) if keep_going => {
                    error!(
                        "Deck {}: skipping slide {} (template {}): {:?}",
                        deck.name,
                        position + 1,
                        template_id,
                        e
                    );
                    failed += 1;
                }
                Err(e) => {
                    return Err(e.wrap_err(format!(
                        "deck {}: slide {} (template {}) failed",
                        deck.name,
                        position + 1,
                        template_id
                    )))
                }
            }
        }

        let path = PathBuf::from(hb.render(OUTPUT_TEMPLATE, &json!({ "deck": deck.name }))?);
        ensure_parent_path_exists(&path)?;
        let content = serde_json::to_string_pretty(&DeckOutput {
            deck: &deck.name,
            slides,
        })?;
        fs::write(&path, content)
            .wrap_err_with(|| format!("failed to write output file {}", path.display()))?;
        info!("Wrote deck {} to {}", deck.name, path.display());
    }
    if failed > 0 {
        warn!("{} slide(s) were skipped", failed);
    }
    Ok(())
}

fn check(inputs: &Inputs) -> Result<()> {
    let (definitions, job) = load(inputs)?;
    let builder = SlideConfigBuilder::new(&definitions);
    let mut cache = DatasetCache::default();
    let (mut total, mut invalid) = (0, 0);
    for deck in &job.decks {
        let deck_ctx = job.context(deck, &mut cache)?;
        for (position, slide) in deck.slides.iter().enumerate() {
            total += 1;
            let ctx = slide.context(&deck_ctx)?;
            let validation = builder.validate(slide.template(), &ctx);
            match validation.reason() {
                None => println!("{} #{} {}: ok", deck.name, position + 1, slide.template()),
                Some(reason) => {
                    invalid += 1;
                    println!(
                        "{} #{} {}: invalid: {}",
                        deck.name,
                        position + 1,
                        slide.template(),
                        reason
                    );
                }
            }
        }
    }
    if invalid > 0 {
        return Err(eyre!("{} of {} slide(s) are invalid", invalid, total));
    }
    Ok(())
}

fn ensure_parent_path_exists(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)?;
            debug!("Created directory {}", parent.display());
            Ok(())
        }
        _ => Ok(()),
    }
}
