use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_dxeval::cli::{Cli, ClassifyArgs, Commands, TaxonomyCommand, ValidateArgs};
use kira_dxeval::ctx::{Ctx, InputSource};
use kira_dxeval::diagnosis::classify::classify;
use kira_dxeval::io;
use kira_dxeval::pipeline::Pipeline;
use kira_dxeval::taxonomy::{self, ConditionTaxonomy};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.engine.resolve_config()?;
            let taxonomy = args.engine.resolve_taxonomy()?;
            let source = match args.input {
                Some(path) => InputSource::File(path),
                None => InputSource::Synthetic {
                    rounds: args.synthetic_rounds,
                    seed: args.seed,
                },
            };
            let mut ctx = Ctx::new(
                source,
                args.out,
                config,
                taxonomy,
                args.json,
                args.tsv,
                args.report,
                env!("CARGO_PKG_VERSION"),
            );
            Pipeline::full().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Classify(args) => handle_classify(args)?,
        Commands::Taxonomy(args) => match args.command {
            TaxonomyCommand::Show(show) => {
                let taxonomy = match show.taxonomy {
                    Some(path) => taxonomy::load_user(&path)?,
                    None => taxonomy::load_builtin()?,
                };
                print_taxonomy(&taxonomy);
            }
        },
        Commands::Validate(args) => handle_validate(args)?,
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn handle_classify(args: ClassifyArgs) -> Result<()> {
    let config = args.engine.resolve_config()?;
    let taxonomy = args.engine.resolve_taxonomy()?;
    config
        .validate(&taxonomy)
        .context("invalid engine configuration")?;

    let format = config.format();
    let mut scores = Vec::with_capacity(args.scores.len());
    for (position, token) in args.scores.iter().enumerate() {
        let raw = format
            .parse_token(token)
            .with_context(|| format!("score token {} is malformed", position))?;
        scores.push(raw);
    }
    let result = classify(&scores, &taxonomy, &config.classifier_params())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", io::text_report::format_diagnosis(&result, &taxonomy));
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let config = args.engine.resolve_config()?;
    let taxonomy = args.engine.resolve_taxonomy()?;
    let mut ctx = Ctx::new(
        InputSource::File(args.input),
        PathBuf::from("."),
        config,
        taxonomy,
        false,
        false,
        false,
        env!("CARGO_PKG_VERSION"),
    );
    Pipeline::evaluation().run(&mut ctx)?;

    println!("kira-dxeval validate ok");
    println!("records: {}", ctx.store.len());
    println!("rejected: {}", ctx.rejected.len());
    for r in &ctx.rejected {
        println!(
            "- block {} (line {}) test {} {}: {}",
            r.position, r.line, r.test_id, r.test_name, r.error
        );
    }
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn print_taxonomy(taxonomy: &ConditionTaxonomy) {
    println!("taxonomy (version {}):", taxonomy.version);
    for c in taxonomy.conditions() {
        println!("{}\t{}\t{}\t{}", c.index, c.name, c.urgency, c.recommendation);
    }
}
