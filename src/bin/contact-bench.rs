// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

use anyhow::Result;
use clap::{Parser, Subcommand};
use contact_bench::{
    config::{BatchInput, EvaluationSettings},
    evaluate::{evaluate_files, evaluate_target, Evaluation},
    ContactKind, Structure,
};
use indicatif::ProgressBar;
use pretty_env_logger::env_logger::DEFAULT_FILTER_ENV;
use serde::Serialize;
use std::{io::Write, path::PathBuf};
use validator::Validate;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score one contact prediction against a reference structure
    #[clap(arg_required_else_help = true)]
    Ppv {
        /// Query sequence (FASTA or bare)
        sequence: PathBuf,
        /// Ranked contact list
        contacts: PathBuf,
        /// Reference structure in PDB format
        structure: PathBuf,
        /// Settings file in YAML format; flags below take precedence
        #[clap(long, short = 'c')]
        config: Option<PathBuf>,
        /// Number of scored contacts in units of the sequence length
        #[clap(long, short = 'f')]
        factor: Option<f64>,
        /// Minimum contact score
        #[clap(long, short = 's')]
        score: Option<f64>,
        /// Chain identifier; defaults to the first chain
        #[clap(long)]
        chain: Option<char>,
        /// Model number
        #[clap(long)]
        model: Option<usize>,
        /// Heavy-atom contacts (5 Å) instead of beta carbons (8 Å)
        #[clap(long, action)]
        heavy: bool,
        /// Skip sequence alignment; structure numbering is the query numbering
        #[clap(long, action)]
        noalign: bool,
        /// Report precision after each selected contact
        #[clap(long, action)]
        curve: bool,
    },
    /// Evaluate all targets of a batch file
    #[clap(arg_required_else_help = true)]
    Batch {
        /// Input file in YAML format
        #[clap(long, short = 'i')]
        input: PathBuf,
    },
    /// Print the one-letter sequence of a structure
    #[clap(arg_required_else_help = true)]
    Sequence {
        /// Structure in PDB format
        structure: PathBuf,
        #[clap(long)]
        chain: Option<char>,
        #[clap(long, default_value_t = 1)]
        model: usize,
    },
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Verbose output. See more with e.g. RUST_LOG=Trace
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
    /// Output file in YAML format
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,
}

fn main() {
    if let Err(err) = do_main() {
        eprintln!("Error: {}", &err);
        std::process::exit(1);
    }
}

fn do_main() -> Result<()> {
    let args = Args::parse();
    if std::env::var(DEFAULT_FILTER_ENV).is_err() {
        std::env::set_var(
            DEFAULT_FILTER_ENV,
            if args.verbose { "Debug" } else { "Info" },
        );
    }
    pretty_env_logger::init();

    match args.command {
        Commands::Ppv {
            sequence,
            contacts,
            structure,
            config,
            factor,
            score,
            chain,
            model,
            heavy,
            noalign,
            curve,
        } => {
            let mut settings = match config {
                Some(path) => EvaluationSettings::from_file(path)?,
                None => EvaluationSettings::default(),
            };
            settings.factor = factor.unwrap_or(settings.factor);
            settings.min_score = score.or(settings.min_score);
            settings.chain = chain.or(settings.chain);
            settings.model = model.unwrap_or(settings.model);
            settings.align &= !noalign;
            settings.curve |= curve;
            if heavy {
                settings.contact_kind = ContactKind::HeavyAtom;
            }
            settings.validate()?;
            let evaluation = evaluate_files(&sequence, &contacts, &structure, &settings)?;
            let precision = evaluation.precision();
            println!(
                "{} {} {} {}",
                contacts.display(),
                precision.ppv,
                precision.tp,
                precision.fp
            );
            if let Some(output) = args.output {
                let mut yaml_output = std::fs::File::create(output)?;
                write_yaml(&settings, &mut yaml_output, Some("settings"))?;
                write_yaml(&evaluation, &mut yaml_output, Some("evaluation"))?;
            }
        }
        Commands::Batch { input } => {
            let output = args.output.unwrap_or_else(|| PathBuf::from("output.yaml"));
            let mut yaml_output = std::fs::File::create(output)?;
            batch(input, &mut yaml_output)?;
        }
        Commands::Sequence {
            structure,
            chain,
            model,
        } => {
            let structure = Structure::from_file(structure, chain, model)?;
            println!("{}", contact_bench::atom_sequence(&structure));
        }
    }
    Ok(())
}

/// Outcome of one batch target
#[derive(Serialize)]
struct Report {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<Evaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn batch(input: PathBuf, yaml_output: &mut std::fs::File) -> Result<()> {
    let input = BatchInput::from_file(input)?;
    let settings = &input.settings;
    write_yaml(settings, yaml_output, Some("settings"))?;

    // A failing target is reported and the batch continues
    let pb = ProgressBar::new(input.targets.len() as u64);
    let reports: Vec<Report> = input
        .targets
        .iter()
        .map(|target| {
            let report = match evaluate_target(target, settings) {
                Ok(evaluation) => Report {
                    name: target.label(),
                    evaluation: Some(evaluation),
                    error: None,
                },
                Err(err) => {
                    log::error!("{}", err);
                    Report {
                        name: target.label(),
                        evaluation: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            pb.inc(1);
            report
        })
        .collect();
    pb.finish_and_clear();

    let ppvs: Vec<f64> = reports
        .iter()
        .filter_map(|r| r.evaluation.as_ref())
        .map(|e| e.precision().ppv)
        .collect();
    if !ppvs.is_empty() {
        log::info!(
            "Mean PPV over {} of {} targets: {:.3}",
            ppvs.len(),
            reports.len(),
            ppvs.iter().sum::<f64>() / ppvs.len() as f64
        );
    }
    write_yaml(&reports, yaml_output, Some("targets"))?;
    Ok(())
}

/// Helper function to serialize data to an existing YAML file
fn write_yaml<T: serde::Serialize>(
    data: &T,
    output: &mut std::fs::File,
    key: Option<&str>,
) -> Result<()> {
    let yaml = match key {
        Some(key) => {
            let mut wrapper = std::collections::BTreeMap::new();
            wrapper.insert(key.to_string(), data);
            serde_yaml::to_string(&wrapper)?
        }
        None => serde_yaml::to_string(data)?,
    };
    output.write_all(yaml.as_bytes())?;
    Ok(())
}
