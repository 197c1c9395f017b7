use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bayesnet::{Dag, generation};
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use env_logger::{Builder, Env};
use log::info;

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .init();
    let matches = Command::new("BAYESNET")
        .version("0.1")
        .about("Generation, parameterization and sampling of Bayesian networks.")
        .arg(
            Arg::new("modelstring")
                .long("modelstring")
                .value_name("STRING")
                .help("Build the network from a modelstring, e.g. [A][B|A]"),
        )
        .arg(
            Arg::new("random_nodes")
                .long("random_nodes")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(usize))
                .help("Generate a random DAG with this many nodes instead"),
        )
        .arg(
            Arg::new("edge_prob")
                .long("edge_prob")
                .value_name("PROB")
                .value_parser(clap::value_parser!(f64))
                .default_value("0.3")
                .help("Edge probability for random DAG generation"),
        )
        .arg(
            Arg::new("continuous")
                .long("continuous")
                .action(ArgAction::SetTrue)
                .help("Generate linear-Gaussian parameters instead of CPTs"),
        )
        .arg(
            Arg::new("alpha")
                .long("alpha")
                .value_name("ALPHA")
                .value_parser(clap::value_parser!(f64))
                .help("Dirichlet concentration for discrete parameter generation"),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .value_name("NUMBER")
                .value_parser(clap::value_parser!(usize))
                .default_value("1000")
                .help("Number of rows to sample"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("Seed for reproducible generation and sampling"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write sampled rows as CSV to this file instead of stdout"),
        )
        .arg(
            Arg::new("save_network")
                .long("save_network")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Also save the parameterized network as JSON"),
        )
        .get_matches();

    let seed = matches.get_one::<u64>("seed").copied();
    let mut dag = if let Some(modelstring) = matches.get_one::<String>("modelstring") {
        Dag::from_modelstring(modelstring).context("Failed to parse modelstring")?
    } else if let Some(&n_nodes) = matches.get_one::<usize>("random_nodes") {
        let edge_prob = *matches.get_one::<f64>("edge_prob").expect("defaulted");
        generation::erdos_renyi(n_nodes, edge_prob, seed)
            .context("Failed to generate random structure")?
    } else {
        bail!("either --modelstring or --random_nodes is required");
    };
    info!(
        "built network with {} nodes and {} edges",
        dag.node_count(),
        dag.edge_count()
    );

    if matches.get_flag("continuous") {
        dag.generate_continuous_parameters(None, None, None, seed)
            .context("Failed to generate continuous parameters")?;
    } else {
        let alpha = matches.get_one::<f64>("alpha").copied();
        dag.generate_discrete_parameters(alpha, None, None, true, seed)
            .context("Failed to generate discrete parameters")?;
    }

    let n_samples = *matches.get_one::<usize>("samples").expect("defaulted");
    let table = dag.sample(n_samples, seed).context("Sampling failed")?;

    if let Some(path) = matches.get_one::<PathBuf>("save_network") {
        dag.save(path)
            .with_context(|| format!("Failed to save network to {}", path.display()))?;
        println!("{}", format!("Saved network to {}", path.display()).green());
    }

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, table.to_csv())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{}",
                format!(
                    "Sampled {} rows over {} nodes into {}",
                    n_samples,
                    dag.node_count(),
                    path.display()
                )
                .green()
            );
        }
        None => print!("{}", table.to_csv()),
    }
    Ok(())
}
