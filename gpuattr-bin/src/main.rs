use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use clap::Args;
use clap::Command;
use gpuattr::canonicalize;
use gpuattr::ir::AttributeRegistry;
use std::io::Read;
use tracing::info;
use tracing::Level;

/// Print GPU object attributes in canonical form, one per line
#[derive(Args, Debug)]
#[command(version, about)]
struct GpuAttrArgs {
    /// The input file (- is interpreted as stdin)
    #[arg(default_value = "-")]
    input: String,
}

fn cli() -> Command {
    let cli = Command::new("gpuattr").args(gpuattr::default_arguments());
    GpuAttrArgs::augment_args(cli)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
    }
}

fn run(matches: &ArgMatches, src: &str) -> Result<String> {
    let registry = AttributeRegistry::default();
    let result = canonicalize(&registry, src)?;
    if let Some(path) = matches.get_one::<String>("dump-payload") {
        let object = result
            .last_object()
            .context("--dump-payload needs at least one #gpu.object in the input")?;
        std::fs::write(path, object.object()).with_context(|| format!("failed to write {path}"))?;
        info!("Wrote {} bytes to {path}", object.object().len());
    }
    Ok(result.text)
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let level = if matches.get_flag("debug") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    match gpuattr::init_subscriber(level) {
        Ok(_) => (),
        Err(_e) => (),
    }
    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    let src = read_input(input)?;
    let result = run(&matches, &src)?;
    println!("{result}");
    Ok(())
}
