use crate::dialect::gpu::ObjectAttr;
use crate::ir::Attr;
use crate::ir::AttributeRegistry;
use anyhow::Result;
use clap::Arg;
use clap::ArgAction;
use tracing::debug;
use tracing::info;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;

/// Initialize logging with the given level.
///
/// Logs go to stderr so that they do not mix with printed attributes.
pub fn init_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Initialize logging for tests (output is captured by the test harness).
pub fn init_test_subscriber(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Default arguments that are available in the `gpuattr` binary.
///
/// The input file argument is not included so that downstream tools can
/// decide how to read their input.
pub fn default_arguments() -> Vec<Arg> {
    vec![
        Arg::new("dump-payload")
            .long("dump-payload")
            .value_name("PATH")
            .help("Write the object bytes of the last #gpu.object to PATH"),
        Arg::new("debug")
            .long("debug")
            .help("Print debug logs to stderr")
            .action(ArgAction::SetTrue),
    ]
}

/// Attributes read from a source text and their canonical form.
#[derive(Debug)]
pub struct Canonicalized {
    pub attributes: Vec<Attr>,
    /// One canonical attribute per line.
    pub text: String,
}

impl Canonicalized {
    /// The last `#gpu.object` in the input, if any.
    pub fn last_object(&self) -> Option<&ObjectAttr> {
        self.attributes.iter().rev().find_map(Attr::as_object)
    }
}

/// Parse every attribute in `src` and print it back in canonical form.
///
/// The source holds one attribute per line. Empty lines and lines starting
/// with `//` are skipped.
pub fn canonicalize(registry: &AttributeRegistry, src: &str) -> Result<Canonicalized> {
    let mut attributes = vec![];
    let mut lines = vec![];
    for (i, line) in src.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let attr = registry
            .parse(line)
            .map_err(|e| anyhow::anyhow!("line {}:\n{}", i + 1, e.render(line)))?;
        let printed = registry.print(&attr)?;
        if printed != line {
            debug!("Canonicalized line {}:\n{line}\n{printed}", i + 1);
        }
        lines.push(printed);
        attributes.push(attr);
    }
    info!("Canonicalized {} attribute(s)", attributes.len());
    Ok(Canonicalized {
        attributes,
        text: lines.join("\n"),
    })
}
