mod processor;

use std::io::{self, BufWriter, Read, Write};

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use subedit::Sequence;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Normalize and clean frame-based STL subtitles")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write a backup of the original input to the specified file."
    )]
    backup: Option<String>,
    #[arg(
        short,
        long,
        value_name = "TEXT",
        help = "Insert the given text into a leader subtitle."
    )]
    leader_text: Option<String>,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Drop subtitles matching any of the regular expressions in the given file, one per line."
    )]
    drop_patterns: Option<String>,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("subedit=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let data = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .with_context(|| format!("Failed to open input file: '{}'", cli.input))?
    };

    if let Some(backup_path) = &cli.backup {
        std::fs::write(backup_path, &data)
            .with_context(|| format!("Failed to write backup file: '{}'", backup_path))?;
    }

    let mut seq = Sequence::from_stl(&data)
        .with_context(|| format!("Failed to parse STL file: '{}'", cli.input))?;
    if seq.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    tracing::info!("Read {} subtitles", seq.len());

    let opts = processor::ProcessOpts {
        leader_text: cli.leader_text,
        drop_patterns: cli.drop_patterns,
    };
    processor::process(&mut seq, opts)?;

    if cli.output == "-" {
        let stdout = io::stdout();
        write_output(&seq, stdout.lock())?;
    } else {
        let file = std::fs::File::create(&cli.output)
            .with_context(|| format!("Failed to create output file: '{}'", cli.output))?;
        write_output(&seq, file)?;
    }
    tracing::info!("Wrote {} subtitles", seq.iter().filter(|s| s.has_text()).count());

    Ok(())
}

fn write_output<W: Write>(seq: &Sequence, dst: W) -> Result<()> {
    let mut writer = BufWriter::new(dst);
    seq.write_stl(&mut writer)
        .context("Failed to write to output.")?;
    writer.flush().context("Failed to write to output.")?;
    Ok(())
}
