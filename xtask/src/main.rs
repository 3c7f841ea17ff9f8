use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Build the kernel binary for the hosted simulation target
    Build,
    /// Run the host-side unit tests for the kernel crate
    Test,
    /// Run `cargo clippy` over the workspace
    Lint,
}

#[derive(Parser)]
#[clap(about = "Build and test the mesh kernel")]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let sh = Shell::new()?;

    match args.mode {
        Mode::Build => {
            cmd!(sh, "cargo build -p tessera-kernel --bin kernel").run()?;
        }
        Mode::Test => {
            cmd!(sh, "cargo test -p tessera-kernel --lib").run()?;
        }
        Mode::Lint => {
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;
        }
    }

    Ok(())
}
