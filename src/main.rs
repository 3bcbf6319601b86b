use anyhow::Result;
use gcontrib::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    gcontrib::logging::init(cli.verbose);
    cli.execute()
}
