mod commands;
mod terminal;

use commands::{CommandLine, Commands, collect, hosts};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet);
    print::banner(commands.no_banner, commands.quiet);

    match commands.command {
        Commands::Collect(args) => {
            print::stage("getting ready for collection", commands.quiet);
            let cfg = args.into_config(commands.quiet, commands.no_banner);
            collect::collect(&cfg).await
        }
        Commands::Hosts(args) => {
            print::stage("resolving hosts", commands.quiet);
            hosts::hosts(&args, commands.quiet).await
        }
    }
}
