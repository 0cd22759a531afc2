//! pipegraph binary: validate a pipeline definition or run it on one message.

use clap::Parser;
use pipegraph_cli::{init_tracing, initial_state, run_with_options, validate_file, Cli, Command};

#[tokio::main]
async fn main() -> Result<(), pipegraph_cli::Error> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Validate { definition } => match validate_file(&definition) {
            Ok(summary) => print!("{}", summary),
            Err(e) => {
                eprintln!("invalid pipeline: {}", e);
                std::process::exit(1);
            }
        },
        Command::Run(args) => {
            let state = initial_state(&args.message(), args.state.as_deref())?;
            let options = args.run_options(cli.verbose);
            let out = match run_with_options(&args.definition, state, &options).await {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            if args.output_only {
                println!("{}", out.input_text());
            } else {
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
        }
    }
    Ok(())
}
