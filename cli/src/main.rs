use clap::Parser;
use ppulse_cli::Cli;

fn main() {
    let cli = Cli::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ppulse: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = runtime.block_on(ppulse_cli::run_main(cli)) {
        eprintln!("ppulse: {err:#}");
        std::process::exit(ppulse_cli::exit_code_for(&err));
    }
}
