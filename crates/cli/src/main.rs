use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    prodcat_cli::run().await
}
