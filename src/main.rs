use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match llm_relay::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
