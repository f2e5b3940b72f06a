// wellbeing-relay - crisis-aware llm chat relay

use wellbeing_relay::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("error: {e:?}");
        std::process::exit(1);
    }
}
