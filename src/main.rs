#[tokio::main]
async fn main() {
    if let Err(e) = fsm_harness::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
