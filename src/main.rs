#[tokio::main]
async fn main() {
    if let Err(e) = clientdesk_lib::run().await {
        eprintln!("clientdesk: {e}");
        std::process::exit(1);
    }
}
