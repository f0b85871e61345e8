#[tokio::main]
async fn main() {
    let code = probekit::app::startup::run().await;
    std::process::exit(code);
}
