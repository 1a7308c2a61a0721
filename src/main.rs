#[tokio::main]
async fn main() {
    if let Err(err) = docsearch_assist::run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
