#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use shift_grid::{GridConfig, GridPayload, http_api, load_payload_from_json};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr: SocketAddr = std::env::var("SHIFT_GRID_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = GridConfig::from_env()?;
    let payload = match std::env::args().nth(1) {
        Some(path) => load_payload_from_json(&path)?,
        None => GridPayload::default(),
    };

    println!("shift-grid layout service listening on http://{addr}");
    http_api::serve(addr, payload, config).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
