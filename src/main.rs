use anyhow::Result;
use clap::Parser;
use product_image_ingest::pipeline::Pipeline;
use serde_json::{json, Value};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "product-image-ingest")]
#[command(about = "Fetch product images, store originals, and build a thumbnail")]
struct CliArgs {
    /// Comma-separated image URLs; the first one is the main image.
    #[arg(value_name = "URLS", conflicts_with = "payload")]
    urls: Option<String>,

    /// Product name used to choose the storage folder.
    #[arg(long, conflicts_with = "payload")]
    product_name: Option<String>,

    /// Raw JSON request, either `{"url": ...}` or `{"data": {"url": ...}}`.
    #[arg(long, value_name = "JSON")]
    payload: Option<String>,
}

fn build_payload(args: &CliArgs) -> std::result::Result<Value, String> {
    match &args.payload {
        Some(raw) => {
            serde_json::from_str(raw).map_err(|e| format!("Invalid --payload JSON: {}", e))
        }
        None => Ok(json!({
            "url": args.urls.clone().unwrap_or_default(),
            "productName": args.product_name,
        })),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_image_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let payload = match build_payload(&args) {
        Ok(payload) => payload,
        Err(message) => {
            error!("{}", message);
            println!("{}", json!({ "code": "invalid-argument", "message": message }));
            std::process::exit(1);
        }
    };

    let pipeline = match Pipeline::new().await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!("Failed to initialize pipeline: {}", e);
            std::process::exit(1);
        }
    };

    match pipeline.handle(payload).await {
        Ok(response) => {
            info!(
                "Stored {} of {} image uploads",
                response.success_count,
                response.results.len()
            );
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            error!("Ingestion failed: {}", e);
            println!("{}", json!({ "code": e.code(), "message": e.to_string() }));
            std::process::exit(1);
        }
    }
}
