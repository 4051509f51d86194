use crate::CatalogArgs;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

pub async fn run(catalog: CatalogArgs, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let apis = catalog.catalog().discover().await;
    print_json(&apis, compact)
}

pub async fn show(catalog: CatalogArgs, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let api = catalog
        .catalog()
        .lookup(endpoint)
        .await
        .ok_or_else(|| format!("API not found: {}", endpoint))?;
    print_json(&api, false)
}
