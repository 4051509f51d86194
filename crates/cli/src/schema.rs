use routescope_api::ApiMetadata;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(ApiMetadata);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
