use crate::CatalogArgs;
use std::sync::Arc;
use tracing::info;

pub fn run(catalog: CatalogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(catalog.config());
    let report = routescope_core::catalog::check_catalog(config);

    for finding in &report.findings {
        let level = if finding.is_error() { "error" } else { "warning" };
        println!("{}: {}", level, finding);
    }
    println!(
        "{} of {} descriptors valid under {}",
        report.valid,
        report.total,
        catalog.root.display()
    );
    info!("Check finished with {} findings", report.findings.len());

    if report.has_errors() {
        let errors = report.findings.iter().filter(|f| f.is_error()).count();
        return Err(format!("{} descriptor error(s) found", errors).into());
    }
    Ok(())
}
