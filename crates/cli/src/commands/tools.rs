//! `homehub tools`: print the catalog sent to the completion service.

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = super::build_registry(&config)?;

    println!("homehub tools ({})", registry.len());
    for spec in registry.catalog() {
        println!();
        println!("  {}: {}", spec.name, spec.description);
        for param in &spec.parameters {
            let mut line = format!("    - {}", param.name);
            if !param.required {
                line.push_str(" (optional)");
            }
            if let Some(description) = &param.description {
                line.push_str(&format!(": {description}"));
            }
            if !param.allowed.is_empty() {
                line.push_str(&format!(" [{}]", param.allowed.join(", ")));
            }
            println!("{line}");
        }
    }

    Ok(())
}
