//! Print the `OpenAPI` document for the HTTP API.

use anyhow::Result;

fn main() -> Result<()> {
    let doc = portero::api::openapi().to_pretty_json()?;
    println!("{doc}");
    Ok(())
}
