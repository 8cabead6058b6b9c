use edgestats_core::{EdgeStatsError, Result};

use super::AgentArgs;

pub fn run(args: &AgentArgs) -> Result<()> {
    let config = args.resolve()?;
    let json = serde_json::to_string_pretty(&config).map_err(EdgeStatsError::Encode)?;
    println!("{json}");
    Ok(())
}
