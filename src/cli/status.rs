//! Feature health report.

use std::path::Path;

use anyhow::Result;

use crate::config::{BuildMode, GlobalConfig, Paths};
use crate::data::{ToolConfig, ToolMode, list_feature_dirs};
use crate::log;

pub fn run(root: &Path) -> Result<()> {
    let paths = Paths::new(root, BuildMode::Dev);
    let global = GlobalConfig::load(&paths.global_config());
    let locales = &global.build.locales;

    log!("status"; "scanning feature ecosystem...");
    let rule = "-".repeat(60 + locales.len().saturating_sub(2) * 4);
    println!("{rule}");
    println!(
        "{:<25} | {:<10} | {:<10} | Mode",
        "Feature ID", "Status", "Locales"
    );
    println!("{rule}");

    for id in list_feature_dirs(&paths.features_dir()) {
        let config_path = paths.tool_config(&id);
        if !config_path.is_file() {
            continue;
        }
        let Ok(config) = ToolConfig::from_file(&config_path, &id) else {
            println!("{id:<25} | {:<10} | {:<10} |", "INVALID", "");
            continue;
        };

        let status = if config.is_active() { "ACTIVE" } else { "DRAFT" };
        let present: Vec<&str> = locales
            .iter()
            .filter(|locale| {
                let dir = paths.features_dir().join(&id).join("locales");
                dir.join(format!("{locale}.yaml")).is_file()
                    || dir.join(format!("{locale}.yml")).is_file()
            })
            .map(|locale| locale.as_str())
            .collect();
        let locales_col = present
            .iter()
            .map(|l| l.to_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        let mode = match config.mode {
            ToolMode::Standard => "STD",
            ToolMode::Advanced => "ADV",
        };

        println!("{id:<25} | {status:<10} | {locales_col:<10} | {mode}");
    }
    println!("{rule}");
    Ok(())
}
