//! Presets command - lists the bundled parser presets

use clap::Args;
use serde::Serialize;

use crate::domain::parsing::{ConfigPreset, ParserConfig};

/// Arguments for the presets command
#[derive(Args, Clone, Debug, Default)]
pub struct PresetsArgs {
    /// Print full preset configurations as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PresetView {
    name: &'static str,
    description: &'static str,
    config: ParserConfig,
}

pub async fn run(args: PresetsArgs) -> anyhow::Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &PresetsArgs) -> anyhow::Result<String> {
    if args.json {
        let views: Vec<PresetView> = ConfigPreset::all()
            .into_iter()
            .map(|preset| PresetView {
                name: preset.as_str(),
                description: preset.description(),
                config: preset.config(),
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&views)?);
    }

    let lines: Vec<String> = ConfigPreset::all()
        .into_iter()
        .map(|preset| {
            let config = preset.config();
            format!(
                "{:<10} levels {:?}, threshold {:.2} - {}",
                preset.as_str(),
                config.chapter_header_levels,
                config.confidence_threshold,
                preset.description()
            )
        })
        .collect();

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_listing() {
        let text = render(&PresetsArgs::default()).unwrap();

        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("technical"));
        assert!(text.contains("academic   levels [1, 2, 3], threshold 0.75"));
    }

    #[test]
    fn test_json_listing() {
        let json = render(&PresetsArgs { json: true }).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[3]["name"], "blog");
        assert_eq!(value[3]["config"]["confidence_threshold"], 0.5);
    }
}
