use std::{fs, path::Path};

use anyhow::{Context, Result};
use endless_assault_core::Tuning;

/// Reads and validates a TOML tuning file.
pub(crate) fn load_tuning(path: &Path) -> Result<Tuning> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    parse_tuning(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}

/// Parses tuning overrides; omitted sections and fields keep their defaults.
pub(crate) fn parse_tuning(contents: &str) -> Result<Tuning> {
    let tuning: Tuning =
        toml::from_str(contents).context("failed to parse tuning toml contents")?;
    tuning.validate().context("tuning failed validation")?;
    Ok(tuning)
}

/// Renders the tuning as a TOML document.
pub(crate) fn render_tuning(tuning: &Tuning) -> Result<String> {
    toml::to_string_pretty(tuning).context("failed to serialize tuning")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_keep_unnamed_defaults() {
        let tuning = parse_tuning(
            r#"
            [player]
            speed = 250.0

            [capacity]
            max_enemies = 12
            "#,
        )
        .expect("valid overrides");

        assert_eq!(tuning.player.speed, 250.0);
        assert_eq!(tuning.capacity.max_enemies, 12);
        assert_eq!(tuning.waves, Tuning::default().waves);
    }

    #[test]
    fn invalid_values_are_reported_with_the_field() {
        let error = parse_tuning("[frame]\nmax_dt = 0.0\n").expect_err("zero clamp rejected");

        let message = format!("{error:#}");
        assert!(message.contains("frame.max_dt"), "{message}");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(parse_tuning("[player\nspeed = ").is_err());
    }

    #[test]
    fn rendered_defaults_parse_back() {
        let rendered = render_tuning(&Tuning::default()).expect("serializable");

        assert_eq!(parse_tuning(&rendered).expect("valid"), Tuning::default());
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = load_tuning(Path::new("/nonexistent/endless-assault.toml"))
            .expect_err("missing file");

        assert!(format!("{error:#}").contains("/nonexistent/endless-assault.toml"));
    }
}
