use crate::args::Args;
use crate::santa::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SantaRules {
    #[serde(rename = "maxAttempts")]
    _max_attempts: Option<JSValue>,
    #[serde(rename = "randomSeed")]
    _random_seed: Option<JSValue>,
    #[serde(rename = "duplicateEmails")]
    pub duplicate_emails: Option<String>,
}

impl SantaRules {
    pub fn max_attempts(&self) -> SantaResult<u32> {
        match &self._max_attempts {
            None => Ok(AssignmentRules::DEFAULT_MAX_ATTEMPTS),
            x => {
                let n = read_js_int(x)?;
                u32::try_from(n)
                    .ok()
                    .filter(|n| *n > 0)
                    .whatever_context(format!("maxAttempts must be a positive number, got {}", n))
            }
        }
    }

    pub fn random_source(&self) -> SantaResult<RandomSource> {
        match &self._random_seed {
            None => Ok(RandomSource::Entropy),
            x => read_js_int(x).map(RandomSource::Seeded),
        }
    }

    pub fn duplicate_email_mode(&self) -> SantaResult<DuplicateEmailMode> {
        match self.duplicate_emails.as_deref() {
            None | Some("reject") => Ok(DuplicateEmailMode::Reject),
            Some("allowDistinct") => Ok(DuplicateEmailMode::AllowDistinct),
            Some(x) => whatever!("unknown duplicateEmails option: {}", x),
        }
    }

    pub fn validate(&self) -> SantaResult<AssignmentRules> {
        Ok(AssignmentRules {
            max_attempts: self.max_attempts()?,
            random_source: self.random_source()?,
            duplicate_email_mode: self.duplicate_email_mode()?,
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SantaConfig {
    #[serde(rename = "rosterFile")]
    pub roster_file: Option<String>,
    #[serde(rename = "historyFiles", default)]
    pub history_files: Vec<String>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub rules: Option<SantaRules>,
}

/// What a run of the program works on, once the configuration file and the
/// command line are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub roster_file: Option<String>,
    pub history_files: Vec<String>,
    /// A path, `stdout`, or nothing to only print a preview.
    pub output: Option<String>,
    pub rules: AssignmentRules,
}

pub fn read_config(path: &str) -> SantaResult<SantaConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SantaConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Builds the settings for this run. Command line flags take precedence over
/// the configuration file.
pub fn build_settings(args: &Args) -> SantaResult<RunSettings> {
    let mut settings = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?;
            settings_from_config(&config, root_p)?
        }
        None => RunSettings {
            roster_file: None,
            history_files: Vec::new(),
            output: None,
            rules: AssignmentRules::DEFAULT_RULES,
        },
    };

    if let Some(input) = &args.input {
        settings.roster_file = Some(input.clone());
    }
    if !args.history.is_empty() {
        settings.history_files = args.history.clone();
    }
    if let Some(out) = &args.out {
        settings.output = Some(out.clone());
    }
    if let Some(seed) = args.seed {
        settings.rules.random_source = RandomSource::Seeded(seed);
    }
    if let Some(max_attempts) = args.max_attempts {
        ensure_whatever!(max_attempts > 0, "--max-attempts must be positive");
        settings.rules.max_attempts = max_attempts;
    }
    info!("settings: {:?}", settings);
    Ok(settings)
}

pub fn settings_from_config(config: &SantaConfig, root_p: &Path) -> SantaResult<RunSettings> {
    let rules = config.rules.clone().unwrap_or_default().validate()?;
    let output = config
        .output_settings
        .as_ref()
        .and_then(|o| o.output_file.as_deref())
        .map(|p| match p {
            "stdout" => p.to_string(),
            _ => resolve(root_p, p),
        });
    Ok(RunSettings {
        roster_file: config.roster_file.as_deref().map(|p| resolve(root_p, p)),
        history_files: config
            .history_files
            .iter()
            .map(|p| resolve(root_p, p))
            .collect(),
        output,
        rules,
    })
}

// Relative paths are relative to the directory of the configuration file.
fn resolve(root_p: &Path, path: &str) -> String {
    let p: PathBuf = [root_p, Path::new(path)].iter().collect();
    p.as_path().display().to_string()
}

fn read_js_int(x: &Option<JSValue>) -> SantaResult<u64> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s.trim().parse::<u64>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(js: &str) -> SantaConfig {
        serde_json::from_str(js).unwrap()
    }

    #[test]
    fn minimal_config() {
        let c = parse(r#"{"rosterFile": "roster.csv"}"#);
        let s = settings_from_config(&c, Path::new("/data")).unwrap();
        assert_eq!(s.roster_file, Some("/data/roster.csv".to_string()));
        assert!(s.history_files.is_empty());
        assert_eq!(s.output, None);
        assert_eq!(s.rules, AssignmentRules::DEFAULT_RULES);
    }

    #[test]
    fn full_config() {
        let c = parse(
            r#"{
                "rosterFile": "/abs/roster.csv",
                "historyFiles": ["h1.csv", "h2.csv"],
                "outputSettings": {"outputFile": "stdout"},
                "rules": {"maxAttempts": "50", "randomSeed": 42, "duplicateEmails": "allowDistinct"}
            }"#,
        );
        let s = settings_from_config(&c, Path::new("cfg")).unwrap();
        assert_eq!(s.roster_file, Some("/abs/roster.csv".to_string()));
        assert_eq!(s.history_files.len(), 2);
        assert!(s.history_files[0].ends_with("h1.csv"));
        assert_eq!(s.output, Some("stdout".to_string()));
        assert_eq!(
            s.rules,
            AssignmentRules {
                max_attempts: 50,
                random_source: RandomSource::Seeded(42),
                duplicate_email_mode: DuplicateEmailMode::AllowDistinct,
            }
        );
    }

    #[test]
    fn bad_rules() {
        let c = parse(r#"{"rules": {"maxAttempts": 0}}"#);
        assert!(settings_from_config(&c, Path::new(".")).is_err());
        let c = parse(r#"{"rules": {"randomSeed": "abc"}}"#);
        assert!(matches!(
            settings_from_config(&c, Path::new(".")),
            Err(SantaError::ParsingJsonNumber {})
        ));
        let c = parse(r#"{"rules": {"duplicateEmails": "merge"}}"#);
        assert!(settings_from_config(&c, Path::new(".")).is_err());
    }
}
