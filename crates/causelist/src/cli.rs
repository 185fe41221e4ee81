use causelist_engine::config::CauselistConfig;
use causelist_engine::validation::RequestFields;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "causelist", version, about = "eCourts cause list acquisition")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ./causelist.yaml, then ~/.causelist/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Browser backend driving the portal
    #[arg(long, value_enum, default_value_t = BackendKind::Headless, global = true)]
    pub backend: BackendKind,

    /// Launch browser in visible mode (not headless)
    #[arg(long, global = true)]
    pub visible: bool,

    /// External WebDriver URL (a local chromedriver is spawned if not provided)
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Chromium over CDP
    Headless,
    /// Chrome through a WebDriver server
    Webdriver,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List states
    States,
    /// List districts of a state
    Districts { state: String },
    /// List court complexes of a district
    Complexes { state: String, district: String },
    /// List courts of a court complex
    Courts {
        state: String,
        district: String,
        complex: String,
    },
    /// Fetch a cause list and render it to PDF
    Scrape {
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        complex: Option<String>,
        #[arg(long)]
        court: Option<String>,
        /// Hearing date as the portal expects it (e.g. 2024-01-15)
        #[arg(long)]
        date: Option<String>,
        /// civil or criminal
        #[arg(long, default_value = "civil")]
        list_type: Option<String>,
    },
    /// Print the path of a generated document
    Locate { name: String },
}

impl Args {
    /// Command-line browser flags override the configuration file.
    pub fn apply(&self, config: &mut CauselistConfig) {
        if self.visible {
            config.browser.headless = false;
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = Some(url.clone());
        }
    }

    pub fn needs_browser(&self) -> bool {
        !matches!(self.command, Command::Locate { .. })
    }
}

impl Command {
    pub fn request_fields(&self) -> Option<RequestFields> {
        match self {
            Command::Scrape {
                state,
                district,
                complex,
                court,
                date,
                list_type,
            } => Some(RequestFields {
                state: state.clone(),
                district: district.clone(),
                complex: complex.clone(),
                court: court.clone(),
                date: date.clone(),
                list_type: list_type.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causelist_engine::protocol::ListType;
    use causelist_engine::validation::ValidationError;

    #[test]
    fn test_scrape_arguments_validate_into_request() {
        let args = Args::try_parse_from([
            "causelist",
            "scrape",
            "--state",
            "KL",
            "--district",
            "KLM",
            "--complex",
            "KLM-C1",
            "--court",
            "KLM-01",
            "--date",
            "2024-01-15",
            "--list-type",
            "Criminal",
        ])
        .unwrap();

        let request = args.command.request_fields().unwrap().validate().unwrap();
        assert_eq!(request.location.court, "KLM-01");
        assert_eq!(request.list_type, ListType::Criminal);
    }

    #[test]
    fn test_scrape_missing_field_rejected() {
        let args =
            Args::try_parse_from(["causelist", "scrape", "--state", "KL", "--district", "KLM"])
                .unwrap();
        let err = args.command.request_fields().unwrap().validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("complex"));
    }

    #[test]
    fn test_global_flags_override_config() {
        let args = Args::try_parse_from([
            "causelist",
            "districts",
            "KL",
            "--visible",
            "--backend",
            "webdriver",
            "--webdriver-url",
            "http://localhost:4444",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.backend, BackendKind::Webdriver);
        assert!(args.json);

        let mut config = CauselistConfig::default();
        args.apply(&mut config);
        assert!(!config.browser.headless);
        assert_eq!(
            config.browser.webdriver_url.as_deref(),
            Some("http://localhost:4444")
        );
    }

    #[test]
    fn test_locate_needs_no_browser() {
        let args = Args::try_parse_from(["causelist", "locate", "cause_list.pdf"]).unwrap();
        assert!(!args.needs_browser());
        assert!(args.command.request_fields().is_none());

        let args = Args::try_parse_from(["causelist", "states"]).unwrap();
        assert!(args.needs_browser());
        assert_eq!(args.backend, BackendKind::Headless);
    }
}
