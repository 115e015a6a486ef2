use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use tensio_track_data::{ApiConfig, ConfigError};

/// Command line arguments of the `tensio_track` binary
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "tensio_track",
    version,
    about = "Suivi de la tension artérielle depuis le terminal."
)]
pub struct Args {
    /// Base URL of the TensioTrack API
    #[arg(long, env = "TENSIO_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "TENSIO_API_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log filter, e.g. `debug` or `tensio_track_data=trace`; defaults to RUST_LOG, then `info`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Delete without asking for confirmation; overrides the confirmation step on purpose, for scripted use
    #[arg(long)]
    pub yes: bool,

    /// Print screens as JSON
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Environment configuration with the command line overrides applied
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        self.apply(ApiConfig::from_env()?)
    }

    fn apply(&self, mut config: ApiConfig) -> Result<ApiConfig, ConfigError> {
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url)?;
        }
        Ok(config.with_timeout(self.timeout_secs))
    }
}

/// One line typed in the shell
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(no_binary_name = true, name = "tensio_track")]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

/// Commands understood by the shell
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Se connecter
    Login { email: String, password: String },

    /// Créer un compte
    Register {
        email: String,
        password: String,
        first_name: String,
        last_name: String,
        /// Date de naissance (AAAA-MM-JJ)
        #[arg(long)]
        born: Option<String>,
    },

    /// Basculer entre connexion et inscription
    Mode,

    /// Afficher le formulaire de nouvelle mesure
    Form,

    /// Enregistrer une mesure
    Add {
        systolic: String,
        diastolic: String,
        pulse: String,
        /// Date (AAAA-MM-JJ), aujourd'hui par défaut
        #[arg(long)]
        date: Option<String>,
        /// Heure (HH:MM), maintenant par défaut
        #[arg(long)]
        time: Option<String>,
        /// Commentaires sur la mesure
        #[arg(long)]
        notes: Option<String>,
    },

    /// Afficher le tableau de bord
    #[command(alias = "show")]
    Dashboard,

    /// Recharger les mesures
    Refresh,

    /// Modifier la date de début
    From { date: NaiveDate },

    /// Modifier la date de fin
    To { date: NaiveDate },

    /// Supprimer une mesure
    Delete { id: String },

    /// Se déconnecter
    Logout,

    /// Quitter
    #[command(alias = "exit")]
    Quit,
}

/// Split a line into words, keeping double-quoted text together
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err("Guillemet non fermé".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse a shell line; the error is the text to show, help included
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let words = split_words(line)?;
    ShellLine::try_parse_from(words)
        .map(|parsed| parsed.command)
        .map_err(|err| err.render().to_string())
}
