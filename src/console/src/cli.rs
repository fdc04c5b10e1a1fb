use clap::{Parser, Subcommand};

/// Smart Kuku admin console.
#[derive(Parser, Debug)]
#[command(name = "kuku", about = "Smart Kuku farm console", version)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "KUKU_CONFIG", default_value = "kuku.toml")]
    pub config: String,

    /// Backend api root, overrides `api_url` from the configuration.
    #[arg(long, global = true, env = "KUKU_API_URL")]
    pub api_url: Option<String>,

    /// trace, debug, info, warn or error.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Log in and keep the token for later commands.
    Login {
        #[arg(long, short)]
        username: String,
        #[arg(long, short, env = "KUKU_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Where a client route lands for the current session.
    Route { path: String },

    /// List a resource (e.g. batches, devices, breed-types).
    List {
        resource: String,
        #[arg(long, short, default_value = "")]
        search: String,
        /// Devices and subscriptions only.
        #[arg(long)]
        status: Option<String>,
        /// Devices only: online, offline or all.
        #[arg(long)]
        online: Option<String>,
    },

    /// Create a row from `--set field=value` pairs.
    Create {
        resource: String,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Edit a row; unset fields keep their current value.
    Update {
        resource: String,
        id: i64,
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,
    },

    /// Delete a row.
    Delete {
        resource: String,
        id: i64,
        /// Confirm the deletion.
        #[arg(long, short)]
        yes: bool,
    },

    /// Switch a device or subscription between active and inactive.
    Toggle { resource: String, id: i64 },

    /// Admin dashboard counters.
    Dashboard,

    /// Print the admin sidebar.
    Nav {
        #[arg(long, default_value = "/admin")]
        path: String,
    },
}

/// `field=value` from `--set`.
pub fn parse_assignment(raw: &str) -> Option<(&str, &str)> {
    let (field, value) = raw.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        None
    } else {
        Some((field, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crud_commands() {
        let cli = Cli::try_parse_from([
            "kuku", "create", "batches", "--set", "name=Layers", "--set", "size=300",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Create {
                resource: "batches".to_owned(),
                set: vec!["name=Layers".to_owned(), "size=300".to_owned()],
            }
        );

        let cli = Cli::try_parse_from([
            "kuku", "list", "devices", "--status", "active", "--online", "online", "--api-url",
            "http://farm.local/api/",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://farm.local/api/"));
        assert!(matches!(cli.command, Command::List { ref status, .. } if status.as_deref() == Some("active")));

        assert!(Cli::try_parse_from(["kuku", "delete", "batches", "x"]).is_err());
    }

    #[test]
    fn assignments() {
        assert_eq!(parse_assignment("notes=a=b"), Some(("notes", "a=b")));
        assert_eq!(parse_assignment("end_date="), Some(("end_date", "")));
        assert_eq!(parse_assignment("=3"), None);
        assert_eq!(parse_assignment("size"), None);
    }
}
