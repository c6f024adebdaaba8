use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::db::DriverConfig;
use crate::error::DbInfraError;

/// Characters escaped in the userinfo and path segments of a connection URL.
const URL_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// SQLite paths keep their `/` separators; only the URL delimiters are escaped.
const SQLITE_PATH: &AsciiSet = &CONTROLS.add(b' ').add(b'#').add(b'%').add(b'?');

pub const SQLITE_MEMORY: &str = ":memory:";

const HOST_FORBIDDEN: &[char] = &['@', '/', '?', '#', '\\', ';', '=', '%', '[', ']', '{', '}'];

/// Closed set of driver kinds accepted in `DB_DRIVER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    MySql,
    Postgres,
    Sqlite,
    SqlServer,
    /// Accepted but not wired to a client yet.
    Redis,
    /// Accepted but not wired to a client yet.
    Mongo,
}

impl DriverKind {
    pub const ALL: [DriverKind; 6] = [
        DriverKind::MySql,
        DriverKind::Postgres,
        DriverKind::Sqlite,
        DriverKind::SqlServer,
        DriverKind::Redis,
        DriverKind::Mongo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DriverKind::MySql => "mysql",
            DriverKind::Postgres => "postgres",
            DriverKind::Sqlite => "sqlite",
            DriverKind::SqlServer => "sqlserver",
            DriverKind::Redis => "redis",
            DriverKind::Mongo => "mongo",
        }
    }

    /// Whether `connect` can open a real handle for this kind.
    pub fn is_wired(self) -> bool {
        !matches!(self, DriverKind::Redis | DriverKind::Mongo)
    }

    pub fn default_port(self) -> Option<u16> {
        match self {
            DriverKind::MySql => Some(3306),
            DriverKind::Postgres => Some(5432),
            DriverKind::SqlServer => Some(1433),
            DriverKind::Redis => Some(6379),
            DriverKind::Mongo => Some(27017),
            DriverKind::Sqlite => None,
        }
    }

    /// Per-driver field checks. Runs before any I/O.
    pub fn validate(self, cfg: &DriverConfig) -> Result<(), DbInfraError> {
        match self {
            DriverKind::Sqlite => {
                require(self, "DB_DATABASE", &cfg.database)?;
                Ok(())
            }
            DriverKind::MySql | DriverKind::Postgres | DriverKind::SqlServer => {
                require(self, "DB_HOST", &cfg.host)?;
                self.host_component(&cfg.host)?;
                require(self, "DB_DATABASE", &cfg.database)?;
                self.port(cfg)?;
                Ok(())
            }
            DriverKind::Redis | DriverKind::Mongo => Ok(()),
        }
    }

    /// Host as written into a connection string. IPv6 literals are bracketed;
    /// characters that would read as userinfo, path, query or a JDBC property
    /// are rejected so distinct configs never collapse into one string.
    pub fn host_component(self, host: &str) -> Result<String, DbInfraError> {
        if host.contains(':') {
            return match host.parse::<Ipv6Addr>() {
                Ok(_) => Ok(format!("[{host}]")),
                Err(_) => Err(DbInfraError::config(format!(
                    "invalid DB_HOST '{host}' for {}: IPv6 literals must be given without brackets or port",
                    self.name()
                ))),
            };
        }
        let bad = host
            .chars()
            .find(|c| HOST_FORBIDDEN.contains(c) || c.is_whitespace() || c.is_control());
        if let Some(bad) = bad {
            return Err(DbInfraError::config(format!(
                "invalid DB_HOST '{host}' for {}: unexpected character {bad:?}",
                self.name()
            )));
        }
        Ok(host.to_string())
    }

    /// Effective port: the configured one, or the driver default when empty.
    pub fn port(self, cfg: &DriverConfig) -> Result<u16, DbInfraError> {
        let raw = cfg.port.trim();
        if raw.is_empty() {
            return self.default_port().ok_or_else(|| {
                DbInfraError::config(format!("{} does not use a port", self.name()))
            });
        }
        match raw.parse::<u16>() {
            Ok(0) | Err(_) => Err(DbInfraError::config(format!(
                "invalid DB_PORT '{raw}' for {}",
                self.name()
            ))),
            Ok(port) => Ok(port),
        }
    }

    /// Driver-specific connection string built from the config fields.
    pub fn conn_spec(self, cfg: &DriverConfig) -> Result<String, DbInfraError> {
        self.validate(cfg)?;

        match self {
            DriverKind::MySql | DriverKind::Postgres => Ok(url_spec(
                self.name(),
                cfg,
                &self.host_component(&cfg.host)?,
                self.port(cfg)?,
            )),
            DriverKind::Sqlite => {
                if cfg.database == SQLITE_MEMORY {
                    Ok("sqlite::memory:".to_string())
                } else {
                    Ok(format!(
                        "sqlite://{}?mode=rwc",
                        utf8_percent_encode(&cfg.database, SQLITE_PATH)
                    ))
                }
            }
            DriverKind::SqlServer => Ok(format!(
                "jdbc:sqlserver://{}:{};databaseName={};user={};password={};trustServerCertificate=true",
                self.host_component(&cfg.host)?,
                self.port(cfg)?,
                brace_quote(&cfg.database),
                brace_quote(&cfg.username),
                brace_quote(&cfg.password),
            )),
            DriverKind::Redis | DriverKind::Mongo => Err(DbInfraError::NotImplemented {
                driver: self.name().to_string(),
            }),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriverKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Err(DbInfraError::config("driver kind is required (DB_DRIVER)")),
            "mysql" => Ok(DriverKind::MySql),
            "postgres" | "postgresql" => Ok(DriverKind::Postgres),
            "sqlite" | "sqlite3" => Ok(DriverKind::Sqlite),
            "sqlserver" | "mssql" => Ok(DriverKind::SqlServer),
            "redis" => Ok(DriverKind::Redis),
            "mongo" | "mongodb" => Ok(DriverKind::Mongo),
            _ => Err(DbInfraError::UnsupportedDriver {
                driver: s.to_string(),
            }),
        }
    }
}

impl DriverConfig {
    /// Resolve the driver kind; unknown values are `UnsupportedDriver`.
    pub fn kind(&self) -> Result<DriverKind, DbInfraError> {
        self.driver.parse()
    }
}

fn require(kind: DriverKind, var: &str, value: &str) -> Result<(), DbInfraError> {
    if value.trim().is_empty() {
        return Err(DbInfraError::config(format!(
            "{var} is required for the {kind} driver"
        )));
    }
    Ok(())
}

fn url_spec(scheme: &str, cfg: &DriverConfig, host: &str, port: u16) -> String {
    let userinfo = if cfg.username.is_empty() && cfg.password.is_empty() {
        String::new()
    } else {
        format!(
            "{}:{}@",
            utf8_percent_encode(&cfg.username, URL_COMPONENT),
            utf8_percent_encode(&cfg.password, URL_COMPONENT)
        )
    };
    format!(
        "{scheme}://{userinfo}{host}:{port}/{}",
        utf8_percent_encode(&cfg.database, URL_COMPONENT)
    )
}

/// JDBC property values are wrapped in braces; a literal `}` is doubled.
fn brace_quote(value: &str) -> String {
    format!("{{{}}}", value.replace('}', "}}"))
}

/// Mask the password of a URL-style connection string for logging.
pub fn sanitize_conn_spec(spec: &str) -> String {
    if let Some(rest) = spec.strip_prefix("jdbc:") {
        return format!("jdbc:{}", mask_jdbc_password(rest));
    }

    let Some((scheme, rest)) = spec.split_once("://") else {
        return spec.to_string();
    };
    let Some((auth_part, host_part)) = rest.rsplit_once('@') else {
        return spec.to_string();
    };
    match auth_part.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
        None => spec.to_string(),
    }
}

fn mask_jdbc_password(spec: &str) -> String {
    const KEY: &str = ";password=";
    let Some(start) = spec.to_ascii_lowercase().find(KEY) else {
        return spec.to_string();
    };
    let value_start = start + KEY.len();
    let rest = &spec[value_start..];
    let end = if rest.starts_with('{') {
        closing_brace(rest).map(|i| i + 1)
    } else {
        rest.find(';')
    }
    .unwrap_or(rest.len());
    format!("{}***{}", &spec[..value_start], &rest[end..])
}

/// Index of the brace closing a quoted JDBC value, skipping doubled `}}`.
fn closing_brace(quoted: &str) -> Option<usize> {
    let bytes = quoted.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'}' {
            if bytes.get(i + 1) == Some(&b'}') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}
