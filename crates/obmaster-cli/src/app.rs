use crate::cli::Command;
use crate::display;
use crate::session::Session;
use obmaster::obmaster_tools::{FieldValues, ToolId};
use obmaster::{Client, Config, ConfigError};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

/// Checks the credential, then dispatches `command`. Nothing runs, not even
/// `tools`, until a client has been built from `config`.
pub async fn run<R, O, E>(
    config: Result<Config, ConfigError>,
    build: impl FnOnce(Arc<Config>) -> Result<Client, ConfigError>,
    command: Option<Command>,
    input: R,
    out: &mut O,
    err: &mut E,
) -> io::Result<u8>
where
    R: BufRead,
    O: Write,
    E: Write,
{
    let Some(client) = connect(config, build, err)? else {
        return Ok(EXIT_FAILURE);
    };
    match command {
        Some(Command::Tools) => {
            display::tool_list(out)?;
            Ok(EXIT_OK)
        }
        Some(Command::Run { tool, fields }) => run_once(&client, &tool, fields, out, err).await,
        None => {
            Session::new(&client, input, out).run().await?;
            Ok(EXIT_OK)
        }
    }
}

/// Turns the loaded configuration into a client; on failure tells the
/// operator and returns `None`.
fn connect(
    config: Result<Config, ConfigError>,
    build: impl FnOnce(Arc<Config>) -> Result<Client, ConfigError>,
    err: &mut impl Write,
) -> io::Result<Option<Client>> {
    let client = config.and_then(|config| {
        info!(model = %config.model(), "configuration loaded");
        build(Arc::new(config))
    });
    match client {
        Ok(client) => Ok(Some(client)),
        Err(ConfigError::MissingCredential(var)) => {
            writeln!(err, "⚠️ Erro: Chave API não encontrada. Configure {var}.")?;
            Ok(None)
        }
        Err(error) => {
            writeln!(err, "⚠️ Erro: {error}")?;
            Ok(None)
        }
    }
}

async fn run_once(
    client: &Client,
    tool: &str,
    fields: Vec<(String, String)>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<u8> {
    let tool: ToolId = match tool.parse() {
        Ok(tool) => tool,
        Err(error) => {
            writeln!(err, "⚠️ {error}")?;
            return Ok(EXIT_USAGE);
        }
    };
    if tool == ToolId::Dashboard {
        display::dashboard(out)?;
        return Ok(EXIT_OK);
    }

    let definition = tool.definition();
    let mut values = FieldValues::new();
    for (name, raw) in fields {
        let parsed = definition
            .field(&name)
            .ok_or_else(|| format!("tool {tool} has no field {name:?}"))
            .and_then(|spec| spec.parse_input(tool, &raw).map_err(|e| e.to_string()));
        match parsed {
            Ok(value) => values.insert(name, value),
            Err(message) => {
                writeln!(err, "⚠️ {message}")?;
                return Ok(EXIT_USAGE);
            }
        }
    }
    if let Err(error) = definition.check_ready(&values) {
        writeln!(err, "{}", display::form_error(definition, &error))?;
        return Ok(EXIT_USAGE);
    }

    writeln!(err, "{}", display::WAITING)?;
    let result = match client.generate_for(tool, &values).await {
        Ok(result) => result,
        Err(error) => {
            writeln!(err, "{}", display::form_error(definition, &error))?;
            return Ok(EXIT_USAGE);
        }
    };
    display::result(out, definition, &result)?;
    Ok(if result.is_success() {
        EXIT_OK
    } else {
        EXIT_FAILURE
    })
}
