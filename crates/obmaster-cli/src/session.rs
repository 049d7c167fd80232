use crate::display;
use obmaster::obmaster_tools::{FieldKind, FieldSpec, FieldValue, FieldValues, ToolId};
use obmaster::Client;
use std::io::{self, BufRead, Write};
use tracing::debug;

const INVALID_TEXT: &str = "Entrada inválida: use texto UTF-8.";

/// Interactive menu loop. Each generate action issues one blocking call.
pub struct Session<'a, R, W> {
    client: &'a Client,
    input: R,
    output: W,
}

enum Flow {
    Continue,
    Quit,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(client: &'a Client, input: R, output: W) -> Self {
        Self {
            client,
            input,
            output,
        }
    }

    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output)?;
            display::menu(&mut self.output)?;
            let Some(line) = self.prompt("> ")? else {
                return Ok(());
            };
            let choice = line.trim();
            if matches!(choice, "q" | "sair") {
                return Ok(());
            }
            let Some(tool) = select_tool(choice) else {
                writeln!(self.output, "Opção inválida: {choice:?}")?;
                continue;
            };
            if let Flow::Quit = self.open(tool).await? {
                return Ok(());
            }
        }
    }

    async fn open(&mut self, tool: ToolId) -> io::Result<Flow> {
        debug!(%tool, "tool opened");
        if tool == ToolId::Dashboard {
            display::dashboard(&mut self.output)?;
            return Ok(Flow::Continue);
        }

        let definition = tool.definition();
        writeln!(self.output, "\n{}", definition.title)?;
        let mut values = FieldValues::new();
        for spec in definition.fields {
            match self.read_field(tool, spec)? {
                Some(value) => values.insert(spec.name, value),
                None => return Ok(Flow::Quit),
            }
        }

        if let Err(error) = definition.check_ready(&values) {
            writeln!(self.output, "{}", display::form_error(definition, &error))?;
            return Ok(Flow::Continue);
        }

        if let Some(action) = definition.action_label {
            writeln!(self.output, "[{action}] {}", display::WAITING)?;
        }
        self.output.flush()?;
        match self.client.generate_for(tool, &values).await {
            Ok(result) => display::result(&mut self.output, definition, &result)?,
            Err(error) => writeln!(self.output, "{}", display::form_error(definition, &error))?,
        }
        Ok(Flow::Continue)
    }

    /// Prompts until the input is valid for `spec`; `None` on end of input.
    fn read_field(&mut self, tool: ToolId, spec: &FieldSpec) -> io::Result<Option<FieldValue>> {
        loop {
            match spec.hint {
                Some(hint) => writeln!(self.output, "{} ({hint})", spec.label)?,
                None => writeln!(self.output, "{}", spec.label)?,
            }
            if let FieldKind::Select(choices) = spec.kind {
                for (index, choice) in choices.iter().enumerate() {
                    writeln!(self.output, "  {}. {}", index + 1, choice.label)?;
                }
            }
            let Some(line) = self.prompt("> ")? else {
                return Ok(None);
            };

            let raw = match spec.kind {
                FieldKind::Select(choices) => match line.trim().parse::<usize>() {
                    Ok(n) if (1..=choices.len()).contains(&n) => choices[n - 1].id.to_string(),
                    _ => line.trim().to_string(),
                },
                _ => line,
            };
            match spec.parse_input(tool, &raw) {
                Ok(value) => return Ok(Some(value)),
                Err(_) if matches!(spec.kind, FieldKind::Count { .. }) => {
                    writeln!(self.output, "Digite um número inteiro maior ou igual a zero.")?;
                }
                Err(_) => writeln!(self.output, "Opção inválida: {:?}", raw)?,
            }
        }
    }

    /// Reads one line; lines that are not valid UTF-8 are rejected and asked again.
    fn prompt(&mut self, marker: &str) -> io::Result<Option<String>> {
        loop {
            write!(self.output, "{marker}")?;
            self.output.flush()?;
            let mut raw = Vec::new();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                return Ok(None);
            }
            match String::from_utf8(raw) {
                Ok(mut line) => {
                    let trimmed = line.trim_end_matches(['\n', '\r']).len();
                    line.truncate(trimmed);
                    return Ok(Some(line));
                }
                Err(_) => writeln!(self.output, "{INVALID_TEXT}")?,
            }
        }
    }
}

/// Accepts a 1-based menu number or a tool identifier.
fn select_tool(choice: &str) -> Option<ToolId> {
    match choice.parse::<usize>() {
        Ok(n) if (1..=ToolId::ALL.len()).contains(&n) => Some(ToolId::ALL[n - 1]),
        Ok(_) => None,
        Err(_) => choice.parse().ok(),
    }
}
