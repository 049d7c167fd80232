use obmaster::obmaster_core::GenerationResult;
use obmaster::obmaster_tools::{
    dashboard_text, FieldKind, OutputStyle, ToolDefinition, ToolError, ToolId,
};
use std::io::{self, Write};

pub const SEPARATOR: &str = "---";
pub const WAITING: &str = "Analisando mercado e gerando estratégia...";

pub fn menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "📈 OB MASTER")?;
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "Escolha a Ferramenta:")?;
    for (index, id) in ToolId::ALL.into_iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, id.definition().menu_label)?;
    }
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "Status: Online 🟢  (q para sair)")
}

pub fn dashboard(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "# {}", ToolId::Dashboard.definition().title)?;
    writeln!(out)?;
    write!(out, "{}", dashboard_text())
}

pub fn tool_list(out: &mut impl Write) -> io::Result<()> {
    for id in ToolId::ALL {
        let definition = id.definition();
        writeln!(out, "{id}  {}", definition.menu_label)?;
        for spec in definition.fields {
            let kind = match spec.kind {
                FieldKind::FreeText => "text".to_string(),
                FieldKind::Select(choices) => choices
                    .iter()
                    .map(|c| c.id)
                    .collect::<Vec<_>>()
                    .join("|"),
                FieldKind::Count { min } => format!("integer >= {min}"),
            };
            writeln!(out, "    {:<10} {kind}  ({})", spec.name, spec.label)?;
        }
    }
    Ok(())
}

/// Operator-facing explanation of a form problem.
pub fn form_error(definition: &ToolDefinition, error: &ToolError) -> String {
    let label = |field: &str| {
        definition
            .field(field)
            .map(|spec| spec.label)
            .unwrap_or(field)
            .trim_end_matches(['?', ':'])
            .to_string()
    };
    match error {
        ToolError::BlankField { field, .. } | ToolError::MissingField { field, .. } => {
            format!("⚠️ Preencha o campo '{}' primeiro.", label(field))
        }
        other => format!("⚠️ {other}"),
    }
}

pub fn result(
    out: &mut impl Write,
    definition: &ToolDefinition,
    result: &GenerationResult,
) -> io::Result<()> {
    writeln!(out, "{SEPARATOR}")?;
    match result {
        GenerationResult::Success(text) => {
            if let Some(heading) = definition.result_heading {
                writeln!(out, "✅ {heading}")?;
            }
            match definition.output {
                OutputStyle::Markdown => writeln!(out, "{text}"),
                OutputStyle::Code => writeln!(out, "```text\n{text}\n```"),
            }
        }
        GenerationResult::Failure(message) => writeln!(out, "❌ {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn menu_lists_every_tool_in_order() {
        let text = rendered(|out| menu(out));
        assert!(text.contains("1. 🏠 Dashboard"));
        assert!(text.contains("6. 💎 Gerador de Ofertas"));
    }

    #[test]
    fn code_output_is_fenced() {
        let definition = ToolId::CreativePromptGenerator.definition();
        let text = rendered(|out| {
            result(
                out,
                definition,
                &GenerationResult::Success("A trader in Dubai".to_string()),
            )
        });
        assert_eq!(text, "---\n```text\nA trader in Dubai\n```\n");
    }

    #[test]
    fn analyzer_success_has_heading() {
        let definition = ToolId::PerformanceAnalyzer.definition();
        let text = rendered(|out| {
            result(out, definition, &GenerationResult::Success("CTR 10%".to_string()))
        });
        assert!(text.contains("✅ Diagnóstico Realizado:\nCTR 10%"));
    }

    #[test]
    fn failure_is_shown_verbatim() {
        let definition = ToolId::OfferGenerator.definition();
        let text = rendered(|out| {
            result(
                out,
                definition,
                &GenerationResult::Failure("Erro ao conectar com a IA: quota".to_string()),
            )
        });
        assert!(text.contains("❌ Erro ao conectar com a IA: quota"));
    }

    #[test]
    fn blank_field_message_uses_label() {
        let definition = ToolId::ContentGenerator.definition();
        let error = ToolError::BlankField {
            tool: ToolId::ContentGenerator,
            field: "topic".to_string(),
        };
        assert_eq!(
            form_error(definition, &error),
            "⚠️ Preencha o campo 'Qual o tema do post' primeiro."
        );
    }

    #[test]
    fn tool_list_shows_choices_and_counts() {
        let text = rendered(|out| tool_list(out));
        assert!(text.contains("aggressive|educational|motivational|mysterious"));
        assert!(text.contains("integer >= 0"));
    }
}
