use crate::fields::{Choice, FieldKind, FieldSpec, FieldValue, FieldValues};
use crate::{ToolError, ToolId};
use std::fmt;

type RenderFn = fn(&Inputs<'_>) -> Result<String, ToolError>;

/// How generated output should be presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Markdown,
    /// Verbatim text meant to be copied into another tool.
    Code,
}

pub struct ToolDefinition {
    pub id: ToolId,
    pub menu_label: &'static str,
    pub title: &'static str,
    pub action_label: Option<&'static str>,
    pub result_heading: Option<&'static str>,
    pub output: OutputStyle,
    pub fields: &'static [FieldSpec],
    render: Option<RenderFn>,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("fields", &self.fields)
            .field("generative", &self.is_generative())
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    pub fn is_generative(&self) -> bool {
        self.render.is_some()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn render(&self, values: &FieldValues) -> Result<String, ToolError> {
        let render = self.render.ok_or(ToolError::NotGenerative(self.id))?;
        if let Some(spec) = self.fields.iter().find(|spec| values.get(spec.name).is_none()) {
            return Err(ToolError::MissingField {
                tool: self.id,
                field: spec.name.to_string(),
            });
        }
        render(&Inputs {
            definition: self,
            values,
        })
    }

    /// Gate applied before a generation call: every field present and every
    /// free-text field non-blank.
    pub fn check_ready(&self, values: &FieldValues) -> Result<(), ToolError> {
        if !self.is_generative() {
            return Err(ToolError::NotGenerative(self.id));
        }
        for spec in self.fields {
            match (values.get(spec.name), spec.kind) {
                (None, _) => {
                    return Err(ToolError::MissingField {
                        tool: self.id,
                        field: spec.name.to_string(),
                    })
                }
                (Some(FieldValue::Text(text)), FieldKind::FreeText) if text.trim().is_empty() => {
                    return Err(ToolError::BlankField {
                        tool: self.id,
                        field: spec.name.to_string(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }
}

struct Inputs<'a> {
    definition: &'a ToolDefinition,
    values: &'a FieldValues,
}

impl<'a> Inputs<'a> {
    fn lookup(&self, name: &str) -> Result<(&'static FieldSpec, &'a FieldValue), ToolError> {
        let tool = self.definition.id;
        let spec = self
            .definition
            .field(name)
            .ok_or_else(|| ToolError::InvalidValue {
                tool,
                field: name.to_string(),
                reason: "field is not declared by this tool".to_string(),
            })?;
        let value = self.values.get(name).ok_or_else(|| ToolError::MissingField {
            tool,
            field: name.to_string(),
        })?;
        Ok((spec, value))
    }

    fn text(&self, name: &str) -> Result<&'a str, ToolError> {
        match self.lookup(name)? {
            (_, FieldValue::Text(text)) => Ok(text.as_str()),
            (spec, FieldValue::Count(_)) => {
                Err(spec.invalid(self.definition.id, "expected text, got a number"))
            }
        }
    }

    fn choice(&self, name: &str) -> Result<&'static str, ToolError> {
        match self.lookup(name)? {
            (spec, FieldValue::Text(raw)) => Ok(spec.choice(self.definition.id, raw)?.label),
            (spec, FieldValue::Count(_)) => {
                Err(spec.invalid(self.definition.id, "expected a choice, got a number"))
            }
        }
    }

    fn count(&self, name: &str) -> Result<u64, ToolError> {
        let tool = self.definition.id;
        match self.lookup(name)? {
            (spec, FieldValue::Count(value)) => spec.check_count(tool, *value),
            (spec, FieldValue::Text(raw)) => spec.count(tool, raw.trim()),
        }
    }
}

const STYLES: [Choice; 4] = [
    Choice {
        id: "aggressive",
        label: "Agressivo/Ostentação",
    },
    Choice {
        id: "educational",
        label: "Educativo/Técnico",
    },
    Choice {
        id: "motivational",
        label: "Motivacional",
    },
    Choice {
        id: "mysterious",
        label: "Misterioso",
    },
];

const PLATFORMS: [Choice; 4] = [
    Choice {
        id: "feed",
        label: "Instagram Feed",
    },
    Choice {
        id: "stories",
        label: "Instagram Stories",
    },
    Choice {
        id: "telegram",
        label: "Telegram",
    },
    Choice {
        id: "email",
        label: "E-mail",
    },
];

const CONTENT_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "topic",
        label: "Qual o tema do post?",
        hint: Some("Ex: Estratégia M5, Mindset, Resultado do dia"),
        kind: FieldKind::FreeText,
    },
    FieldSpec {
        name: "style",
        label: "Estilo:",
        hint: None,
        kind: FieldKind::Select(&STYLES),
    },
    FieldSpec {
        name: "platform",
        label: "Onde vai postar?",
        hint: None,
        kind: FieldKind::Select(&PLATFORMS),
    },
];

const FUNNEL_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "goal",
    label: "Qual o objetivo final?",
    hint: Some("Ex: Venda de Mentoria, Cadastro na Corretora"),
    kind: FieldKind::FreeText,
}];

const ANALYZER_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "clicks",
        label: "Cliques no Link",
        hint: None,
        kind: FieldKind::Count { min: 0 },
    },
    FieldSpec {
        name: "signups",
        label: "Cadastros (Leads)",
        hint: None,
        kind: FieldKind::Count { min: 0 },
    },
    FieldSpec {
        name: "deposits",
        label: "Depósitos/Vendas",
        hint: None,
        kind: FieldKind::Count { min: 0 },
    },
];

const CREATIVE_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "scene",
    label: "Descreva a cena básica",
    hint: Some("Ex: Trader operando no celular em Dubai"),
    kind: FieldKind::FreeText,
}];

const OFFER_FIELDS: [FieldSpec; 1] = [FieldSpec {
    name: "product",
    label: "O que você está vendendo/indicando?",
    hint: None,
    kind: FieldKind::FreeText,
}];

// Indexed by `ToolId as usize`; order must follow `ToolId::ALL`.
static REGISTRY: [ToolDefinition; 6] = [
    ToolDefinition {
        id: ToolId::Dashboard,
        menu_label: "🏠 Dashboard",
        title: "Bem-vindo ao QG do Trader",
        action_label: None,
        result_heading: None,
        output: OutputStyle::Markdown,
        fields: &[],
        render: None,
    },
    ToolDefinition {
        id: ToolId::ContentGenerator,
        menu_label: "📝 Gerador de Conteúdo",
        title: "📝 Gerador de Posts e Copy",
        action_label: Some("Gerar Conteúdo"),
        result_heading: None,
        output: OutputStyle::Markdown,
        fields: &CONTENT_FIELDS,
        render: Some(content_prompt),
    },
    ToolDefinition {
        id: ToolId::FunnelBuilder,
        menu_label: "🌪️ Criador de Funis",
        title: "🌪️ Arquiteto de Funis",
        action_label: Some("Construir Funil"),
        result_heading: None,
        output: OutputStyle::Markdown,
        fields: &FUNNEL_FIELDS,
        render: Some(funnel_prompt),
    },
    ToolDefinition {
        id: ToolId::PerformanceAnalyzer,
        menu_label: "📊 Analisador de Performance",
        title: "📊 Diagnóstico de Métricas",
        action_label: Some("Analisar Dados"),
        result_heading: Some("Diagnóstico Realizado:"),
        output: OutputStyle::Markdown,
        fields: &ANALYZER_FIELDS,
        render: Some(analyzer_prompt),
    },
    ToolDefinition {
        id: ToolId::CreativePromptGenerator,
        menu_label: "🎨 Gerador de Criativos",
        title: "🎨 Prompt para Imagens (Midjourney/DALL-E)",
        action_label: Some("Criar Prompt"),
        result_heading: None,
        output: OutputStyle::Code,
        fields: &CREATIVE_FIELDS,
        render: Some(creative_prompt),
    },
    ToolDefinition {
        id: ToolId::OfferGenerator,
        menu_label: "💎 Gerador de Ofertas",
        title: "💎 Criador de Ofertas Irresistíveis",
        action_label: Some("Gerar 3 Versões"),
        result_heading: None,
        output: OutputStyle::Markdown,
        fields: &OFFER_FIELDS,
        render: Some(offer_prompt),
    },
];

pub(crate) fn definition(id: ToolId) -> &'static ToolDefinition {
    &REGISTRY[id as usize]
}

pub fn dashboard_text() -> &'static str {
    "\
Selecione uma ferramenta no menu para começar a operar seu marketing.

### Resumo do Dia:
* **Foco:** Alta conversão.
* **Meta:** Captura de Leads e FTDs.
"
}

fn content_prompt(inputs: &Inputs<'_>) -> Result<String, ToolError> {
    let topic = inputs.text("topic")?;
    let style = inputs.choice("style")?;
    let platform = inputs.choice("platform")?;
    Ok(format!(
        "Crie um conteúdo para {platform} sobre '{topic}'. Estilo: {style}. \
         Inclua Headline, Texto persuasivo e CTA."
    ))
}

fn funnel_prompt(inputs: &Inputs<'_>) -> Result<String, ToolError> {
    let goal = inputs.text("goal")?;
    Ok(format!(
        "Crie um funil de vendas completo para: {goal}. Inclua: 1. Script de Vídeo, \
         2. Headline da Landing Page, 3. Sequência de 3 e-mails."
    ))
}

fn analyzer_prompt(inputs: &Inputs<'_>) -> Result<String, ToolError> {
    let clicks = inputs.count("clicks")?;
    let signups = inputs.count("signups")?;
    let deposits = inputs.count("deposits")?;
    Ok(format!(
        "Analise estes dados de tráfego para Opções Binárias: {clicks} cliques, \
         {signups} cadastros, {deposits} vendas. Calcule as taxas de conversão, \
         diagnostique o problema (Criativo, LP ou Oferta) e me diga o que fazer."
    ))
}

fn creative_prompt(inputs: &Inputs<'_>) -> Result<String, ToolError> {
    let scene = inputs.text("scene")?;
    Ok(format!(
        "Crie um prompt detalhado e profissional em INGLÊS para gerar uma imagem \
         realista de IA. Base: {scene}. Estilo: Trader profissional, dark mode, \
         luzes neon, luxo, alta definição."
    ))
}

fn offer_prompt(inputs: &Inputs<'_>) -> Result<String, ToolError> {
    let product = inputs.text("product")?;
    Ok(format!(
        "Crie 3 níveis de oferta (Leve, Moderada, Agressiva) para o produto: {product}. \
         Use gatilhos mentais de escassez e urgência."
    ))
}
