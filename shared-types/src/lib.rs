//! Shared types between the Conecta backend and its clients
//!
//! Everything here is serde-serializable and travels as JSON over
//! HTTP/WebSocket. The server assembles these DTOs at the store
//! boundary; clients treat them as the wire contract.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generate a fresh opaque identifier for a stored record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// Users
// ============================================================================

/// Brazilian federative-unit codes. Closed enumeration so an invalid
/// region can never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Ac, Al, Ap, Am, Ba, Ce, Df, Es, Go, Ma, Mt, Ms, Mg, Pa,
    Pb, Pr, Pe, Pi, Rj, Rn, Rs, Ro, Rr, Sc, Sp, Se, To,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Ac => "AC", Region::Al => "AL", Region::Ap => "AP",
            Region::Am => "AM", Region::Ba => "BA", Region::Ce => "CE",
            Region::Df => "DF", Region::Es => "ES", Region::Go => "GO",
            Region::Ma => "MA", Region::Mt => "MT", Region::Ms => "MS",
            Region::Mg => "MG", Region::Pa => "PA", Region::Pb => "PB",
            Region::Pr => "PR", Region::Pe => "PE", Region::Pi => "PI",
            Region::Rj => "RJ", Region::Rn => "RN", Region::Rs => "RS",
            Region::Ro => "RO", Region::Rr => "RR", Region::Sc => "SC",
            Region::Sp => "SP", Region::Se => "SE", Region::To => "TO",
        }
    }
}

impl std::str::FromStr for Region {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = match s.to_ascii_uppercase().as_str() {
            "AC" => Region::Ac, "AL" => Region::Al, "AP" => Region::Ap,
            "AM" => Region::Am, "BA" => Region::Ba, "CE" => Region::Ce,
            "DF" => Region::Df, "ES" => Region::Es, "GO" => Region::Go,
            "MA" => Region::Ma, "MT" => Region::Mt, "MS" => Region::Ms,
            "MG" => Region::Mg, "PA" => Region::Pa, "PB" => Region::Pb,
            "PR" => Region::Pr, "PE" => Region::Pe, "PI" => Region::Pi,
            "RJ" => Region::Rj, "RN" => Region::Rn, "RS" => Region::Rs,
            "RO" => Region::Ro, "RR" => Region::Rr, "SC" => Region::Sc,
            "SP" => Region::Sp, "SE" => Region::Se, "TO" => Region::To,
            _ => return Err(()),
        };
        Ok(code)
    }
}

/// School-network affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Municipal,
    Estadual,
    Federal,
    Privada,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Municipal => "municipal",
            Network::Estadual => "estadual",
            Network::Federal => "federal",
            Network::Privada => "privada",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "municipal" => Ok(Network::Municipal),
            "estadual" => Ok(Network::Estadual),
            "federal" => Ok(Network::Federal),
            "privada" => Ok(Network::Privada),
            _ => Err(()),
        }
    }
}

/// A user's profile record as exposed by the API. The password hash
/// never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub region: Option<Region>,
    pub network: Option<Network>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Display label shown next to authored content: the name when
    /// present, falling back to the email.
    pub fn display_label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

// ============================================================================
// Notes feed
// ============================================================================

/// The four reaction symbols. A closed enum so exhaustiveness is
/// checkable; serializes as the emoji itself on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ReactionKind {
    #[serde(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "❤️")]
    Heart,
    #[serde(rename = "💡")]
    Idea,
    #[serde(rename = "🎉")]
    Party,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::ThumbsUp,
        ReactionKind::Heart,
        ReactionKind::Idea,
        ReactionKind::Party,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            ReactionKind::ThumbsUp => "👍",
            ReactionKind::Heart => "❤️",
            ReactionKind::Idea => "💡",
            ReactionKind::Party => "🎉",
        }
    }

    /// Stable ASCII identifier used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::ThumbsUp => "thumbs_up",
            ReactionKind::Heart => "heart",
            ReactionKind::Idea => "idea",
            ReactionKind::Party => "party",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "thumbs_up" => Some(ReactionKind::ThumbsUp),
            "heart" => Some(ReactionKind::Heart),
            "idea" => Some(ReactionKind::Idea),
            "party" => Some(ReactionKind::Party),
            _ => None,
        }
    }
}

/// Aggregated state of one reaction symbol on one note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionState {
    pub count: i64,
    pub reacted_by: Vec<String>,
}

/// A top-level note in the feed, with reactions aggregated per symbol.
/// All four symbols are always present, zero-initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
    pub reactions: BTreeMap<ReactionKind, ReactionState>,
}

/// A reply under a note's thread, ordered ascending by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub note_id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

/// Messages pushed over the live feed WebSocket. The notes payload is
/// always the full replacement list, never a diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    Notes {
        notes: Vec<Note>,
    },
    Thread {
        note_id: String,
        replies: Vec<Reply>,
    },
}

// ============================================================================
// News
// ============================================================================

/// An admin-published announcement. Wire field names follow the
/// persisted record shape (`titulo`/`corpo`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "corpo")]
    pub body: String,
    pub published_at: DateTime<Utc>,
}

// ============================================================================
// Pedagogical content generator
// ============================================================================

/// The four document templates the generator offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "Plano de Aula")]
    PlanoDeAula,
    #[serde(rename = "Plano de Curso")]
    PlanoDeCurso,
    #[serde(rename = "Lista de Exercícios")]
    ListaDeExercicios,
    #[serde(rename = "Projeto Pedagógico")]
    ProjetoPedagogico,
}

/// One labeled input field of a template. `long` marks multi-line
/// fields (rendered as a textarea).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub long: bool,
}

const fn field(id: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { id, label, long: false }
}

const fn long_field(id: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { id, label, long: true }
}

const PLANO_DE_AULA_FIELDS: &[FieldSpec] = &[
    field("tema", "Tema / Título"),
    long_field("objetivo", "Objetivo Geral"),
    field("publico", "Público-Alvo"),
    field("disciplina", "Disciplina"),
    long_field("conteudos", "Conteúdos"),
    field("recursos", "Recursos Didáticos"),
    long_field("estrategias", "Estratégias de Ensino"),
    field("avaliacao", "Avaliação"),
    long_field("observacoes", "Observações"),
];

const PLANO_DE_CURSO_FIELDS: &[FieldSpec] = &[
    field("curso", "Nome do Curso"),
    long_field("objetivo", "Objetivo Geral"),
    field("publico", "Público-Alvo"),
    field("carga", "Carga Horária total"),
    long_field("conteudos", "Módulos / Conteúdos"),
    long_field("metodologia", "Metodologia"),
    field("avaliacao", "Avaliação"),
];

const LISTA_DE_EXERCICIOS_FIELDS: &[FieldSpec] = &[
    field("tema", "Tema / Tópico"),
    field("nivel", "Nível (fundamental, médio...)"),
    field("disciplina", "Disciplina"),
    field("quantidade", "Quantidade de questões"),
    long_field("habilidades", "Habilidades / Competências"),
    long_field("observacoes", "Observações"),
];

const PROJETO_PEDAGOGICO_FIELDS: &[FieldSpec] = &[
    field("titulo", "Título do Projeto"),
    long_field("justificativa", "Justificativa"),
    long_field("objetivos", "Objetivos"),
    field("publico", "Público-Alvo"),
    field("areas", "Área(s) do conhecimento"),
    field("duracao", "Duração"),
    field("recursos", "Recursos"),
    field("avaliacao", "Avaliação"),
    long_field("produtos", "Resultados esperados"),
];

impl ContentKind {
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::PlanoDeAula => "Plano de Aula",
            ContentKind::PlanoDeCurso => "Plano de Curso",
            ContentKind::ListaDeExercicios => "Lista de Exercícios",
            ContentKind::ProjetoPedagogico => "Projeto Pedagógico",
        }
    }

    /// The labeled fields collected for this template, in form order.
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            ContentKind::PlanoDeAula => PLANO_DE_AULA_FIELDS,
            ContentKind::PlanoDeCurso => PLANO_DE_CURSO_FIELDS,
            ContentKind::ListaDeExercicios => LISTA_DE_EXERCICIOS_FIELDS,
            ContentKind::ProjetoPedagogico => PROJETO_PEDAGOGICO_FIELDS,
        }
    }
}

/// Assemble the completion prompt for a template from its labeled
/// field values. Missing fields render as empty strings, matching the
/// form's behavior when a field is left blank.
pub fn build_prompt(kind: ContentKind, campos: &HashMap<String, String>) -> String {
    fn get<'a>(campos: &'a HashMap<String, String>, id: &str) -> &'a str {
        campos.get(id).map(String::as_str).unwrap_or("")
    }

    match kind {
        ContentKind::PlanoDeAula => format!(
            "Você é um professor especialista. Elabore um PLANO DE AULA detalhado.\n\
             Tema: {}\nObjetivo: {}\nPúblico: {}\nDisciplina: {}\nConteúdos: {}\n\
             Recursos: {}\nEstratégias: {}\nAvaliação: {}\nObservações: {}",
            get(campos, "tema"),
            get(campos, "objetivo"),
            get(campos, "publico"),
            get(campos, "disciplina"),
            get(campos, "conteudos"),
            get(campos, "recursos"),
            get(campos, "estrategias"),
            get(campos, "avaliacao"),
            get(campos, "observacoes"),
        ),
        ContentKind::PlanoDeCurso => format!(
            "Crie um PLANO DE CURSO completo, seja detalhista e escreva como um \
             especialista com 30 anos de experiência.\n\
             Curso: {}\nObjetivo: {}\nPúblico: {}\nCarga Horária: {}\n\
             Conteúdos/Módulos: {}\nMetodologia: {}\nAvaliação: {}",
            get(campos, "curso"),
            get(campos, "objetivo"),
            get(campos, "publico"),
            get(campos, "carga"),
            get(campos, "conteudos"),
            get(campos, "metodologia"),
            get(campos, "avaliacao"),
        ),
        ContentKind::ListaDeExercicios => format!(
            "Gere uma LISTA DE EXERCÍCIOS, escreva como um especialista com 30 \
             anos de experiência na área.\n\
             Tema: {}\nNível: {}\nDisciplina: {}\nQuantidade: {}\n\
             Habilidades trabalhadas: {}\nObservações adicionais: {}",
            get(campos, "tema"),
            get(campos, "nivel"),
            get(campos, "disciplina"),
            get(campos, "quantidade"),
            get(campos, "habilidades"),
            get(campos, "observacoes"),
        ),
        ContentKind::ProjetoPedagogico => format!(
            "Desenvolva um PROJETO PEDAGÓGICO, seja extremamente detalhista e \
             escreva como um especialista com 30 anos de experiência.\n\
             Título: {}\nJustificativa: {}\nObjetivos: {}\nPúblico: {}\n\
             Áreas: {}\nDuração: {}\nRecursos: {}\nAvaliação: {}\n\
             Resultados esperados: {}",
            get(campos, "titulo"),
            get(campos, "justificativa"),
            get(campos, "objetivos"),
            get(campos, "publico"),
            get(campos, "areas"),
            get(campos, "duracao"),
            get(campos, "recursos"),
            get(campos, "avaliacao"),
            get(campos, "produtos"),
        ),
    }
}
