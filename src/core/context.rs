// builds the bounded message list we send upstream

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TURNS: usize = 21;

pub const SYSTEM_PREAMBLE: &str = "Eres un asistente de bienestar emocional dentro de una \
aplicación de salud. Responde en español, con calidez y empatía, en mensajes breves. \
No das diagnósticos ni indicaciones médicas; ante dudas clínicas sugiere consultar a un \
profesional de la salud. Si la persona menciona riesgo para su vida, anímala a buscar \
ayuda de emergencia de inmediato.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn preamble() -> Self {
        Self::new(Role::System, SYSTEM_PREAMBLE)
    }
}

/// Content of the most recent user turn, if any.
pub fn last_user_content(history: &[Turn]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
}

pub struct ContextAssembler {
    max_turns: usize,
}

impl ContextAssembler {
    /// `max_turns` counts the preamble, so it is clamped to at least 1.
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn build_upstream_payload(&self, history: &[Turn]) -> Vec<Turn> {
        // oldest caller turns go first, the preamble always stays at 0
        let keep = self.max_turns - 1;
        let start = history.len().saturating_sub(keep);

        let mut payload = Vec::with_capacity(history.len() - start + 1);
        payload.push(Turn::preamble());
        payload.extend_from_slice(&history[start..]);
        payload
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}
