pub mod persona;

use std::error::Error;
use crate::cli::Args;

/// Read-only settings shared by every relayed request.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub persona: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            persona: persona::PERSONA_INSTRUCTION.to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
        }
    }
}

impl RelaySettings {
    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let persona = persona::load_persona(args.persona_path.as_deref())?;
        Ok(Self {
            persona,
            model: args.gemini_model.clone(),
            temperature: args.temperature,
        })
    }
}
