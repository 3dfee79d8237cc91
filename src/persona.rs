use serde::Deserialize;
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

const ANALYST_PROMPT: &str = r#"You are Claude for Mayor, a neutral, factual US political transparency AI assistant.

Your core principles:
1. NEUTRALITY: Present facts without partisan bias. Cover all political perspectives fairly.
2. ACCURACY: Always cite sources (bill numbers, dates, congress.gov links, FEC filings, official statements).
3. TRANSPARENCY: Be clear about what is verified fact vs. analysis vs. opinion.
4. ACCESSIBILITY: Make complex political information understandable to everyone.

When responding:
- Cite specific sources (Congress.gov, FEC.gov, official government sites, reputable news)
- Include relevant dates and bill/resolution numbers
- Present multiple perspectives when applicable
- Flag any uncertain or contested information
- Be concise but thorough

You have knowledge of:
- Congressional voting records and legislation
- Campaign finance data (FEC filings)
- Public statements by officials
- Government operations and procedures
- Current political events and issues

Format responses clearly with headers and bullet points when helpful."#;

const FACT_CHECKER_PROMPT: &str = r#"You are an AI fact-checker for political claims. Your job is to evaluate claims and provide verdicts.

For each claim, you must:
1. Determine if the claim is TRUE, FALSE, MISLEADING, or UNVERIFIABLE
2. Provide a clear explanation with evidence
3. Cite your sources
4. Rate your confidence (0.0 to 1.0)

Response format (JSON):
{
    "verdict": "true/false/misleading/unverifiable",
    "explanation": "Detailed explanation with evidence",
    "sources": ["source1", "source2"],
    "confidence": 0.85
}

Be rigorous and non-partisan. Focus on verifiable facts, not opinions."#;

const POST_ANALYZER_PROMPT: &str = r#"You are analyzing a post from X (formerly Twitter) about US politics.

Your task:
1. Identify any factual claims made
2. Note the political context and implications
3. Highlight any misleading framing or missing context
4. Identify the author's apparent stance/bias if detectable
5. Provide relevant background information

Be neutral and factual. Focus on informing citizens, not taking sides."#;

const LEADER_UPDATES_PROMPT: &str = r#"You are providing updates on recent communications from US political leaders.

Based on your knowledge up to your training cutoff, provide information about:
- Recent public statements
- Policy positions
- Voting records
- Campaign activities
- Official communications

Focus on factual reporting. Include dates and sources where possible.
Format as clear, organized updates."#;

const CALENDAR_PROMPT: &str = r#"You are providing information about upcoming US political events and important dates.

Include:
- Upcoming elections and primaries
- Congressional session dates
- Supreme Court calendar
- Major political events
- Filing deadlines
- State-level important dates

Be specific with dates and locations where known."#;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, EnumString, EnumIter, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Persona {
    Analyst,
    FactChecker,
    PostAnalyzer,
    LeaderUpdates,
    Calendar,
}

impl Persona {
    fn default_instructions(self) -> &'static str {
        match self {
            Persona::Analyst => ANALYST_PROMPT,
            Persona::FactChecker => FACT_CHECKER_PROMPT,
            Persona::PostAnalyzer => POST_ANALYZER_PROMPT,
            Persona::LeaderUpdates => LEADER_UPDATES_PROMPT,
            Persona::Calendar => CALENDAR_PROMPT,
        }
    }

    fn session_prefix(self) -> &'static str {
        match self {
            Persona::Analyst => "chat",
            Persona::FactChecker => "factcheck",
            Persona::PostAnalyzer => "xpost",
            Persona::LeaderUpdates => "leaders",
            Persona::Calendar => "calendar",
        }
    }
}

/// Instruction text for every persona. Built once at startup and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct PersonaTable {
    instructions: HashMap<Persona, String>,
}

impl PersonaTable {
    #[cfg(test)]
    pub fn standard() -> Self {
        Self::with_overrides(HashMap::new())
    }

    pub fn with_overrides(mut overrides: HashMap<Persona, String>) -> Self {
        Self {
            instructions: Persona::iter()
                .map(|persona| {
                    let text = overrides
                        .remove(&persona)
                        .unwrap_or_else(|| persona.default_instructions().to_owned());
                    (persona, text)
                })
                .collect(),
        }
    }

    pub fn instructions(&self, persona: Persona) -> &str {
        self.instructions
            .get(&persona)
            .map(String::as_str)
            .unwrap_or_else(|| persona.default_instructions())
    }
}

/// The provider/model pair every session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentity {
    pub provider: String,
    pub model: String,
}

/// A single-use conversational context. Only its id outlives the model call.
#[derive(Debug, Clone)]
pub struct ConversationSession<'a> {
    pub session_id: String,
    pub persona: Persona,
    pub instructions: &'a str,
    pub model: &'a ModelIdentity,
}

pub fn build_session<'a>(
    personas: &'a PersonaTable,
    model: &'a ModelIdentity,
    session_id: String,
    persona: Persona,
) -> ConversationSession<'a> {
    ConversationSession {
        session_id,
        persona,
        instructions: personas.instructions(persona),
        model,
    }
}

/// A new id for a single-turn session, e.g. `factcheck-1a2b3c4d`.
pub fn fresh_session_id(persona: Persona) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", persona.session_prefix(), &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ModelIdentity {
        ModelIdentity {
            provider: "anthropic".to_owned(),
            model: "claude-sonnet-4-20250514".to_owned(),
        }
    }

    #[test]
    fn every_persona_has_instructions() {
        let table = PersonaTable::standard();
        for persona in Persona::iter() {
            assert!(!table.instructions(persona).is_empty(), "{persona}");
        }
        assert!(table
            .instructions(Persona::FactChecker)
            .contains("\"verdict\": \"true/false/misleading/unverifiable\""));
    }

    #[test]
    fn overrides_replace_only_named_personas() {
        let table = PersonaTable::with_overrides(HashMap::from([(
            Persona::Calendar,
            "List upcoming elections.".to_owned(),
        )]));
        assert_eq!(table.instructions(Persona::Calendar), "List upcoming elections.");
        assert_eq!(table.instructions(Persona::Analyst), ANALYST_PROMPT);
    }

    #[test]
    fn session_binds_persona_instructions_and_model() {
        let table = PersonaTable::standard();
        let model = identity();
        let session = build_session(&table, &model, "abc".to_owned(), Persona::PostAnalyzer);

        assert_eq!(session.session_id, "abc");
        assert_eq!(session.persona, Persona::PostAnalyzer);
        assert_eq!(session.instructions, POST_ANALYZER_PROMPT);
        assert_eq!(session.model, &model);
    }

    #[test]
    fn fresh_ids_are_prefixed_and_unique() {
        let first = fresh_session_id(Persona::FactChecker);
        let second = fresh_session_id(Persona::FactChecker);

        assert!(first.starts_with("factcheck-"));
        assert_eq!(first.len(), "factcheck-".len() + 8);
        assert_ne!(first, second);
        assert!(fresh_session_id(Persona::LeaderUpdates).starts_with("leaders-"));
    }

    #[test]
    fn persona_names_round_trip_through_strings() {
        assert_eq!("fact_checker".parse::<Persona>().unwrap(), Persona::FactChecker);
        assert_eq!(Persona::LeaderUpdates.to_string(), "leader_updates");
    }
}
