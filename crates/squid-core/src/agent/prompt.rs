//! System preamble for the agent.
//!
//! The preamble travels outside the turn list. Sections are wrapped in XML
//! tags so the model can tell identity, capabilities, and guidance apart:
//!
//! ```text
//! <identity>You are {name}, a personal AI agent. ...</identity>
//! <capabilities>- skill: description</capabilities>
//! <channels>...</channels>
//! <security>...</security>
//! <memory>...</memory>
//! <instructions>...</instructions>
//! ```

use squid_types::skill::Skill;

/// Surfaces the agent is told it may hear from.
pub const CHANNEL_DESCRIPTIONS: &[(&str, &str)] = &[
    ("chat", "Chat (always on)"),
    ("sms", "SMS via Twilio (send messages, receive commands)"),
    ("x", "X / Twitter (post updates)"),
    ("moltbook", "Moltbook (social network for AI agents)"),
    ("a2a", "A2A (agent-to-agent protocol, talk to other agents)"),
];

pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    pub fn build(agent_name: &str, skills: &[Skill], free_scans: u32) -> String {
        let channel_names: Vec<&str> = CHANNEL_DESCRIPTIONS.iter().map(|(name, _)| *name).collect();

        let mut sections = Vec::with_capacity(6);

        sections.push(format!(
            "<identity>\nYou are {agent_name}, a personal AI agent.\n\
             You have persistent memory: you remember everything across conversations \
             and channels ({}).\n</identity>",
            channel_names.join(", ")
        ));

        sections.push(format!(
            "<capabilities>\n{}\n</capabilities>",
            render_skills(skills)
        ));

        let channel_lines: Vec<String> = CHANNEL_DESCRIPTIONS
            .iter()
            .map(|(_, desc)| format!("- {desc}"))
            .collect();
        sections.push(format!("<channels>\n{}\n</channels>", channel_lines.join("\n")));

        sections.push(format!(
            "<security>\n\
             - You have a trust score from a security scanner\n\
             - If your trust score drops, alert your owner and suggest fixes from the scan report\n\
             - {free_scans} free manual scans are included\n\
             </security>"
        ));

        sections.push(
            "<memory>\n\
             - Everything said to you is saved automatically across all channels\n\
             - Messages from other channels may appear as reference context\n\
             - If someone asks what you talked about, check your memory\n\
             </memory>"
                .to_string(),
        );

        sections.push(
            "<instructions>\n\
             - Be concise unless asked for detail\n\
             - If you don't know something, say so\n\
             - Never make up information about past conversations\n\
             - Keep responses under 500 words unless specifically asked for more\n\
             </instructions>"
                .to_string(),
        );

        sections.join("\n\n")
    }
}

fn render_skills(skills: &[Skill]) -> String {
    if skills.is_empty() {
        return "- No skills installed yet".to_string();
    }
    skills
        .iter()
        .map(|s| format!("- {}: {}", s.name, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn skill(name: &str, description: &str) -> Skill {
        Skill {
            id: name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            file_path: String::new(),
            marketplace_listed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_names_agent_and_channels() {
        let prompt = SystemPromptBuilder::build("Inky", &[], 10);
        assert!(prompt.contains("You are Inky, a personal AI agent."));
        assert!(prompt.contains("(chat, sms, x, moltbook, a2a)"));
        assert!(prompt.contains("- No skills installed yet"));
        assert!(prompt.contains("10 free manual scans"));
    }

    #[test]
    fn test_prompt_lists_skills() {
        let skills = vec![
            skill("summarize", "Condense long text"),
            skill("translate", "Translate between languages"),
        ];
        let prompt = SystemPromptBuilder::build("Inky", &skills, 10);
        assert!(prompt.contains(
            "<capabilities>\n- summarize: Condense long text\n- translate: Translate between languages\n</capabilities>"
        ));
        assert!(!prompt.contains("No skills installed"));
    }
}
