//! Installed skill commands. Skills are listed in the system preamble.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color};
use console::style;

use squid_core::skill::SkillRepository;
use squid_types::skill::NewSkill;

use super::{new_table, print_json, truncate};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum SkillCommand {
    /// List installed skills, newest first.
    List,

    /// Install or update a skill.
    Add {
        /// Stable skill identifier.
        id: String,

        /// Display name.
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Path to the skill's source file.
        #[arg(long, default_value = "")]
        file_path: String,
    },
}

pub async fn handle_skill_command(cmd: SkillCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        SkillCommand::List => {
            let skills = state.skills.list().await?;
            if json {
                return print_json(&skills);
            }
            println!();
            if skills.is_empty() {
                println!("  {} No skills installed.", style("i").blue().bold());
                println!();
                return Ok(());
            }
            let mut table = new_table();
            table.set_header(vec![
                Cell::new("ID").fg(Color::White),
                Cell::new("Name").fg(Color::White),
                Cell::new("Description").fg(Color::White),
                Cell::new("Listed").fg(Color::White),
            ]);
            for skill in &skills {
                table.add_row(vec![
                    Cell::new(&skill.id).fg(Color::DarkGrey),
                    Cell::new(&skill.name).fg(Color::Cyan),
                    Cell::new(truncate(&skill.description, 60)),
                    Cell::new(if skill.marketplace_listed { "yes" } else { "no" }),
                ]);
            }
            println!("{table}");
            println!();
            Ok(())
        }
        SkillCommand::Add {
            id,
            name,
            description,
            file_path,
        } => {
            let skill = state
                .skills
                .add(&NewSkill {
                    id,
                    name,
                    description,
                    file_path,
                })
                .await?;
            if json {
                return print_json(&skill);
            }
            println!();
            println!(
                "  {} Installed skill '{}'",
                style("ok").green(),
                style(&skill.name).cyan()
            );
            println!();
            Ok(())
        }
    }
}
