use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::{
    models::Phase,
    setup::ActivityInput,
    timer::{shortcuts::KeyPress, Clock, TickSource},
};

use super::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(ActivityDraft),
    Edit(String, ActivityDraft),
    Delete(String),
    Duration(i64),
    Deadline(DateTime<Utc>),
    Begin,
    Select(String),
    Start,
    Pause,
    Resume,
    Complete,
    Switch(String),
    Key(KeyPress),
    Status,
    Dump,
    Restart,
    Help,
    Quit,
}

/// Name plus optional trailing estimate in minutes, as typed on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    pub name: String,
    pub estimate_minutes: Option<u64>,
}

impl ActivityDraft {
    fn parse(words: &[&str]) -> Result<Self> {
        let (name_words, estimate_minutes) = match words.split_last() {
            Some((last, rest)) if !rest.is_empty() => match last.parse::<u64>() {
                Ok(minutes) => (rest, Some(minutes)),
                Err(_) => (words, None),
            },
            _ => (words, None),
        };
        Ok(Self {
            name: name_words.join(" "),
            estimate_minutes,
        })
    }

    fn to_input(&self) -> ActivityInput {
        ActivityInput {
            name: self.name.clone(),
            description: None,
            estimate_minutes: self.estimate_minutes,
        }
    }
}

pub const HELP: &str = "\
setup:    add <name> [minutes] | edit <id> <name> [minutes] | delete <id>
          duration <minutes> | deadline <rfc3339> | begin
activity: select <id> | start | pause | resume | complete | switch <id>
          key ctrl+space | key ctrl+enter
any:      status | dump | restart | help | quit";

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = words.split_first() else {
            bail!("empty command");
        };

        let one_arg = |what: &str| -> Result<String> {
            args.first()
                .map(|s| s.to_string())
                .ok_or_else(|| anyhow!("{verb} needs {what}"))
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => {
                if args.is_empty() {
                    bail!("add needs a name");
                }
                Command::Add(ActivityDraft::parse(args)?)
            }
            "edit" => {
                let id = one_arg("an activity id")?;
                Command::Edit(id, ActivityDraft::parse(&args[1..])?)
            }
            "delete" => Command::Delete(one_arg("an activity id")?),
            "duration" => {
                let minutes = one_arg("minutes")?;
                Command::Duration(
                    minutes
                        .parse()
                        .with_context(|| format!("invalid minutes '{minutes}'"))?,
                )
            }
            "deadline" => {
                let raw = one_arg("a timestamp")?;
                let deadline = DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("invalid deadline '{raw}'"))?
                    .with_timezone(&Utc);
                Command::Deadline(deadline)
            }
            "begin" => Command::Begin,
            "select" => Command::Select(one_arg("an activity id")?),
            "start" => Command::Start,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "complete" | "done" => Command::Complete,
            "switch" => Command::Switch(one_arg("an activity id")?),
            "key" => {
                let raw = one_arg("a key like ctrl+space")?;
                Command::Key(KeyPress::parse(&raw).ok_or_else(|| anyhow!("unknown key '{raw}'"))?)
            }
            "status" | "s" => Command::Status,
            "dump" => Command::Dump,
            "restart" | "new" => Command::Restart,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{other}' (try 'help')"),
        };
        Ok(command)
    }

    fn allowed_in(&self, phase: Phase) -> bool {
        match self {
            Command::Add(_)
            | Command::Edit(..)
            | Command::Delete(_)
            | Command::Duration(_)
            | Command::Deadline(_)
            | Command::Begin => phase == Phase::Setup,
            Command::Select(_)
            | Command::Start
            | Command::Pause
            | Command::Resume
            | Command::Complete
            | Command::Switch(_)
            | Command::Key(_) => phase == Phase::Activity,
            Command::Status | Command::Dump | Command::Restart | Command::Help | Command::Quit => {
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Quit,
}

pub fn execute<C, T>(app: &mut App<C, T>, command: Command) -> Result<Outcome>
where
    C: Clock + Clone + 'static,
    T: TickSource + Clone + 'static,
{
    if !command.allowed_in(app.phase()) {
        bail!("not available during the {} phase", app.phase().as_str());
    }

    let output = match command {
        Command::Add(draft) => {
            let id = app.add_activity(&draft.to_input())?;
            format!("Activity added ({id})")
        }
        Command::Edit(id, draft) => {
            app.edit_activity(&id, &draft.to_input())?;
            "Activity updated".to_string()
        }
        Command::Delete(id) => {
            app.delete_activity(&id)?;
            "Activity deleted".to_string()
        }
        Command::Duration(minutes) => {
            app.set_duration_minutes(minutes)?;
            app.render()
        }
        Command::Deadline(deadline) => {
            app.set_deadline(deadline);
            app.render()
        }
        Command::Begin => {
            app.begin()?;
            app.render()
        }
        Command::Select(id) => {
            app.select(&id);
            app.render()
        }
        Command::Start => {
            app.start();
            app.render()
        }
        Command::Pause => {
            app.pause();
            app.render()
        }
        Command::Resume => {
            app.resume();
            app.render()
        }
        Command::Complete => {
            app.complete();
            app.render()
        }
        Command::Switch(id) => {
            app.switch_to(&id);
            app.render()
        }
        Command::Key(press) => match app.key(press) {
            Some(action) => format!("{action:?}\n{}", app.render()),
            None => "Shortcut does nothing right now".to_string(),
        },
        Command::Status => app.render(),
        Command::Dump => serde_json::to_string_pretty(app.session())?,
        Command::Restart => {
            app.restart();
            app.render()
        }
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Outcome::Quit),
    };
    Ok(Outcome::Output(output))
}
