use std::collections::BTreeSet;
use vg_client::Command;
use vg_core::FilterCriteria;

pub const HELP: &str = "\
commands:
  more                       load the next page of stored logs
  reload                     reload from the first page
  filter key=a,b …           filter results; keys: events, fields,
                             expected, received, statuses, value
                             (quote values with spaces)
  clear                      drop the filter and reload
  export                     download the report CSV (filtered set if a
                             filter is active)
  export valid               download the fully-valid-events CSV
  delete                     delete all stored logs (asks to confirm)
  quit                       exit";

pub enum Parsed {
    Command(Command),
    Help,
    Empty,
}

/// Parse one stdin line into a command. Lines are split shell-style so
/// filter values may be quoted.
pub fn parse(line: &str) -> Result<Parsed, String> {
    let tokens = shell_words::split(line.trim()).map_err(|err| err.to_string())?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(Parsed::Empty);
    };
    let command = match head.as_str() {
        "more" => require_bare(rest, "more", Command::LoadMore)?,
        "reload" => require_bare(rest, "reload", Command::Reload)?,
        "clear" => require_bare(rest, "clear", Command::ClearFilter)?,
        "filter" => Command::Filter(parse_filter(rest)?),
        "export" => match rest {
            [] => Command::ExportReport,
            [kind] if kind == "valid" => Command::ExportValid,
            _ => return Err("usage: export [valid]".to_string()),
        },
        "delete" => match rest {
            [] => Command::DeleteAll { confirmed: false },
            [word] if word == "yes" => Command::DeleteAll { confirmed: true },
            _ => return Err("usage: delete [yes]".to_string()),
        },
        "quit" | "exit" | "q" => Command::Quit,
        "help" | "?" => return Ok(Parsed::Help),
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Parsed::Command(command))
}

fn require_bare(rest: &[String], name: &str, command: Command) -> Result<Command, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("`{name}` takes no arguments"))
    }
}

fn parse_filter(tokens: &[String]) -> Result<FilterCriteria, String> {
    let mut criteria = FilterCriteria::default();
    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            return Err(format!("expected key=value, got `{token}`"));
        };
        match key {
            "event" | "events" => criteria.events = split_set(value),
            "field" | "fields" => criteria.fields = split_set(value),
            "expected" => criteria.expected_types = split_set(value),
            "received" => criteria.received_types = split_set(value),
            "status" | "statuses" => criteria.statuses = split_set(value),
            "value" => criteria.value_contains = Some(value.to_string()),
            other => return Err(format!("unknown filter key `{other}`")),
        }
    }
    Ok(criteria)
}

fn split_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
