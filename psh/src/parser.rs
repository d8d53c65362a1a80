use crate::process::{ExecMode, Job, Process};
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use psh_types::{PshError, PshResult};
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[grammar = "psh.pest"]
pub struct PshParser;

const DELIMS: &[char] = &[' ', '\t', '\r', '\n', '\x07'];

/// Parses one input line into a job.
///
/// Returns `Ok(None)` for a line holding nothing but separators. A `<` or `>`
/// that is not followed by a path is a syntax error.
pub fn parse_line(line: &str) -> PshResult<Option<Job>> {
    if line.trim_matches(DELIMS).is_empty() {
        return Ok(None);
    }
    let (body, mode) = split_background(line);

    let pairs = PshParser::parse(Rule::line, body).map_err(|e| PshError::Parse(e.to_string()))?;
    let mut processes = Vec::new();
    for pair in pairs.flatten().filter(|p| p.as_rule() == Rule::segment) {
        // empty text between two `|` is skipped, like strtok would
        if pair.as_str().is_empty() {
            continue;
        }
        processes.push(parse_segment(pair)?);
    }

    if processes.is_empty() {
        return Ok(None);
    }
    debug!(
        "parsed '{}' mode: {:?} stages: {}",
        line,
        mode,
        processes.len()
    );
    Ok(Some(Job::new(line.to_string(), mode, processes)))
}

/// Strips a trailing `&` and the spaces before it.
fn split_background(line: &str) -> (&str, ExecMode) {
    let trimmed = line.trim_end_matches(DELIMS);
    match trimmed.strip_suffix('&') {
        Some(rest) => (rest.trim_end_matches(DELIMS), ExecMode::Background),
        None => (line, ExecMode::Foreground),
    }
}

fn parse_segment(pair: Pair<Rule>) -> PshResult<Process> {
    let cmd = pair.as_str().trim_start_matches(' ').to_string();
    let mut argv = Vec::new();
    let mut infile = None;
    let mut outfile = None;

    let mut words = pair.into_inner().map(|w| w.as_str());
    while let Some(word) = words.next() {
        match word {
            "<" => infile = Some(redirect_path(word, words.next())?),
            ">" => outfile = Some(redirect_path(word, words.next())?),
            _ => argv.push(word.to_string()),
        }
    }
    Ok(Process::new(cmd, argv, infile, outfile))
}

fn redirect_path(op: &str, path: Option<&str>) -> PshResult<String> {
    path.map(str::to_string)
        .ok_or_else(|| PshError::Parse(format!("expected a path after `{op}`")))
}
