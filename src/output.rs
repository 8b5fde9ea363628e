//! Terminal rendering for one-shot and interactive chat modes.

use owo_colors::OwoColorize;

/// Pieces of a reply: plan narrative interleaved with fenced SQL blocks.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Narrative(&'a str),
    Sql(&'a str),
}

/// Split a reply on ```sql fences.
///
/// Unterminated fences swallow the rest of the reply as SQL, which matches
/// how truncated completions usually look.
fn split_segments(reply: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = reply;

    while let Some(open) = rest.find("```sql") {
        let narrative = &rest[..open];
        if !narrative.trim().is_empty() {
            segments.push(Segment::Narrative(narrative.trim()));
        }
        let after_open = &rest[open + "```sql".len()..];
        match after_open.find("```") {
            Some(close) => {
                segments.push(Segment::Sql(after_open[..close].trim()));
                rest = &after_open[close + 3..];
            }
            None => {
                segments.push(Segment::Sql(after_open.trim()));
                rest = "";
            }
        }
    }

    if !rest.trim().is_empty() {
        segments.push(Segment::Narrative(rest.trim()));
    }

    segments
}

/// Print one question/reply exchange with the SQL highlighted.
pub fn render_exchange(question: &str, reply: &str) {
    println!("{} {}", ">".green().bold(), question.bold());
    for segment in split_segments(reply) {
        match segment {
            Segment::Narrative(text) => println!("{}", text.dimmed()),
            Segment::Sql(sql) => {
                println!();
                for line in sql.lines() {
                    println!("  {}", line.cyan());
                }
                println!();
            }
        }
    }
}

/// Print what the transcriber heard before the reply arrives.
pub fn render_transcript(transcript: &str) {
    eprintln!("{} {}", "heard:".dimmed(), transcript);
}
