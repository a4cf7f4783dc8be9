use std::io::{self, Write};

use crate::agent::PipelineResult;

const RULE_WIDTH: usize = 50;

pub fn render_result<W: Write>(out: &mut W, result: &PipelineResult, verbose: bool) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Query: {}", result.query)?;
    writeln!(out, "{}", rule)?;

    if verbose {
        writeln!(out)?;
        writeln!(out, "Top Search Results:")?;
        for (i, res) in result.search_results.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, res.link.as_deref().unwrap_or("N/A"))?;
        }
        if !result.sources.is_empty() {
            writeln!(out)?;
            writeln!(out, "Pages read: {}", result.sources.len())?;
            for source in &result.sources {
                writeln!(out, "  - {}", source)?;
            }
        }
    }

    if let Some(error) = &result.search_error {
        writeln!(out)?;
        writeln!(out, "Search error: {}", error)?;
    }

    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "{}", result.summary)?;
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    out.flush()
}
