//! Output rendering for the CLI commands.

use babel_search_core::{Candidate, DecodedPage, EngineResult, SearchResponse};

/// Preview length for page text in table output.
const PREVIEW_CHARS: usize = 160;

fn preview(text: &str, limit: usize) -> &str {
    let end = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

fn to_json<T: serde::Serialize>(value: &T) -> EngineResult<String> {
    serde_json::to_string_pretty(value).map_err(babel_search_core::EngineError::from)
}

pub fn print_search(response: &SearchResponse, json: bool) -> EngineResult<()> {
    if json {
        println!("{}", to_json(response)?);
        return Ok(());
    }

    println!(
        "query: {:?}  matches: {}  returned: {}  elapsed: {}ms{}{}",
        response.query,
        response.total_found,
        response.results.len(),
        response.elapsed_ms,
        if response.from_cache { "  (cached)" } else { "" },
        if response.partial { "  (partial)" } else { "" },
    );

    for (rank, page) in response.results.iter().enumerate() {
        println!(
            "\n#{:<3} {:.2}  [{:?}]  {}",
            rank + 1,
            page.coherence.overall_score,
            page.coherence.confidence_level,
            page.address,
        );
        println!("     {}", page.snippet());
    }
    Ok(())
}

pub fn print_page(address: &str, page: &str, full: bool, json: bool) -> EngineResult<()> {
    if json {
        let value = serde_json::json!({
            "address": address,
            "length": page.chars().count(),
            "text": page,
        });
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    if full {
        println!("{page}");
    } else {
        println!("address: {address}");
        println!("{}…", preview(page, PREVIEW_CHARS));
    }
    Ok(())
}

pub fn print_candidates(candidates: &[Candidate], json: bool) -> EngineResult<()> {
    if json {
        println!("{}", to_json(&candidates)?);
        return Ok(());
    }

    println!("{:<6} {:<8} {:<10} source n-grams", "rank", "score", "variant");
    for (rank, candidate) in candidates.iter().enumerate() {
        let ngrams: Vec<&str> = candidate.ngrams.iter().map(String::as_str).collect();
        println!(
            "{:<6} {:<8.3} {:<10} {}",
            rank + 1,
            candidate.score,
            candidate.depth,
            ngrams.join(", "),
        );
        println!("       {}", candidate.address);
    }
    Ok(())
}

pub fn print_decoded(page: &DecodedPage, json: bool) -> EngineResult<()> {
    if json {
        println!("{}", to_json(page)?);
        return Ok(());
    }

    println!("address:    {}", page.address);
    println!("query:      {}", page.query.as_deref().unwrap_or("-"));
    println!("confidence: {:?}", page.coherence.confidence_level);
    println!(
        "scores:     overall {:.2} | language {:.2} | structure {:.2} | ngram {:.2} | exact {:.2}",
        page.coherence.overall_score,
        page.coherence.language_score,
        page.coherence.structure_score,
        page.coherence.ngram_score,
        page.coherence.exact_match_score,
    );
    println!("snippet:    {}", page.snippet());
    Ok(())
}
