//! word2vec text format
//!
//! ```text
//! 3 2
//! cat 1.0 0.0
//! dog 0.9 0.1
//! car 0.0 1.0
//! ```
//!
//! The header (`<count> <dim>`) is optional when `LoadOptions::has_header`
//! is false. Frequency counts come from a separate `token count` file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::LoadOptions;
use crate::error::{Result, VectorError};
use crate::table::{normalize_token, VectorTable};

/// Load a text table (and its optional vocabulary counts) from disk
pub fn load_text(path: &Path, options: &LoadOptions) -> Result<VectorTable> {
    if !path.exists() {
        return Err(VectorError::not_found(path.display().to_string()));
    }

    log::info!("Loading text vectors from: {}", path.display());

    let counts = match &options.vocab_path {
        Some(vocab_path) => {
            let file = File::open(vocab_path)?;
            let counts = read_vocab_counts(BufReader::new(file))?;
            log::info!(
                "Loaded {} vocabulary counts from: {}",
                counts.len(),
                vocab_path.display()
            );
            Some(counts)
        }
        None => None,
    };

    let file = File::open(path)?;
    let table = read_text(
        BufReader::new(file),
        counts.as_ref(),
        options,
        Some(&path.display().to_string()),
    )?;

    log::info!(
        "Loaded {} vectors ({}d, min_count {})",
        table.len(),
        table.dimension(),
        table.metadata().min_count
    );

    Ok(table)
}

/// Parse a text table
///
/// Tokens missing from `counts` (or every token, when `counts` is `None`)
/// get a count of 1. Count keys are matched after the same trimming and
/// case folding as the tokens themselves.
pub fn read_text<R: BufRead>(
    reader: R,
    counts: Option<&HashMap<String, u64>>,
    options: &LoadOptions,
    source: Option<&str>,
) -> Result<VectorTable> {
    let mut builder = VectorTable::builder()
        .min_count(options.min_count)
        .lowercase(options.lowercase);
    if let Some(source) = source {
        builder = builder.source(source);
    }

    // keyed the way the builder will store tokens
    let counts = counts.map(|c| normalize_counts(c, options.lowercase));

    let mut lines = reader.lines().enumerate();
    let mut declared: Option<(usize, usize)> = None;

    if options.has_header {
        let (number, line) = loop {
            match lines.next() {
                Some((i, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break (i + 1, line);
                    }
                }
                None => return Err(VectorError::parse(1, "missing header line")),
            }
        };
        let (count, dim) = parse_header(number, &line)?;
        builder = builder.dimension(dim);
        declared = Some((count, dim));
    }

    let mut dimension = declared.map(|(_, dim)| dim);

    for (i, line) in lines {
        let number = i + 1;
        let line = line?;
        let mut fields = line.split_whitespace();
        let token = match fields.next() {
            Some(token) => token,
            None => continue,
        };

        let vector = fields
            .map(|f| {
                f.parse::<f32>()
                    .map_err(|_| VectorError::parse(number, format!("invalid number '{}'", f)))
            })
            .collect::<Result<Vec<f32>>>()?;

        let expected = *dimension.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(VectorError::parse(
                number,
                format!(
                    "token '{}' has {} values, expected {}",
                    token,
                    vector.len(),
                    expected
                ),
            ));
        }

        let count = counts
            .as_ref()
            .and_then(|c| c.get(&normalize_token(token, options.lowercase)).copied())
            .unwrap_or(1);
        builder.push(token, count, vector);
    }

    if let Some((count, _)) = declared {
        if builder.pending() != count {
            return Err(VectorError::parse(
                1,
                format!(
                    "header declares {} entries, found {}",
                    count,
                    builder.pending()
                ),
            ));
        }
    }

    builder.build()
}

/// Re-key counts by stored token; counts of keys that fold together add up
fn normalize_counts(counts: &HashMap<String, u64>, lowercase: bool) -> HashMap<String, u64> {
    let mut normalized = HashMap::with_capacity(counts.len());
    for (token, &count) in counts {
        let total: &mut u64 = normalized
            .entry(normalize_token(token, lowercase))
            .or_insert(0);
        *total = total.saturating_add(count);
    }
    normalized
}

fn parse_header(number: usize, line: &str) -> Result<(usize, usize)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(VectorError::parse(
            number,
            format!("expected '<count> <dimension>', got '{}'", line.trim()),
        ));
    }
    let parse = |f: &str| {
        f.parse::<usize>()
            .map_err(|_| VectorError::parse(number, format!("invalid header value '{}'", f)))
    };
    Ok((parse(fields[0])?, parse(fields[1])?))
}

/// Parse a `token count` vocabulary file
pub fn read_vocab_counts<R: BufRead>(reader: R) -> Result<HashMap<String, u64>> {
    let mut counts = HashMap::new();
    for (i, line) in reader.lines().enumerate() {
        let number = i + 1;
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [token, count] => {
                let count = count.parse::<u64>().map_err(|_| {
                    VectorError::parse(number, format!("invalid count '{}'", count))
                })?;
                counts.insert((*token).to_string(), count);
            }
            _ => {
                return Err(VectorError::parse(
                    number,
                    format!("expected '<token> <count>', got '{}'", line.trim()),
                ))
            }
        }
    }
    Ok(counts)
}

/// Write a table in text format, header included
pub fn write_text<W: Write>(table: &VectorTable, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{} {}", table.len(), table.dimension())?;
    for entry in table.entries() {
        if entry.token.chars().any(char::is_whitespace) {
            return Err(VectorError::invalid_table(format!(
                "token '{}' contains whitespace and cannot be written as text",
                entry.token
            )));
        }
        write!(writer, "{}", entry.token)?;
        for value in &entry.vector {
            write!(writer, " {}", value)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a text table to disk
pub fn save_text(table: &VectorTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_text(table, file)?;
    log::info!("Wrote {} vectors to: {}", table.len(), path.display());
    Ok(())
}
