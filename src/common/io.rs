//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read JSON lines from `path` into records of type `T`.
///
/// Empty lines are skipped.  Errors carry the 1-based line number.
pub fn read_jsonl<T, P>(path: P) -> Result<Vec<T>, anyhow::Error>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not open {:?} for reading: {}", path.as_ref(), e)
    })?;
    let mut result = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
            anyhow::anyhow!(
                "could not parse line {} of {:?}: {}",
                lineno + 1,
                path.as_ref(),
                e
            )
        })?;
        result.push(record);
    }
    Ok(result)
}

/// Write `records` as JSON lines to `path`.
pub fn write_jsonl<'a, T, I, P>(path: P, records: I) -> Result<usize, anyhow::Error>
where
    T: serde::Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
    P: AsRef<Path>,
{
    let mut writer = open_write_maybe_gz(path.as_ref()).map_err(|e| {
        anyhow::anyhow!("could not open {:?} for writing: {}", path.as_ref(), e)
    })?;
    let mut count = 0;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
