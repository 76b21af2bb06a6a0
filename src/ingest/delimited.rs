// CSV/TSV reading

use super::Grid;

/// Decode file bytes as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs)
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Parse delimited text into a grid. `None` sniffs the delimiter.
pub fn parse(content: &str, delimiter: Option<u8>) -> Result<Grid, String> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Grid::new();
    for result in reader.records() {
        let record = result.map_err(|e| format!("malformed delimited data: {e}"))?;
        grid.push(record.iter().map(str::to_string).collect());
    }

    if grid.is_empty() {
        return Err("file contains no header row".to_string());
    }
    Ok(grid)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Header line must split into more than one field
        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // More columns breaks ties
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_prefers_consistent_delimiter() {
        assert_eq!(sniff_delimiter("A;B;C\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("A\tB\n1\t2,5\n"), b'\t');
        assert_eq!(sniff_delimiter("A,B\n\"X; Y\",2\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_parse_quoted_fields() {
        let grid = parse("ADDRESS,AGE\n\"ZONE 1, GUSA\",19\n", None).unwrap();
        assert_eq!(grid[1], vec!["ZONE 1, GUSA", "19"]);
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(parse("", Some(b',')).is_err());
    }

    #[test]
    fn test_decode_windows_1252_and_bom() {
        // 0xD1 is 'Ñ' in Windows-1252
        let text = decode(vec![b'P', b'A', 0xD1, b'A']);
        assert_eq!(text, "PAÑA");
        assert_eq!(decode("\u{feff}ADDRESS".as_bytes().to_vec()), "ADDRESS");
    }
}
