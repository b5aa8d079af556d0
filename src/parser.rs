//! Word sheet parsing.
//!
//! The sheet is a comma-separated export whose header row names the parts.
//! Header columns are read in pairs: column `2k` carries the part name and
//! holds the source-language term, column `2k + 1` holds its translation.
//! Malformed content never fails the parse, it only drops the affected
//! fields or rows.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{ColumnMapping, Part, Side, Word};

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Splits one line into trimmed fields, honoring quoted fields.
///
/// A doubled quote inside a quoted field is a literal `"`. An unterminated
/// quote simply runs to the end of the line.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quote {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    current.push(QUOTE);
                    chars.next();
                } else {
                    in_quote = false;
                }
            } else {
                current.push(c);
            }
        } else if c == QUOTE {
            in_quote = true;
        } else if c == DELIMITER {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Builds the column mapping from a tokenized header row.
///
/// Returns the flat mapping (source entry followed by target entry for each
/// accepted pair) and the parts in first-seen order, all still empty.
pub fn map_header(headers: &[String]) -> (Vec<ColumnMapping>, Vec<Part>) {
    let mut mapping = Vec::new();
    let mut parts: Vec<Part> = Vec::new();

    for i in (0..headers.len()).step_by(2) {
        if i + 1 >= headers.len() {
            break;
        }

        let part_name = headers[i].trim();
        if part_name.is_empty() {
            debug!(column = i, "skipping header pair without a part name");
            continue;
        }

        if !parts.iter().any(|p| p.name == part_name) {
            parts.push(Part::new(part_name));
        }

        mapping.push(ColumnMapping {
            index: i,
            part_name: part_name.to_string(),
            side: Side::Source,
        });
        mapping.push(ColumnMapping {
            index: i + 1,
            part_name: part_name.to_string(),
            side: Side::Target,
        });
    }

    (mapping, parts)
}

/// Extracts the words of one data row into `parts`.
///
/// `row_index` is the 1-based position of the row after the header in the
/// blank-filtered line sequence.
pub fn process_row(
    row: &[String],
    row_index: usize,
    mapping: &[ColumnMapping],
    parts: &mut [Part],
    part_slots: &HashMap<String, usize>,
) {
    for (pair_index, pair) in mapping.chunks_exact(2).enumerate() {
        let (source_col, target_col) = (&pair[0], &pair[1]);
        if source_col.side != Side::Source
            || target_col.side != Side::Target
            || source_col.part_name != target_col.part_name
        {
            continue;
        }

        let source_text = cell(row, source_col.index);
        let target_text = cell(row, target_col.index);
        if source_text.is_empty() || target_text.is_empty() {
            continue;
        }

        let Some(&slot) = part_slots.get(&source_col.part_name) else {
            continue;
        };

        // Identifiers use the flat mapping position so saved hard-word sets
        // from earlier exports keep resolving.
        let id = format!("{}-{}-{}", source_col.part_name, row_index, pair_index * 2);
        parts[slot].words.push(Word {
            id,
            source_text: source_text.to_string(),
            target_text: target_text.to_string(),
            part_name: source_col.part_name.clone(),
        });
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

/// Parses a whole sheet into its parts.
///
/// Blank lines are dropped before indexing. A document with fewer than two
/// remaining lines yields no parts.
pub fn parse_words(text: &str) -> Vec<Part> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        debug!(lines = lines.len(), "sheet has no data rows");
        return Vec::new();
    }

    let headers = tokenize_line(lines[0]);
    let (mapping, mut parts) = map_header(&headers);
    let part_slots: HashMap<String, usize> = parts
        .iter()
        .enumerate()
        .map(|(slot, part)| (part.name.clone(), slot))
        .collect();

    for (row_index, line) in lines.iter().enumerate().skip(1) {
        let row = tokenize_line(line);
        process_row(&row, row_index, &mapping, &mut parts, &part_slots);
    }

    debug!(
        parts = parts.len(),
        words = parts.iter().map(|p| p.words.len()).sum::<usize>(),
        "parsed word sheet"
    );

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenize_plain_line() {
        assert_eq!(tokenize_line(" a , b,c "), strings(&["a", "b", "c"]));
    }

    #[test]
    fn tokenize_quoted_delimiter() {
        assert_eq!(tokenize_line(r#"a,"b,c",d"#), strings(&["a", "b,c", "d"]));
    }

    #[test]
    fn tokenize_quote_mid_field_toggles_quoting() {
        assert_eq!(tokenize_line(r#"ab"c,d"e,f"#), strings(&["abc,de", "f"]));
    }

    #[test]
    fn tokenize_doubled_quote() {
        assert_eq!(
            tokenize_line(r#""say ""hi""",x"#),
            strings(&[r#"say "hi""#, "x"])
        );
    }

    #[test]
    fn tokenize_empty_line_yields_one_field() {
        assert_eq!(tokenize_line(""), strings(&[""]));
    }

    #[test]
    fn tokenize_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize_line(r#"a,"b,c"#), strings(&["a", "b,c"]));
    }

    #[test]
    fn tokenize_trailing_delimiter_emits_empty_field() {
        assert_eq!(tokenize_line("a,b,"), strings(&["a", "b", ""]));
    }

    #[test]
    fn header_ignores_trailing_odd_column() {
        let (mapping, parts) = map_header(&strings(&["P1", "P1", "P2"]));
        assert_eq!(mapping.len(), 2);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "P1");
    }

    #[test]
    fn header_skips_unnamed_pair_and_keeps_scanning() {
        let (mapping, parts) = map_header(&strings(&["", "", "PART2", "PART2"]));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name, "PART2");
        assert_eq!(mapping[0].index, 2);
        assert_eq!(mapping[0].side, Side::Source);
        assert_eq!(mapping[1].index, 3);
        assert_eq!(mapping[1].side, Side::Target);
    }

    #[test]
    fn header_merges_repeated_part_names() {
        let (mapping, parts) = map_header(&strings(&["A", "A", "B", "B", "A", "A"]));
        assert_eq!(mapping.len(), 6);
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn parse_two_parts() {
        let parts = parse_words("PART1,PART1,PART2,PART2\ncat,kedi,dog,kopek\n");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "PART1");
        assert_eq!(parts[0].words.len(), 1);
        assert_eq!(parts[0].words[0].source_text, "cat");
        assert_eq!(parts[0].words[0].target_text, "kedi");
        assert_eq!(parts[0].words[0].id, "PART1-1-0");
        assert_eq!(parts[1].words[0].source_text, "dog");
        assert_eq!(parts[1].words[0].target_text, "kopek");
        assert_eq!(parts[1].words[0].id, "PART2-1-2");
        assert_eq!(parts[1].words[0].part_name, "PART2");
    }

    #[test]
    fn parse_skips_blank_half_of_pair() {
        let parts = parse_words("PART1,PART1,PART2,PART2\ncat,,dog,kopek");
        assert!(parts[0].words.is_empty());
        assert_eq!(parts[1].words.len(), 1);
    }

    #[test]
    fn parse_keeps_empty_parts() {
        let parts = parse_words("PART1,PART1,PART2,PART2\n,,dog,kopek");
        assert_eq!(parts.len(), 2);
        assert!(parts[0].words.is_empty());
    }

    #[test]
    fn parse_tolerates_short_rows() {
        let parts = parse_words("PART1,PART1,PART2,PART2\ncat,kedi");
        assert_eq!(parts[0].words.len(), 1);
        assert!(parts[1].words.is_empty());
    }

    #[test]
    fn row_indices_follow_filtered_lines() {
        let parts = parse_words("P,P\r\n\r\n   \r\none,bir\r\n\r\ntwo,iki\r\n");
        let ids: Vec<_> = parts[0].words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["P-1-0", "P-2-0"]);
    }

    #[test]
    fn merged_parts_keep_row_then_pair_order() {
        let parts = parse_words("A,A,B,B,A,A\n1,bir,x,y,2,iki\n3,uc,,,4,dort");
        let a: Vec<_> = parts[0].words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(a, ["A-1-0", "A-1-4", "A-2-0", "A-2-4"]);
        assert_eq!(parts[1].words.len(), 1);
    }

    #[test]
    fn mismatched_mapping_pair_yields_nothing() {
        let mut parts = vec![Part::new("A")];
        let slots = HashMap::from([("A".to_string(), 0)]);
        let mapping = [
            ColumnMapping { index: 0, part_name: "A".into(), side: Side::Target },
            ColumnMapping { index: 1, part_name: "A".into(), side: Side::Source },
        ];
        process_row(&strings(&["one", "bir"]), 1, &mapping, &mut parts, &slots);
        assert!(parts[0].words.is_empty());

        let mapping = [
            ColumnMapping { index: 0, part_name: "A".into(), side: Side::Source },
            ColumnMapping { index: 1, part_name: "A".into(), side: Side::Target },
        ];
        process_row(&strings(&["one", "bir"]), 1, &mapping, &mut parts, &slots);
        assert_eq!(parts[0].words[0].id, "A-1-0");
    }

    #[test]
    fn too_few_lines_is_empty() {
        assert!(parse_words("").is_empty());
        assert!(parse_words("PART1,PART1\n\n  \n").is_empty());
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let parts = parse_words("P,P\n\"to look, to see\",\"bakmak, görmek\"");
        assert_eq!(parts[0].words[0].source_text, "to look, to see");
        assert_eq!(parts[0].words[0].target_text, "bakmak, görmek");
    }
}
