// ── CSV and printable HTML export ──
//
// Both formats carry the same projected fields: one row per bird, with
// images and locations folded into single `|`-joined cells.

use std::borrow::Cow;

use crate::model::{BirdRecord, LocationEntry};

const BOM: char = '\u{feff}';
const FIELD_SEPARATOR: char = ',';
const RECORD_SEPARATOR: char = '\n';
const MULTI_VALUE_SEPARATOR: &str = "|";
/// Images and Locations.
const MULTI_VALUED_COLUMNS: [usize; 2] = [7, 9];

pub const CSV_HEADER: [&str; 10] = [
    "ID",
    "Local Name",
    "Arabic Name",
    "English Name",
    "Scientific Name",
    "Description",
    "Notes",
    "Images",
    "Audio",
    "Locations",
];

/// Quote a CSV field if it contains a delimiter, quote, or line break.
pub fn escape_csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([FIELD_SEPARATOR, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// One item of a multi-valued cell. A literal `|` inside an item would
/// split it on re-parse, so it becomes `/`.
fn multi_value_item(value: &str) -> String {
    value.replace(MULTI_VALUE_SEPARATOR, "/")
}

fn location_summary(location: &LocationEntry) -> String {
    let label = [location.place_name.trim(), location.region.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" / ");
    let label = if label.is_empty() {
        "unnamed site".to_owned()
    } else {
        label
    };

    let summary = if location.has_coordinate() {
        format!("{label} ({}, {})", location.latitude, location.longitude)
    } else {
        label
    };
    multi_value_item(&summary)
}

/// The exported cells for one bird, in [`CSV_HEADER`] order.
pub fn export_fields(bird: &BirdRecord) -> [String; 10] {
    [
        bird.id.to_string(),
        bird.local_name.clone(),
        bird.arabic_name.clone(),
        bird.english_name.clone(),
        bird.scientific_name.clone(),
        bird.description.clone(),
        bird.notes.clone(),
        bird.images
            .iter()
            .map(|p| multi_value_item(p))
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        bird.audio.clone().unwrap_or_default(),
        bird.locations
            .iter()
            .map(location_summary)
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
    ]
}

fn push_csv_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (idx, field) in fields.into_iter().enumerate() {
        if idx > 0 {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(&escape_csv_field(field));
    }
    out.push(RECORD_SEPARATOR);
}

/// Serialize records as UTF-8 CSV with a byte-order mark and header row.
pub fn export_csv(records: &[BirdRecord]) -> String {
    let mut out = String::new();
    out.push(BOM);
    push_csv_record(&mut out, CSV_HEADER);
    for bird in records {
        let fields = export_fields(bird);
        push_csv_record(&mut out, fields.iter().map(String::as_str));
    }
    out
}

const PRINT_STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:1.5rem;color:#111}\
h1{font-size:1.3rem;margin:0 0 .25rem}\
p.meta{color:#555;margin:0 0 1rem;font-size:.85rem}\
table{border-collapse:collapse;width:100%;font-size:.8rem}\
th,td{border:1px solid #999;padding:.3rem .4rem;vertical-align:top;text-align:left}\
th{background:#eee}\
td{white-space:pre-wrap}\
tr{page-break-inside:avoid}\
@media print{body{margin:0}}";

/// Render a standalone printable HTML document with one table row per bird.
pub fn export_html(records: &[BirdRecord], title: &str) -> String {
    let title = escape_html(title);
    let mut out = String::with_capacity(1024 + records.len() * 256);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{title}</title>\n"));
    out.push_str(&format!("<style>{PRINT_STYLE}</style>\n</head>\n<body>\n"));
    out.push_str(&format!("<h1>{title}</h1>\n"));
    out.push_str(&format!(
        "<p class=\"meta\">{} bird record(s)</p>\n",
        records.len()
    ));

    out.push_str("<table>\n<thead><tr>");
    for heading in CSV_HEADER {
        out.push_str(&format!("<th>{}</th>", escape_html(heading)));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for bird in records {
        out.push_str("<tr>");
        for (idx, cell) in export_fields(bird).into_iter().enumerate() {
            let cell = if MULTI_VALUED_COLUMNS.contains(&idx) {
                cell.replace(MULTI_VALUE_SEPARATOR, "\n")
            } else {
                cell
            };
            out.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Minimal RFC 4180 reader for checking what the writer produces.
    fn parse_csv(input: &str) -> Vec<Vec<String>> {
        let mut records = Vec::new();
        let mut record = Vec::new();
        let mut field = String::new();
        let mut chars = input.chars().peekable();
        let mut quoted = false;

        while let Some(ch) = chars.next() {
            match (quoted, ch) {
                (true, '"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                (true, '"') => quoted = false,
                (true, c) => field.push(c),
                (false, '"') => quoted = true,
                (false, ',') => record.push(std::mem::take(&mut field)),
                (false, '\n') => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                (false, c) => field.push(c),
            }
        }
        records
    }

    fn hoopoe() -> BirdRecord {
        let mut bird = BirdRecord::new(1);
        bird.local_name = "Hudhud".into();
        bird.english_name = "Eurasian Hoopoe".into();
        bird.images = vec!["birds/a.jpg".into(), "birds/b.jpg".into()];
        let mut muscat = LocationEntry::new(23.6, 58.5);
        muscat.place_name = "Muscat".into();
        bird.locations = vec![muscat, LocationEntry::default()];
        bird
    }

    #[test]
    fn quotes_and_doubles_embedded_quotes() {
        assert_eq!(escape_csv_field("a,b\"c"), "\"a,b\"\"c\"");
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv_field("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn naive_parser_recovers_tricky_field() {
        let mut bird = BirdRecord::new(7);
        bird.notes = "a,b\"c".into();
        bird.description = "seen at dusk\nnear the wadi".into();

        let csv = export_csv(&[bird]);
        let parsed = parse_csv(csv.trim_start_matches(BOM));

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1][6], "a,b\"c");
        assert_eq!(parsed[1][5], "seen at dusk\nnear the wadi");
    }

    #[test]
    fn document_has_bom_and_header() {
        let csv = export_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(
            csv.trim_start_matches(BOM),
            "ID,Local Name,Arabic Name,English Name,Scientific Name,Description,Notes,Images,Audio,Locations\n"
        );
    }

    #[test]
    fn multi_valued_fields_join_with_pipe() {
        let csv = export_csv(&[hoopoe()]);
        let parsed = parse_csv(csv.trim_start_matches(BOM));
        let row = &parsed[1];

        assert_eq!(row[0], "1");
        assert_eq!(row[7], "birds/a.jpg|birds/b.jpg");
        assert_eq!(row[9], "Muscat (23.6, 58.5)|unnamed site");
    }

    #[test]
    fn pipe_inside_an_item_is_replaced() {
        let mut bird = BirdRecord::new(2);
        bird.images = vec!["odd|name.jpg".into()];
        assert_eq!(export_fields(&bird)[7], "odd/name.jpg");
    }

    #[test]
    fn html_is_escaped_and_complete() {
        let mut bird = hoopoe();
        bird.notes = "<script>alert('x')</script> & more".into();
        let html = export_html(&[bird], "Field log <draft>");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Field log &lt;draft&gt;</title>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<th>Scientific Name</th>"));
        assert!(html.contains("birds/a.jpg\nbirds/b.jpg"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
