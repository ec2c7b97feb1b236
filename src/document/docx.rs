//! DOCX text extraction from the `word/document.xml` part.

use crate::error::{RecapError, Result};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

/// Main body part inside the OOXML package.
const DOCUMENT_PART: &str = "word/document.xml";

static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:p(?:\s[^>]*?)?(?:/>|>(.*?)</w:p>)").expect("Invalid regex")
});

// Text runs, run-level tabs and breaks inside a paragraph, in document order.
// Tab stops in <w:tabs> carry attributes and are not matched.
static RUN_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*?)?>(.*?)</w:t>|<w:(tab)/>|<w:(?:br|cr)(?:\s[^>]*?)?/>")
        .expect("Invalid regex")
});

/// Paragraph texts, each followed by a newline.
pub(super) fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| RecapError::DocumentParseFailed(format!("cannot open DOCX: {}", e)))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| RecapError::DocumentParseFailed(format!("not a DOCX package: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| RecapError::DocumentParseFailed(format!("missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| RecapError::DocumentParseFailed(format!("cannot read {}: {}", DOCUMENT_PART, e)))?;

    Ok(paragraphs_text(&xml))
}

fn paragraphs_text(xml: &str) -> String {
    let mut out = String::new();

    for paragraph in PARAGRAPH.captures_iter(xml) {
        if let Some(body) = paragraph.get(1) {
            for run in RUN_CONTENT.captures_iter(body.as_str()) {
                match (run.get(1), run.get(2)) {
                    (Some(text), _) => out.push_str(&unescape(text.as_str())),
                    (None, Some(_)) => out.push('\t'),
                    (None, None) => out.push('\n'),
                }
            }
        }
        out.push('\n');
    }

    out
}

/// Resolve the predefined XML entities and numeric character references.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let decoded = tail.find(';').and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(|dec| dec.parse::<u32>()))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_docx(path: &Path, body: &str) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>").unwrap();
        zip.start_file(DOCUMENT_PART, options).unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{}</w:body></w:document>",
            body
        )
        .unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_paragraphs_in_order_with_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        write_docx(
            &path,
            "<w:p><w:pPr><w:pStyle w:val=\"Title\"/></w:pPr><w:r><w:t>Quarterly</w:t></w:r>\
             <w:r><w:t xml:space=\"preserve\"> report</w:t></w:r></w:p>\
             <w:p/>\
             <w:p w:rsidR=\"00AB\"><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>\
             <w:r><w:t>Revenue grew.</w:t><w:tab/><w:t>Costs fell.</w:t><w:br/><w:t>Next line</w:t></w:r></w:p>",
        );

        let text = read_docx(&path).unwrap();
        assert_eq!(text, "Quarterly report\n\nRevenue grew.\tCosts fell.\nNext line\n");
    }

    #[test]
    fn test_entities_are_unescaped() {
        let xml = "<w:p><w:r><w:t>R&amp;D &lt;core&gt; &#233;t&#xE9; &bogus; a&b</w:t></w:r></w:p>";
        assert_eq!(paragraphs_text(xml), "R&D <core> été &bogus; a&b\n");
    }

    #[test]
    fn test_malformed_entities_stay_literal() {
        let xml = "<w:p><w:r><w:t>&#xD800; &#99999999999; &#; &amp</w:t></w:r></w:p>";
        assert_eq!(
            paragraphs_text(xml),
            "&#xD800; &#99999999999; &#; &amp\n"
        );
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain text").unwrap();

        assert!(matches!(
            read_docx(&path),
            Err(RecapError::DocumentParseFailed(_))
        ));
    }

    #[test]
    fn test_zip_without_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        zip.finish().unwrap();

        let err = read_docx(&path).unwrap_err();
        assert!(err.to_string().contains(DOCUMENT_PART));
    }
}
