use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

/// Upper bound on the decompressed `word/document.xml`.
const MAX_DOCUMENT_XML_BYTES: u64 = 32 * 1024 * 1024;

/// Pull the visible text out of a DOCX held in memory.
///
/// DOCX is a zip archive; the body lives in `word/document.xml`. Text runs
/// are `<w:t>` elements, each `<w:p>` is a paragraph (one output line),
/// `<w:tab/>` becomes a tab and `<w:br/>` a line break.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_document_xml(bytes, MAX_DOCUMENT_XML_BYTES)?;
    walk_document_xml(&xml)
}

/// Read `word/document.xml`, refusing anything larger than `limit`.
///
/// The declared size is checked up front; the read is still bounded since
/// the header can understate the real payload.
fn read_document_xml(bytes: &[u8], limit: u64) -> Result<Vec<u8>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("zip: {e}")))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(format!("missing document.xml: {e}")))?;

    let too_large = || ExtractionError::Docx(format!("document.xml exceeds {limit} bytes"));
    if entry.size() > limit {
        return Err(too_large());
    }

    let mut xml = Vec::new();
    entry
        .take(limit + 1)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractionError::Docx(format!("read document.xml: {e}")))?;
    if xml.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(xml)
}

fn walk_document_xml(xml: &[u8]) -> Result<String, ExtractionError> {

    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text_run = false;
    let mut paragraph_open = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = true,
                b"p" => {
                    if paragraph_open || !text.is_empty() {
                        text.push('\n');
                    }
                    paragraph_open = true;
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                // Empty paragraph still occupies a line
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraph_open = false,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text_run => {
                let unescaped = e
                    .unescape()
                    .map_err(|err| ExtractionError::Docx(format!("XML text: {err}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Docx(format!("XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    fn escape(s: &str) -> String {
        s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    }

    /// Minimal DOCX with one paragraph per line.
    pub(crate) fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", escape(p)))
            .collect();
        build_docx_xml(&body)
    }

    pub(crate) fn build_docx_xml(body: &str) -> Vec<u8> {
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn runs_in_one_paragraph_concatenate() {
        let bytes = build_docx_xml(
            "<w:p><w:r><w:t>Net </w:t></w:r><w:r><w:t xml:space=\"preserve\">worth</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "Net worth");
    }

    #[test]
    fn tabs_and_breaks() {
        let bytes = build_docx_xml(
            "<w:p><w:r><w:t>ISA</w:t><w:tab/><w:t>20000</w:t><w:br/><w:t>Next</w:t></w:r></w:p>",
        );
        assert_eq!(extract_docx(&bytes).unwrap(), "ISA\t20000\nNext");
    }

    #[test]
    fn entities_unescaped() {
        let bytes = build_docx(&["Smith & Co <Trustees>"]);
        assert_eq!(extract_docx(&bytes).unwrap(), "Smith & Co <Trustees>");
    }

    #[test]
    fn oversized_document_xml_rejected() {
        let bytes = build_docx(&["Client name: Jane Doe", "Net worth: 2850000"]);
        let err = read_document_xml(&bytes, 64).unwrap_err();
        assert!(err.to_string().contains("document.xml exceeds 64 bytes"));
        assert!(read_document_xml(&bytes, MAX_DOCUMENT_XML_BYTES).is_ok());
    }

    #[test]
    fn missing_document_xml() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let err = extract_docx(&bytes).unwrap_err();
        assert!(err.to_string().contains("document.xml"));
    }
}
