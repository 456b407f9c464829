// Plain-text extraction from uploaded documents (.txt/.md, .pdf, .docx).
// Anything with another extension is read as text.
use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx"];

const DOCX_BODY: &str = "word/document.xml";

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    match extension(path).as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| ExtractError::Pdf(e.to_string())),
        "docx" => read_docx(path),
        _ => read_text_file(path),
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExtractError + '_ {
    move |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_text_file(path: &Path) -> Result<String, ExtractError> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(io_error(path))?;
    Ok(decode_text(bytes))
}

/// UTF-8 when valid, otherwise lossy with replacement characters.
pub fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn read_docx(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| ExtractError::Docx(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(io_error(path))?;
    docx_paragraphs(&xml)
}

/// Text of every non-empty `<w:p>` paragraph, one per line.
pub fn docx_paragraphs(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" if !current.is_empty() => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:tab" => current.push('\t'),
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "malformed XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::TempDir;

    const DOC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph</w:t></w:r><w:r><w:t xml:space="preserve"> continues.</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t>Fish &amp; chips</w:t><w:tab/><w:t>here.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_docx_paragraphs() -> Result<()> {
        let text = docx_paragraphs(DOC_XML)?;
        assert_eq!(text, "First paragraph continues.\nFish & chips\there.");
        Ok(())
    }

    #[test]
    fn test_read_docx_archive() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("report.DOCX");
        let mut zip = zip::ZipWriter::new(File::create(&path)?);
        zip.start_file(DOCX_BODY, zip::write::FileOptions::default())?;
        zip.write_all(DOC_XML.as_bytes())?;
        zip.finish()?;

        let text = extract_text(&path)?;
        assert!(text.starts_with("First paragraph continues."));
        Ok(())
    }

    #[test]
    fn test_docx_without_body() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("empty.docx");
        let mut zip = zip::ZipWriter::new(File::create(&path)?);
        zip.start_file("other.xml", zip::write::FileOptions::default())?;
        zip.finish()?;

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
        Ok(())
    }

    #[test]
    fn test_read_txt() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("notes.txt");
        let mut file = File::create(&path)?;
        writeln!(file, "Hello, World!")?;

        assert_eq!(extract_text(&path)?, "Hello, World!\n");
        Ok(())
    }

    #[test]
    fn test_unknown_extension_read_as_text() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("notes.log");
        std::fs::write(&path, "plain log line")?;

        assert_eq!(extract_text(&path)?, "plain log line");
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let text = decode_text(vec![b'a', 0xff, b'b']);
        assert_eq!(text, "a\u{fffd}b");
    }

    #[test]
    fn test_missing_file() {
        let err = extract_text(Path::new("/nonexistent/input.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a/b.PDF")));
        assert!(is_supported(Path::new("notes.md")));
        assert!(!is_supported(Path::new("image.png")));
        assert!(!is_supported(Path::new("Makefile")));
    }
}
