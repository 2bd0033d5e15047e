//! Plain-text extraction from uploaded documents and web pages.

use crate::error::ExtractError;
use quick_xml::{events::Event, Reader as XmlReader};
use scraper::{ElementRef, Html};
use std::io::{Cursor, Read};
use tracing::{debug, info};
use zip::ZipArchive;

/// Lowercased text after the last '.', or the whole name when there is none.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(filename)
        .to_lowercase()
}

/// Extract text from an uploaded PDF, DOCX or TXT file.
pub fn extract_document_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let extension = file_extension(filename);
    debug!("Extracting text from '{}' ({} bytes)", filename, bytes.len());

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Failed(e.to_string()))?,
        "docx" => extract_docx_text(bytes)?,
        "txt" => String::from_utf8_lossy(bytes).into_owned(),
        other => return Err(ExtractError::UnsupportedFileType(other.to_string())),
    };

    let text = text.trim().to_string();
    info!(
        "Extracted {} chars from {} upload",
        text.chars().count(),
        extension
    );
    Ok(text)
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Failed(format!("not a DOCX archive: {}", e)))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Failed("missing word/document.xml".to_string()))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Failed(format!("failed to read DOCX XML: {}", e)))?;

    let mut reader = XmlReader::from_str(&xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" if !output.is_empty() => output.push('\n'),
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                b"w:t" => in_text_node = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:p" if !output.is_empty() => output.push('\n'),
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e
                        .unescape()
                        .map_err(|err| ExtractError::Failed(err.to_string()))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_node = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ExtractError::Failed(format!(
                    "failed to parse DOCX XML: {}",
                    err
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}

/// Download `url` and reduce the page to readable text.
pub async fn fetch_page_text(client: &reqwest::Client, url: &str) -> Result<String, ExtractError> {
    info!("Fetching page text from {}", url);

    let html = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let text = html_to_text(&html);
    debug!("Extracted {} chars from {}", text.chars().count(), url);
    Ok(text)
}

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text of the `<main>` element, else every `<p>` joined by newlines, else
/// the whole page. Character references are decoded by the HTML parser.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let root = document.root_element();

    if let Some(main) = elements_named(root, "main").next() {
        let text = element_text(main);
        if !text.is_empty() {
            return text;
        }
    }

    let paragraphs: Vec<String> = elements_named(root, "p")
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs.join("\n");
    }

    element_text(root)
}

fn elements_named<'a>(
    root: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |element| element.value().name() == name)
}

/// Visible text under `element` with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    let mut words = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: Option<&str>) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let (name, body) = match document_xml {
            Some(xml) => ("word/document.xml", xml),
            None => ("word/styles.xml", "<w:styles/>"),
        };
        zip.start_file(name, SimpleFileOptions::default())
            .expect("zip start file");
        zip.write_all(body.as_bytes()).expect("write xml");
        zip.finish().expect("finish zip").into_inner()
    }

    // ==================== Document Tests ====================

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Report.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.docx"), "docx");
        assert_eq!(file_extension("README"), "readme");
    }

    #[test]
    fn test_extract_txt_trims() {
        let text = extract_document_text("notes.txt", b"  hello world \n").unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_extract_txt_tolerates_invalid_utf8() {
        let text = extract_document_text("notes.TXT", b"caf\xff ok").unwrap();
        assert!(text.starts_with("caf"));
        assert!(text.ends_with("ok"));
    }

    #[test]
    fn test_extract_docx_paragraphs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Hello</w:t></w:r></w:p>
    <w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let text = extract_document_text("sample.docx", &build_docx(Some(xml))).unwrap();
        assert_eq!(text, "Hello\nFish & chips");
    }

    #[test]
    fn test_extract_docx_without_document_fails() {
        let err = extract_document_text("broken.docx", &build_docx(None)).unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
        assert!(err.to_string().starts_with("Failed to extract text"));
    }

    #[test]
    fn test_extract_docx_not_a_zip() {
        let err = extract_document_text("fake.docx", b"plain text").unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }

    #[test]
    fn test_extract_invalid_pdf_fails() {
        let err = extract_document_text("scan.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = extract_document_text("image.png", b"\x89PNG").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFileType(ref ext) if ext == "png"));
        assert_eq!(err.to_string(), "Unsupported file type.");
    }

    // ==================== HTML Tests ====================

    #[test]
    fn test_html_prefers_main() {
        let html = "<html><body><nav>Menu</nav><main><h1>Title</h1>\n<p>Body  text</p></main>\
                    <p>Footer</p></body></html>";
        assert_eq!(html_to_text(html), "Title Body text");
    }

    #[test]
    fn test_html_falls_back_to_paragraphs() {
        let html = "<div>skip</div><p>First <b>para</b></p><p class=\"x\">Second</p>";
        assert_eq!(html_to_text(html), "First para\nSecond");
    }

    #[test]
    fn test_html_falls_back_to_whole_page() {
        let html = "<html><body><div>Only   a div</div></body></html>";
        assert_eq!(html_to_text(html), "Only a div");
    }

    #[test]
    fn test_html_drops_scripts_and_styles() {
        let html = "<p>Visible</p><script>var p = '<p>hidden</p>';</script>\
                    <STYLE>p { color: red }</STYLE>";
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn test_html_decodes_entities() {
        let html = "<p>Tom &amp; Jerry &lt;3 &quot;cheese&quot;&nbsp;&#39;n&#39; more</p>";
        assert_eq!(html_to_text(html), "Tom & Jerry <3 \"cheese\" 'n' more");
    }

    #[test]
    fn test_html_decodes_numeric_and_named_entities() {
        let html = "<p>It&#8217;s a test &mdash; caf&eacute; &#x27;q&#x27; &copy;</p>";
        assert_eq!(html_to_text(html), "It\u{2019}s a test \u{2014} caf\u{e9} 'q' \u{a9}");
    }

    #[test]
    fn test_html_keeps_literal_entity_text() {
        let html = "<p>Write &amp;lt; to get &lt;</p>";
        assert_eq!(html_to_text(html), "Write &lt; to get <");
    }

    #[test]
    fn test_html_main_skips_nested_script() {
        let html = "<main><p>Story</p><script>track(\"view\")</script>\
                    <noscript>Enable JS</noscript></main>";
        assert_eq!(html_to_text(html), "Story");
    }

    #[test]
    fn test_html_empty_main_uses_paragraphs() {
        let html = "<main>  </main><p>Fallback</p>";
        assert_eq!(html_to_text(html), "Fallback");
    }

    // ==================== Fetch Tests ====================

    #[tokio::test]
    async fn test_fetch_page_text_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><main><p>News of the day</p></main></html>"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/article", mock_server.uri());
        let text = fetch_page_text(&reqwest::Client::new(), &url)
            .await
            .expect("Should fetch");
        assert_eq!(text, "News of the day");
    }

    #[tokio::test]
    async fn test_fetch_page_text_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        let err = fetch_page_text(&reqwest::Client::new(), &url)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Fetch(_)));
        assert!(err.to_string().starts_with("Failed to extract text:"));
    }

    #[tokio::test]
    async fn test_fetch_page_text_invalid_url() {
        let err = fetch_page_text(&reqwest::Client::new(), "not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Fetch(_)));
    }
}
