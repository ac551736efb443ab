//! Reading exported PDFs back: page count and document information

use std::path::Path;
use lopdf::{Dictionary, Document, Object};
use crate::error::{Error, Result};

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()
        .map_err(|_| Error::General("No catalog in trailer".to_string()))?;

    let pages_id = catalog.get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("Catalog has no Pages reference".to_string()))?;

    let pages = doc.get_dictionary(pages_id)?;

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) if *n >= 0 => Ok(*n as usize),
        Ok(_) => Err(Error::General("Count is not a non-negative integer".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

/// Document information entries of an exported PDF
#[derive(Debug, Clone, PartialEq)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
    /// Raw creation date, e.g. `D:20261016093000` (if present)
    pub creation_date: Option<String>,
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    doc.get_dictionary(info_id).ok()
}

fn info_string(info: Option<&Dictionary>, key: &[u8]) -> Option<String> {
    let bytes = info?.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Metadata of a document already in memory
pub fn document_metadata(doc: &Document) -> Result<PdfMetadata> {
    let page_count = count_pages_from_catalog(doc)?;
    let info = info_dictionary(doc);

    Ok(PdfMetadata {
        page_count,
        title: info_string(info, b"Title"),
        producer: info_string(info, b"Producer"),
        creation_date: info_string(info, b"CreationDate"),
    })
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let metadata = document_metadata(&doc)?;

    if metadata.page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(metadata)
}

/// Count the number of pages in a PDF file
///
/// This is a quick operation that reads the Count field from the Pages dictionary.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageDimensions;
    use crate::pdf::writer::{DocumentInfo, PdfWriter};

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_document_metadata_in_memory() {
        let mut writer = PdfWriter::new(PageDimensions::a4());
        writer.add_page();
        let info = DocumentInfo {
            title: Some("Masirat Technology Proposal".to_string()),
            producer: Some("proposal-export test".to_string()),
            created: None,
        };
        let doc = writer.finish(&info).unwrap();

        let metadata = document_metadata(&doc).unwrap();
        assert_eq!(metadata.page_count, 2);
        assert_eq!(metadata.title.as_deref(), Some("Masirat Technology Proposal"));
        assert_eq!(metadata.producer.as_deref(), Some("proposal-export test"));
        assert_eq!(metadata.creation_date, None);
    }

    #[test]
    fn test_document_without_info() {
        let doc = PdfWriter::new(PageDimensions::letter())
            .finish(&DocumentInfo::default())
            .unwrap();
        let metadata = document_metadata(&doc).unwrap();
        assert_eq!(metadata.page_count, 1);
        assert_eq!(metadata.title, None);
    }

    // File round trips live in tests/integration.rs
}
