//! Integration tests for pdf-core
//!
//! These tests verify end-to-end functionality with real PDF operations.

use lopdf::{dictionary, Document, Object, StringFormat};
use pdf_core::{PdfDocument, PdfError};
use std::io::Cursor;

/// Create a minimal valid PDF with multiple pages for testing
///
/// Page `n` (1-indexed) carries one text widget named `field_n`.
fn create_test_pdf_with_pages(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for n in 1..=page_count {
        let contents_id = doc.add_object(lopdf::Stream::new(dictionary! {}, vec![]));
        let widget_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::String(format!("field_{n}").into_bytes(), StringFormat::Literal),
            "Rect" => vec![100.into(), 100.into(), 300.into(), 120.into()],
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {},
            "Contents" => contents_id,
            "Annots" => vec![widget_id.into()],
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn create_test_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 4, image::Rgba([0, 0, 128, 200]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn page_text(bytes: &[u8], page: u32) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

#[test]
fn test_open_from_bytes_and_page_count() {
    let pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(3)).unwrap();
    assert_eq!(pdf.page_count(), 3);
}

#[test]
fn test_open_invalid_bytes() {
    let result = PdfDocument::open_from_bytes(b"not a pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_open_missing_file() {
    let result = PdfDocument::open("/nonexistent/template.pdf");
    assert!(matches!(result, Err(PdfError::OpenError(_))));
}

#[test]
fn test_widgets_per_page() {
    let pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(2)).unwrap();

    let first = pdf.widgets(1).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name.as_deref(), Some("field_1"));
    assert_eq!(first[0].rect, Some([100.0, 100.0, 300.0, 120.0]));

    let second = pdf.widgets(2).unwrap();
    assert_eq!(second[0].name.as_deref(), Some("field_2"));

    assert!(matches!(pdf.widgets(3), Err(PdfError::InvalidPage(3, 2))));
}

#[test]
fn test_insert_text_roundtrip() {
    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(2)).unwrap();
    pdf.insert_text("XQ.1234", 2, 108.0, 102.0, 12.0).unwrap();
    let bytes = pdf.to_bytes().unwrap();

    assert!(!page_text(&bytes, 1).contains("Tj"));
    let content = page_text(&bytes, 2);
    assert!(content.contains("108 102 Td"));
    assert!(content.contains("<58512E31323334> Tj"));

    let reloaded = Document::load_mem(&bytes).unwrap();
    let page_id = *reloaded.get_pages().get(&2).unwrap();
    let fonts = reloaded
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Font")
        .unwrap()
        .as_dict()
        .unwrap();
    let font_id = fonts.get(b"F1").unwrap().as_reference().unwrap();
    let font = reloaded.get_dictionary(font_id).unwrap();
    assert_eq!(font.get(b"BaseFont").unwrap().as_name_str().unwrap(), "Courier");
}

#[test]
fn test_insert_empty_text_is_noop() {
    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(1)).unwrap();
    pdf.insert_text("", 1, 10.0, 10.0, 12.0).unwrap();
    let bytes = pdf.to_bytes().unwrap();
    assert!(!page_text(&bytes, 1).contains("BT"));
}

#[test]
fn test_insert_png_image() {
    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(1)).unwrap();
    let png = create_test_png();
    pdf.insert_image(&png, 1, 50.0, 60.0, 120.0, 30.0).unwrap();
    pdf.insert_image(&png, 1, 50.0, 160.0, 120.0, 30.0).unwrap();
    let bytes = pdf.to_bytes().unwrap();

    let content = page_text(&bytes, 1);
    assert!(content.contains("120 0 0 30 50 60 cm"));
    assert!(content.contains("120 0 0 30 50 160 cm"));
    assert_eq!(content.matches("/Im1 Do").count(), 2);

    let reloaded = Document::load_mem(&bytes).unwrap();
    let images: Vec<_> = reloaded
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name_str())
                .map(|s| s == "Image")
                .unwrap_or(false)
        })
        .collect();
    // One image plus its soft mask, deduplicated across both insertions
    assert_eq!(images.len(), 2);
}

#[test]
fn test_insert_invalid_image() {
    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(1)).unwrap();
    let result = pdf.insert_image(b"definitely not an image", 1, 0.0, 0.0, 10.0, 10.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_truncate_pages() {
    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(4)).unwrap();
    pdf.insert_text("kept", 1, 10.0, 10.0, 12.0).unwrap();
    pdf.insert_text("dropped", 4, 10.0, 10.0, 12.0).unwrap();
    pdf.truncate_pages(2);
    assert_eq!(pdf.page_count(), 2);

    let bytes = pdf.to_bytes().unwrap();
    let reloaded = Document::load_mem(&bytes).unwrap();
    assert_eq!(reloaded.get_pages().len(), 2);
    assert!(page_text(&bytes, 1).contains("Tj"));
}

#[test]
fn test_save_to_file() {
    let dir = std::env::temp_dir().join("pdf_core_save_test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.pdf");

    let mut pdf = PdfDocument::open_from_bytes(&create_test_pdf_with_pages(1)).unwrap();
    pdf.insert_text("saved", 1, 10.0, 10.0, 12.0).unwrap();
    pdf.save(&path).unwrap();

    let reopened = PdfDocument::open(&path).unwrap();
    assert_eq!(reopened.page_count(), 1);
    std::fs::remove_file(&path).ok();
}
