//! End-to-end fill tests against synthesized templates

use formfill::{
    dump_fields, fill, write_fillable_pdf, ButtonState, DumpKind, FieldValue, FieldValues, FillError,
    FillRequest, FillWarning, RenderDirectives, Signature, TemplateRef,
};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

const KEYFILE: &str = "\
# Form 8621 (test subset)
reference_id_number XQ.1234 /Tx
10a_mark_to_market_dollars f10a_d /Tx
10a_mark_to_market_cents f10a_c /Tx
address_entity f_addr /Tx
is_individual c1_1 /Btn
filing_status_single c2_1 /Btn
";

fn literal(name: &str) -> Object {
    Object::String(name.as_bytes().to_vec(), StringFormat::Literal)
}

fn text_widget(doc: &mut Document, name: &str, rect: [i64; 4]) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => literal(name),
        "Rect" => rect.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
    })
}

/// Two-page template: text fields and a checkbox on page 1, a radio
/// group on page 2. Returns the PDF bytes and the radio parent's id.
fn build_template() -> (Vec<u8>, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let reference = text_widget(&mut doc, "XQ.1234", [100, 100, 300, 120]);
    let dollars = text_widget(&mut doc, "f10a_d", [400, 200, 500, 220]);
    let cents = text_widget(&mut doc, "f10a_c", [500, 200, 530, 220]);
    let address = text_widget(&mut doc, "f_addr", [100, 300, 400, 340]);
    let checkbox = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => literal("c1_1"),
        "Rect" => vec![50.into(), 50.into(), 60.into(), 60.into()],
    });

    let radio_parent = doc.add_object(dictionary! {
        "FT" => "Btn",
        "T" => literal("c2_1"),
        "V" => "Off",
    });
    let mut kids = Vec::new();
    for (state, x) in [("Yes", 100), ("No", 150)] {
        kids.push(doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => radio_parent,
            "AS" => "Off",
            "Rect" => vec![x.into(), 600.into(), (x + 10).into(), 610.into()],
            "AP" => dictionary! {
                "D" => dictionary! { state => dictionary! {}, "Off" => dictionary! {} },
            },
        }));
    }

    let content1 = doc.add_object(lopdf::Stream::new(dictionary! {}, b"0 0 m 612 792 l S".to_vec()));
    let page1 = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => dictionary! { "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica" } },
        },
        "Contents" => content1,
        "Annots" => vec![reference.into(), dollars.into(), cents.into(), address.into(), checkbox.into()],
    });
    let page2 = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Annots" => kids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page1.into(), page2.into()],
            "Count" => 2,
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    (bytes, radio_parent)
}

struct Fixture {
    dir: TempDir,
    template: TemplateRef,
    radio_parent: ObjectId,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (pdf, radio_parent) = build_template();
        let template_path = dir.path().join("f8621.pdf");
        let keyfile_path = dir.path().join("f8621.keys");
        std::fs::write(&template_path, pdf).unwrap();
        std::fs::write(&keyfile_path, KEYFILE).unwrap();
        Self {
            template: TemplateRef::new(template_path, keyfile_path),
            dir,
            radio_parent,
        }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }
}

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn values(pairs: &[(&str, FieldValue)]) -> FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn write_png(path: &Path) {
    let img = image::RgbImage::from_pixel(4, 2, image::Rgb([0, 0, 0]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn test_text_field_is_drawn_at_padded_origin() {
    let fixture = Fixture::new();
    let values = values(&[("reference_id_number", FieldValue::from("XQ.1234"))]);

    let outcome = fill(&fixture.template, &values, &RenderDirectives::default()).unwrap();
    assert!(outcome.warnings.is_empty());

    let content = page_content(&outcome.bytes, 1);
    assert!(content.contains("12 Tf\n108 102 Td\n<58512E31323334> Tj"));
    // Template drawing survives underneath
    assert!(content.contains("0 0 m 612 792 l S"));
}

#[test]
fn test_dollars_round_with_cents_and_cents_are_blank() {
    let fixture = Fixture::new();
    let values = values(&[
        ("10a_mark_to_market_dollars", FieldValue::Numeric(1234.0)),
        ("10a_mark_to_market_cents", FieldValue::Numeric(51.0)),
    ]);

    let outcome = fill(&fixture.template, &values, &RenderDirectives::default()).unwrap();
    let content = page_content(&outcome.bytes, 1);

    // "   1,235" at (404, 202)
    assert!(content.contains("404 202 Td\n<202020312C323335> Tj"));
    assert_eq!(content.matches(" Tj").count(), 1);
}

#[test]
fn test_checkbox_and_multi_line() {
    let fixture = Fixture::new();
    let values = values(&[
        ("is_individual", FieldValue::Checked(true)),
        ("address_entity", FieldValue::from("1 Main\nSpringfield")),
    ]);

    let outcome = fill(&fixture.template, &values, &RenderDirectives::default()).unwrap();
    let content = page_content(&outcome.bytes, 1);

    assert!(content.contains("50 52 Td\n<58> Tj"));
    // Address box: min (100, 300), pads 12 and 1, so bottom is 303
    assert!(content.contains("/F2 9 Tf\n112 321 Td"));
    assert!(content.contains("/F2 9 Tf\n112 312 Td"));
}

#[test]
fn test_unknown_field_fails_before_output() {
    let fixture = Fixture::new();
    let values = values(&[("not_a_field", FieldValue::from("x"))]);
    let output = fixture.path("out.pdf");

    let err = write_fillable_pdf(&fixture.template, &values, &RenderDirectives::default(), &output)
        .unwrap_err();
    assert!(matches!(err, FillError::UnknownField(ref name) if name == "not_a_field"));
    assert!(!output.exists());
}

#[test]
fn test_grouped_button_state_is_applied() {
    let fixture = Fixture::new();
    let directives = RenderDirectives {
        buttons: vec![ButtonState::new("filing_status_single", "Yes")],
        ..Default::default()
    };

    let outcome = fill(&fixture.template, &FieldValues::new(), &directives).unwrap();
    assert!(outcome.warnings.is_empty());

    let doc = Document::load_mem(&outcome.bytes).unwrap();
    let parent = doc.get_dictionary(fixture.radio_parent).unwrap();
    assert_eq!(parent.get(b"V").unwrap().as_name_str().unwrap(), "Yes");
}

#[test]
fn test_unmatched_button_state_is_a_warning() {
    let fixture = Fixture::new();
    let directives = RenderDirectives {
        buttons: vec![ButtonState::new("filing_status_single", "Maybe")],
        ..Default::default()
    };

    let outcome = fill(&fixture.template, &FieldValues::new(), &directives).unwrap();
    assert_eq!(
        outcome.warnings,
        vec![FillWarning::UnmatchedButtonState {
            field: "filing_status_single".to_string(),
            state: "Maybe".to_string(),
        }]
    );

    let doc = Document::load_mem(&outcome.bytes).unwrap();
    let parent = doc.get_dictionary(fixture.radio_parent).unwrap();
    assert_eq!(parent.get(b"V").unwrap().as_name_str().unwrap(), "Off");
}

#[test]
fn test_output_keeps_template_page_count() {
    let fixture = Fixture::new();
    let output = fixture.path("filled.pdf");
    let values = values(&[("reference_id_number", FieldValue::from("XQ.1234"))]);

    write_fillable_pdf(&fixture.template, &values, &RenderDirectives::default(), &output).unwrap();
    let doc = Document::load(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[test]
fn test_signature_and_extra_annotations() {
    let fixture = Fixture::new();
    let signature_path = fixture.path("sig.png");
    write_png(&signature_path);

    let request = FillRequest::from_json(&format!(
        r#"{{
            "reference_id_number": "XQ.1234",
            "_signature_page": 2,
            "_signature_path": {path},
            "_signature_x": 300,
            "_signature_y": 80,
            "_signature_width": 120,
            "_signature_height": 30,
            "_extra_annots": {{"1": [{{"size": 10, "x": 40, "y": 700, "string": "See statement"}}]}}
        }}"#,
        path = serde_json::to_string(&signature_path).unwrap()
    ))
    .unwrap();
    assert_eq!(
        request.directives.signature.as_ref().map(|s: &Signature| s.page),
        Some(2)
    );

    let outcome = fill(&fixture.template, &request.values, &request.directives).unwrap();

    let page1 = page_content(&outcome.bytes, 1);
    assert!(page1.contains("/F2 10 Tf\n40 700 Td"));
    let page2 = page_content(&outcome.bytes, 2);
    assert!(page2.contains("120 0 0 30 300 80 cm\n/Im1 Do"));
}

#[test]
fn test_missing_template() {
    let fixture = Fixture::new();
    let template = TemplateRef::new(fixture.path("missing.pdf"), fixture.template.keyfile.clone());
    let err = fill(&template, &FieldValues::new(), &RenderDirectives::default()).unwrap_err();
    assert!(matches!(err, FillError::TemplateLoad { .. }));
}

#[test]
fn test_malformed_keyfile() {
    let fixture = Fixture::new();
    let keyfile = fixture.path("bad.keys");
    std::fs::write(&keyfile, "good f1 /Tx\nbad_line\n").unwrap();
    let template = TemplateRef::new(fixture.template.template.clone(), keyfile);

    let err = fill(&template, &FieldValues::new(), &RenderDirectives::default()).unwrap_err();
    assert!(matches!(err, FillError::MalformedKeyfile { line: 2, .. }));
}

#[test]
fn test_dump_fields() {
    let fixture = Fixture::new();
    let dumps = dump_fields(&fixture.template.template).unwrap();

    let names: Vec<_> = dumps.iter().map(|d| (d.page, d.name.as_str())).collect();
    assert_eq!(
        names,
        vec![
            (1, "XQ.1234"),
            (1, "f10a_d"),
            (1, "f10a_c"),
            (1, "f_addr"),
            (1, "c1_1"),
            (2, "c2_1"),
            (2, "c2_1"),
        ]
    );
    assert_eq!(
        dumps[5].kind,
        DumpKind::GroupedButton {
            states: vec!["Yes".to_string(), "Off".to_string()],
        }
    );
    assert_eq!(dumps[4].keyfile_line(), "c1_1 c1_1 /Btn");
}
